use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Whole hour of the day. The only time-of-day type.
pub type Hour = u8;

/// Half-open hour interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HourSpan {
    pub start: Hour,
    pub end: Hour,
}

impl HourSpan {
    pub fn new(start: Hour, end: Hour) -> Self {
        debug_assert!(start < end, "HourSpan start must be before end");
        Self { start, end }
    }

    pub fn hours(&self) -> u32 {
        u32::from(self.end - self.start)
    }

    pub fn overlaps(&self, other: &HourSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_hour(&self, h: Hour) -> bool {
        self.start <= h && h < self.end
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains_span(&self, other: &HourSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Every hour slot covered by the span, in ascending order.
    pub fn each_hour(&self) -> std::ops::Range<Hour> {
        self.start..self.end
    }
}

impl std::fmt::Display for HourSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:00 ~ {:02}:00", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    /// Created, awaiting payment.
    Pending,
    /// Paid.
    Confirmed,
    /// The slot is over. Ended bookings no longer reserve anything.
    Ended,
}

impl BookingStatus {
    /// Pending and confirmed bookings hold their slot.
    pub fn is_active(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Ended => "ENDED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacilityStatus {
    Available,
    UnderMaintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentCategory {
    /// Lent out for a time slot; each unit is held exclusively.
    Borrowable,
    /// Sold by count; no time exclusivity.
    Sellable,
}

// ── Catalogue ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityType {
    pub id: Ulid,
    pub name: String,
    pub sport: String,
    pub price_per_hour: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportFacility {
    pub id: Ulid,
    pub name: String,
    pub facility_type: Ulid,
    pub status: FacilityStatus,
}

/// Template shared by a pool of interchangeable equipment units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentType {
    pub id: Ulid,
    /// Catalogue code, e.g. `ET-001`.
    pub code: String,
    pub name: String,
    /// Prefix of unit labels, e.g. `BASKA`.
    pub short_name: String,
    pub sport: String,
    pub price: f64,
    pub category: EquipmentCategory,
}

/// One physical equipment unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: Ulid,
    pub serial: u32,
    pub equipment_type: Ulid,
}

impl Equipment {
    /// Human-facing label such as `BASKA-003`.
    pub fn label(&self, ty: &EquipmentType) -> String {
        format!("{}-{:03}", ty.short_name, self.serial)
    }
}

/// Something that can hold a time slot: a facility or a single equipment unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Facility(Ulid),
    Unit(Ulid),
}

// ── Booking records ───────────────────────────────────────────────

/// Fields common to every booking record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSlot {
    pub user: Ulid,
    pub date: NaiveDate,
    pub span: HourSpan,
    pub status: BookingStatus,
}

impl BookingSlot {
    pub fn new(user: Ulid, date: NaiveDate, span: HourSpan) -> Self {
        Self {
            user,
            date,
            span,
            status: BookingStatus::Pending,
        }
    }

    /// True once the slot's first hour has been reached.
    pub fn has_started(&self, today: NaiveDate, hour: Hour) -> bool {
        self.date < today || (self.date == today && self.span.start <= hour)
    }

    /// True once the slot's end hour has been reached.
    pub fn has_elapsed(&self, today: NaiveDate, hour: Hour) -> bool {
        self.date < today || (self.date == today && self.span.end <= hour)
    }

    pub fn sort_key(&self) -> (NaiveDate, Hour) {
        (self.date, self.span.start)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityBooking {
    pub id: Ulid,
    pub facility: Ulid,
    pub slot: BookingSlot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentBooking {
    pub id: Ulid,
    pub equipment_type: Ulid,
    pub category: EquipmentCategory,
    /// Borrowable: exactly `quantity` distinct units. Sellable: one representative unit.
    pub units: Vec<Ulid>,
    pub quantity: u32,
    pub slot: BookingSlot,
}

impl EquipmentBooking {
    /// Whether this record occupies `unit` for its slot.
    pub fn holds_unit(&self, unit: &Ulid) -> bool {
        self.category == EquipmentCategory::Borrowable && self.units.contains(unit)
    }

    pub fn is_sellable(&self) -> bool {
        self.category == EquipmentCategory::Sellable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingKind {
    Facility,
    Equipment,
}

/// Lifecycle events broadcast to the owning user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    BookingCreated {
        id: Ulid,
        kind: BookingKind,
    },
    BookingConfirmed {
        id: Ulid,
    },
    BookingRescheduled {
        id: Ulid,
        date: NaiveDate,
        span: HourSpan,
    },
    FacilityReassigned {
        id: Ulid,
        facility: Ulid,
    },
    BookingCancelled {
        id: Ulid,
    },
    BookingEnded {
        id: Ulid,
    },
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserBookings {
    pub facility: Vec<FacilityBooking>,
    pub equipment: Vec<EquipmentBooking>,
}

impl UserBookings {
    pub fn is_empty(&self) -> bool {
        self.facility.is_empty() && self.equipment.is_empty()
    }
}

/// Records moved to ENDED by one status sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub facility: Vec<Ulid>,
    pub equipment: Vec<Ulid>,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.facility.len() + self.equipment.len()
    }
}
