use std::collections::BTreeSet;

use chrono::NaiveDate;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;

use super::gaps::compute_gaps;
use super::pool::{pool_gaps, units_free_for};
use super::{BookingError, Engine};

/// Active spans booked on `facility` for `date`, skipping `exclude`.
pub(crate) fn facility_busy(
    bookings: &[FacilityBooking],
    facility: &Ulid,
    date: NaiveDate,
    exclude: Option<Ulid>,
) -> Vec<HourSpan> {
    bookings
        .iter()
        .filter(|b| {
            b.facility == *facility
                && b.slot.date == date
                && b.slot.status.is_active()
                && Some(b.id) != exclude
        })
        .map(|b| b.slot.span)
        .collect()
}

/// Active spans holding `unit` on `date`, skipping `exclude`.
pub(crate) fn unit_busy(
    bookings: &[EquipmentBooking],
    unit: &Ulid,
    date: NaiveDate,
    exclude: Option<Ulid>,
) -> Vec<HourSpan> {
    bookings
        .iter()
        .filter(|b| {
            b.holds_unit(unit)
                && b.slot.date == date
                && b.slot.status.is_active()
                && Some(b.id) != exclude
        })
        .map(|b| b.slot.span)
        .collect()
}

impl Engine {
    // ── Single-resource availability ─────────────────────────

    /// Free intervals of one facility or one equipment unit on `date`.
    pub async fn available_slots(&self, resource: Resource, date: NaiveDate) -> Result<Vec<HourSpan>, BookingError> {
        match resource {
            Resource::Facility(id) => {
                if !self.catalog.contains_facility(&id) {
                    return Err(BookingError::ResourceNotFound(id));
                }
                let guard = self.facility_bookings.read().await;
                let busy = facility_busy(&guard, &id, date, None);
                Ok(compute_gaps(&busy, OPENING_HOUR, CLOSING_HOUR))
            }
            Resource::Unit(id) => {
                if self.catalog.unit(&id).is_none() {
                    return Err(BookingError::ResourceNotFound(id));
                }
                let guard = self.equipment_bookings.read().await;
                let busy = unit_busy(&guard, &id, date, None);
                Ok(compute_gaps(&busy, OPENING_HOUR, CLOSING_HOUR))
            }
        }
    }

    // ── Pool availability ────────────────────────────────────

    /// Single-resource free intervals of every unit in a type's pool, in pool order.
    pub(crate) fn pool_free(
        &self,
        bookings: &[EquipmentBooking],
        type_id: &Ulid,
        date: NaiveDate,
        exclude: Option<Ulid>,
    ) -> Vec<(Ulid, Vec<HourSpan>)> {
        self.catalog
            .pool(type_id)
            .into_iter()
            .map(|unit| {
                let busy = unit_busy(bookings, &unit, date, exclude);
                (unit, compute_gaps(&busy, OPENING_HOUR, CLOSING_HOUR))
            })
            .collect()
    }

    /// Pool-level gaps for a request of as many units as `units` names, of their shared type.
    ///
    /// Availability is computed over the whole pool, not only the listed units.
    /// A unit listed twice is counted once.
    pub async fn available_gap_slots(&self, units: &[Ulid], date: NaiveDate) -> Result<Vec<HourSpan>, BookingError> {
        let mut seen = BTreeSet::new();
        let units: Vec<Ulid> = units.iter().copied().filter(|u| seen.insert(*u)).collect();
        let Some(first) = units.first() else {
            return Ok(Vec::new());
        };
        let type_id = self
            .catalog
            .unit(first)
            .ok_or(BookingError::ResourceNotFound(*first))?
            .equipment_type;
        for id in &units[1..] {
            let unit = self.catalog.unit(id).ok_or(BookingError::ResourceNotFound(*id))?;
            if unit.equipment_type != type_id {
                return Err(BookingError::CategoryMismatch(*id));
            }
        }
        self.available_gap_slots_for_type(type_id, units.len() as u32, date).await
    }

    /// Pool-level gaps where `quantity` units of `type_id` are free together.
    pub async fn available_gap_slots_for_type(
        &self,
        type_id: Ulid,
        quantity: u32,
        date: NaiveDate,
    ) -> Result<Vec<HourSpan>, BookingError> {
        if self.catalog.equipment_type(&type_id).is_none() {
            return Err(BookingError::ResourceNotFound(type_id));
        }
        let guard = self.equipment_bookings.read().await;
        let free = self.pool_free(&guard, &type_id, date, None);
        Ok(pool_gaps(&free, quantity as usize))
    }

    /// Units of `type_id` free for all of `window`, in pool order.
    pub async fn available_units(&self, type_id: Ulid, date: NaiveDate, window: HourSpan) -> Vec<Ulid> {
        let guard = self.equipment_bookings.read().await;
        let free = self.pool_free(&guard, &type_id, date, None);
        units_free_for(&free, &window)
    }

    /// How many units of each type could be borrowed for `window`.
    ///
    /// Sellable types report their stock of units, since they are not time-bound.
    pub async fn available_quantity_by_type(
        &self,
        types: &[Ulid],
        date: NaiveDate,
        window: HourSpan,
    ) -> Vec<(Ulid, u32)> {
        let guard = self.equipment_bookings.read().await;
        types
            .iter()
            .map(|type_id| {
                let count = match self.catalog.equipment_type(type_id) {
                    None => 0,
                    Some(ty) if ty.category == EquipmentCategory::Sellable => {
                        self.catalog.pool(type_id).len()
                    }
                    Some(_) => {
                        let free = self.pool_free(&guard, type_id, date, None);
                        units_free_for(&free, &window).len()
                    }
                };
                (*type_id, count as u32)
            })
            .collect()
    }

    // ── Listings ─────────────────────────────────────────────

    /// Facilities open for booking, ordered by name.
    pub fn available_facilities(&self) -> Vec<SportFacility> {
        self.catalog
            .facilities()
            .into_iter()
            .filter(|f| f.status == FacilityStatus::Available)
            .collect()
    }

    /// Every booking record of a facility on `date`, whatever its status.
    pub async fn facility_bookings_on(
        &self,
        facility: Ulid,
        date: NaiveDate,
    ) -> Result<Vec<FacilityBooking>, BookingError> {
        if !self.catalog.contains_facility(&facility) {
            return Err(BookingError::ResourceNotFound(facility));
        }
        let guard = self.facility_bookings.read().await;
        Ok(guard
            .iter()
            .filter(|b| b.facility == facility && b.slot.date == date)
            .cloned()
            .collect())
    }

    /// A user's bookings, optionally narrowed to one status. Sorted by date and start hour.
    pub async fn user_bookings(&self, user: Ulid, status: Option<BookingStatus>) -> UserBookings {
        let matches = |slot: &BookingSlot| slot.user == user && status.is_none_or(|s| slot.status == s);
        let facility = self
            .facility_bookings
            .read()
            .await
            .iter()
            .filter(|b| matches(&b.slot))
            .cloned()
            .collect();
        let equipment = self
            .equipment_bookings
            .read()
            .await
            .iter()
            .filter(|b| matches(&b.slot))
            .cloned()
            .collect();
        UserBookings { facility, equipment }
    }

    pub async fn facility_booking(&self, id: Ulid) -> Option<FacilityBooking> {
        self.facility_bookings
            .read()
            .await
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    pub async fn equipment_booking(&self, id: Ulid) -> Option<EquipmentBooking> {
        self.equipment_bookings
            .read()
            .await
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    // ── Pricing hook ─────────────────────────────────────────

    fn facility_price(&self, booking: &FacilityBooking) -> f64 {
        self.catalog
            .facility(&booking.facility)
            .and_then(|f| self.catalog.facility_type(&f.facility_type))
            .map_or(0.0, |t| t.price_per_hour * f64::from(booking.slot.span.hours()))
    }

    fn equipment_price(&self, booking: &EquipmentBooking) -> f64 {
        let unit_price = self
            .catalog
            .equipment_type(&booking.equipment_type)
            .map_or(0.0, |t| t.price);
        match booking.category {
            EquipmentCategory::Borrowable => unit_price * booking.units.len() as f64,
            EquipmentCategory::Sellable => unit_price * f64::from(booking.quantity),
        }
    }

    /// Undiscounted price of one booking record.
    pub async fn total_price(&self, id: Ulid) -> Result<f64, BookingError> {
        if let Some(b) = self.facility_booking(id).await {
            return Ok(self.facility_price(&b));
        }
        if let Some(b) = self.equipment_booking(id).await {
            return Ok(self.equipment_price(&b));
        }
        Err(BookingError::RecordNotFound(id))
    }

    /// Undiscounted sum over a user's pending bookings, the amount due at payment.
    pub async fn pending_total(&self, user: Ulid) -> f64 {
        let pending = self.user_bookings(user, Some(BookingStatus::Pending)).await;
        let facility: f64 = pending.facility.iter().map(|b| self.facility_price(b)).sum();
        let equipment: f64 = pending.equipment.iter().map(|b| self.equipment_price(b)).sum();
        facility + equipment
    }
}
