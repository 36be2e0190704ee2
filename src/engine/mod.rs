mod conflict;
mod error;
mod gaps;
mod mutations;
mod pool;
mod queries;
mod store;

pub use error::BookingError;
pub use gaps::{compute_gaps, covers};
pub use pool::{free_units_by_hour, gaps_cover_hours, pool_gaps, units_free_for};
pub use store::{Catalog, CatalogSeed, EquipmentTypeSeed, FacilitySeed, FacilityTypeSeed};

use std::sync::Arc;

use tokio::sync::RwLock;
use ulid::Ulid;

use crate::clock::Clock;
use crate::model::*;
use crate::notify::NotifyHub;

/// Owns the booking collections and runs every availability query and mutation.
///
/// Both collections are kept sorted by `(date, start)`. Any code path that needs
/// both locks takes the facility lock first.
pub struct Engine {
    pub catalog: Arc<Catalog>,
    facility_bookings: RwLock<Vec<FacilityBooking>>,
    equipment_bookings: RwLock<Vec<EquipmentBooking>>,
    clock: Arc<dyn Clock>,
    pub notify: Arc<NotifyHub>,
}

impl Engine {
    pub fn new(catalog: Arc<Catalog>, clock: Arc<dyn Clock>, notify: Arc<NotifyHub>) -> Self {
        Self {
            catalog,
            facility_bookings: RwLock::new(Vec::new()),
            equipment_bookings: RwLock::new(Vec::new()),
            clock,
            notify,
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn emit(&self, user: Ulid, event: Event) {
        self.notify.send(user, &event);
    }
}

fn sort_facility(bookings: &mut [FacilityBooking]) {
    bookings.sort_by_key(|b| b.slot.sort_key());
}

fn sort_equipment(bookings: &mut [EquipmentBooking]) {
    bookings.sort_by_key(|b| b.slot.sort_key());
}

/// Count a rejected operation by reason.
fn note_rejection(err: &BookingError) {
    metrics::counter!(crate::observability::BOOKINGS_REJECTED_TOTAL, "reason" => err.kind())
        .increment(1);
}

fn kind_label(kind: BookingKind) -> &'static str {
    match kind {
        BookingKind::Facility => "facility",
        BookingKind::Equipment => "equipment",
    }
}
