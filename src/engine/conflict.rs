use chrono::NaiveDate;
use ulid::Ulid;

use crate::clock::Clock;
use crate::limits::*;
use crate::model::*;

use super::store::Catalog;
use super::BookingError;

/// Reject windows outside opening hours or with `start >= end`.
pub(crate) fn validate_window(start: Hour, end: Hour) -> Result<HourSpan, BookingError> {
    if start < OPENING_HOUR || end > CLOSING_HOUR || start >= end {
        return Err(BookingError::InvalidTimeWindow { start, end });
    }
    Ok(HourSpan::new(start, end))
}

/// A new slot must not already have started.
pub(crate) fn validate_not_past(
    date: NaiveDate,
    span: &HourSpan,
    clock: &dyn Clock,
) -> Result<(), BookingError> {
    let today = clock.today();
    if date < today || (date == today && span.start <= clock.current_hour()) {
        return Err(BookingError::InvalidTimeWindow {
            start: span.start,
            end: span.end,
        });
    }
    Ok(())
}

/// Update and cancel are only allowed on active bookings whose slot has not begun.
pub(crate) fn check_not_started(id: Ulid, slot: &BookingSlot, clock: &dyn Clock) -> Result<(), BookingError> {
    if !slot.status.is_active() || slot.has_started(clock.today(), clock.current_hour()) {
        return Err(BookingError::BookingAlreadyStarted(id));
    }
    Ok(())
}

pub(crate) fn check_facility_bookable(catalog: &Catalog, facility: &Ulid) -> Result<(), BookingError> {
    match catalog.facility_status(facility) {
        None => Err(BookingError::ResourceNotFound(*facility)),
        Some(FacilityStatus::UnderMaintenance) => Err(BookingError::ResourceUnavailable(*facility)),
        Some(FacilityStatus::Available) => Ok(()),
    }
}

pub(crate) fn validate_quantity(quantity: u32) -> Result<(), BookingError> {
    if quantity == 0 {
        return Err(BookingError::InsufficientUnits {
            requested: 0,
            available: 0,
        });
    }
    if quantity > MAX_QUANTITY_PER_BOOKING {
        return Err(BookingError::LimitExceeded("quantity too large"));
    }
    Ok(())
}

/// Look up an equipment type and make sure it is of the expected category.
pub(crate) fn equipment_type_of(
    catalog: &Catalog,
    type_id: &Ulid,
    category: EquipmentCategory,
) -> Result<EquipmentType, BookingError> {
    let ty = catalog
        .equipment_type(type_id)
        .ok_or(BookingError::ResourceNotFound(*type_id))?;
    if ty.category != category {
        return Err(BookingError::CategoryMismatch(*type_id));
    }
    Ok(ty)
}
