use ulid::Ulid;

use crate::model::{BookingStatus, HourSpan};

#[derive(Debug, Clone, PartialEq)]
pub enum BookingError {
    /// Outside opening hours, or start >= end.
    InvalidTimeWindow { start: u8, end: u8 },
    /// No free interval covers the requested window.
    SlotUnavailable(HourSpan),
    InsufficientUnits { requested: u32, available: u32 },
    ResourceNotFound(Ulid),
    ResourceUnavailable(Ulid),
    RecordNotFound(Ulid),
    BookingAlreadyStarted(Ulid),
    /// Sellable equipment records cannot be rescheduled.
    NotUpdatable(Ulid),
    InvalidTransition { id: Ulid, from: BookingStatus, to: BookingStatus },
    /// Equipment type used with the wrong operation (borrow vs buy).
    CategoryMismatch(Ulid),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::InvalidTimeWindow { start, end } => write!(
                f,
                "invalid time slot {start}..{end}: select a time between 09:00 and 21:00"
            ),
            BookingError::SlotUnavailable(span) => {
                write!(f, "the selected time slot {span} is not available on that day")
            }
            BookingError::InsufficientUnits { requested, available } => write!(
                f,
                "not enough available equipment: requested {requested}, available {available}"
            ),
            BookingError::ResourceNotFound(id) => write!(f, "resource not found: {id}"),
            BookingError::ResourceUnavailable(id) => {
                write!(f, "resource {id} is not available for booking")
            }
            BookingError::RecordNotFound(id) => write!(f, "booking record not found: {id}"),
            BookingError::BookingAlreadyStarted(id) => {
                write!(f, "booking {id} has already started")
            }
            BookingError::NotUpdatable(id) => {
                write!(f, "booking {id} is for sellable equipment and cannot be updated")
            }
            BookingError::InvalidTransition { id, from, to } => {
                write!(f, "booking {id} cannot move from {from} to {to}")
            }
            BookingError::CategoryMismatch(id) => {
                write!(f, "equipment type {id} does not support this operation")
            }
            BookingError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for BookingError {}

impl BookingError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::InvalidTimeWindow { .. } => "invalid_time_window",
            BookingError::SlotUnavailable(_) => "slot_unavailable",
            BookingError::InsufficientUnits { .. } => "insufficient_units",
            BookingError::ResourceNotFound(_) => "resource_not_found",
            BookingError::ResourceUnavailable(_) => "resource_unavailable",
            BookingError::RecordNotFound(_) => "record_not_found",
            BookingError::BookingAlreadyStarted(_) => "booking_already_started",
            BookingError::NotUpdatable(_) => "not_updatable",
            BookingError::InvalidTransition { .. } => "invalid_transition",
            BookingError::CategoryMismatch(_) => "category_mismatch",
            BookingError::LimitExceeded(_) => "limit_exceeded",
        }
    }
}
