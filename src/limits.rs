/// Hour the centre opens. Bookings may start at this hour at the earliest.
pub const OPENING_HOUR: u8 = 9;

/// Hour the centre closes. Bookings must end at or before this hour.
pub const CLOSING_HOUR: u8 = 21;

pub const MAX_NAME_LEN: usize = 128;
pub const MAX_QUANTITY_PER_BOOKING: u32 = 50;
pub const MAX_UNITS_PER_POOL: usize = 1_000;
pub const MAX_BOOKINGS_PER_KIND: usize = 100_000;
