
pub mod ephemeris;
pub mod nav_msg;

pub const NAV_BIT_PERIOD_MS:i32 = 20;
