pub mod datetime;
pub mod interval;
