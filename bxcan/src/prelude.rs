//! Traits needed to call into handlers and delays
pub use crate::interrupt::Handler as _;
pub use embedded_hal::blocking::delay::DelayUs as _;
