//! Error status register (ESR)

use bitfield::bitfield;

bitfield! {
    /// Value of the error status register
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct Esr(u32);
    impl Debug;
    /// Receive error counter
    pub u8, rec, _: 31, 24;
    /// Transmit error counter
    pub u8, tec, _: 23, 16;
    /// Last error code
    pub u8, lec, set_lec: 6, 4;
    /// Bus-off flag
    pub boff, _: 2;
    /// Error passive flag
    pub epvf, _: 1;
    /// Error warning flag
    pub ewgf, _: 0;
}

impl_register_value!(Esr);
