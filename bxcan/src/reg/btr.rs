//! Bit timing register (BTR)
//!
//! Segment lengths and the prescaler are stored as `value - 1`.

use bitfield::bitfield;

bitfield! {
    /// Value of the bit timing register
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct Btr(u32);
    impl Debug;
    /// Silent mode (debug)
    pub silm, set_silm: 31;
    /// Loop back mode (debug)
    pub lbkm, set_lbkm: 30;
    /// Resynchronization jump width, minus one
    pub u8, sjw, set_sjw: 25, 24;
    /// Time segment 2, minus one
    pub u8, ts2, set_ts2: 22, 20;
    /// Time segment 1, minus one
    pub u8, ts1, set_ts1: 19, 16;
    /// Baud rate prescaler, minus one
    pub u16, brp, set_brp: 9, 0;
}

/// Value after reset
pub const RESET_VALUE: u32 = 0x0123_0000;

/// Bits written by a timing reconfiguration; everything else is reserved
pub const CONFIG_MASK: u32 = 0xC37F_03FF;

impl_register_value!(Btr);
