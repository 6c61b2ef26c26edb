//! Interrupt enable register (IER)

use bitfield::bitfield;

bitfield! {
    /// Value of the interrupt enable register
    #[derive(Copy, Clone, Default, PartialEq, Eq)]
    pub struct Ier(u32);
    impl Debug;
    /// Sleep interrupt enable
    pub slkie, set_slkie: 17;
    /// Wake-up interrupt enable
    pub wkuie, set_wkuie: 16;
    /// Error interrupt enable
    pub errie, set_errie: 15;
    /// Last error code interrupt enable
    pub lecie, set_lecie: 11;
    /// Bus-off interrupt enable
    pub bofie, set_bofie: 10;
    /// Error passive interrupt enable
    pub epvie, set_epvie: 9;
    /// Error warning interrupt enable
    pub ewgie, set_ewgie: 8;
    /// FIFO 1 overrun interrupt enable
    pub fovie1, set_fovie1: 6;
    /// FIFO 1 full interrupt enable
    pub ffie1, set_ffie1: 5;
    /// FIFO 1 message pending interrupt enable
    pub fmpie1, set_fmpie1: 4;
    /// FIFO 0 overrun interrupt enable
    pub fovie0, set_fovie0: 3;
    /// FIFO 0 full interrupt enable
    pub ffie0, set_ffie0: 2;
    /// FIFO 0 message pending interrupt enable
    pub fmpie0, set_fmpie0: 1;
    /// Transmit mailbox empty interrupt enable
    pub tmeie, set_tmeie: 0;
}

/// All documented enable bits
pub const CONFIG_MASK: u32 = 0x0003_8F7F;

impl_register_value!(Ier);
