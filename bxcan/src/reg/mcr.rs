//! Master control register (MCR)

use bitfield::bitfield;

bitfield! {
    /// Value of the master control register
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct Mcr(u32);
    impl Debug;
    /// Debug freeze: reception and transmission stop while the core is halted
    pub dbf, set_dbf: 16;
    /// Software master reset
    pub reset, set_reset: 15;
    /// Time triggered communication mode
    pub ttcm, set_ttcm: 7;
    /// Automatic bus-off management
    pub abom, set_abom: 6;
    /// Automatic wake-up on bus activity
    pub awum, set_awum: 5;
    /// No automatic retransmission
    pub nart, set_nart: 4;
    /// Receive FIFO locked against overrun
    pub rflm, set_rflm: 3;
    /// Transmit FIFO priority (chronological instead of by identifier)
    pub txfp, set_txfp: 2;
    /// Sleep mode request
    pub sleep, set_sleep: 1;
    /// Initialization request
    pub inrq, set_inrq: 0;
}

/// Value after reset: debug freeze on, sleep requested
pub const RESET_VALUE: u32 = 0x0001_0002;

/// Bits that carry configuration. `RESET`, `SLEEP` and `INRQ` are live
/// requests and stay out of configuration writes.
pub const CONFIG_MASK: u32 = 1 << 16 | 0b1111_1100;

impl_register_value!(Mcr);
