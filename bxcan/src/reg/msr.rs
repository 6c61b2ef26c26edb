//! Master status register (MSR)

use bitfield::bitfield;

bitfield! {
    /// Value of the master status register
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct Msr(u32);
    impl Debug;
    /// Actual level of the CAN RX pin
    pub rx, set_rx: 11;
    /// Last sample point
    pub samp, set_samp: 10;
    /// Receive mode
    pub rxm, set_rxm: 9;
    /// Transmit mode
    pub txm, set_txm: 8;
    /// Sleep acknowledge interrupt (write 1 to clear)
    pub slaki, set_slaki: 4;
    /// Wake-up interrupt (write 1 to clear)
    pub wkui, set_wkui: 3;
    /// Error interrupt (write 1 to clear)
    pub erri, set_erri: 2;
    /// Sleep acknowledge
    pub slak, set_slak: 1;
    /// Initialization acknowledge
    pub inak, set_inak: 0;
}

/// Value after reset: asleep, RX pin recessive
pub const RESET_VALUE: u32 = 0x0000_0C02;

impl_register_value!(Msr);
