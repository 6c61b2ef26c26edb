//! Transmit status register (TSR)

use bitfield::bitfield;

bitfield! {
    /// Value of the transmit status register
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct Tsr(u32);
    impl Debug;
    /// Lowest priority flag for mailbox 2
    pub low2, _: 31;
    /// Lowest priority flag for mailbox 1
    pub low1, _: 30;
    /// Lowest priority flag for mailbox 0
    pub low0, _: 29;
    /// Transmit mailbox 2 empty
    pub tme2, set_tme2: 28;
    /// Transmit mailbox 1 empty
    pub tme1, set_tme1: 27;
    /// Transmit mailbox 0 empty
    pub tme0, set_tme0: 26;
    /// Number of the next empty mailbox
    pub u8, code, _: 25, 24;
    /// Abort request for mailbox 2
    pub abrq2, set_abrq2: 23;
    /// Transmission error of mailbox 2
    pub terr2, _: 19;
    /// Arbitration lost for mailbox 2
    pub alst2, _: 18;
    /// Transmission OK of mailbox 2
    pub txok2, _: 17;
    /// Request completed mailbox 2
    pub rqcp2, set_rqcp2: 16;
    /// Abort request for mailbox 1
    pub abrq1, set_abrq1: 15;
    /// Transmission error of mailbox 1
    pub terr1, _: 11;
    /// Arbitration lost for mailbox 1
    pub alst1, _: 10;
    /// Transmission OK of mailbox 1
    pub txok1, _: 9;
    /// Request completed mailbox 1
    pub rqcp1, set_rqcp1: 8;
    /// Abort request for mailbox 0
    pub abrq0, set_abrq0: 7;
    /// Transmission error of mailbox 0
    pub terr0, _: 3;
    /// Arbitration lost for mailbox 0
    pub alst0, _: 2;
    /// Transmission OK of mailbox 0
    pub txok0, _: 1;
    /// Request completed mailbox 0
    pub rqcp0, set_rqcp0: 0;
}

/// Position of `TME0`; `TME1` and `TME2` follow
pub const TME_OFFSET: u32 = 26;

/// Value after reset: all three mailboxes empty
pub const RESET_VALUE: u32 = 0x1C00_0000;

impl Tsr {
    /// Transmit-mailbox-empty flag of the zero-based mailbox `index`
    pub fn tme(&self, index: u8) -> bool {
        self.0 & (1 << (TME_OFFSET + u32::from(index))) != 0
    }
}

impl_register_value!(Tsr);
