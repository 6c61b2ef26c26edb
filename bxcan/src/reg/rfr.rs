//! Receive FIFO registers (RF0R, RF1R)

use bitfield::bitfield;

bitfield! {
    /// Value of a receive FIFO register
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct Rfr(u32);
    impl Debug;
    /// Release the output mailbox of the FIFO
    pub rfom, set_rfom: 5;
    /// FIFO overrun (write 1 to clear)
    pub fovr, set_fovr: 4;
    /// FIFO full (write 1 to clear)
    pub full, set_full: 3;
    /// Number of messages pending in the FIFO
    pub u8, fmp, set_fmp: 1, 0;
}

impl_register_value!(Rfr);
