//! Mailbox register blocks
//!
//! Transmit mailboxes and receive FIFO output mailboxes share one layout of
//! four consecutive registers.

use super::Reg;
use bitfield::bitfield;
use embedded_can::{ExtendedId, Id, StandardId};

bitfield! {
    /// Value of a mailbox identifier register (TIxR / RIxR)
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct MailboxId(u32);
    impl Debug;
    /// Standard identifier, or the upper 11 bits of an extended one
    pub u16, stid, set_stid: 31, 21;
    /// Extended identifier
    pub u32, exid, set_exid: 31, 3;
    /// Identifier extension
    pub ide, set_ide: 2;
    /// Remote transmission request
    pub rtr, set_rtr: 1;
    /// Transmit mailbox request (TX mailboxes only)
    pub txrq, set_txrq: 0;
}

bitfield! {
    /// Value of a mailbox data length and time stamp register (TDTxR / RDTxR)
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct MailboxDataLength(u32);
    impl Debug;
    /// Message time stamp
    pub u16, time, set_time: 31, 16;
    /// Filter match index (RX mailboxes only)
    pub u8, fmi, set_fmi: 15, 8;
    /// Transmit global time (TX mailboxes only)
    pub tgt, set_tgt: 8;
    /// Data length code
    pub u8, dlc, set_dlc: 3, 0;
}

impl_register_value!(MailboxId);
impl_register_value!(MailboxDataLength);

/// The four registers of a single mailbox
#[repr(C)]
pub struct MailboxRegs {
    /// Identifier register
    pub ir: Reg<MailboxId>,
    /// Data length control and time stamp register
    pub dtr: Reg<MailboxDataLength>,
    /// Data bytes 0..=3
    pub dlr: Reg<u32>,
    /// Data bytes 4..=7
    pub dhr: Reg<u32>,
}

impl MailboxRegs {
    #[cfg(test)]
    pub(crate) const fn new() -> Self {
        Self {
            ir: Reg::new(0),
            dtr: Reg::new(0),
            dlr: Reg::new(0),
            dhr: Reg::new(0),
        }
    }

    /// Identifier currently held by the mailbox
    pub fn id(&self) -> Id {
        let ir = self.ir.read();
        if ir.ide() {
            // Safety: EXID is a 29-bit field.
            Id::Extended(unsafe { ExtendedId::new_unchecked(ir.exid()) })
        } else {
            // Safety: STID is an 11-bit field.
            Id::Standard(unsafe { StandardId::new_unchecked(ir.stid()) })
        }
    }

    /// `true` for a remote frame
    pub fn is_remote_frame(&self) -> bool {
        self.ir.read().rtr()
    }

    /// Data length code
    pub fn dlc(&self) -> u8 {
        self.dtr.read().dlc()
    }

    /// Time stamp captured at start of frame
    pub fn timestamp(&self) -> u16 {
        self.dtr.read().time()
    }

    /// Index of the filter the frame matched. Meaningless for TX mailboxes.
    pub fn filter_match_index(&self) -> u8 {
        self.dtr.read().fmi()
    }

    /// All eight data bytes, in bus order, regardless of the DLC
    pub fn data(&self) -> [u8; 8] {
        let mut data = [0; 8];
        data[..4].copy_from_slice(&self.dlr.read().to_le_bytes());
        data[4..].copy_from_slice(&self.dhr.read().to_le_bytes());
        data
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn standard_id_is_taken_from_stid() {
        let mailbox = MailboxRegs::new();
        mailbox.ir.write(MailboxId(0x123 << 21 | 1 << 1));
        assert_eq!(mailbox.id(), Id::Standard(StandardId::new(0x123).unwrap()));
        assert!(mailbox.is_remote_frame());
    }

    #[test]
    fn extended_id_is_taken_from_exid() {
        let mailbox = MailboxRegs::new();
        mailbox.ir.write(MailboxId(0x14C9_2A2B << 3 | 1 << 2));
        assert_eq!(
            mailbox.id(),
            Id::Extended(ExtendedId::new(0x14C9_2A2B).unwrap())
        );
        assert!(!mailbox.is_remote_frame());
    }

    #[test]
    fn data_registers_hold_bytes_little_endian() {
        let mailbox = MailboxRegs::new();
        mailbox.dlr.write(0x0403_0201);
        mailbox.dhr.write(0x0807_0605);
        mailbox.dtr.write(MailboxDataLength(0xBEEF_0208));
        assert_eq!(mailbox.data(), [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(mailbox.dlc(), 8);
        assert_eq!(mailbox.filter_match_index(), 2);
        assert_eq!(mailbox.timestamp(), 0xBEEF);
    }
}
