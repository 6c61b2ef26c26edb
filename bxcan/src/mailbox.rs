//! Transmit mailboxes and receive FIFOs
//!
//! Slot state is never cached: every query reads the status registers.

use crate::bus::Error;
use crate::reg::{self, MailboxRegs};

/// One of the three transmit mailboxes, numbered from one
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TxMailbox {
    /// Mailbox 1
    First = 1,
    /// Mailbox 2
    Second = 2,
    /// Mailbox 3
    Third = 3,
}

impl TxMailbox {
    /// All mailboxes in index order
    pub const ALL: [Self; reg::TX_MAILBOXES] = [Self::First, Self::Second, Self::Third];

    /// Zero-based position of the mailbox in the register map
    pub fn index(self) -> u8 {
        self as u8 - 1
    }
}

impl TryFrom<u8> for TxMailbox {
    type Error = Error;

    fn try_from(number: u8) -> Result<Self, Error> {
        match number {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// One of the two receive FIFOs
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RxFifo {
    /// FIFO 0
    Fifo0,
    /// FIFO 1
    Fifo1,
}

impl RxFifo {
    /// Zero-based position of the FIFO in the register map
    pub fn index(self) -> usize {
        match self {
            Self::Fifo0 => 0,
            Self::Fifo1 => 1,
        }
    }
}

/// Mailbox manager of peripheral `Id`
pub struct Mailboxes<Id> {
    regs: reg::Can<Id>,
}

impl<Id> Mailboxes<Id> {
    /// # Safety
    /// The caller must be the owner of the peripheral. The constructed type
    /// assumes ownership of the following registers. Do not write them
    /// elsewhere.
    /// - TSR
    /// - RF0R, RF1R
    /// - every mailbox register block
    pub(crate) unsafe fn new(regs: reg::Can<Id>) -> Self {
        Self { regs }
    }

    /// `true` if `mailbox` is empty and may be loaded with a frame
    pub fn tx_mailbox_free(&self, mailbox: TxMailbox) -> bool {
        self.regs.tsr.read().tme(mailbox.index())
    }

    /// First empty transmit mailbox, if any
    pub fn free_tx_mailbox(&self) -> Option<TxMailbox> {
        let tsr = self.regs.tsr.read();
        TxMailbox::ALL
            .into_iter()
            .find(|mailbox| tsr.tme(mailbox.index()))
    }

    /// Registers of a transmit mailbox
    pub fn tx_mailbox(&self, mailbox: TxMailbox) -> &MailboxRegs {
        &self.regs.tx[usize::from(mailbox.index())]
    }

    /// Output mailbox of a receive FIFO
    pub fn rx_mailbox(&self, fifo: RxFifo) -> &MailboxRegs {
        &self.regs.rx[fifo.index()]
    }

    /// Number of frames pending in `fifo`, 0..=3
    pub fn rx_pending(&self, fifo: RxFifo) -> u8 {
        self.regs.rfr[fifo.index()].read().fmp()
    }

    /// `true` if `fifo` holds three frames
    pub fn rx_fifo_full(&self, fifo: RxFifo) -> bool {
        self.regs.rfr[fifo.index()].read().full()
    }

    /// `true` if a frame was lost because `fifo` was full
    pub fn rx_fifo_overrun(&self, fifo: RxFifo) -> bool {
        self.regs.rfr[fifo.index()].read().fovr()
    }
}
