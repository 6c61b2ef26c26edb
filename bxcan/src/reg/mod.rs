//! Register map of the bxCAN cell
//!
//! [`RegisterBlock`] mirrors the peripheral memory map bit-exactly, including
//! the reserved gaps between register groups. Each register is a [`Reg`]
//! parametrized with its `bitfield` value type.

macro_rules! impl_register_value {
    ($t:ident) => {
        impl From<u32> for $t {
            fn from(bits: u32) -> Self {
                $t(bits)
            }
        }

        impl From<$t> for u32 {
            fn from(value: $t) -> u32 {
                value.0
            }
        }
    };
}

pub mod btr;
pub mod esr;
pub mod generic;
pub mod ier;
pub mod mailbox;
pub mod mcr;
pub mod msr;
pub mod rfr;
pub mod tsr;

pub use btr::Btr;
pub use esr::Esr;
pub use generic::Reg;
pub use ier::Ier;
pub use mailbox::{MailboxDataLength, MailboxId, MailboxRegs};
pub use mcr::Mcr;
pub use msr::Msr;
pub use rfr::Rfr;
pub use tsr::Tsr;

use bxcan_core::CanId;
use core::marker::PhantomData;
use core::ops::Deref;
use core::ptr::NonNull;

/// Number of transmit mailboxes
pub const TX_MAILBOXES: usize = 3;
/// Number of receive FIFOs
pub const RX_FIFOS: usize = 2;
/// Number of filter banks of a single-instance cell
pub const FILTER_BANKS: usize = 14;

/// The two registers of one filter bank
#[repr(C)]
pub struct FilterBank {
    /// Filter bank register 1
    pub fr1: Reg<u32>,
    /// Filter bank register 2
    pub fr2: Reg<u32>,
}

impl FilterBank {
    #[cfg(test)]
    const fn new() -> Self {
        Self {
            fr1: Reg::new(0),
            fr2: Reg::new(0),
        }
    }
}

/// Memory map of the bxCAN cell
#[repr(C)]
pub struct RegisterBlock {
    /// 0x000 master control
    pub mcr: Reg<Mcr>,
    /// 0x004 master status
    pub msr: Reg<Msr>,
    /// 0x008 transmit status
    pub tsr: Reg<Tsr>,
    /// 0x00C and 0x010 receive FIFO 0 and 1
    pub rfr: [Reg<Rfr>; RX_FIFOS],
    /// 0x014 interrupt enable
    pub ier: Reg<Ier>,
    /// 0x018 error status
    pub esr: Reg<Esr>,
    /// 0x01C bit timing
    pub btr: Reg<Btr>,
    _reserved0: [u32; 88],
    /// 0x180 transmit mailboxes
    pub tx: [MailboxRegs; TX_MAILBOXES],
    /// 0x1B0 receive FIFO output mailboxes
    pub rx: [MailboxRegs; RX_FIFOS],
    _reserved1: [u32; 12],
    /// 0x200 filter master
    pub fmr: Reg<u32>,
    /// 0x204 filter mode
    pub fm1r: Reg<u32>,
    _reserved2: u32,
    /// 0x20C filter scale
    pub fs1r: Reg<u32>,
    _reserved3: u32,
    /// 0x214 filter FIFO assignment
    pub ffa1r: Reg<u32>,
    _reserved4: u32,
    /// 0x21C filter activation
    pub fa1r: Reg<u32>,
    _reserved5: [u32; 8],
    /// 0x240 filter banks
    pub banks: [FilterBank; FILTER_BANKS],
}

impl RegisterBlock {
    /// A block in its documented reset state, for simulation.
    #[cfg(test)]
    pub(crate) const fn reset_state() -> Self {
        const BANK: FilterBank = FilterBank::new();
        Self {
            mcr: Reg::new(mcr::RESET_VALUE),
            msr: Reg::new(msr::RESET_VALUE),
            tsr: Reg::new(tsr::RESET_VALUE),
            rfr: [Reg::new(0), Reg::new(0)],
            ier: Reg::new(0),
            esr: Reg::new(0),
            btr: Reg::new(btr::RESET_VALUE),
            _reserved0: [0; 88],
            tx: [MailboxRegs::new(), MailboxRegs::new(), MailboxRegs::new()],
            rx: [MailboxRegs::new(), MailboxRegs::new()],
            _reserved1: [0; 12],
            fmr: Reg::new(0x2A1C_0E01),
            fm1r: Reg::new(0),
            _reserved2: 0,
            fs1r: Reg::new(0),
            _reserved3: 0,
            ffa1r: Reg::new(0),
            _reserved4: 0,
            fa1r: Reg::new(0),
            _reserved5: [0; 8],
            banks: [BANK; FILTER_BANKS],
        }
    }
}

/// Opaque handle over the register block of the peripheral `Id`
///
/// Dereferences to [`RegisterBlock`]; every field access is volatile.
pub struct Can<Id> {
    block: NonNull<RegisterBlock>,
    _id: PhantomData<Id>,
}

impl<Id: CanId> Can<Id> {
    /// Handle over the register block at `Id::ADDRESS`.
    ///
    /// # Safety
    /// The caller must be the owner of the peripheral `Id`. Do not keep
    /// multiple handles for the same peripheral.
    pub(crate) unsafe fn new() -> Self {
        Self::from_ptr(NonNull::new_unchecked(Id::ADDRESS as *mut RegisterBlock))
    }
}

impl<Id> Can<Id> {
    /// # Safety
    /// `block` points to a register block that outlives the handle and that
    /// nothing else writes to.
    pub(crate) unsafe fn from_ptr(block: NonNull<RegisterBlock>) -> Self {
        Self {
            block,
            _id: PhantomData,
        }
    }

    /// Second handle over the same block.
    ///
    /// # Safety
    /// The caller splits register ownership between the handles so that no
    /// register is written through both.
    pub(crate) unsafe fn alias(&self) -> Self {
        Self::from_ptr(self.block)
    }
}

impl<Id> Deref for Can<Id> {
    type Target = RegisterBlock;

    fn deref(&self) -> &RegisterBlock {
        // Safety: the constructors guarantee a live, owned block.
        unsafe { self.block.as_ref() }
    }
}
