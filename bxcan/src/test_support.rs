//! Simulated peripheral for unit tests

use crate::bus::Can;
use crate::config::CanConfig;
use crate::interrupt::{InterruptHandlers, Interrupts};
use crate::reg::{self, btr, mcr, msr, tsr, Mcr, RegisterBlock};
use bxcan_core::{CanId, Dependencies, InterruptController, InterruptLines};
use core::ptr::NonNull;
use embedded_hal::blocking::delay::DelayUs;
use fugit::{HertzU32, RateExtU32};

/// Identity of the simulated cell; its block lives on the heap.
pub(crate) enum SimCan {}

// Safety: `ADDRESS` is never dereferenced, handles are built from the heap
// block instead.
unsafe impl CanId for SimCan {
    const ADDRESS: *const () = core::ptr::null();
}

/// A fresh block in reset state together with a handle over it
pub(crate) fn registers() -> (&'static RegisterBlock, reg::Can<SimCan>) {
    let block: &'static RegisterBlock = Box::leak(Box::new(RegisterBlock::reset_state()));
    // Safety: the block is leaked and thus outlives the handle.
    let can = unsafe { reg::Can::from_ptr(NonNull::from(block)) };
    (block, can)
}

/// Plays the mode logic of the cell whenever the driver waits
pub(crate) struct SimHardware {
    block: &'static RegisterBlock,
    /// Acknowledge mode requests
    pub responsive: bool,
    /// MCR as seen at every wait
    pub observed: Vec<Mcr>,
    /// Total time waited
    pub waited_us: u32,
}

impl SimHardware {
    /// Updates `SLAK` and `INAK` from the pending requests in MCR.
    pub fn settle(&self) {
        let mcr = self.block.mcr.read();
        self.block.msr.modify(|mut msr| {
            msr.set_inak(mcr.inrq());
            msr.set_slak(!mcr.inrq() && mcr.sleep());
            msr
        });
    }
}

impl DelayUs<u32> for SimHardware {
    fn delay_us(&mut self, us: u32) {
        self.observed.push(self.block.mcr.read());
        self.waited_us += us;
        if self.responsive {
            self.settle();
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ClockEvent {
    Enable,
    Reset,
}

/// Clock collaborator that resets the simulated block
pub(crate) struct FakeDependencies {
    block: &'static RegisterBlock,
    clock: HertzU32,
    pub events: Vec<ClockEvent>,
}

// Safety: there is one `FakeDependencies` per simulated block.
unsafe impl Dependencies<SimCan> for FakeDependencies {
    fn can_clock(&self) -> HertzU32 {
        self.clock
    }

    fn enable_clock(&mut self) {
        self.events.push(ClockEvent::Enable);
    }

    fn reset(&mut self) {
        self.events.push(ClockEvent::Reset);
        self.block.mcr.write(Mcr(mcr::RESET_VALUE));
        self.block.msr.write(msr::RESET_VALUE.into());
        self.block.tsr.write(tsr::RESET_VALUE.into());
        self.block.ier.write(Default::default());
        self.block.btr.write(btr::RESET_VALUE.into());
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Line {
    Tx,
    Rx,
    StatusChange,
}

impl Line {
    pub fn all() -> InterruptLines<Self> {
        InterruptLines {
            tx: Self::Tx,
            rx: Self::Rx,
            status_change: Self::StatusChange,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum NvicEvent {
    Enable(Line),
    Disable(Line),
}

/// Interrupt controller recording every call
#[derive(Default)]
pub(crate) struct FakeNvic {
    pub events: Vec<NvicEvent>,
}

impl FakeNvic {
    pub fn is_enabled(&self, line: Line) -> bool {
        self.events
            .iter()
            .rev()
            .find_map(|event| match *event {
                NvicEvent::Enable(l) if l == line => Some(true),
                NvicEvent::Disable(l) if l == line => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl InterruptController for FakeNvic {
    type Line = Line;

    fn enable(&mut self, line: Line) {
        self.events.push(NvicEvent::Enable(line));
    }

    fn disable(&mut self, line: Line) {
        self.events.push(NvicEvent::Disable(line));
    }
}

pub(crate) struct Bench {
    pub can: Can<SimCan, FakeDependencies, FakeNvic>,
    pub block: &'static RegisterBlock,
    pub hw: SimHardware,
    pub handlers: &'static InterruptHandlers,
}

/// A driver over a fresh simulated cell clocked at 36 MHz
pub(crate) fn bench(config: CanConfig) -> Bench {
    let (block, regs) = registers();
    let handlers: &'static InterruptHandlers = Box::leak(Box::new(InterruptHandlers::new()));
    // Safety: the table is fresh and used by this bench only.
    let interrupts = unsafe { Interrupts::new(handlers, FakeNvic::default(), Line::all()) };
    let dependencies = FakeDependencies {
        block,
        clock: 36.MHz(),
        events: Vec::new(),
    };
    // Safety: `regs` is the only handle over the block.
    let can = unsafe { Can::from_registers(regs, dependencies, interrupts, config) };
    Bench {
        can,
        block,
        hw: SimHardware {
            block,
            responsive: true,
            observed: Vec::new(),
            waited_us: 0,
        },
        handlers,
    }
}
