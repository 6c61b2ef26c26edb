//! Peripheral handle and operating mode control

use crate::config::{BitRate, BitTimingError, CanConfig, Options, TestModes};
use crate::interrupt::{Handler, InterruptSource, Interrupts};
use crate::mailbox::Mailboxes;
use crate::reg::{self, btr, ier, mcr, Btr, Esr, Ier, Mcr};
use bxcan_core::{CanId, Dependencies, InterruptController};
use core::convert::Infallible;
use core::fmt::{self, Debug};
use embedded_hal::blocking::delay::DelayUs;

/// Operating mode of the cell, as acknowledged in MSR
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Low power mode, entered after reset
    Sleep,
    /// Configuration mode; the cell is off the bus
    Initialization,
    /// Synchronized with the bus
    Normal,
}

/// Errors reported by the driver
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A mailbox number or bit rate outside the supported set
    InvalidArgument,
    /// The cell did not acknowledge a mode change in time. The peripheral is
    /// left as it was last observed.
    Timeout {
        /// Requested mode
        target: Mode,
        /// Mode read on the final poll
        observed: Mode,
    },
    /// Timing that cannot be realized with the peripheral clock
    UnsupportedConfiguration(BitTimingError),
}

impl From<BitTimingError> for Error {
    fn from(value: BitTimingError) -> Self {
        Self::UnsupportedConfiguration(value)
    }
}

/// Last error code recorded in ESR
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LastErrorCode {
    /// No error
    NoError,
    /// Stuff error
    Stuff,
    /// Form error
    Form,
    /// Acknowledgment error
    Acknowledgment,
    /// Bit recessive error
    BitRecessive,
    /// Bit dominant error
    BitDominant,
    /// CRC error
    Crc,
    /// Set by software
    SetBySoftware,
}

impl From<u8> for LastErrorCode {
    fn from(lec: u8) -> Self {
        match lec & 0b111 {
            0 => Self::NoError,
            1 => Self::Stuff,
            2 => Self::Form,
            3 => Self::Acknowledgment,
            4 => Self::BitRecessive,
            5 => Self::BitDominant,
            6 => Self::Crc,
            _ => Self::SetBySoftware,
        }
    }
}

/// Snapshot of the error status register
pub struct ErrorStatus(pub Esr);

impl From<Esr> for ErrorStatus {
    fn from(value: Esr) -> Self {
        Self(value)
    }
}

impl ErrorStatus {
    /// Receive error counter
    pub fn receive_errors(&self) -> u8 {
        self.0.rec()
    }

    /// Transmit error counter
    pub fn transmit_errors(&self) -> u8 {
        self.0.tec()
    }

    /// Error recorded for the last erroneous frame
    pub fn last_error_code(&self) -> LastErrorCode {
        self.0.lec().into()
    }

    /// `true` once the transmit error counter passed 255
    pub fn is_bus_off(&self) -> bool {
        self.0.boff()
    }

    /// `true` while an error counter is above 127
    pub fn is_error_passive(&self) -> bool {
        self.0.epvf()
    }

    /// `true` while an error counter is at least 96
    pub fn is_error_warning(&self) -> bool {
        self.0.ewgf()
    }
}

impl Debug for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorStatus")
            .field("rec", &self.receive_errors())
            .field("tec", &self.transmit_errors())
            .field("lec", &self.last_error_code())
            .field("boff", &self.is_bus_off())
            .field("epvf", &self.is_error_passive())
            .field("ewgf", &self.is_error_warning())
            .finish()
    }
}

/// A bxCAN peripheral
///
/// Owns the register block of `Id` through the singleton `D`. Mode changes
/// and reconfiguration go through the methods of this type; slot status and
/// interrupt handlers through its public fields.
pub struct Can<Id, D, N: InterruptController> {
    /// Handler attachment and interrupt line control
    pub interrupts: Interrupts<N>,
    /// Transmit mailboxes and receive FIFOs
    pub mailboxes: Mailboxes<Id>,

    /// Implementation details. The field is public to allow destructuring.
    pub internals: Internals<Id, D>,
}

/// Implementation details.
pub struct Internals<Id, D> {
    /// Owns MCR, MSR, IER, ESR and BTR
    can: reg::Can<Id>,
    dependencies: D,
    config: CanConfig,
}

impl<Id: CanId, D: Dependencies<Id>, N: InterruptController> Can<Id, D, N> {
    /// Takes over the peripheral. The cell is left in whatever mode it is
    /// in; call [`init`](Self::init) and [`reconfigure`](Self::reconfigure)
    /// or [`begin`](Self::begin) to bring it onto the bus.
    pub fn new(dependencies: D, interrupts: Interrupts<N>, config: CanConfig) -> Self {
        // Safety: `D` is the only instance of `Dependencies<Id>`, nothing
        // else owns the register block.
        unsafe { Self::from_registers(reg::Can::new(), dependencies, interrupts, config) }
    }

    /// Enables the peripheral clock and pulses its reset line.
    ///
    /// No register is written, the mode after this call is the reset mode
    /// (sleep).
    pub fn init(&mut self) {
        self.internals.dependencies.enable_clock();
        self.internals.dependencies.reset();
        log::debug!("peripheral clocked and reset");
    }

    /// Brings the peripheral onto the bus at a standard bit rate.
    ///
    /// Resets the cell, forces transmit FIFO priority on top of `options`
    /// and applies the reference timing for `bit_rate`.
    pub fn begin<T: DelayUs<u32>>(
        &mut self,
        bit_rate: BitRate,
        options: Options,
        test_modes: TestModes,
        delay: &mut T,
    ) -> Result<(), Error> {
        self.init();
        let config = &mut self.internals.config;
        config.options = Options {
            tx_fifo_priority: true,
            ..options
        };
        config.test_modes = test_modes;
        config.timing = bit_rate.timing();
        self.reconfigure(delay)
    }

    /// Puts the peripheral to sleep.
    pub fn end(&mut self) {
        self.request_sleep();
    }

    /// Applies [`config`](Self::config) through an initialization window.
    ///
    /// The timing is validated against the peripheral clock before any
    /// register is touched.
    pub fn reconfigure<T: DelayUs<u32>>(&mut self, delay: &mut T) -> Result<(), Error> {
        let config = &self.internals.config;
        let timing = config
            .timing
            .register_value(self.internals.dependencies.can_clock())?;
        let btr = config.test_modes.apply(timing);
        let mcr = config.options.register_value();
        let ier = config.interrupts;
        self.reconfigure_raw(mcr, ier, btr, delay)
    }

    /// Frequency of the clock feeding the cell
    pub fn can_clock(&self) -> fugit::HertzU32 {
        self.internals.dependencies.can_clock()
    }

    /// Gives the peripheral dependencies and the interrupt controller back.
    ///
    /// Every interrupt line is masked and every handler detached.
    pub fn release(self) -> (D, N) {
        (
            self.internals.dependencies,
            self.interrupts.release(),
        )
    }
}

impl<Id, D, N: InterruptController> Can<Id, D, N> {
    /// # Safety
    /// `can` must be the only handle over the register block.
    pub(crate) unsafe fn from_registers(
        can: reg::Can<Id>,
        dependencies: D,
        interrupts: Interrupts<N>,
        config: CanConfig,
    ) -> Self {
        Self {
            interrupts,
            mailboxes: Mailboxes::new(can.alias()),
            internals: Internals {
                can,
                dependencies,
                config,
            },
        }
    }

    /// Raw access to the registers.
    ///
    /// # Safety
    /// The abstraction assumes that it has exclusive ownership of the
    /// registers. Direct access can break such assumptions.
    pub unsafe fn registers(&self) -> &reg::Can<Id> {
        &self.internals.can
    }

    fn regs(&self) -> &reg::RegisterBlock {
        &self.internals.can
    }

    /// Configuration applied by [`reconfigure`](Self::reconfigure)
    pub fn config(&mut self) -> &mut CanConfig {
        &mut self.internals.config
    }

    /// Current mode, derived from the acknowledge bits.
    ///
    /// `INAK` wins over `SLAK`; with both clear the cell is in normal mode.
    pub fn mode(&self) -> Mode {
        let msr = self.regs().msr.read();
        if msr.inak() {
            Mode::Initialization
        } else if msr.slak() {
            Mode::Sleep
        } else {
            Mode::Normal
        }
    }

    /// `true` in sleep mode
    pub fn is_asleep(&self) -> bool {
        self.mode() == Mode::Sleep
    }

    /// `true` in initialization mode
    pub fn is_initializing(&self) -> bool {
        self.mode() == Mode::Initialization
    }

    /// `true` in normal mode
    pub fn is_normal(&self) -> bool {
        self.mode() == Mode::Normal
    }

    /// Clears the sleep request.
    pub fn wake(&mut self) {
        self.regs().mcr.modify(|mut mcr| {
            mcr.set_sleep(false);
            mcr
        });
        log::trace!("sleep request cleared");
    }

    /// Leaves sleep, then requests initialization mode. Completion is
    /// signalled by [`poll_mode`](Self::poll_mode).
    pub fn request_initialization(&mut self) {
        self.wake();
        self.regs().mcr.modify(|mut mcr| {
            mcr.set_inrq(true);
            mcr
        });
        log::trace!("initialization requested");
    }

    /// Requests to leave initialization mode.
    pub fn request_normal(&mut self) {
        self.regs().mcr.modify(|mut mcr| {
            mcr.set_inrq(false);
            mcr
        });
        log::trace!("normal mode requested");
    }

    /// Requests sleep mode. The acknowledge is not awaited.
    pub fn request_sleep(&mut self) {
        self.regs().mcr.modify(|mut mcr| {
            mcr.set_sleep(true);
            mcr
        });
        log::trace!("sleep requested");
    }

    /// Succeeds once the cell reports `target`.
    pub fn poll_mode(&self, target: Mode) -> nb::Result<(), Infallible> {
        if self.mode() == target {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Requests initialization mode and waits for the acknowledge.
    pub fn enter_initialization<T: DelayUs<u32>>(&mut self, delay: &mut T) -> Result<(), Error> {
        self.request_initialization();
        self.wait_for(Mode::Initialization, delay)
    }

    /// Leaves initialization mode and waits for the acknowledge.
    pub fn enter_normal<T: DelayUs<u32>>(&mut self, delay: &mut T) -> Result<(), Error> {
        self.request_normal();
        self.wait_for(Mode::Normal, delay)
    }

    fn wait_for<T: DelayUs<u32>>(&self, target: Mode, delay: &mut T) -> Result<(), Error> {
        let limit = self.internals.config.poll_limit;
        let mut waits = 0;
        loop {
            match self.poll_mode(target) {
                Ok(()) => {
                    log::trace!("entered {:?} mode", target);
                    return Ok(());
                }
                Err(nb::Error::WouldBlock) if waits < limit.attempts => {
                    delay.delay_us(limit.interval_us);
                    waits += 1;
                }
                Err(nb::Error::WouldBlock) => {
                    return Err(Error::Timeout {
                        target,
                        observed: self.mode(),
                    })
                }
                Err(nb::Error::Other(never)) => match never {},
            }
        }
    }

    /// Writes raw configuration words through an initialization window.
    ///
    /// Only the bits of [`mcr::CONFIG_MASK`], [`ier::CONFIG_MASK`] and
    /// [`btr::CONFIG_MASK`] are taken from the arguments, everything else in
    /// the registers is written back unchanged. The peripheral ends up in
    /// normal mode.
    pub fn reconfigure_raw<T: DelayUs<u32>>(
        &mut self,
        mcr: Mcr,
        ier: Ier,
        btr: Btr,
        delay: &mut T,
    ) -> Result<(), Error> {
        self.enter_initialization(delay)?;
        let regs = self.regs();
        regs.mcr.modify_masked(mcr::CONFIG_MASK, mcr);
        regs.ier.modify_masked(ier::CONFIG_MASK, ier);
        regs.btr.modify_masked(btr::CONFIG_MASK, btr);
        self.enter_normal(delay)?;
        log::debug!(
            "reconfigured: mcr {:#010x} ier {:#010x} btr {:#010x}",
            self.regs().mcr.bits(),
            self.regs().ier.bits(),
            self.regs().btr.bits()
        );
        Ok(())
    }

    /// Current error counters and flags
    pub fn error_status(&self) -> ErrorStatus {
        self.regs().esr.read().into()
    }

    /// Attaches `handler` to `source` and unmasks its line.
    pub fn attach(&mut self, source: InterruptSource, handler: &'static dyn Handler) {
        self.interrupts.attach(source, handler)
    }

    /// Masks the line of `source` and detaches its handler.
    pub fn detach(&mut self, source: InterruptSource) {
        self.interrupts.detach(source)
    }

    /// Lets arriving interrupts reach their handlers.
    pub fn enable_interrupts(&mut self) {
        self.interrupts.enable()
    }

    /// Arriving interrupts are ignored.
    pub fn disable_interrupts(&mut self) {
        self.interrupts.disable()
    }
}
