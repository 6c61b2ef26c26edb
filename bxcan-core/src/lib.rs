#![no_std]
#![warn(missing_docs)]

//! `bxcan-core` provides a set of essential abstractions that serve as a thin
//! integration layer between the platform independent [`bxcan`] crate and
//! platform specific HAL crates (in documentation also referred to as _target
//! HALs_).
//!
//! Traits from this crate are not supposed to be implemented by the
//! application developer; implementations should be provided by target HALs.
//!
//! Integrators of this crate into any given target HAL are responsible for
//! soundness of trait implementations and conforming to their respective safety
//! prerequisites.
//!
//! [`bxcan`]: <https://docs.rs/crate/bxcan/>

pub use fugit;

/// Trait representing CAN peripheral identity
///
/// Types implementing this trait are expected to be used as marker types that
/// identify a specific instance of the bxCAN peripheral available on the
/// platform. It only conveys *where* the register block is located, not that
/// it can be accessed. The latter is expressed by the [`Dependencies`] trait.
///
/// # Safety
/// `CanId::ADDRESS` points to the start of a valid bxCAN register block
///
/// # Examples
/// ```no_run
/// use bxcan_core::CanId;
///
/// pub enum Can1 {}
///
/// unsafe impl CanId for Can1 {
///     const ADDRESS: *const () = 0x4000_6400 as *const _;
/// }
/// ```
pub unsafe trait CanId {
    /// Static address of the register block controlling the peripheral
    const ADDRESS: *const ();
}

/// Trait representing CAN peripheral dependencies
///
/// Structs implementing [`Dependencies`] should
/// - enclose all object representable dependencies of [`CanId`] (clock gate,
///   RX/TX pins in their alternate function modes) and release them upon
///   destruction
/// - be a singleton (only a single instance of [`Dependencies`] for a specific
///   [`CanId`] must exist at the same time)
///
/// in order to prevent aliasing and guarantee that the driver handle built on
/// top of it is the sole owner of the register block.
///
/// # Safety
/// While a [`Dependencies`] type instance exists
/// - the peripheral input clock must not change frequency
/// - CAN related pin modes must not change
/// - the register block must not be safely accessible by the application
///   developer nor accessed in other parts of the target HAL
pub unsafe trait Dependencies<Id: CanId> {
    /// Frequency of the clock feeding the bxCAN cell (APB1 on STM32F1).
    ///
    /// Bit timing is derived from this frequency, so it has to be exact.
    fn can_clock(&self) -> fugit::HertzU32;

    /// Gates the peripheral clock on.
    fn enable_clock(&mut self);

    /// Pulses the peripheral reset line, returning every register to its
    /// reset value.
    fn reset(&mut self);
}

/// Interrupt controller collaborator
///
/// Enables and disables individual interrupt lines (NVIC vectors on
/// Cortex-M). Priorities are configured elsewhere.
pub trait InterruptController {
    /// Identifier of a single interrupt line
    type Line: Copy;

    /// Unmask `line`
    fn enable(&mut self, line: Self::Line);

    /// Mask `line`. Once this returns, the handler of `line` will not start
    /// until the line is enabled again. A handler that the caller preempted
    /// is still active and resumes afterwards.
    fn disable(&mut self, line: Self::Line);
}

/// The three interrupt lines a bxCAN cell is wired to
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InterruptLines<L> {
    /// Transmit mailbox empty
    pub tx: L,
    /// FIFO 0 message pending
    pub rx: L,
    /// Status change and error
    pub status_change: L,
}
