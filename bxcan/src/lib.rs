#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
//! # bxCAN
//!
//! ## Overview
//! This crate provides a low level driver for the bxCAN cell found in STM32F1
//! class microcontrollers.
//!
//! It provides the following features:
//!
//! - typed, volatile access to the complete register map
//! - mode control (sleep, initialization, normal) with bounded waits
//! - bit timing calculation for the standard bus rates
//! - mask preserving reconfiguration of the cell
//! - transmit mailbox and receive FIFO status queries
//! - attachment of handlers to the three interrupt lines
//!
//! The bxCAN is embedded in the MCU like all other peripherals. The interface
//! between them includes a clock and a reset line, three HW interrupt lines
//! and a single memory-mapped register block. Platform specific HAL crates
//! describe this interface by implementing the [`bxcan_core`] traits.
//!
//! In order to use bxCAN, one has to instantiate [`Can`] from an instance of
//! a [`Dependencies`] implementing struct and an [`Interrupts`] owning the
//! handler table. `Can` holds onto both until it's [`released`]. Safety
//! requirements of the `Dependencies` trait guarantee that no other code
//! touches the register block meanwhile.
//!
//! ## Mode changes
//!
//! The cell leaves reset asleep. Configuration registers are only writable in
//! initialization mode, so every configuration change goes through
//! [`reconfigure`], which enters initialization, writes the configuration bits
//! and returns to normal mode. Each wait for a mode acknowledge is bounded by
//! [`PollLimit`] and reports [`Error::Timeout`] instead of hanging.
//!
//! ## General usage example
//!
//! ```no_run
//! # use bxcan::core::{CanId, Dependencies, InterruptController};
//! # use fugit::RateExtU32 as _;
//! # pub enum Can1 {}
//! # unsafe impl CanId for Can1 {
//! #     const ADDRESS: *const () = 0x4000_6400 as *const _;
//! # }
//! # pub struct Clocks;
//! # unsafe impl Dependencies<Can1> for Clocks {
//! #     fn can_clock(&self) -> fugit::HertzU32 { 36.MHz() }
//! #     fn enable_clock(&mut self) {}
//! #     fn reset(&mut self) {}
//! # }
//! # pub struct Nvic;
//! # impl InterruptController for Nvic {
//! #     type Line = u8;
//! #     fn enable(&mut self, _: u8) {}
//! #     fn disable(&mut self, _: u8) {}
//! # }
//! # pub struct Delay;
//! # impl embedded_hal::blocking::delay::DelayUs<u32> for Delay {
//! #     fn delay_us(&mut self, _: u32) {}
//! # }
//! use bxcan::config::{BitRate, CanConfig, Options, TestModes};
//! use bxcan::core::InterruptLines;
//! use bxcan::interrupt::{InterruptHandlers, InterruptSource, Interrupts};
//! use bxcan::mailbox::TxMailbox;
//!
//! static HANDLERS: InterruptHandlers = InterruptHandlers::new();
//! static ON_RX: fn() = || {
//!     // drain FIFO 0
//! };
//!
//! let lines = InterruptLines {
//!     tx: 19,
//!     rx: 20,
//!     status_change: 22,
//! };
//! // Safety: the vectors of `lines` call into `HANDLERS` and nothing else
//! // uses the table.
//! let interrupts = unsafe { Interrupts::new(&HANDLERS, Nvic, lines) };
//! let mut can = bxcan::Can::<Can1, _, _>::new(Clocks, interrupts, CanConfig::new(500.kHz()));
//!
//! // Clock, reset and configure in one go
//! can.begin(BitRate::Kbps500, Options::default(), TestModes::default(), &mut Delay)?;
//!
//! can.attach(InterruptSource::Rx, &ON_RX);
//! can.enable_interrupts();
//!
//! // Later changes go through `config` and `reconfigure`
//! can.config().options.auto_bus_off = true;
//! can.reconfigure(&mut Delay)?;
//!
//! if can.mailboxes.tx_mailbox_free(TxMailbox::First) {
//!     // load the mailbox registers
//! }
//! # Ok::<(), bxcan::Error>(())
//! ```
//!
//! [`Dependencies`]: bxcan_core::Dependencies
//! [`Interrupts`]: crate::interrupt::Interrupts
//! [`released`]: crate::bus::Can::release
//! [`reconfigure`]: crate::bus::Can::reconfigure
//! [`PollLimit`]: crate::config::PollLimit

pub mod bus;
pub mod config;
pub mod interrupt;
pub mod mailbox;
pub mod prelude;
pub mod reg;

#[cfg(test)]
mod test_support;

pub use bus::{Can, Error, Mode};
pub use bxcan_core as core;
pub use embedded_can;
