//! Interrupt dispatch
//!
//! The bxCAN cell drives three interrupt lines. A statically allocated
//! [`InterruptHandlers`] table keeps one optional [`Handler`] per line and is
//! reached from the vector table through [`InterruptHandlers::dispatch`] or
//! its `on_*` shorthands. Slots are only ever mutated by the owning
//! [`Interrupts`] while the matching line is masked, from a context that the
//! line's handler is not preempted by, so a dispatch always sees either a
//! complete handler or none.
//!
//! ```ignore
//! static HANDLERS: InterruptHandlers = InterruptHandlers::new();
//!
//! #[interrupt]
//! fn USB_HP_CAN_TX() {
//!     // Safety: this is the vector of the TX line.
//!     unsafe { HANDLERS.on_tx() }
//! }
//! ```

use bxcan_core::{InterruptController, InterruptLines};
use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, Ordering};

/// Peripheral interrupt sources
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InterruptSource {
    /// A transmit mailbox became empty
    Tx,
    /// A frame is pending in a receive FIFO
    Rx,
    /// Error, wake-up or sleep acknowledge
    StatusChange,
}

impl InterruptSource {
    fn index(self) -> usize {
        match self {
            Self::Tx => 0,
            Self::Rx => 1,
            Self::StatusChange => 2,
        }
    }

    fn line<L: Copy>(self, lines: &InterruptLines<L>) -> L {
        match self {
            Self::Tx => lines.tx,
            Self::Rx => lines.rx,
            Self::StatusChange => lines.status_change,
        }
    }
}

/// Something invocable with no arguments from interrupt context
pub trait Handler: Sync {
    /// Runs the handler
    fn call(&self);
}

impl<F: Fn() + Sync> Handler for F {
    fn call(&self) {
        self()
    }
}

/// Handler slots shared between the driver and the vector table
pub struct InterruptHandlers {
    enabled: AtomicBool,
    slots: [UnsafeCell<Option<&'static dyn Handler>>; 3],
}

// Safety: a slot is written only through `Interrupts`, which masks the
// corresponding line first, and read only from that line's handler.
unsafe impl Sync for InterruptHandlers {}

impl InterruptHandlers {
    /// Empty table with dispatch disabled
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            slots: [
                UnsafeCell::new(None),
                UnsafeCell::new(None),
                UnsafeCell::new(None),
            ],
        }
    }

    /// `true` if arriving interrupts reach their handlers
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Runs the handler attached to `source`, if any and if dispatch is
    /// enabled.
    ///
    /// # Safety
    /// Must only be called from the interrupt handler of the line wired to
    /// `source`.
    pub unsafe fn dispatch(&self, source: InterruptSource) {
        if !self.is_enabled() {
            return;
        }
        if let Some(handler) = *self.slots[source.index()].get() {
            handler.call();
        }
    }

    /// Entry point for the TX line
    ///
    /// # Safety
    /// See [`dispatch`](Self::dispatch).
    pub unsafe fn on_tx(&self) {
        self.dispatch(InterruptSource::Tx)
    }

    /// Entry point for the RX line
    ///
    /// # Safety
    /// See [`dispatch`](Self::dispatch).
    pub unsafe fn on_rx(&self) {
        self.dispatch(InterruptSource::Rx)
    }

    /// Entry point for the status change line
    ///
    /// # Safety
    /// See [`dispatch`](Self::dispatch).
    pub unsafe fn on_status_change(&self) {
        self.dispatch(InterruptSource::StatusChange)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release)
    }

    /// # Safety
    /// The line wired to `source` is masked.
    unsafe fn store(&self, source: InterruptSource, handler: Option<&'static dyn Handler>) {
        *self.slots[source.index()].get() = handler;
    }

    /// # Safety
    /// No dispatch for `source` is in flight.
    unsafe fn peek(&self, source: InterruptSource) -> Option<&'static dyn Handler> {
        *self.slots[source.index()].get()
    }
}

impl Default for InterruptHandlers {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of the handler table and the interrupt lines of one peripheral
pub struct Interrupts<N: InterruptController> {
    handlers: &'static InterruptHandlers,
    controller: N,
    lines: InterruptLines<N::Line>,
}

impl<N: InterruptController> Interrupts<N> {
    /// # Safety
    /// - `handlers` must not be handed to another [`Interrupts`]
    /// - `lines` must be the lines whose vectors call into `handlers`
    /// - the returned value (and the [`Can`](crate::Can) holding it) must only
    ///   be used from thread mode or from handlers that cannot preempt the
    ///   handlers of `lines`; masking a line does not stop a handler that is
    ///   already active
    pub unsafe fn new(
        handlers: &'static InterruptHandlers,
        controller: N,
        lines: InterruptLines<N::Line>,
    ) -> Self {
        Self {
            handlers,
            controller,
            lines,
        }
    }

    /// Stores `handler` in the slot of `source` and unmasks its line.
    ///
    /// A handler already attached is replaced.
    pub fn attach(&mut self, source: InterruptSource, handler: &'static dyn Handler) {
        let line = source.line(&self.lines);
        self.controller.disable(line);
        // Safety: the line is masked.
        unsafe { self.handlers.store(source, Some(handler)) };
        self.controller.enable(line);
        log::trace!("attached {:?} handler", source);
    }

    /// Masks the line of `source` and empties its slot.
    pub fn detach(&mut self, source: InterruptSource) {
        self.controller.disable(source.line(&self.lines));
        // Safety: the line is masked.
        unsafe { self.handlers.store(source, None) };
        log::trace!("detached {:?} handler", source);
    }

    /// `true` if a handler is attached to `source`
    pub fn is_attached(&self, source: InterruptSource) -> bool {
        self.handler(source).is_some()
    }

    /// Handler attached to `source`
    pub fn handler(&self, source: InterruptSource) -> Option<&'static dyn Handler> {
        // Safety: a dispatch only reads the slot and `self` is the only
        // writer.
        unsafe { self.handlers.peek(source) }
    }

    /// Lets arriving interrupts reach their handlers.
    pub fn enable(&mut self) {
        self.handlers.set_enabled(true);
    }

    /// Arriving interrupts are ignored until [`enable`](Self::enable).
    pub fn disable(&mut self) {
        self.handlers.set_enabled(false);
    }

    /// `true` if dispatch is enabled
    pub fn is_enabled(&self) -> bool {
        self.handlers.is_enabled()
    }

    /// Masks every line, empties every slot and gives back the controller.
    pub fn release(mut self) -> N {
        for source in [
            InterruptSource::Tx,
            InterruptSource::Rx,
            InterruptSource::StatusChange,
        ] {
            self.detach(source);
        }
        self.disable();
        self.controller
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_support::{FakeNvic, Line, NvicEvent};
    use std::sync::atomic::AtomicU32;

    fn counter() -> &'static AtomicU32 {
        Box::leak(Box::new(AtomicU32::new(0)))
    }

    fn counting(count: &'static AtomicU32) -> &'static dyn Handler {
        Box::leak(Box::new(move || {
            count.fetch_add(1, Ordering::Relaxed);
        }))
    }

    fn interrupts() -> (Interrupts<FakeNvic>, &'static InterruptHandlers) {
        let handlers: &'static InterruptHandlers = Box::leak(Box::new(InterruptHandlers::new()));
        // Safety: the table is fresh and used by this test only.
        let interrupts = unsafe { Interrupts::new(handlers, FakeNvic::default(), Line::all()) };
        (interrupts, handlers)
    }

    fn same(a: Option<&'static dyn Handler>, b: &'static dyn Handler) -> bool {
        a.map_or(false, |a| {
            a as *const dyn Handler as *const u8 == b as *const dyn Handler as *const u8
        })
    }

    #[test]
    fn attach_fills_slot_and_unmasks_line() {
        let (mut interrupts, _) = interrupts();
        let handler = counting(counter());
        interrupts.attach(InterruptSource::Tx, handler);
        assert!(same(interrupts.handler(InterruptSource::Tx), handler));
        assert!(interrupts.controller.is_enabled(Line::Tx));
        assert_eq!(
            interrupts.controller.events,
            [NvicEvent::Disable(Line::Tx), NvicEvent::Enable(Line::Tx)]
        );
    }

    #[test]
    fn detach_empties_slot_and_masks_line() {
        let (mut interrupts, _) = interrupts();
        interrupts.attach(InterruptSource::Tx, counting(counter()));
        interrupts.controller.events.clear();
        interrupts.detach(InterruptSource::Tx);
        assert!(!interrupts.is_attached(InterruptSource::Tx));
        assert!(!interrupts.controller.is_enabled(Line::Tx));
        assert_eq!(interrupts.controller.events, [NvicEvent::Disable(Line::Tx)]);
    }

    #[test]
    fn slots_are_independent() {
        let (mut interrupts, _) = interrupts();
        let tx = counting(counter());
        let rx = counting(counter());
        interrupts.attach(InterruptSource::Tx, tx);
        interrupts.attach(InterruptSource::Rx, rx);
        interrupts.attach(InterruptSource::StatusChange, counting(counter()));
        assert!(same(interrupts.handler(InterruptSource::Tx), tx));
        assert!(same(interrupts.handler(InterruptSource::Rx), rx));
        assert!(interrupts.controller.is_enabled(Line::Tx));
        assert!(interrupts.controller.is_enabled(Line::Rx));
    }

    #[test]
    fn dispatch_requires_enabled_flag() {
        let (mut interrupts, handlers) = interrupts();
        let count = counter();
        interrupts.attach(InterruptSource::Rx, counting(count));
        unsafe { handlers.on_rx() };
        assert_eq!(count.load(Ordering::Relaxed), 0);
        interrupts.enable();
        unsafe { handlers.on_rx() };
        assert_eq!(count.load(Ordering::Relaxed), 1);
        interrupts.disable();
        unsafe { handlers.on_rx() };
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn dispatch_runs_only_matching_source() {
        let (mut interrupts, handlers) = interrupts();
        let tx = counter();
        let status = counter();
        interrupts.attach(InterruptSource::Tx, counting(tx));
        interrupts.attach(InterruptSource::StatusChange, counting(status));
        interrupts.enable();
        unsafe {
            handlers.on_status_change();
            handlers.on_status_change();
            handlers.on_tx();
            handlers.on_rx();
        }
        assert_eq!(tx.load(Ordering::Relaxed), 1);
        assert_eq!(status.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn release_masks_everything() {
        let (mut interrupts, handlers) = interrupts();
        interrupts.attach(InterruptSource::Rx, counting(counter()));
        interrupts.enable();
        let nvic = interrupts.release();
        assert!(!handlers.is_enabled());
        assert!(!nvic.is_enabled(Line::Rx));
    }
}
