//! Volatile register cell

use core::marker::PhantomData;
use vcell::VolatileCell;

/// Value type of a 32-bit register
///
/// Implemented by the `bitfield` views of every register and by plain `u32`
/// for registers without a field breakdown.
pub trait RegisterValue: Copy + From<u32> + Into<u32> {}

impl<T: Copy + From<u32> + Into<u32>> RegisterValue for T {}

/// A single memory-mapped 32-bit register
///
/// Every access goes through [`VolatileCell`], so reads and writes are never
/// cached, merged or reordered with respect to each other.
#[repr(transparent)]
pub struct Reg<T> {
    cell: VolatileCell<u32>,
    _value: PhantomData<T>,
}

impl<T: RegisterValue> Reg<T> {
    /// A register holding `bits`. Only meaningful for memory that plays the
    /// role of the peripheral (simulation).
    #[cfg(test)]
    pub(crate) const fn new(bits: u32) -> Self {
        Self {
            cell: VolatileCell::new(bits),
            _value: PhantomData,
        }
    }

    /// Raw content of the register
    #[inline(always)]
    pub fn bits(&self) -> u32 {
        self.cell.get()
    }

    /// Reads the register
    #[inline(always)]
    pub fn read(&self) -> T {
        T::from(self.cell.get())
    }

    /// Overwrites the whole register
    #[inline(always)]
    pub fn write(&self, value: T) {
        self.cell.set(value.into())
    }

    /// Read-modify-write
    #[inline(always)]
    pub fn modify<F: FnOnce(T) -> T>(&self, f: F) {
        self.write(f(self.read()))
    }

    /// Read-modify-write that only touches the bits selected by `mask`.
    ///
    /// Bits of `value` outside `mask` are ignored and the current register
    /// content outside `mask` is written back unchanged.
    #[inline(always)]
    pub fn modify_masked(&self, mask: u32, value: T) {
        let current = self.cell.get();
        self.cell.set((current & !mask) | (value.into() & mask));
    }
}
