//! CAN bus configuration

use crate::bus::Error;
use crate::reg::{Btr, Ier, Mcr};
use core::ops::RangeInclusive;
use fugit::HertzU32;

/// Configuration for the CAN bus
#[derive(Copy, Clone, Debug)]
pub struct CanConfig {
    /// Master control options
    pub options: Options,
    /// Debug modes of the cell
    pub test_modes: TestModes,
    /// Interrupt sources enabled on the peripheral side
    pub interrupts: Ier,
    /// Bit timing parameters
    pub timing: BitTiming,
    /// Bound on every mode transition wait
    pub poll_limit: PollLimit,
}

impl CanConfig {
    /// Create an instance
    ///
    /// Bitrate value must be provided, all other settings come pre-populated
    /// with default values.
    pub fn new(bitrate: HertzU32) -> Self {
        Self {
            options: Default::default(),
            test_modes: Default::default(),
            interrupts: Default::default(),
            timing: BitTiming::new(bitrate),
            poll_limit: Default::default(),
        }
    }
}

/// Standard bus bit rates
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BitRate {
    /// 1 Mbit/s
    Mbps1,
    /// 500 kbit/s
    Kbps500,
    /// 250 kbit/s
    Kbps250,
    /// 125 kbit/s
    Kbps125,
}

impl BitRate {
    /// Rate in bits per second
    pub fn hertz(self) -> HertzU32 {
        HertzU32::from_raw(match self {
            Self::Mbps1 => 1_000_000,
            Self::Kbps500 => 500_000,
            Self::Kbps250 => 250_000,
            Self::Kbps125 => 125_000,
        })
    }

    /// Reference bit timing for this rate
    pub fn timing(self) -> BitTiming {
        BitTiming::new(self.hertz())
    }
}

impl TryFrom<HertzU32> for BitRate {
    type Error = Error;

    fn try_from(rate: HertzU32) -> Result<Self, Error> {
        [Self::Mbps1, Self::Kbps500, Self::Kbps250, Self::Kbps125]
            .into_iter()
            .find(|candidate| candidate.hertz() == rate)
            .ok_or(Error::InvalidArgument)
    }
}

impl From<BitRate> for HertzU32 {
    fn from(rate: BitRate) -> Self {
        rate.hertz()
    }
}

/// Bit-timing parameters
///
/// The bit time is determined by
/// - the time quantum `t_q`, which is the peripheral clock divided by the
///   prescaler
/// - the number of time quanta in a bit time, determined by `phase_seg_1` and
///   `phase_seg_2`
///
/// This struct expects *real* values, the `- 1` encoding of [`Btr`] is
/// handled by the HAL.
///
/// Default values are:
/// - sjw: 2
/// - phase_seg_1: 3
/// - phase_seg_2: 2
///
/// Default time quanta in a bit time is 6 (phase_seg_1 + phase_seg_2 +
/// synchronization segment (1))
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitTiming {
    /// Synchronization jump width
    pub sjw: u8,
    /// Propagation time and phase time before sample point
    pub phase_seg_1: u8,
    /// Time after sample point
    pub phase_seg_2: u8,
    /// The bitrate of the bus. The peripheral clock must be divisible into
    /// time quanta such that the bit time is a whole number of them.
    pub bitrate: HertzU32,
}

impl BitTiming {
    /// Create an instance
    ///
    /// Bitrate value must be provided, segments come pre-populated with
    /// default values.
    pub fn new(bitrate: HertzU32) -> Self {
        Self {
            sjw: 2,
            phase_seg_1: 3,
            phase_seg_2: 2,
            bitrate,
        }
    }

    /// Returns the number of time quanta that make up one bit time, `t_bit /
    /// t_q`
    pub fn time_quanta_per_bit(&self) -> u32 {
        1 + u32::from(self.phase_seg_1) + u32::from(self.phase_seg_2)
    }

    fn check(&self, valid: &BitTimingRanges) -> Result<(), BitTimingError> {
        if !valid.sjw.contains(&self.sjw.into()) {
            Err(BitTimingError::SynchronizationJumpWidthOutOfRange(
                valid.sjw.clone(),
            ))
        } else if !valid.phase_seg_1.contains(&self.phase_seg_1.into()) {
            Err(BitTimingError::PhaseSeg1OutOfRange(
                valid.phase_seg_1.clone(),
            ))
        } else if !valid.phase_seg_2.contains(&self.phase_seg_2.into()) {
            Err(BitTimingError::PhaseSeg2OutOfRange(
                valid.phase_seg_2.clone(),
            ))
        } else {
            Ok(())
        }
    }

    /// Prescaler dividing `can_clock` into time quanta of this timing
    pub fn prescaler(&self, can_clock: HertzU32) -> Result<u16, BitTimingError> {
        let valid = &BIT_TIMING_RANGES;
        self.check(valid)?;
        let bit_time_quanta = self.time_quanta_per_bit();
        let no_valid_prescaler = || BitTimingError::NoValidPrescaler {
            can_clock,
            bitrate: self.bitrate,
            bit_time_quanta,
        };
        let f_q = self
            .bitrate
            .to_Hz()
            .checked_mul(bit_time_quanta)
            .ok_or_else(no_valid_prescaler)?;
        if can_clock.to_Hz().checked_rem(f_q) != Some(0) {
            return Err(no_valid_prescaler());
        }
        let prescaler = can_clock.to_Hz() / f_q;
        if valid.prescaler.contains(&prescaler) {
            Ok(prescaler as u16)
        } else {
            Err(BitTimingError::PrescalerOutOfRange(valid.prescaler.clone()))
        }
    }

    /// Packs the timing into a [`Btr`] value, test modes cleared.
    pub fn register_value(&self, can_clock: HertzU32) -> Result<Btr, BitTimingError> {
        let prescaler = self.prescaler(can_clock)?;
        let mut value = Btr(0);
        value.set_sjw(self.sjw - 1);
        value.set_ts1(self.phase_seg_1 - 1);
        value.set_ts2(self.phase_seg_2 - 1);
        value.set_brp(prescaler - 1);
        Ok(value)
    }

    /// Reads back the timing held by a [`Btr`] value.
    ///
    /// Returns `None` when `can_clock` is not a whole multiple of the bit
    /// time it describes.
    pub fn from_register_value(value: Btr, can_clock: HertzU32) -> Option<Self> {
        let mut timing = Self {
            sjw: value.sjw() + 1,
            phase_seg_1: value.ts1() + 1,
            phase_seg_2: value.ts2() + 1,
            bitrate: HertzU32::from_raw(0),
        };
        let divider = (u32::from(value.brp()) + 1) * timing.time_quanta_per_bit();
        if can_clock.to_Hz() % divider != 0 {
            return None;
        }
        timing.bitrate = can_clock / divider;
        Some(timing)
    }
}

/// Misconfigurations of [`BitTiming`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BitTimingError {
    /// SJW is outside the wrapped `RangeInclusive`
    SynchronizationJumpWidthOutOfRange(RangeInclusive<u32>),
    /// Phase segment 1 is outside the wrapped `RangeInclusive`
    PhaseSeg1OutOfRange(RangeInclusive<u32>),
    /// Phase segment 2 is outside the wrapped `RangeInclusive`
    PhaseSeg2OutOfRange(RangeInclusive<u32>),
    /// Prescaler is outside the wrapped `RangeInclusive`
    PrescalerOutOfRange(RangeInclusive<u32>),
    /// No valid prescaler could be found
    ///
    /// The following requirement must be met:
    /// - `can_clock` must be divisible by `bitrate * bit_time_quanta`
    NoValidPrescaler {
        /// Provided peripheral clock
        can_clock: HertzU32,
        /// Bitrate requested in [`BitTiming`]
        bitrate: HertzU32,
        /// Time quanta per bit selected by [`BitTiming`]
        bit_time_quanta: u32,
    },
}

/// Valid values of a BitTiming struct
#[derive(Clone)]
struct BitTimingRanges {
    sjw: RangeInclusive<u32>,
    phase_seg_1: RangeInclusive<u32>,
    phase_seg_2: RangeInclusive<u32>,
    prescaler: RangeInclusive<u32>,
}

const BIT_TIMING_RANGES: BitTimingRanges = BitTimingRanges {
    sjw: 1..=4,
    phase_seg_1: 1..=16,
    phase_seg_2: 1..=8,
    prescaler: 1..=1024,
};

/// Debug modes, mapped onto the top bits of [`Btr`]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TestModes {
    /// Transmitted frames are not driven onto the bus
    pub silent: bool,
    /// Transmitted frames are fed back to the receiver
    pub loopback: bool,
}

impl TestModes {
    pub(crate) fn apply(self, mut value: Btr) -> Btr {
        value.set_silm(self.silent);
        value.set_lbkm(self.loopback);
        value
    }
}

/// Master control options
///
/// Covers exactly the bits of [`CONFIG_MASK`](crate::reg::mcr::CONFIG_MASK).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// Freeze reception and transmission while the core is halted by a
    /// debugger
    pub debug_freeze: bool,
    /// Time triggered communication mode
    pub time_triggered: bool,
    /// Leave bus-off automatically after 128 × 11 recessive bits
    pub auto_bus_off: bool,
    /// Wake up on bus activity
    pub auto_wake_up: bool,
    /// Transmit each frame once, whatever its outcome
    pub no_retransmit: bool,
    /// Discard incoming frames instead of overwriting when a FIFO is full
    pub rx_fifo_locked: bool,
    /// Transmit in request order instead of by identifier priority
    pub tx_fifo_priority: bool,
}

impl Options {
    /// MCR value carrying these options; bits outside
    /// [`CONFIG_MASK`](crate::reg::mcr::CONFIG_MASK) are zero.
    pub fn register_value(&self) -> Mcr {
        let mut value = Mcr(0);
        value.set_dbf(self.debug_freeze);
        value.set_ttcm(self.time_triggered);
        value.set_abom(self.auto_bus_off);
        value.set_awum(self.auto_wake_up);
        value.set_nart(self.no_retransmit);
        value.set_rflm(self.rx_fifo_locked);
        value.set_txfp(self.tx_fifo_priority);
        value
    }
}

/// Bounded wait policy for mode transitions
///
/// The acknowledge bits are sampled once, then again after each of up to
/// `attempts` waits of `interval_us` microseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PollLimit {
    /// Number of waits before giving up
    pub attempts: u32,
    /// Delay between two reads
    pub interval_us: u32,
}

impl Default for PollLimit {
    fn default() -> Self {
        Self {
            attempts: 10_000,
            interval_us: 1,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reg::mcr;
    use fugit::RateExtU32;

    fn clock() -> HertzU32 {
        36.MHz()
    }

    #[test]
    fn reference_timing_at_500_kbps() {
        let value = BitRate::Kbps500.timing().register_value(clock()).unwrap();
        assert_eq!(value.brp(), 11);
        assert_eq!(value.ts1(), 2);
        assert_eq!(value.ts2(), 1);
        assert_eq!(value.sjw(), 1);
        assert_eq!(value.0, 0x0112_000B);
    }

    #[test]
    fn packed_fields_reproduce_clock_ratio() {
        for rate in [
            BitRate::Mbps1,
            BitRate::Kbps500,
            BitRate::Kbps250,
            BitRate::Kbps125,
        ] {
            let value = rate.timing().register_value(clock()).unwrap();
            let unpacked = Btr(value.0);
            let quanta = 1 + (u32::from(unpacked.ts1()) + 1) + (u32::from(unpacked.ts2()) + 1);
            let prescaler = u32::from(unpacked.brp()) + 1;
            assert_eq!(quanta * prescaler, clock().to_Hz() / rate.hertz().to_Hz());
        }
    }

    #[test]
    fn register_value_reads_back() {
        let timing = BitRate::Kbps125.timing();
        let value = timing.register_value(clock()).unwrap();
        assert_eq!(
            BitTiming::from_register_value(value, clock()),
            Some(timing)
        );
    }

    #[test]
    fn inexact_prescaler_is_rejected() {
        let timing = BitTiming::new(700.kHz());
        assert_eq!(
            timing.register_value(clock()),
            Err(BitTimingError::NoValidPrescaler {
                can_clock: clock(),
                bitrate: 700.kHz(),
                bit_time_quanta: 6,
            })
        );
    }

    #[test]
    fn overflowing_bitrate_is_rejected() {
        let timing = BitTiming::new(1_000.MHz());
        assert_eq!(
            timing.register_value(clock()),
            Err(BitTimingError::NoValidPrescaler {
                can_clock: clock(),
                bitrate: 1_000.MHz(),
                bit_time_quanta: 6,
            })
        );
    }

    #[test]
    fn zero_bitrate_is_rejected() {
        let timing = BitTiming::new(HertzU32::from_raw(0));
        assert!(matches!(
            timing.register_value(clock()),
            Err(BitTimingError::NoValidPrescaler { .. })
        ));
    }

    #[test]
    fn segments_out_of_range_are_rejected() {
        let mut timing = BitRate::Mbps1.timing();
        timing.phase_seg_2 = 9;
        assert_eq!(
            timing.register_value(clock()),
            Err(BitTimingError::PhaseSeg2OutOfRange(1..=8))
        );
        timing.phase_seg_2 = 2;
        timing.sjw = 0;
        assert_eq!(
            timing.register_value(clock()),
            Err(BitTimingError::SynchronizationJumpWidthOutOfRange(1..=4))
        );
    }

    #[test]
    fn slow_rate_overflows_prescaler() {
        let timing = BitTiming::new(5.kHz());
        assert_eq!(
            timing.register_value(clock()),
            Err(BitTimingError::PrescalerOutOfRange(1..=1024))
        );
    }

    #[test]
    fn only_standard_rates_convert() {
        assert_eq!(BitRate::try_from(250.kHz()), Ok(BitRate::Kbps250));
        assert_eq!(BitRate::try_from(1.MHz()), Ok(BitRate::Mbps1));
        assert_eq!(BitRate::try_from(100.kHz()), Err(Error::InvalidArgument));
    }

    #[test]
    fn options_stay_inside_config_mask() {
        let all = Options {
            debug_freeze: true,
            time_triggered: true,
            auto_bus_off: true,
            auto_wake_up: true,
            no_retransmit: true,
            rx_fifo_locked: true,
            tx_fifo_priority: true,
        };
        assert_eq!(all.register_value().0, mcr::CONFIG_MASK);
        assert_eq!(Options::default().register_value().0, 0);
    }

    #[test]
    fn test_modes_set_top_bits() {
        let modes = TestModes {
            silent: true,
            loopback: true,
        };
        assert_eq!(modes.apply(Btr(0x0112_000B)).0, 0xC112_000B);
        assert_eq!(TestModes::default().apply(Btr(0xC000_0000)).0, 0);
    }
}
