//! Static TIMER instance configuration
//!
//! One [`TimerConfig`] per TIMER describes the board-level facts the driver
//! cannot discover: the register block, how many compare channels the
//! application may use, the counter width and the interrupt line.
//!
//! ```ignore
//! const TIMER_CONFIG: [TimerConfig<Timer>; 1] = [
//!     unsafe { Timer::steal::<pac::TIMER3>() }
//!         .config(5)
//!         .bitmode(Bitmode::_32Bit)
//!         .stop_mode(StopMode::Shutdown),
//! ];
//! ```

use crate::interrupt::Interrupt;
use crate::registers::{Bitmode, CC_NUM};

/// Upper bound of compare channels available to the application
///
/// One capture/compare register is always reserved for reading the counter.
/// Instances with fewer than [`CC_NUM`] registers allow less, see
/// [`Timer::config`](crate::Timer::config).
pub const MAX_CHANNELS: u8 = CC_NUM as u8 - 1;

/// How [`Timers::stop`](super::Timers::stop) halts the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopMode {
    /// Trigger the SHUTDOWN task
    ///
    /// nRF52 erratum 78: stopping a TIMER that has been running with the
    /// STOP task alone leaves it drawing excess current. SHUTDOWN avoids
    /// this.
    Shutdown,
    /// Trigger the STOP task, only for silicon without erratum 78
    Stop,
}

/// Configuration of one TIMER instance
#[derive(Debug)]
pub struct TimerConfig<P> {
    pub(crate) dev: P,
    pub(crate) irq: Interrupt,
    pub(crate) channels: u8,
    pub(crate) bitmode: Bitmode,
    pub(crate) power_register: bool,
    pub(crate) stop_mode: StopMode,
}

impl<P> TimerConfig<P> {
    /// TIMER `dev` on interrupt line `irq` with `channels` compare channels
    ///
    /// Defaults to a 32 bit counter, stopping through SHUTDOWN and a POWER
    /// register only on nRF51.
    ///
    /// [`Timer::config`](crate::Timer::config) also checks `channels`
    /// against the capture/compare count of the instance.
    ///
    /// # Panics
    ///
    /// Panics if `channels` exceeds [`MAX_CHANNELS`]. In a `static` this is a
    /// compile time error.
    pub const fn new(dev: P, irq: Interrupt, channels: u8) -> Self {
        assert!(
            channels <= MAX_CHANNELS,
            "a TIMER has at most 5 compare channels besides the capture channel"
        );

        TimerConfig {
            dev,
            irq,
            channels,
            bitmode: Bitmode::_32Bit,
            power_register: cfg!(feature = "nrf51"),
            stop_mode: StopMode::Shutdown,
        }
    }

    /// Counter bit width
    pub const fn bitmode(mut self, bitmode: Bitmode) -> Self {
        self.bitmode = bitmode;
        self
    }

    /// Whether the instance has a POWER register that must be set by `init`
    pub const fn power_register(mut self, present: bool) -> Self {
        self.power_register = present;
        self
    }

    /// Task used to stop the counter
    pub const fn stop_mode(mut self, stop_mode: StopMode) -> Self {
        self.stop_mode = stop_mode;
        self
    }

    /// Register block handle
    pub fn dev(&self) -> &P {
        &self.dev
    }

    /// Number of compare channels
    pub const fn channels(&self) -> u8 {
        self.channels
    }

    /// Index of the capture/compare register used to sample the counter
    pub(crate) const fn capture_channel(&self) -> u8 {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TimerConfig::new((), Interrupt(8), 3);
        assert_eq!(config.channels(), 3);
        assert_eq!(config.capture_channel(), 3);
        assert_eq!(config.bitmode, Bitmode::_32Bit);
        assert_eq!(config.stop_mode, StopMode::Shutdown);
        assert_eq!(config.power_register, cfg!(feature = "nrf51"));
    }

    #[test]
    fn builder() {
        const CONFIG: TimerConfig<()> = TimerConfig::new((), Interrupt(26), MAX_CHANNELS)
            .bitmode(Bitmode::_16Bit)
            .power_register(true)
            .stop_mode(StopMode::Stop);

        assert_eq!(CONFIG.irq, Interrupt(26));
        assert_eq!(CONFIG.bitmode, Bitmode::_16Bit);
        assert!(CONFIG.power_register);
        assert_eq!(CONFIG.stop_mode, StopMode::Stop);
    }

    #[test]
    #[should_panic]
    fn too_many_channels() {
        let channels = MAX_CHANNELS + 1;
        let _ = TimerConfig::new((), Interrupt(8), channels);
    }
}
