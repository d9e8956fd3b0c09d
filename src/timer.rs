//! Timers
//!
//! A [`Timers`] value owns a fixed table of TIMER instances together with
//! the per-instance state the driver keeps across calls: the callback
//! binding and which compare channels are armed, and which of those are
//! periodic. It is meant to live in a `static` so that both application code
//! and the interrupt handlers bound with [`timer_isr!`](crate::timer_isr)
//! can reach it.
//!
//! State shared with the interrupt handler is only touched inside a
//! `critical_section`. Register sequences that reconfigure a channel run in
//! the same critical section, so the dispatcher never observes a
//! half-configured channel.

use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;
use log::{debug, warn};

use crate::interrupt::InterruptController;
use crate::registers::{Mode, TimerPeripheral};
use crate::time::Hertz;

mod channel;
mod config;
mod dispatch;
pub mod prescaler;

pub use channel::{ChannelMask, PeriodicFlags};
pub use config::{StopMode, TimerConfig, MAX_CHANNELS};
pub use prescaler::{query_freqs, query_freqs_numof, BASE_CLOCK};

/// Compare event flags reset by [`Timers::init`]
///
/// Fixed at the three channels every TIMER implements, independent of the
/// configured channel count.
const INIT_CLEARED_EVENTS: u8 = 3;

/// Expiration callback, invoked from interrupt context with the instance's
/// argument and the index of the channel that fired
pub type Callback<A> = fn(arg: A, channel: u8);

/// Timer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Instance index is not part of the configuration table
    InvalidInstance,
    /// Channel index is not below the instance's channel count
    InvalidChannel,
    /// The frequency is not 16MHz divided by a power of two up to 2^9
    UnsupportedFrequency,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidInstance => f.write_str("invalid timer instance"),
            Error::InvalidChannel => f.write_str("invalid timer channel"),
            Error::UnsupportedFrequency => f.write_str("unsupported timer frequency"),
        }
    }
}

#[derive(Clone, Copy)]
struct Binding<A> {
    callback: Callback<A>,
    arg: A,
}

struct Context<A> {
    binding: Option<Binding<A>>,
    armed: ChannelMask,
    periodic: ChannelMask,
}

impl<A> Context<A> {
    const EMPTY: Self = Context {
        binding: None,
        armed: ChannelMask::EMPTY,
        periodic: ChannelMask::EMPTY,
    };
}

/// Table of TIMER instances
///
/// * `P` - register block handle of each instance
/// * `IC` - interrupt controller
/// * `A` - argument passed to the callbacks
/// * `N` - number of instances
pub struct Timers<P, IC, A, const N: usize> {
    config: [TimerConfig<P>; N],
    ctx: [Mutex<RefCell<Context<A>>>; N],
    ic: IC,
}

impl<P, IC, A, const N: usize> Timers<P, IC, A, N> {
    const CONTEXT: Mutex<RefCell<Context<A>>> = Mutex::new(RefCell::new(Context::EMPTY));

    /// Creates the table. No hardware is touched until [`init`](Self::init).
    pub const fn new(config: [TimerConfig<P>; N], ic: IC) -> Self {
        Timers {
            config,
            ctx: [Self::CONTEXT; N],
            ic,
        }
    }

    /// Number of configured instances
    pub const fn numof(&self) -> usize {
        N
    }

    /// Configuration of instance `tim`
    pub fn config(&self, tim: usize) -> Option<&TimerConfig<P>> {
        self.config.get(tim)
    }

    /// Number of compare channels of instance `tim`
    pub fn channel_numof(&self, tim: usize) -> Option<u8> {
        self.config(tim).map(TimerConfig::channels)
    }
}

impl<P, IC, A, const N: usize> Timers<P, IC, A, N>
where
    P: TimerPeripheral,
    IC: InterruptController,
    A: Copy,
{
    /// Initializes instance `tim` to count at `freq` and binds `callback`
    ///
    /// The counter is powered, stopped, set to timer mode and cleared, then
    /// started at `freq` with the TIMER interrupt enabled. `freq` must be one
    /// of the frequencies listed by [`query_freqs`].
    ///
    /// Fails with `InvalidChannel` before touching the hardware if the
    /// instance has no capture/compare register left for [`read`](Self::read).
    /// There is no rollback on other errors: after `UnsupportedFrequency` the
    /// callback stays bound and the counter is left stopped.
    pub fn init<F>(&self, tim: usize, freq: F, callback: Callback<A>, arg: A) -> Result<(), Error>
    where
        F: Into<Hertz>,
    {
        let config = self.config.get(tim).ok_or(Error::InvalidInstance)?;
        let dev = &config.dev;
        if config.capture_channel() >= dev.cc_num() {
            warn!(
                "timer {}: {} channels leave no capture register",
                tim, config.channels
            );
            return Err(Error::InvalidChannel);
        }
        let freq = freq.into();

        critical_section::with(|cs| {
            self.ctx[tim].borrow_ref_mut(cs).binding = Some(Binding { callback, arg });
        });

        if config.power_register {
            dev.set_power(true);
        }

        dev.stop();
        dev.set_bitmode(config.bitmode);
        dev.set_mode(Mode::Timer);
        dev.clear();

        let prescaler = prescaler::prescaler_for(freq).ok_or_else(|| {
            warn!("timer {}: {} is not reachable from {}", tim, freq, BASE_CLOCK);
            Error::UnsupportedFrequency
        })?;
        dev.set_prescaler(prescaler);
        debug!("timer {}: {} (prescaler {})", tim, freq, prescaler);

        for channel in 0..INIT_CLEARED_EVENTS {
            dev.clear_compare_event(channel);
        }

        self.ic.unmask(config.irq);
        dev.start();

        Ok(())
    }

    /// Resumes counting from the current counter value
    ///
    /// # Panics
    ///
    /// Panics if `tim` is not a configured instance.
    pub fn start(&self, tim: usize) {
        self.config[tim].dev.start();
    }

    /// Halts the counter
    ///
    /// Uses the SHUTDOWN task unless the instance was configured with
    /// [`StopMode::Stop`].
    ///
    /// # Panics
    ///
    /// Panics if `tim` is not a configured instance.
    pub fn stop(&self, tim: usize) {
        let config = &self.config[tim];
        match config.stop_mode {
            StopMode::Shutdown => config.dev.shutdown(),
            StopMode::Stop => config.dev.stop(),
        }
    }

    /// Samples the running counter
    ///
    /// The counter register cannot be read directly, so the value is captured
    /// into the capture/compare register just above the last compare channel.
    ///
    /// # Panics
    ///
    /// Panics if `tim` is not a configured instance.
    pub fn read(&self, tim: usize) -> u32 {
        let config = &self.config[tim];
        let channel = config.capture_channel();

        critical_section::with(|_| {
            config.dev.capture(channel);
            config.dev.compare_value(channel)
        })
    }
}
