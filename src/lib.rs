//! Compare timer driver for the nRF51 / nRF52 TIMER peripheral
//!
//! The driver manages a fixed table of TIMER instances. Each instance runs a
//! free-running counter at an exact power-of-two division of the 16MHz base
//! clock and exposes a handful of compare channels that can be armed as
//! one-shot or periodic alarms. Expirations are delivered from the TIMER
//! interrupt to a single callback per instance.
//!
//! # Example
//!
//! ```ignore
//! use nrf5x_timer::{pac, prelude::*, timer_isr, Bitmode, Nvic, Timer, Timers};
//!
//! static TIMERS: Timers<Timer, Nvic, usize, 2> = Timers::new(
//!     [
//!         unsafe { Timer::steal::<pac::TIMER0>() }.config(3),
//!         unsafe { Timer::steal::<pac::TIMER1>() }
//!             .config(3)
//!             .bitmode(Bitmode::_16Bit),
//!     ],
//!     Nvic::new(),
//! );
//!
//! timer_isr!(TIMER0 => TIMERS[0]);
//! timer_isr!(TIMER1 => TIMERS[1]);
//!
//! fn on_alarm(_arg: usize, channel: u8) {
//!     log::info!("channel {} expired", channel);
//! }
//!
//! TIMERS.init(0, 1.mhz(), on_alarm, 0)?;
//! TIMERS.set_absolute(0, 0, 1_000)?;
//! ```

#![no_std]

#[cfg(not(feature = "device-selected"))]
compile_error!(
    "This crate requires one of the following device features enabled:
        nrf51
        nrf52832
        nrf52840
"
);

#[cfg(any(
    all(feature = "nrf51", feature = "nrf52"),
    all(feature = "nrf52832", feature = "nrf52840"),
))]
compile_error!("Device features are mutually exclusive, select exactly one device");

#[cfg(test)]
#[macro_use]
extern crate std;

#[cfg(feature = "nrf51")]
pub use nrf51_pac as pac;
#[cfg(feature = "nrf52832")]
pub use nrf52832_pac as pac;
#[cfg(feature = "nrf52840")]
pub use nrf52840_pac as pac;

pub mod interrupt;
pub mod prelude;
pub mod registers;
pub mod time;
pub mod timer;

#[cfg(test)]
mod sim;

pub use crate::interrupt::{Interrupt, InterruptController, Nvic};
pub use crate::registers::{Bitmode, Instance, Mode, Timer, TimerPeripheral};
pub use crate::timer::{
    Callback, ChannelMask, Error, PeriodicFlags, StopMode, TimerConfig, Timers,
};
