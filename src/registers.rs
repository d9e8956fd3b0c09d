//! TIMER register access
//!
//! The register block comes from the device PAC selected by the family
//! feature. All TIMER instances of a family share the `timer0` layout, the
//! smaller instances simply implement fewer capture/compare registers.

use core::ops::Deref;

use crate::interrupt::Interrupt;
use crate::pac;
use crate::timer::TimerConfig;

pub use crate::pac::timer0::RegisterBlock;

/// Number of capture/compare registers implemented by the largest instances
pub const CC_NUM: usize = 6;

const INTEN_COMPARE0: u32 = 1 << 16;
const SHORTS_COMPARE0_CLEAR: u32 = 1 << 0;
const TASK_TRIGGER: u32 = 1;

/// TIMER mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Free-running counter clocked from the prescaler
    Timer = 0,
    /// Incremented by the COUNT task
    Counter = 1,
    /// Incremented by the COUNT task, low power variant (nRF52 only)
    LowPowerCounter = 2,
}

/// Counter bit width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bitmode {
    _16Bit = 0,
    _8Bit = 1,
    _24Bit = 2,
    _32Bit = 3,
}

impl Bitmode {
    /// Largest value the counter reaches before it wraps to zero
    pub const fn mask(self) -> u32 {
        match self {
            Bitmode::_8Bit => 0x0000_00FF,
            Bitmode::_16Bit => 0x0000_FFFF,
            Bitmode::_24Bit => 0x00FF_FFFF,
            Bitmode::_32Bit => 0xFFFF_FFFF,
        }
    }
}

/// Register level operations the driver performs on a TIMER
///
/// Channel arguments index the capture/compare registers and are not range
/// checked here.
pub trait TimerPeripheral {
    /// Number of capture/compare registers of this instance
    fn cc_num(&self) -> u8 {
        CC_NUM as u8
    }
    /// Trigger the START task
    fn start(&self);
    /// Trigger the STOP task
    fn stop(&self);
    /// Trigger the SHUTDOWN task
    fn shutdown(&self);
    /// Trigger the CLEAR task, resetting the counter to zero
    fn clear(&self);
    /// Trigger the CAPTURE task of `channel`
    fn capture(&self, channel: u8);
    /// Read CC\[channel\]
    fn compare_value(&self, channel: u8) -> u32;
    /// Write CC\[channel\]
    fn set_compare_value(&self, channel: u8, value: u32);
    /// Returns `true` if EVENTS_COMPARE\[channel\] is set
    fn compare_event(&self, channel: u8) -> bool;
    /// Reset EVENTS_COMPARE\[channel\]
    fn clear_compare_event(&self, channel: u8);
    /// Enable the COMPARE\[channel\] interrupt
    fn enable_compare_interrupt(&self, channel: u8);
    /// Disable the COMPARE\[channel\] interrupt
    fn disable_compare_interrupt(&self, channel: u8);
    /// Link COMPARE\[channel\] to the CLEAR task
    fn enable_clear_on_compare(&self, channel: u8);
    /// Remove the COMPARE\[channel\] to CLEAR link
    fn disable_clear_on_compare(&self, channel: u8);
    /// Select the timer mode
    fn set_mode(&self, mode: Mode);
    /// Select the counter bit width
    fn set_bitmode(&self, bitmode: Bitmode);
    /// Set the prescaler, f = 16MHz / 2^prescaler
    fn set_prescaler(&self, prescaler: u8);
    /// Switch the peripheral power on or off (nRF51 only)
    fn set_power(&self, on: bool);
}

impl<T> TimerPeripheral for &T
where
    T: TimerPeripheral + ?Sized,
{
    fn cc_num(&self) -> u8 {
        (**self).cc_num()
    }
    fn start(&self) {
        (**self).start()
    }
    fn stop(&self) {
        (**self).stop()
    }
    fn shutdown(&self) {
        (**self).shutdown()
    }
    fn clear(&self) {
        (**self).clear()
    }
    fn capture(&self, channel: u8) {
        (**self).capture(channel)
    }
    fn compare_value(&self, channel: u8) -> u32 {
        (**self).compare_value(channel)
    }
    fn set_compare_value(&self, channel: u8, value: u32) {
        (**self).set_compare_value(channel, value)
    }
    fn compare_event(&self, channel: u8) -> bool {
        (**self).compare_event(channel)
    }
    fn clear_compare_event(&self, channel: u8) {
        (**self).clear_compare_event(channel)
    }
    fn enable_compare_interrupt(&self, channel: u8) {
        (**self).enable_compare_interrupt(channel)
    }
    fn disable_compare_interrupt(&self, channel: u8) {
        (**self).disable_compare_interrupt(channel)
    }
    fn enable_clear_on_compare(&self, channel: u8) {
        (**self).enable_clear_on_compare(channel)
    }
    fn disable_clear_on_compare(&self, channel: u8) {
        (**self).disable_clear_on_compare(channel)
    }
    fn set_mode(&self, mode: Mode) {
        (**self).set_mode(mode)
    }
    fn set_bitmode(&self, bitmode: Bitmode) {
        (**self).set_bitmode(bitmode)
    }
    fn set_prescaler(&self, prescaler: u8) {
        (**self).set_prescaler(prescaler)
    }
    fn set_power(&self, on: bool) {
        (**self).set_power(on)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// PAC TIMER peripherals usable with [`Timer`]
pub trait Instance: sealed::Sealed {
    /// Register block
    const PTR: *const RegisterBlock;
    /// NVIC interrupt line
    const IRQ: Interrupt;
    /// Number of capture/compare registers
    const CC_NUM: u8;
}

macro_rules! instance {
    ($($(#[$attr:meta])* $TIMX:ident: $cc_num:expr,)+) => {
        $(
            $(#[$attr])*
            impl sealed::Sealed for pac::$TIMX {}

            $(#[$attr])*
            impl Instance for pac::$TIMX {
                const PTR: *const RegisterBlock = pac::$TIMX::ptr() as *const RegisterBlock;
                const IRQ: Interrupt = Interrupt(pac::Interrupt::$TIMX as u16);
                const CC_NUM: u8 = $cc_num;
            }
        )+
    };
}

instance! {
    TIMER0: 4,
    TIMER1: 4,
    TIMER2: 4,
    #[cfg(feature = "nrf52")]
    TIMER3: 6,
    #[cfg(feature = "nrf52")]
    TIMER4: 6,
}

/// Handle to one TIMER instance
///
/// Erases the PAC type so that different instances fit in one configuration
/// table, and keeps the instance's interrupt line and capture/compare count.
#[derive(Debug)]
pub struct Timer {
    rb: *const RegisterBlock,
    irq: Interrupt,
    cc_num: u8,
}

// unsafe: the handle stands in for the owned PAC singleton, the register
// block itself is only touched through volatile accesses
unsafe impl Send for Timer {}
unsafe impl Sync for Timer {}

impl Timer {
    /// Takes ownership of a PAC TIMER
    pub fn new<T: Instance>(_timer: T) -> Self {
        // unsafe: `_timer` is the unique PAC singleton and is consumed here
        unsafe { Self::steal::<T>() }
    }

    /// Handle to TIMER `T` without taking the PAC singleton, usable in a
    /// `static` configuration table
    ///
    /// # Safety
    ///
    /// The caller must ensure that only this handle is used to drive the
    /// peripheral.
    pub const unsafe fn steal<T: Instance>() -> Self {
        Timer {
            rb: T::PTR,
            irq: T::IRQ,
            cc_num: T::CC_NUM,
        }
    }

    /// Configuration for this instance with `channels` compare channels
    ///
    /// # Panics
    ///
    /// Panics if the instance has no capture/compare register left for
    /// [`Timers::read`](crate::Timers::read), i.e. if `channels` is not
    /// below its capture/compare count. In a `static` this is a compile time
    /// error.
    pub const fn config(self, channels: u8) -> TimerConfig<Timer> {
        assert!(
            channels < self.cc_num,
            "the TIMER has fewer capture/compare registers than channels + 1"
        );
        let irq = self.irq;
        TimerConfig::new(self, irq, channels)
    }

    /// Interrupt line of this instance
    pub const fn irq(&self) -> Interrupt {
        self.irq
    }

    /// Register block pointer
    pub const fn ptr(&self) -> *const RegisterBlock {
        self.rb
    }
}

impl Deref for Timer {
    type Target = RegisterBlock;

    #[inline(always)]
    fn deref(&self) -> &RegisterBlock {
        // unsafe: points at a TIMER register block for the lifetime of the
        // handle
        unsafe { &*self.rb }
    }
}

impl TimerPeripheral for Timer {
    fn cc_num(&self) -> u8 {
        self.cc_num
    }

    #[inline]
    fn start(&self) {
        // unsafe: task registers only accept a trigger
        self.tasks_start.write(|w| unsafe { w.bits(TASK_TRIGGER) });
    }

    #[inline]
    fn stop(&self) {
        self.tasks_stop.write(|w| unsafe { w.bits(TASK_TRIGGER) });
    }

    #[inline]
    fn shutdown(&self) {
        self.tasks_shutdown.write(|w| unsafe { w.bits(TASK_TRIGGER) });
    }

    #[inline]
    fn clear(&self) {
        self.tasks_clear.write(|w| unsafe { w.bits(TASK_TRIGGER) });
    }

    #[inline]
    fn capture(&self, channel: u8) {
        self.tasks_capture[usize::from(channel)].write(|w| unsafe { w.bits(TASK_TRIGGER) });
    }

    #[inline]
    fn compare_value(&self, channel: u8) -> u32 {
        self.cc[usize::from(channel)].read().bits()
    }

    #[inline]
    fn set_compare_value(&self, channel: u8, value: u32) {
        // unsafe: all values are valid, the hardware ignores bits above the
        // configured bit width
        self.cc[usize::from(channel)].write(|w| unsafe { w.bits(value) });
    }

    #[inline]
    fn compare_event(&self, channel: u8) -> bool {
        self.events_compare[usize::from(channel)].read().bits() != 0
    }

    #[inline]
    fn clear_compare_event(&self, channel: u8) {
        self.events_compare[usize::from(channel)].write(|w| unsafe { w.bits(0) });
    }

    #[inline]
    fn enable_compare_interrupt(&self, channel: u8) {
        // INTENSET / INTENCLR are write-one-to-act, no read-modify-write
        self.intenset
            .write(|w| unsafe { w.bits(INTEN_COMPARE0 << channel) });
    }

    #[inline]
    fn disable_compare_interrupt(&self, channel: u8) {
        self.intenclr
            .write(|w| unsafe { w.bits(INTEN_COMPARE0 << channel) });
    }

    #[inline]
    fn enable_clear_on_compare(&self, channel: u8) {
        self.shorts
            .modify(|r, w| unsafe { w.bits(r.bits() | (SHORTS_COMPARE0_CLEAR << channel)) });
    }

    #[inline]
    fn disable_clear_on_compare(&self, channel: u8) {
        self.shorts
            .modify(|r, w| unsafe { w.bits(r.bits() & !(SHORTS_COMPARE0_CLEAR << channel)) });
    }

    #[inline]
    fn set_mode(&self, mode: Mode) {
        self.mode.write(|w| unsafe { w.bits(mode as u32) });
    }

    #[inline]
    fn set_bitmode(&self, bitmode: Bitmode) {
        self.bitmode.write(|w| unsafe { w.bits(bitmode as u32) });
    }

    #[inline]
    fn set_prescaler(&self, prescaler: u8) {
        self.prescaler
            .write(|w| unsafe { w.bits(u32::from(prescaler)) });
    }

    #[cfg(feature = "nrf51")]
    #[inline]
    fn set_power(&self, on: bool) {
        self.power.write(|w| unsafe { w.bits(u32::from(on)) });
    }

    // no POWER register on nRF52
    #[cfg(not(feature = "nrf51"))]
    #[inline]
    fn set_power(&self, _on: bool) {}
}
