//! Interrupt controller access
//!
//! The timer driver only needs two things from the interrupt controller: a
//! way to enable the TIMER line during initialization and a hook that runs at
//! the end of every dispatch. Both are expressed by [`InterruptController`] so
//! that an RTOS can add its own end-of-ISR work (e.g. pending a context
//! switch) and so the driver can be exercised without a real NVIC.

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;

/// NVIC interrupt line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interrupt(pub u16);

// unsafe: any u16 is accepted by the NVIC register accessors, the number is
// only ever used as an index into ISER/ICER
unsafe impl InterruptNumber for Interrupt {
    #[inline]
    fn number(self) -> u16 {
        self.0
    }
}

/// Interrupt controller primitives used by the timer driver
pub trait InterruptController {
    /// Enable the given interrupt line
    fn unmask(&self, interrupt: Interrupt);

    /// Acknowledge the end of an interrupt handler
    ///
    /// Called exactly once per dispatch, after all channels were serviced.
    fn end_of_interrupt(&self) {}
}

impl<T> InterruptController for &T
where
    T: InterruptController + ?Sized,
{
    fn unmask(&self, interrupt: Interrupt) {
        (**self).unmask(interrupt)
    }

    fn end_of_interrupt(&self) {
        (**self).end_of_interrupt()
    }
}

/// Cortex-M NVIC
///
/// An optional hook can be given that is run at the end of every timer
/// interrupt, typically used by schedulers to request a context switch.
#[derive(Clone, Copy, Default)]
pub struct Nvic {
    isr_end: Option<fn()>,
}

impl Nvic {
    /// NVIC without an end-of-interrupt hook
    pub const fn new() -> Self {
        Self { isr_end: None }
    }

    /// NVIC that calls `hook` at the end of every timer interrupt
    pub const fn with_isr_end(hook: fn()) -> Self {
        Self {
            isr_end: Some(hook),
        }
    }
}

impl InterruptController for Nvic {
    fn unmask(&self, interrupt: Interrupt) {
        // unsafe: unmasking may break critical sections based on masking. The
        // driver only unmasks TIMER lines whose handlers take their own
        // critical sections
        unsafe { NVIC::unmask(interrupt) }
    }

    fn end_of_interrupt(&self) {
        if let Some(hook) = self.isr_end {
            hook();
        }
    }
}
