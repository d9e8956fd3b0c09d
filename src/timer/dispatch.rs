//! Interrupt dispatch

use log::trace;

use crate::interrupt::InterruptController;
use crate::registers::TimerPeripheral;

use super::{Binding, Timers};

impl<P, IC, A, const N: usize> Timers<P, IC, A, N>
where
    P: TimerPeripheral,
    IC: InterruptController,
    A: Copy,
{
    /// Services the interrupt of instance `tim`
    ///
    /// Must be called from the TIMER interrupt handler, see
    /// [`timer_isr!`](crate::timer_isr). Every configured channel with a
    /// pending compare event is handled in ascending order: the event is
    /// cleared and, if the channel is armed, the callback runs. One-shot
    /// channels are disarmed before their callback, so the callback may arm
    /// them again. Events of channels that are not armed are discarded.
    ///
    /// # Panics
    ///
    /// Panics if `tim` is not a configured instance.
    pub fn on_interrupt(&self, tim: usize) {
        let config = &self.config[tim];
        let dev = &config.dev;

        for channel in 0..config.channels {
            if !dev.compare_event(channel) {
                continue;
            }
            dev.clear_compare_event(channel);

            let binding = critical_section::with(|cs| {
                let mut ctx = self.ctx[tim].borrow_ref_mut(cs);
                if !ctx.armed.contains(channel) {
                    return None;
                }
                if !ctx.periodic.contains(channel) {
                    ctx.armed.remove(channel);
                    dev.disable_compare_interrupt(channel);
                }
                ctx.binding
            });

            match binding {
                Some(Binding { callback, arg }) => callback(arg, channel),
                None => trace!("timer {}: discarding event on channel {}", tim, channel),
            }
        }

        self.ic.end_of_interrupt();
    }
}

/// Binds a [`Timers`] instance to its interrupt vector
///
/// Expands to an `extern "C"` handler named after the vector that calls
/// [`Timers::on_interrupt`] for the given instance index.
///
/// ```ignore
/// static TIMERS: Timers<Timer, Nvic, usize, 2> = Timers::new(CONFIG, Nvic::new());
///
/// timer_isr!(TIMER0 => TIMERS[0]);
/// timer_isr!(TIMER1 => TIMERS[1]);
/// ```
#[macro_export]
macro_rules! timer_isr {
    ($vector:ident => $timers:ident[$index:expr]) => {
        #[no_mangle]
        #[allow(non_snake_case)]
        pub extern "C" fn $vector() {
            $timers.on_interrupt($index);
        }
    };
}
