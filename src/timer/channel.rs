//! Compare channels

use crate::interrupt::InterruptController;
use crate::registers::TimerPeripheral;

use super::{Error, TimerConfig, Timers};

bitflags::bitflags! {
    /// Options for [`Timers::set_periodic`]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct PeriodicFlags: u8 {
        /// Reset the counter to zero while arming the channel
        const RESET_ON_SET = 1 << 0;
        /// Reset the counter to zero every time the channel matches
        const RESET_ON_MATCH = 1 << 1;
        /// Leave the counter stopped after arming the channel
        const SET_STOPPED = 1 << 2;
    }
}

/// Set of compare channels of one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelMask(u32);

impl ChannelMask {
    /// No channel
    pub const EMPTY: Self = ChannelMask(0);

    /// Returns `true` if `channel` is in the set
    #[inline]
    pub const fn contains(self, channel: u8) -> bool {
        channel < u32::BITS as u8 && self.0 & (1 << channel) != 0
    }

    #[inline]
    pub(crate) fn insert(&mut self, channel: u8) {
        self.0 |= 1 << channel;
    }

    #[inline]
    pub(crate) fn remove(&mut self, channel: u8) {
        self.0 &= !(1 << channel);
    }

    /// Returns `true` if no channel is in the set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bits, bit n for channel n
    pub const fn bits(self) -> u32 {
        self.0
    }
}

/// Drops a stale compare event and enables the channel interrupt
///
/// The event register is read back after the clear so the write has reached
/// the peripheral before the interrupt is unmasked, otherwise an event that
/// predates the call would fire immediately.
fn arm_interrupt<P: TimerPeripheral>(dev: &P, channel: u8) {
    dev.clear_compare_event(channel);
    let _ = dev.compare_event(channel);
    dev.enable_compare_interrupt(channel);
}

impl<P, IC, A, const N: usize> Timers<P, IC, A, N>
where
    P: TimerPeripheral,
    IC: InterruptController,
    A: Copy,
{
    fn channel_config(&self, tim: usize, channel: u8) -> Result<&TimerConfig<P>, Error> {
        let config = self.config.get(tim).ok_or(Error::InvalidInstance)?;
        if channel >= config.channels {
            return Err(Error::InvalidChannel);
        }
        Ok(config)
    }

    /// Arms `channel` to fire once when the counter reaches `value`
    ///
    /// The channel disarms itself after the callback ran.
    pub fn set_absolute(&self, tim: usize, channel: u8, value: u32) -> Result<(), Error> {
        let dev = &self.channel_config(tim, channel)?.dev;

        critical_section::with(|cs| {
            self.ctx[tim].borrow_ref_mut(cs).armed.insert(channel);
            dev.set_compare_value(channel, value);
            arm_interrupt(dev, channel);
        });

        Ok(())
    }

    /// Arms `channel` to fire once, `timeout` ticks from now
    ///
    /// The target wraps around at the configured counter width.
    pub fn set(&self, tim: usize, channel: u8, timeout: u32) -> Result<(), Error> {
        let mask = self.channel_config(tim, channel)?.bitmode.mask();
        let target = self.read(tim).wrapping_add(timeout) & mask;
        self.set_absolute(tim, channel, target)
    }

    /// Arms `channel` to fire every time the counter reaches `value`
    ///
    /// The counter is stopped while the channel is reconfigured and restarted
    /// afterwards unless [`PeriodicFlags::SET_STOPPED`] is given. With
    /// [`PeriodicFlags::RESET_ON_MATCH`] the hardware clears the counter on
    /// each match, which turns the channel into a period generator.
    pub fn set_periodic(
        &self,
        tim: usize,
        channel: u8,
        value: u32,
        flags: PeriodicFlags,
    ) -> Result<(), Error> {
        let dev = &self.channel_config(tim, channel)?.dev;

        critical_section::with(|cs| {
            // no new compare events while stopped
            dev.stop();

            {
                let mut ctx = self.ctx[tim].borrow_ref_mut(cs);
                ctx.armed.insert(channel);
                ctx.periodic.insert(channel);
            }

            dev.set_compare_value(channel, value);
            if flags.contains(PeriodicFlags::RESET_ON_MATCH) {
                dev.enable_clear_on_compare(channel);
            } else {
                dev.disable_clear_on_compare(channel);
            }
            if flags.contains(PeriodicFlags::RESET_ON_SET) {
                dev.clear();
            }

            arm_interrupt(dev, channel);

            if !flags.contains(PeriodicFlags::SET_STOPPED) {
                dev.start();
            }
        });

        Ok(())
    }

    /// Disarms `channel`
    ///
    /// The compare value stays programmed but no longer triggers the
    /// callback. A match that raced with this call is discarded by the
    /// interrupt handler.
    pub fn clear(&self, tim: usize, channel: u8) -> Result<(), Error> {
        let dev = &self.channel_config(tim, channel)?.dev;

        critical_section::with(|cs| {
            dev.disable_compare_interrupt(channel);
            dev.disable_clear_on_compare(channel);

            let mut ctx = self.ctx[tim].borrow_ref_mut(cs);
            ctx.armed.remove(channel);
            ctx.periodic.remove(channel);
        });

        Ok(())
    }

    /// Channels of instance `tim` that are currently armed
    pub fn armed_channels(&self, tim: usize) -> ChannelMask {
        match self.ctx.get(tim) {
            Some(ctx) => critical_section::with(|cs| ctx.borrow_ref(cs).armed),
            None => ChannelMask::EMPTY,
        }
    }

    /// Returns `true` if `channel` has a pending expiration
    pub fn is_armed(&self, tim: usize, channel: u8) -> bool {
        self.armed_channels(tim).contains(channel)
    }

    /// Returns `true` if `channel` is armed and stays armed after firing
    pub fn is_periodic(&self, tim: usize, channel: u8) -> bool {
        match self.ctx.get(tim) {
            Some(ctx) => critical_section::with(|cs| ctx.borrow_ref(cs).periodic.contains(channel)),
            None => false,
        }
    }
}
