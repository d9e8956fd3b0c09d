//! Prescaler selection
//!
//! The TIMER counts at `BASE_CLOCK / 2^prescaler`. Only those exact
//! frequencies are offered, anything else is rejected rather than rounded.

use crate::time::Hertz;

/// Clock feeding the prescaler of every TIMER instance
pub const BASE_CLOCK: Hertz = Hertz(16_000_000);

/// Number of prescaler settings the driver tries, `0..PRESCALER_NUMOF`
pub const PRESCALER_NUMOF: u8 = 10;

/// Returns the smallest prescaler exponent that divides [`BASE_CLOCK`] down
/// to exactly `freq`
pub fn prescaler_for(freq: Hertz) -> Option<u8> {
    (0..PRESCALER_NUMOF).find(|&k| BASE_CLOCK.halved(k) == freq)
}

/// Number of distinct frequencies a TIMER can run at
pub const fn query_freqs_numof() -> usize {
    PRESCALER_NUMOF as usize
}

/// The `index`th supported frequency, fastest first
pub fn query_freqs(index: usize) -> Option<Hertz> {
    let shift = cast::u8(index).ok()?;
    if shift < PRESCALER_NUMOF {
        Some(BASE_CLOCK.halved(shift))
    } else {
        None
    }
}
