//! Prelude
pub use crate::time::U32Ext as _nrf5x_timer_time_U32Ext;
pub use crate::timer::PeriodicFlags;
