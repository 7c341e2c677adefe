//! Implementations that are useful accross the whole project
//!
//! Date management, logbook records and the metrics computed from them

pub mod date;
pub mod entry;
pub mod history;
pub mod metrics;
pub mod period;
pub mod projection;
pub mod summary;
pub mod timeframe;
pub mod trip;
pub mod typical;
pub mod units;
