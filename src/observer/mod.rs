//! Session observers: the per-document command logger and the
//! active-duration statistics collector.

pub mod logger;
pub mod statistics;

pub use logger::CommandLogger;
pub use statistics::Statistics;
