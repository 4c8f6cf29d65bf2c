//! Active-duration statistics observer.
//!
//! Accrues how long each document has been the active one, driven by
//! the `ActiveStart`/`ActiveStop` event pair; a closed document's
//! accrual is dropped. The workspace listing consumes the totals
//! read-only.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::workspace::event::{Event, Observer};

/// Per-document active-duration accrual.
#[derive(Debug, Default)]
pub struct Statistics {
    durations: HashMap<String, Duration>,
    started: HashMap<String, Instant>,
}

impl Statistics {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total active duration for a document, including any
    /// still-running interval.
    #[must_use]
    pub fn duration(&self, name: &str) -> Duration {
        let accrued = self.durations.get(name).copied().unwrap_or_default();
        let live = self
            .started
            .get(name)
            .map_or(Duration::ZERO, Instant::elapsed);
        accrued + live
    }
}

impl Observer for Statistics {
    fn notify(&mut self, event: &Event) {
        match event {
            Event::ActiveStart { name } => {
                self.started.insert(name.clone(), Instant::now());
            }
            Event::ActiveStop { name } => {
                if let Some(start) = self.started.remove(name) {
                    *self.durations.entry(name.clone()).or_default() += start.elapsed();
                }
            }
            Event::Close { name } => {
                self.durations.remove(name);
                self.started.remove(name);
            }
            _ => {}
        }
    }
}

/// Formats a duration in coarse human buckets.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h{}m", minutes % 60);
    }
    format!("{}d{}h", hours / 24, hours % 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str) -> Event {
        Event::ActiveStart {
            name: name.to_string(),
        }
    }

    fn stop(name: &str) -> Event {
        Event::ActiveStop {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_accrual_on_start_stop() {
        let mut stats = Statistics::new();
        stats.notify(&start("a.txt"));
        stats.notify(&stop("a.txt"));
        // The interval existed, however short.
        assert!(stats.durations.contains_key("a.txt"));
        assert!(stats.duration("a.txt") < Duration::from_secs(1));
    }

    #[test]
    fn test_live_interval_counts() {
        let mut stats = Statistics::new();
        stats.notify(&start("a.txt"));
        // Not stopped yet; duration still readable.
        let d = stats.duration("a.txt");
        assert!(d <= stats.duration("a.txt"));
    }

    #[test]
    fn test_stop_without_start_ignored() {
        let mut stats = Statistics::new();
        stats.notify(&stop("a.txt"));
        assert_eq!(stats.duration("a.txt"), Duration::ZERO);
    }

    #[test]
    fn test_close_clears_accrual() {
        let mut stats = Statistics::new();
        stats.notify(&start("a.txt"));
        stats.notify(&stop("a.txt"));
        stats.notify(&Event::Close {
            name: "a.txt".to_string(),
        });
        assert_eq!(stats.duration("a.txt"), Duration::ZERO);
    }

    #[test]
    fn test_format_duration_buckets() {
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_secs(185)), "3m");
        assert_eq!(format_duration(Duration::from_secs(2 * 3600 + 600)), "2h10m");
        assert_eq!(format_duration(Duration::from_secs(26 * 3600)), "1d2h");
    }
}
