//! Customer-facing visibility evaluation.
//!
//! Visibility is a pure function of `(settings, now)`. Nothing is scheduled:
//! a `HiddenUntil` item simply evaluates as visible on the first read after
//! its reveal time.

use chrono::{DateTime, Datelike, Utc};

use crate::model::{VisibilitySettings, VisibilityWindow};

/// Whether an item with these settings is hidden from customers at `now`.
///
/// Absent settings mean always visible.
pub fn is_hidden(settings: Option<&VisibilitySettings>, now: DateTime<Utc>) -> bool {
    match settings {
        None | Some(VisibilitySettings::AlwaysVisible) => false,
        Some(VisibilitySettings::Hidden) => true,
        Some(VisibilitySettings::HiddenUntil { until }) => *until > now,
        Some(VisibilitySettings::Scheduled { windows }) => {
            !windows.iter().any(|window| window.contains(now))
        }
    }
}

/// The instant a `HiddenUntil` item becomes visible, if it is still pending.
pub fn next_reveal(
    settings: Option<&VisibilitySettings>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match settings {
        Some(VisibilitySettings::HiddenUntil { until }) if *until > now => Some(*until),
        _ => None,
    }
}

impl VisibilityWindow {
    /// Whether `now` falls inside this window.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        let day = now.weekday();
        let time = now.time();
        if self.start < self.end {
            self.days.contains(&day) && time >= self.start && time < self.end
        } else if time >= self.start {
            self.days.contains(&day)
        } else {
            // Tail of a window that opened the previous day.
            time < self.end && self.days.contains(&day.pred())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
