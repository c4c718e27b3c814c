//! Timestamps and ids for memory events
//!
//! Patch ordering compares `ts` strings, so every timestamp must share one
//! format: UTC, millisecond precision, `Z` suffix.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 6;

/// Strictly increasing millisecond clock
///
/// Two events stamped by the same clock never share a timestamp, even when
/// the wall clock stalls or steps backwards.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_millis: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next timestamp in epoch milliseconds
    pub fn now_millis(&self) -> i64 {
        let wall = Utc::now().timestamp_millis();
        let previous = self
            .last_millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
                Some(wall.max(prev + 1))
            })
            .unwrap_or(wall);
        wall.max(previous + 1)
    }

    /// Next event stamp: `(millis, ISO-8601 string)`
    pub fn stamp(&self) -> (i64, String) {
        let millis = self.now_millis();
        (millis, format_millis(millis))
    }
}

/// Format epoch milliseconds as `YYYY-MM-DDTHH:MM:SS.mmmZ`
pub fn format_millis(millis: i64) -> String {
    let dt = DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default();
    format_timestamp(dt)
}

pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `mem_<base36 millis>_<random base36>`
///
/// Unique by construction (time prefix plus random suffix); never checked
/// against existing ids.
pub fn generate_memory_id(millis: i64) -> String {
    let random = uuid::Uuid::new_v4().as_u128();
    let suffix: String = to_base36(random as u64 ^ (random >> 64) as u64)
        .chars()
        .rev()
        .take(ID_SUFFIX_LEN)
        .collect();
    format!("mem_{}_{}", to_base36(millis.max(0) as u64), suffix)
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
