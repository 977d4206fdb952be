//! Per-sender 24h cooldown kept in a [`KeyValueStore`].
//!
//! Records are written as `last_sent_<email>` → epoch millis of the last
//! delivered message.

use crate::storage::{KeyValueStore, StorageError};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;

const MS_PER_MINUTE: i64 = 60 * 1000;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const COOLDOWN_MS: i64 = 24 * MS_PER_HOUR;

/// Time left before a sender may submit again, floored to whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub hours: i64,
    pub minutes: i64,
}

impl Remaining {
    pub fn from_millis(ms: i64) -> Self {
        let ms = ms.max(0);
        Self {
            hours: ms / MS_PER_HOUR,
            minutes: (ms % MS_PER_HOUR) / MS_PER_MINUTE,
        }
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hour{} and {} minute{}",
            self.hours,
            plural(self.hours),
            self.minutes,
            plural(self.minutes)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    Allowed,
    Blocked(Remaining),
}

pub fn cooldown_key(email: &str) -> String {
    format!("last_sent_{}", email)
}

/// Last recorded send for `email`. Unreadable or corrupt records count as absent.
pub fn last_sent<S: KeyValueStore>(store: &S, email: &str) -> Option<DateTime<Utc>> {
    let raw = match store.get(&cooldown_key(email)) {
        Ok(v) => v?,
        Err(e) => {
            log::warn!("cooldown lookup for {} failed: {}", email, e);
            return None;
        }
    };
    let parsed = raw
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single());
    if parsed.is_none() {
        log::warn!("ignoring corrupt cooldown record for {}: {:?}", email, raw);
    }
    parsed
}

pub fn check_cooldown<S: KeyValueStore>(
    store: &S,
    email: &str,
    now: DateTime<Utc>,
) -> CooldownStatus {
    let Some(last) = last_sent(store, email) else {
        return CooldownStatus::Allowed;
    };
    // A record from the future (clock moved back) blocks until last + 24h.
    let elapsed = (now - last).num_milliseconds();
    if elapsed >= COOLDOWN_MS {
        CooldownStatus::Allowed
    } else {
        CooldownStatus::Blocked(Remaining::from_millis(COOLDOWN_MS - elapsed))
    }
}

pub fn record_send<S: KeyValueStore>(
    store: &S,
    email: &str,
    now: DateTime<Utc>,
) -> Result<(), StorageError> {
    store.set(&cooldown_key(email), &now.timestamp_millis().to_string())
}
