// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current time as epoch seconds.
pub fn now_epoch_secs() -> i64 {
    Utc::now().timestamp()
}

/// Format an epoch-seconds expiry as RFC3339 using a `Z` suffix.
///
/// Out-of-range values render as `"invalid"`.
pub fn format_epoch_rfc3339(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|date| date.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "invalid".to_string())
}
