//! Timestamp helpers.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! precision, so string order matches time order.

use chrono::{SecondsFormat, Utc};

/// The current time as a storable timestamp.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width() {
        let ts = now();
        assert_eq!(ts.len(), "2026-01-01T00:00:00.000000Z".len());
        assert!(ts.ends_with('Z'));
    }
}
