//! Cached halp version stamp
//!
//! Stored in the tool section as `"<semver>::<RFC3339 timestamp>"`.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use semver::Version;
use std::fmt;

/// Value written when the tool section has no stamp yet
pub const DEFAULT_STAMP: &str = "v0.0.0::0001-01-01T00:00:00Z";

/// Hours between version checks
pub const CHECK_INTERVAL_HOURS: i64 = 2;

const STAMP_SEPARATOR: &str = "::";

/// Last recorded running version and when it was recorded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionStamp {
    /// Recorded version
    pub version: Option<Version>,
    /// When it was recorded
    pub checked_at: Option<DateTime<Utc>>,
}

impl VersionStamp {
    /// Stamp for `version` recorded at `checked_at`
    #[must_use]
    pub fn new(version: Version, checked_at: DateTime<Utc>) -> Self {
        Self {
            version: Some(version),
            checked_at: Some(checked_at),
        }
    }

    /// Parse a stored stamp; the empty string is an empty stamp
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Ok(Self::default());
        }

        let parts: Vec<&str> = raw.split(STAMP_SEPARATOR).collect();
        if parts.len() != 2 {
            return Err(Error::VersionStamp(raw.to_string()));
        }

        let checked_at = DateTime::parse_from_rfc3339(parts[1].trim())
            .map_err(|e| Error::VersionStamp(format!("{}: {}", raw, e)))?
            .with_timezone(&Utc);

        let version_text = parts[0].trim();
        let version = Version::parse(version_text.strip_prefix('v').unwrap_or(version_text))
            .map_err(|e| Error::VersionStamp(format!("{}: {}", raw, e)))?;

        Ok(Self::new(version, checked_at))
    }

    /// When the next check is due
    #[must_use]
    pub fn next_check(&self) -> Option<DateTime<Utc>> {
        self.checked_at
            .and_then(|at| at.checked_add_signed(Duration::hours(CHECK_INTERVAL_HOURS)))
    }

    /// Whether the stamp is older than the check interval
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.next_check() {
            Some(next) => next <= now,
            None => true,
        }
    }
}

impl fmt::Display for VersionStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.version, &self.checked_at) {
            (Some(version), Some(at)) => write!(
                f,
                "{}{}{}",
                version,
                STAMP_SEPARATOR,
                at.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_default_stamp() {
        let stamp = VersionStamp::parse(DEFAULT_STAMP).unwrap();
        assert_eq!(stamp.version, Some(Version::new(0, 0, 0)));
        assert_eq!(
            stamp.checked_at.unwrap().to_rfc3339_opts(SecondsFormat::Secs, true),
            "0001-01-01T00:00:00Z"
        );
        assert!(stamp.is_stale(Utc::now()));
    }

    #[test]
    fn test_parse_empty() {
        let stamp = VersionStamp::parse("").unwrap();
        assert_eq!(stamp, VersionStamp::default());
        assert!(stamp.is_stale(Utc::now()));
        assert_eq!(stamp.to_string(), "");
    }

    #[test]
    fn test_parse_with_offset() {
        let stamp = VersionStamp::parse("1.0.0+dev::2024-03-01T10:00:00+02:00").unwrap();
        assert_eq!(stamp.version.unwrap().to_string(), "1.0.0+dev");
        assert_eq!(
            stamp.checked_at.unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            VersionStamp::parse("1.0.0"),
            Err(Error::VersionStamp(_))
        ));
        assert!(VersionStamp::parse("1.0.0::yesterday").is_err());
        assert!(VersionStamp::parse("one::2024-03-01T10:00:00Z").is_err());
    }

    #[test]
    fn test_display_parse() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let stamp = VersionStamp::new(Version::new(1, 2, 3), at);

        assert_eq!(stamp.to_string(), "1.2.3::2024-03-01T08:00:00Z");
        assert_eq!(VersionStamp::parse(&stamp.to_string()).unwrap(), stamp);
    }

    #[test]
    fn test_staleness_window() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let stamp = VersionStamp::new(Version::new(1, 0, 0), at);

        assert!(!stamp.is_stale(at + Duration::minutes(119)));
        assert!(stamp.is_stale(at + Duration::hours(2)));
    }
}
