//! # Record: Verification Freshness Log
//!
//! The persisted record of verification runs. Its JSON layout is shared with
//! other tools and must stay exactly:
//!
//! ```json
//! {
//!   "lastVerified": "2026-10-17T09:30:00.000Z",
//!   "nextVerificationDue": "2026-10-24T09:30:00.000Z",
//!   "changelog": [
//!     { "date": "2026-10-17", "action": "verified", "note": "All 62 checks passed" }
//!   ]
//! }
//! ```
//!
//! Timestamps are UTC with millisecond precision and a `Z` suffix. The
//! changelog is kept newest first and never holds more than
//! [`CHANGELOG_LIMIT`] entries.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Maximum changelog length.
pub const CHANGELOG_LIMIT: usize = 10;

/// Days between a verification and the next one falling due.
pub const VERIFICATION_INTERVAL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Verified,
    Failed,
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeAction::Verified => write!(f, "verified"),
            ChangeAction::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub date: NaiveDate,
    pub action: ChangeAction,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    #[serde(
        default,
        with = "iso_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_verified: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "iso_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_verification_due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub changelog: Vec<ChangelogEntry>,
}

impl VerificationRecord {
    /// Log a finished run: prepend the entry, advance both timestamps and
    /// cap the changelog. Timestamps advance for failed runs too.
    pub fn with_run(mut self, now: DateTime<Utc>, action: ChangeAction, note: String) -> Self {
        self.changelog.insert(
            0,
            ChangelogEntry {
                date: now.date_naive(),
                action,
                note,
            },
        );
        // Entries written oldest-last by other tools end up newest first.
        self.changelog.sort_by(|a, b| b.date.cmp(&a.date));
        self.changelog.truncate(CHANGELOG_LIMIT);
        self.last_verified = Some(now);
        self.next_verification_due = Some(now + Duration::days(VERIFICATION_INTERVAL_DAYS));
        self
    }

    /// Never verified, or the next due time has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_verification_due {
            Some(due) => now >= due,
            None => true,
        }
    }

    pub fn latest(&self) -> Option<&ChangelogEntry> {
        self.changelog.first()
    }
}

/// Format a timestamp the way the record stores it.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Serde adapter for `Option<DateTime<Utc>>` as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&super::format_timestamp(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 9, 30, 0).unwrap()
    }

    #[test]
    fn run_advances_timestamps_by_a_week() {
        let rec = VerificationRecord::default().with_run(at(1), ChangeAction::Verified, "ok".into());
        assert_eq!(rec.last_verified, Some(at(1)));
        assert_eq!(rec.next_verification_due, Some(at(8)));
        assert_eq!(rec.changelog.len(), 1);
        assert_eq!(rec.latest().unwrap().date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[test]
    fn failed_run_still_advances_timestamps() {
        let rec = VerificationRecord::default().with_run(at(2), ChangeAction::Failed, "bad".into());
        assert_eq!(rec.last_verified, Some(at(2)));
        assert_eq!(rec.latest().unwrap().action, ChangeAction::Failed);
    }

    #[test]
    fn changelog_is_newest_first_and_capped() {
        let mut rec = VerificationRecord::default();
        for day in 1..=15 {
            rec = rec.with_run(at(day), ChangeAction::Verified, format!("run {}", day));
        }
        assert_eq!(rec.changelog.len(), CHANGELOG_LIMIT);
        assert_eq!(rec.changelog[0].note, "run 15");
        assert_eq!(rec.changelog[9].note, "run 6");
    }

    #[test]
    fn oldest_first_changelog_is_reordered() {
        let json = r#"{
            "lastVerified": "2026-03-02T09:30:00.000Z",
            "nextVerificationDue": "2026-03-09T09:30:00.000Z",
            "changelog": [
                {"date": "2026-03-01", "action": "verified", "note": "first"},
                {"date": "2026-03-02", "action": "failed", "note": "second"}
            ]
        }"#;
        let rec: VerificationRecord = serde_json::from_str(json).unwrap();
        let rec = rec.with_run(at(3), ChangeAction::Verified, "third".into());
        let notes: Vec<&str> = rec.changelog.iter().map(|e| e.note.as_str()).collect();
        assert_eq!(notes, vec!["third", "second", "first"]);
    }

    #[test]
    fn serializes_with_millisecond_z_timestamps() {
        let rec = VerificationRecord::default().with_run(at(1), ChangeAction::Verified, "ok".into());
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["lastVerified"], "2026-03-01T09:30:00.000Z");
        assert_eq!(json["nextVerificationDue"], "2026-03-08T09:30:00.000Z");
        assert_eq!(json["changelog"][0]["date"], "2026-03-01");
        assert_eq!(json["changelog"][0]["action"], "verified");
    }

    #[test]
    fn accepts_offset_timestamps() {
        let json = r#"{"lastVerified": "2026-03-01T11:30:00+02:00", "changelog": []}"#;
        let rec: VerificationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.last_verified, Some(at(1)));
        assert!(rec.next_verification_due.is_none());
    }

    #[test]
    fn due_when_never_verified_or_past_due() {
        assert!(VerificationRecord::default().is_due(at(1)));
        let rec = VerificationRecord::default().with_run(at(1), ChangeAction::Verified, "ok".into());
        assert!(!rec.is_due(at(7)));
        assert!(rec.is_due(at(8)));
    }
}
