// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::Duration;
use chrono::NaiveDateTime;
use chrono::SubsecRound;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::types::date::Date;

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// A local timestamp without a timezone and millisecond precision.
///
/// Every operation in the core takes the current time as a `Timestamp`
/// argument, so tests can pin the clock.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn new(ndt: NaiveDateTime) -> Self {
        Self(ndt.trunc_subsecs(3))
    }

    /// Converts a timestamp into a `NaiveDateTime`.
    pub fn into_inner(self) -> NaiveDateTime {
        self.0
    }

    /// The current timestamp in the user's local time.
    #[cfg(feature = "clock")]
    pub fn now() -> Self {
        Self(chrono::Local::now().naive_local().trunc_subsecs(3))
    }

    /// The calendar date of this timestamp.
    pub fn date(self) -> Date {
        Date::new(self.0.date())
    }

    /// This timestamp moved forward by a whole number of days. Saturates at
    /// the latest representable timestamp.
    pub fn plus_days(self, days: u32) -> Self {
        match self.0.checked_add_signed(Duration::days(i64::from(days))) {
            Some(ndt) => Self(ndt),
            None => Self(NaiveDateTime::MAX.trunc_subsecs(3)),
        }
    }

    /// Whole days elapsed from `earlier` to `self`, rounded toward zero.
    pub fn days_since(self, earlier: Timestamp) -> i64 {
        (self.0 - earlier.0).num_days()
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl TryFrom<String> for Timestamp {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let ndt = NaiveDateTime::parse_from_str(&value, FORMAT)
            .map_err(|_| ErrorReport::new(format!("Failed to parse timestamp: '{value}'.")))?;
        Ok(Timestamp(ndt))
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> String {
        ts.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::error::Fallible;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    #[test]
    fn test_timestamp_to_string() {
        assert_eq!(
            ts("2023-10-05T14:30:15.123").to_string(),
            "2023-10-05T14:30:15.123"
        );
    }

    #[test]
    fn test_new_truncates_to_millis() {
        let ndt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_nano_opt(8, 0, 0, 123_456_789)
            .unwrap();
        assert_eq!(Timestamp::new(ndt).to_string(), "2024-03-01T08:00:00.123");
    }

    #[test]
    fn test_plus_days_keeps_time_of_day() {
        let start = ts("2024-02-27T21:15:00.500");
        assert_eq!(start.plus_days(0), start);
        assert_eq!(start.plus_days(3).to_string(), "2024-03-01T21:15:00.500");
        assert_eq!(start.plus_days(3).days_since(start), 3);
    }

    #[test]
    fn test_plus_days_saturates() {
        let start = ts("2024-02-27T21:15:00.500");
        let far = start.plus_days(u32::MAX);
        assert!(far > start);
        assert_eq!(far.plus_days(1), far);
    }

    #[test]
    fn test_ordering() {
        assert!(ts("2024-01-01T00:00:00.000") < ts("2024-01-01T00:00:00.001"));
        assert!(ts("2024-01-02T00:00:00.000") > ts("2024-01-01T23:59:59.999"));
    }

    #[test]
    fn test_date() {
        let date = ts("2024-01-02T23:59:59.999").date();
        assert_eq!(date.to_string(), "2024-01-02");
    }

    #[test]
    fn test_serde_roundtrip() -> Fallible<()> {
        let original = ts("2023-10-05T14:30:15.123");
        let serialized = serde_json::to_string(&original)?;
        assert_eq!(serialized, "\"2023-10-05T14:30:15.123\"");
        let parsed: Timestamp = serde_json::from_str(&serialized)?;
        assert_eq!(parsed, original);
        Ok(())
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Timestamp::try_from("yesterday".to_string()).is_err());
    }
}
