//! The BSON UTC datetime: a signed count of milliseconds since the Unix epoch.

use std::{
    fmt,
    time::{Duration, SystemTime},
};

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::error::{Error, Result};

/// A BSON UTC datetime, stored on the wire as an `int64` of milliseconds since the Unix epoch.
///
/// Every `i64` is a valid value. Only the part of that range the [`time`] crate can represent
/// converts to and from RFC 3339 text.
///
/// ```
/// let dt = rawbson::DateTime::parse_rfc3339_str("1998-02-12T00:01:00.023Z")?;
/// assert_eq!(dt.timestamp_millis(), 887_241_660_023);
/// assert_eq!(dt.try_to_rfc3339_string()?, "1998-02-12T00:01:00.023Z");
/// # Ok::<(), rawbson::error::Error>(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone, Default)]
pub struct DateTime(i64);

impl DateTime {
    /// `i64::MAX` milliseconds after the epoch.
    pub const MAX: Self = Self(i64::MAX);

    /// `i64::MIN` milliseconds after the epoch.
    pub const MIN: Self = Self(i64::MIN);

    /// The Unix epoch.
    pub const UNIX_EPOCH: Self = Self(0);

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// The current time, truncated to milliseconds.
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Converts a [`SystemTime`], saturating at [`DateTime::MIN`] and [`DateTime::MAX`].
    pub fn from_system_time(st: SystemTime) -> Self {
        let clamp = |millis: u128| i64::try_from(millis).unwrap_or(i64::MAX);
        match st.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(after) => Self(clamp(after.as_millis())),
            Err(before) => Self(clamp(before.duration().as_millis()).saturating_neg()),
        }
    }

    pub fn to_system_time(self) -> SystemTime {
        let offset = Duration::from_millis(self.0.unsigned_abs());
        if self.0 >= 0 {
            SystemTime::UNIX_EPOCH + offset
        } else {
            SystemTime::UNIX_EPOCH - offset
        }
    }

    pub const fn timestamp_millis(self) -> i64 {
        self.0
    }

    pub(crate) fn to_time_opt(self) -> Option<OffsetDateTime> {
        OffsetDateTime::UNIX_EPOCH.checked_add(time::Duration::milliseconds(self.0))
    }

    /// Formats as RFC 3339 in UTC, e.g. `2014-11-28T12:00:09.123Z`.
    pub fn try_to_rfc3339_string(self) -> Result<String> {
        let dt = self
            .to_time_opt()
            .ok_or_else(|| Error::datetime(format!("{} is out of range for RFC 3339", self.0)))?;
        dt.format(&Rfc3339).map_err(Error::datetime)
    }

    /// Parses RFC 3339 text. Sub-millisecond digits are dropped.
    pub fn parse_rfc3339_str(s: impl AsRef<str>) -> Result<Self> {
        let dt = OffsetDateTime::parse(s.as_ref(), &Rfc3339).map_err(Error::datetime)?;
        let millis = dt.unix_timestamp_nanos() / 1_000_000;
        // time's range is far inside i64 milliseconds
        Ok(Self(millis as i64))
    }
}

impl fmt::Debug for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_time_opt() {
            Some(dt) => f.debug_tuple("DateTime").field(&dt).finish(),
            None => f.debug_tuple("DateTime").field(&self.0).finish(),
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_time_opt() {
            Some(dt) => fmt::Display::fmt(&dt, f),
            None => fmt::Display::fmt(&self.0, f),
        }
    }
}

impl From<SystemTime> for DateTime {
    fn from(st: SystemTime) -> Self {
        Self::from_system_time(st)
    }
}

impl From<DateTime> for SystemTime {
    fn from(dt: DateTime) -> Self {
        dt.to_system_time()
    }
}
