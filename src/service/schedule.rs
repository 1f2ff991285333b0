use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime, Offset, Timelike, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::{ServiceError, ServiceResult};
use crate::error::{Error, Result};

const SECONDS_PER_MINUTE: i32 = 60;

/// The time-of-day rule an appointment slot broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotViolation {
    #[error("past")]
    Past,
    #[error("outside business hours")]
    OutsideBusinessHours,
    #[error("not on a half-hour boundary")]
    NotOnHalfHour,
}

/// Bookable window, expressed in clinic-local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    offset: FixedOffset,
    opening_hour: u32,
    closing_hour: u32,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            opening_hour: 9,
            closing_hour: 17,
        }
    }
}

impl BusinessHours {
    pub fn new(utc_offset_minutes: i32, opening_hour: u32, closing_hour: u32) -> Result<Self> {
        let offset = utc_offset_minutes
            .checked_mul(SECONDS_PER_MINUTE)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                Error::Config(format!("utc offset of {utc_offset_minutes} minutes is out of range"))
            })?;

        if closing_hour > 24 || opening_hour >= closing_hour {
            return Err(Error::Config(format!(
                "business hours {opening_hour}..{closing_hour} are not a valid window"
            )));
        }

        Ok(Self {
            offset,
            opening_hour,
            closing_hour,
        })
    }

    /// Checks the time rules for `slot` in order: past, business hours,
    /// half-hour grid. Only the first violation is reported.
    pub fn check(&self, slot: DateTime<Utc>, now: DateTime<Utc>) -> std::result::Result<(), SlotViolation> {
        if slot <= now {
            return Err(SlotViolation::Past);
        }

        let local = slot.with_timezone(&self.offset);
        if local.hour() < self.opening_hour || local.hour() >= self.closing_hour {
            return Err(SlotViolation::OutsideBusinessHours);
        }

        if !matches!(local.minute(), 0 | 30) || local.second() != 0 || local.nanosecond() != 0 {
            return Err(SlotViolation::NotOnHalfHour);
        }

        Ok(())
    }

    /// Start and end (exclusive) of the clinic-local day containing `now`.
    /// `None` only when the day lies at the edge of the representable range.
    #[must_use]
    pub fn today_bounds(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let midnight = now
            .with_timezone(&self.offset)
            .date_naive()
            .and_time(NaiveTime::MIN);
        let start = self.to_utc(midnight)?;
        let end = start.checked_add_signed(Duration::days(1))?;
        Some((start, end))
    }

    /// Interprets a requested slot. Times without an offset are clinic-local.
    pub fn resolve(&self, slot: SlotTime) -> ServiceResult<DateTime<Utc>> {
        match slot {
            SlotTime::Zoned(dt) => Ok(dt.with_timezone(&Utc)),
            SlotTime::Local(naive) => self
                .to_utc(naive)
                .ok_or_else(|| ServiceError::invalid("slot is out of range")),
        }
    }

    fn to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        local
            .checked_sub_signed(Duration::seconds(i64::from(self.offset.local_minus_utc())))
            .map(|utc| utc.and_utc())
    }
}

/// A slot as sent by clients: RFC 3339 with an offset, or a bare local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SlotTime {
    Zoned(DateTime<FixedOffset>),
    Local(NaiveDateTime),
}

impl From<DateTime<Utc>> for SlotTime {
    fn from(dt: DateTime<Utc>) -> Self {
        SlotTime::Zoned(dt.fixed_offset())
    }
}
