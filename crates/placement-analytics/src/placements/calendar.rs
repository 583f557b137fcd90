use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime,
    Offset, TimeZone, Utc,
};

pub const DAY_MS: i64 = 86_400_000;

/// Fixed-offset calendar used for every day, week, and month bucket.
///
/// Bucketing never consults the process-local timezone; callers pick an
/// offset (UTC by default) and every report built with it is reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingCalendar {
    offset: FixedOffset,
}

impl Default for ReportingCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl ReportingCalendar {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Returns `None` for offsets outside +/- 24h.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        let seconds = minutes.checked_mul(60)?;
        FixedOffset::east_opt(seconds).map(|offset| Self { offset })
    }

    pub fn offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    pub fn local_date_from_millis(&self, millis: i64) -> Option<NaiveDate> {
        DateTime::from_timestamp_millis(millis).map(|instant| self.local_date(instant))
    }

    /// Interprets a wall-clock time in this calendar.
    pub fn to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        let shift = Duration::seconds(i64::from(self.offset.local_minus_utc()));
        local
            .checked_sub_signed(shift)
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.to_utc(date.and_time(NaiveTime::MIN))
    }

    pub fn start_of_day_millis(&self, date: NaiveDate) -> i64 {
        self.start_of_day(date)
            .map_or(0, |instant| instant.timestamp_millis())
    }

    /// Monday of the week containing `date`.
    pub fn week_start(date: NaiveDate) -> NaiveDate {
        let offset = i64::from(date.weekday().num_days_from_monday());
        date.checked_sub_signed(Duration::days(offset))
            .unwrap_or(date)
    }

    pub fn month_start(date: NaiveDate) -> NaiveDate {
        date.with_day(1).unwrap_or(date)
    }

    /// First days of the `count` calendar months ending with the month of
    /// `today`, oldest first.
    pub fn trailing_months(today: NaiveDate, count: u32) -> Vec<NaiveDate> {
        let current = Self::month_start(today);
        (0..count)
            .rev()
            .filter_map(|back| current.checked_sub_months(Months::new(back)))
            .collect()
    }
}
