use chrono::{Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Weekday};
use chrono_tz::{America::New_York, Tz};
use std::collections::BTreeSet;
use vigil_ports::{Session, SourceError, SourceResult, TradingCalendar};

/// New York Stock Exchange calendar
///
/// Regular session 09:30-16:00 America/New_York, 13:00 close on the
/// customary half days.
#[derive(Debug, Clone, Default)]
pub struct NyseCalendar {
    /// Unscheduled full-day closures
    closures: BTreeSet<NaiveDate>,
}

impl NyseCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calendar with additional unscheduled closures
    pub fn with_closures(closures: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            closures: closures.into_iter().collect(),
        }
    }

    fn open_time() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN)
    }

    fn close_time(early: bool) -> NaiveTime {
        let hour = if early { 13 } else { 16 };
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Is `day` one of the exchange holidays?
    pub fn is_holiday(&self, day: NaiveDate) -> bool {
        if self.closures.contains(&day) {
            return true;
        }
        let year = day.year();
        let (month, dom) = (day.month(), day.day());

        // New Year's Day: Sunday moves to Monday, Saturday is not observed
        if (month == 1 && dom == 1 && !is_weekend(day))
            || (month == 1 && dom == 2 && day.weekday() == Weekday::Mon)
        {
            return true;
        }

        let floating = [
            (year >= 1998).then(|| nth_weekday(year, 1, Weekday::Mon, 3)).flatten(),
            nth_weekday(year, 2, Weekday::Mon, 3),
            easter_sunday(year).map(|easter| easter - Duration::days(2)),
            last_weekday(year, 5, Weekday::Mon),
            nth_weekday(year, 9, Weekday::Mon, 1),
            nth_weekday(year, 11, Weekday::Thu, 4),
        ];
        if floating.iter().flatten().any(|d| *d == day) {
            return true;
        }

        let mut fixed = vec![observed(year, 7, 4), observed(year, 12, 25)];
        if year >= 2022 {
            fixed.push(observed(year, 6, 19));
        }
        fixed.iter().flatten().any(|d| *d == day)
    }

    /// Half day with a 13:00 close?
    pub fn is_early_close(&self, day: NaiveDate) -> bool {
        if is_weekend(day) || self.is_holiday(day) {
            return false;
        }
        let year = day.year();
        let day_after_thanksgiving =
            nth_weekday(year, 11, Weekday::Thu, 4).map(|d| d + Duration::days(1));

        (day.month() == 7 && day.day() == 3)
            || (day.month() == 12 && day.day() == 24)
            || day_after_thanksgiving == Some(day)
    }

    fn localize(&self, day: NaiveDate, time: NaiveTime) -> SourceResult<chrono::DateTime<Tz>> {
        match New_York.from_local_datetime(&day.and_time(time)) {
            LocalResult::Single(dt) => Ok(dt),
            LocalResult::Ambiguous(first, _) => Ok(first),
            LocalResult::None => Err(SourceError::Calendar(format!(
                "{} {} does not exist in {}",
                day,
                time,
                New_York.name()
            ))),
        }
    }
}

impl TradingCalendar for NyseCalendar {
    fn timezone(&self) -> Tz {
        New_York
    }

    fn is_trading_day(&self, day: NaiveDate) -> SourceResult<bool> {
        Ok(!is_weekend(day) && !self.is_holiday(day))
    }

    fn session_open_close(&self, day: NaiveDate) -> SourceResult<Option<Session>> {
        if !self.is_trading_day(day)? {
            return Ok(None);
        }
        let open = self.localize(day, Self::open_time())?;
        let close = self.localize(day, Self::close_time(self.is_early_close(day)))?;
        Ok(Some(Session { open, close }))
    }
}

fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    nth_weekday(year, month, weekday, 5).or_else(|| nth_weekday(year, month, weekday, 4))
}

/// Fixed-date holiday moved to Friday/Monday when it lands on a weekend
fn observed(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    })
}

/// Gregorian Easter Sunday (anonymous computus)
fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}
