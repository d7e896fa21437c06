use crate::error::SourceResult;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use vigil_core::Timestamp;

/// Regular session bounds for one trading day, in the market timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub open: DateTime<Tz>,
    pub close: DateTime<Tz>,
}

impl Session {
    pub fn contains(&self, at: &DateTime<Tz>) -> bool {
        self.open <= *at && *at <= self.close
    }
}

/// Port for the exchange trading calendar
pub trait TradingCalendar: Send + Sync {
    /// Timezone trading days are expressed in
    fn timezone(&self) -> Tz;

    /// Is the exchange open at all on `day`?
    fn is_trading_day(&self, day: NaiveDate) -> SourceResult<bool>;

    /// Session bounds for `day`, `None` if it is not a trading day
    fn session_open_close(&self, day: NaiveDate) -> SourceResult<Option<Session>>;

    /// Is `candidate` the first trading day after `prev`?
    fn is_immediate_next_trading_day(
        &self,
        prev: NaiveDate,
        candidate: NaiveDate,
    ) -> SourceResult<bool> {
        if candidate <= prev || !self.is_trading_day(candidate)? {
            return Ok(false);
        }
        let mut day = prev;
        while let Some(next) = day.succ_opt() {
            if next >= candidate {
                break;
            }
            if self.is_trading_day(next)? {
                return Ok(false);
            }
            day = next;
        }
        Ok(true)
    }

    /// Most recent trading day strictly before `day`
    fn previous_trading_day(&self, day: NaiveDate) -> SourceResult<Option<NaiveDate>> {
        let mut cursor = day;
        // A couple of weeks covers any run of weekends and holidays
        for _ in 0..14 {
            match cursor.pred_opt() {
                Some(prev) => cursor = prev,
                None => return Ok(None),
            }
            if self.is_trading_day(cursor)? {
                return Ok(Some(cursor));
            }
        }
        Ok(None)
    }

    /// Local calendar day of `now` in the market timezone
    fn local_day(&self, now: Timestamp) -> NaiveDate {
        now.with_timezone(&self.timezone()).date_naive()
    }

    /// Is the regular session open at `now`?
    fn is_open(&self, now: Timestamp) -> SourceResult<bool> {
        let local = now.with_timezone(&self.timezone());
        Ok(self
            .session_open_close(local.date_naive())?
            .is_some_and(|session| session.contains(&local)))
    }
}
