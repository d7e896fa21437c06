//! Daily bar series
//!
//! Bars are kept sorted by date with at most one bar per date. Every
//! constructor and mutator restores that invariant before returning, so
//! strategies can treat `bars()` as a strictly ascending slice.

use super::Bar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from unordered bars. When a date repeats, the bar that
    /// appears last in the input wins.
    pub fn from_bars(mut bars: Vec<Bar>) -> Self {
        // Stable sort keeps input order among equal dates
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self { bars: deduped }
    }

    /// Insert a bar, replacing the existing bar for the same date.
    ///
    /// Returns `true` if an existing row was replaced.
    pub fn upsert(&mut self, bar: Bar) -> bool {
        match self.bars.binary_search_by_key(&bar.date, |b| b.date) {
            Ok(idx) => {
                self.bars[idx] = bar;
                true
            }
            Err(idx) => {
                self.bars.insert(idx, bar);
                false
            }
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&Bar> {
        self.bars
            .binary_search_by_key(&date, |b| b.date)
            .ok()
            .map(|idx| &self.bars[idx])
    }

    /// The most recent bar dated strictly before `date`
    pub fn last_before(&self, date: NaiveDate) -> Option<&Bar> {
        let idx = self.bars.partition_point(|b| b.date < date);
        idx.checked_sub(1).map(|i| &self.bars[i])
    }

    /// Copy of the series without any bar dated on or after `date`
    pub fn before(&self, date: NaiveDate) -> Series {
        let idx = self.bars.partition_point(|b| b.date < date);
        Series {
            bars: self.bars[..idx].to_vec(),
        }
    }
}

impl From<Vec<Bar>> for Series {
    fn from(bars: Vec<Bar>) -> Self {
        Series::from_bars(bars)
    }
}

impl From<Series> for Vec<Bar> {
    fn from(series: Series) -> Self {
        series.bars
    }
}
