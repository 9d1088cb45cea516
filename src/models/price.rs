//! Daily price bars and the append-only series built from them

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

impl PricePoint {
    /// Bar where open/high/low/adj_close all equal `close`.
    pub fn flat(symbol: impl Into<String>, date: NaiveDate, close: f64, volume: u64) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            open: close,
            high: close,
            low: close,
            close,
            adj_close: close,
            volume,
        }
    }
}

/// Time-ordered bars for one symbol.
///
/// Dates are strictly increasing. Missing trading days are allowed; the
/// series never holds two bars for the same date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
        }
    }

    /// Build a series from an append log.
    ///
    /// Later entries for an already-seen date supersede earlier ones (bar
    /// corrections). Entries older than the current tail are dropped.
    pub fn from_log<I>(symbol: impl Into<String>, log: I) -> Self
    where
        I: IntoIterator<Item = PricePoint>,
    {
        let mut series = Self::new(symbol);
        for point in log {
            match series.points.last() {
                Some(last) if last.date == point.date => {
                    let idx = series.points.len() - 1;
                    series.points[idx] = point;
                }
                Some(last) if last.date > point.date => {}
                _ => series.points.push(point),
            }
        }
        series
    }

    /// Append a bar strictly after the current tail.
    ///
    /// Returns the rejected bar when its date is not after the last one.
    pub fn push(&mut self, point: PricePoint) -> Result<(), PricePoint> {
        if let Some(last) = self.points.last() {
            if point.date <= last.date {
                return Err(point);
            }
        }
        self.points.push(point);
        Ok(())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Index of the first bar dated on or after `date`; `len()` if none is.
    pub fn position_from(&self, date: NaiveDate) -> usize {
        self.points.partition_point(|p| p.date < date)
    }

    /// Closes of the prefix ending at `as_of` (inclusive).
    pub fn closes_until(&self, as_of: usize) -> Vec<f64> {
        self.points[..=as_of].iter().map(|p| p.close).collect()
    }

    /// Volumes of the prefix ending at `as_of` (inclusive).
    pub fn volumes_until(&self, as_of: usize) -> Vec<f64> {
        self.points[..=as_of].iter().map(|p| p.volume as f64).collect()
    }
}
