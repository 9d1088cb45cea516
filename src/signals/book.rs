//! Keyed, date-ordered history per symbol.
//!
//! Crossover detection and signal-change alerts compare a value with the one
//! computed for the bar before it. When several bars arrive at once every one
//! of them is evaluated in order, so the books keep a short history rather
//! than a single pair.

use crate::models::alert::Alert;
use crate::models::indicators::IndicatorSnapshot;
use crate::signals::engine::Evaluation;
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for IndicatorSnapshot {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for Evaluation {
    fn date(&self) -> NaiveDate {
        self.signal.date
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatedPair<T> {
    pub previous: Option<T>,
    pub latest: T,
}

pub struct DatedBook<T> {
    capacity: usize,
    entries: RwLock<HashMap<String, VecDeque<T>>>,
}

pub type SnapshotBook = DatedBook<IndicatorSnapshot>;
pub type DecisionBook = DatedBook<Evaluation>;

impl<T: Dated + Clone> DatedBook<T> {
    /// A book keeping the latest value and the one before it.
    pub fn new() -> Self {
        Self::with_capacity(2)
    }

    /// A book keeping up to `capacity` values per symbol (at least two).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(2),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<DatedPair<T>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let history = entries.get(symbol)?;
        let mut newest = history.iter().rev();
        let latest = newest.next()?.clone();
        Some(DatedPair {
            previous: newest.next().cloned(),
            latest,
        })
    }

    pub fn latest(&self, symbol: &str) -> Option<T> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(symbol)?.back().cloned()
    }

    /// The most recent value dated strictly before `date`.
    pub fn previous_for(&self, symbol: &str, date: NaiveDate) -> Option<T> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(symbol)?
            .iter()
            .rev()
            .find(|value| value.date() < date)
            .cloned()
    }

    /// Values dated on or after `date`, oldest first.
    pub fn since(&self, symbol: &str, date: NaiveDate) -> Vec<T> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(symbol)
            .map(|history| {
                history
                    .iter()
                    .filter(|value| value.date() >= date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Record a value.
    ///
    /// A value for the latest date replaces it in place; a newer value is
    /// appended, evicting the oldest beyond capacity. Values older than the
    /// latest are refused.
    pub fn insert(&self, symbol: &str, value: T) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let history = entries.entry(symbol.to_string()).or_default();
        match history.back().map(Dated::date) {
            Some(date) if date > value.date() => false,
            Some(date) if date == value.date() => {
                if let Some(latest) = history.back_mut() {
                    *latest = value;
                }
                true
            }
            _ => {
                history.push_back(value);
                while history.len() > self.capacity {
                    history.pop_front();
                }
                true
            }
        }
    }
}

impl<T: Dated + Clone> Default for DatedBook<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Candidate alerts from bars that were decided while a newer bar arrived in
/// the same run. They are offered to the sink once, ahead of the latest
/// evaluation's candidates.
#[derive(Default)]
pub struct AlertBacklog {
    entries: RwLock<HashMap<String, Vec<Alert>>>,
}

impl AlertBacklog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, symbol: &str, alerts: impl IntoIterator<Item = Alert>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.entry(symbol.to_string()).or_default().extend(alerts);
    }

    /// Remove and return every queued alert for the symbol.
    pub fn take(&self, symbol: &str) -> Vec<Alert> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(symbol).unwrap_or_default()
    }
}
