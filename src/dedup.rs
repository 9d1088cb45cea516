//! Cooldown-based alert deduplication.
//!
//! At most one alert per `(symbol, kind)` is delivered within that kind's
//! cooldown. The clock for a key only advances after a successful delivery,
//! so a failed delivery leaves the candidate eligible on the next run.

use crate::models::alert::{Alert, AlertKind, DedupKey};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldowns {
    pub price_move: Duration,
    pub rsi_extreme: Duration,
    pub macd_cross: Duration,
    pub volume_spike: Duration,
    pub signal_change: Duration,
}

impl Default for Cooldowns {
    fn default() -> Self {
        const HOUR: u64 = 60 * 60;
        Self {
            price_move: Duration::from_secs(HOUR),
            rsi_extreme: Duration::from_secs(4 * HOUR),
            macd_cross: Duration::from_secs(24 * HOUR),
            volume_spike: Duration::from_secs(4 * HOUR),
            signal_change: Duration::from_secs(24 * HOUR),
        }
    }
}

impl Cooldowns {
    pub fn for_kind(&self, kind: AlertKind) -> Duration {
        match kind {
            AlertKind::PriceMove => self.price_move,
            AlertKind::RsiExtreme => self.rsi_extreme,
            AlertKind::MacdCross(_) => self.macd_cross,
            AlertKind::VolumeSpike => self.volume_spike,
            AlertKind::SignalChange => self.signal_change,
        }
    }

    /// Same cooldown for every kind.
    pub fn uniform(cooldown: Duration) -> Self {
        Self {
            price_move: cooldown,
            rsi_extreme: cooldown,
            macd_cross: cooldown,
            volume_spike: cooldown,
            signal_change: cooldown,
        }
    }
}

#[derive(Debug, Default)]
struct KeyState {
    last_fired: Option<DateTime<Utc>>,
    reserved: bool,
}

pub struct AlertDeduplicator {
    cooldowns: Cooldowns,
    state: Mutex<HashMap<DedupKey, KeyState>>,
}

impl AlertDeduplicator {
    pub fn new(cooldowns: Cooldowns) -> Self {
        Self {
            cooldowns,
            state: Mutex::new(HashMap::new()),
        }
    }

    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    fn elapsed(&self, kind: AlertKind, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(last) = last else {
            return true;
        };
        let cooldown = chrono::Duration::from_std(self.cooldowns.for_kind(kind))
            .unwrap_or_else(|_| chrono::Duration::weeks(52 * 100));
        now.signed_duration_since(last) >= cooldown
    }

    /// Whether the alert's key is outside its cooldown and not being delivered.
    pub fn should_fire(&self, alert: &Alert, now: DateTime<Utc>) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.get(&alert.dedup_key()) {
            Some(entry) => !entry.reserved && self.elapsed(alert.kind, entry.last_fired, now),
            None => true,
        }
    }

    /// Mark the alert's key as fired at `now`.
    pub fn record_fired(&self, alert: &Alert, now: DateTime<Utc>) {
        self.mark(&alert.dedup_key(), now);
    }

    fn mark(&self, key: &DedupKey, at: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let entry = state.entry(key.clone()).or_default();
        entry.last_fired = Some(at);
        entry.reserved = false;
    }

    /// Check eligibility and claim the key in one step.
    ///
    /// While the reservation lives, other callers see the key as ineligible.
    /// Commit it after a successful delivery; dropping it releases the key
    /// without touching its cooldown clock.
    pub fn try_reserve(&self, alert: &Alert, now: DateTime<Utc>) -> Option<Reservation<'_>> {
        let key = alert.dedup_key();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let entry = state.entry(key.clone()).or_default();
        if entry.reserved || !self.elapsed(alert.kind, entry.last_fired, now) {
            debug!(key = %key, "alert suppressed by cooldown");
            return None;
        }
        entry.reserved = true;
        Some(Reservation {
            dedup: self,
            key,
            committed: false,
        })
    }

    fn release(&self, key: &DedupKey) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = state.get_mut(key) {
            entry.reserved = false;
        }
    }

    pub fn last_fired(&self, key: &DedupKey) -> Option<DateTime<Utc>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.get(key).and_then(|entry| entry.last_fired)
    }

    /// Seed a key from persisted history, keeping the later of the two instants.
    pub fn restore(&self, key: DedupKey, fired_at: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let entry = state.entry(key).or_default();
        if entry.last_fired.map_or(true, |existing| existing < fired_at) {
            entry.last_fired = Some(fired_at);
        }
    }
}

/// A claimed dedup key awaiting the outcome of a delivery.
pub struct Reservation<'a> {
    dedup: &'a AlertDeduplicator,
    key: DedupKey,
    committed: bool,
}

impl Reservation<'_> {
    pub fn key(&self) -> &DedupKey {
        &self.key
    }

    /// Delivery succeeded: start the cooldown at `fired_at`.
    pub fn commit(mut self, fired_at: DateTime<Utc>) {
        self.dedup.mark(&self.key, fired_at);
        self.committed = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.dedup.release(&self.key);
        }
    }
}
