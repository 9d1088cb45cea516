use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    PriceMove,
    RsiExtreme,
    MacdCross(CrossDirection),
    VolumeSpike,
    SignalChange,
}

impl AlertKind {
    pub const ALL: [AlertKind; 6] = [
        AlertKind::PriceMove,
        AlertKind::RsiExtreme,
        AlertKind::MacdCross(CrossDirection::Up),
        AlertKind::MacdCross(CrossDirection::Down),
        AlertKind::VolumeSpike,
        AlertKind::SignalChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::PriceMove => "price-move",
            AlertKind::RsiExtreme => "rsi-extreme",
            AlertKind::MacdCross(CrossDirection::Up) => "macd-cross-up",
            AlertKind::MacdCross(CrossDirection::Down) => "macd-cross-down",
            AlertKind::VolumeSpike => "volume-spike",
            AlertKind::SignalChange => "signal-change",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "INFO" => Some(Severity::Info),
            "WARNING" => Some(Severity::Warning),
            "CRITICAL" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DedupKey {
    pub symbol: String,
    pub kind: AlertKind,
}

impl DedupKey {
    pub fn new(symbol: impl Into<String>, kind: AlertKind) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.symbol, self.kind)
    }
}

/// A candidate or delivered notification.
///
/// `date` is the bar the alert was derived from; `timestamp` is when the
/// candidate was raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub symbol: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(self.symbol.clone(), self.kind)
    }
}
