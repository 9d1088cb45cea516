//! Shared data models spanning the pipeline stages.

pub mod alert;
pub mod indicators;
pub mod price;
pub mod signal;

pub use alert::{Alert, AlertKind, CrossDirection, DedupKey, Severity};
pub use indicators::{BollingerBands, IndicatorSnapshot, MacdIndicator};
pub use price::{PricePoint, PriceSeries};
pub use signal::{RiskLevel, Signal, Verdict};
