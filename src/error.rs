//! Error taxonomy for the monitoring pipeline.

use chrono::NaiveDate;

/// Failures raised by a price data provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("rate limited by upstream for {symbol}")]
    RateLimited { symbol: String },

    #[error("upstream unavailable for {symbol}: {reason}")]
    Unavailable { symbol: String, reason: String },

    #[error("malformed upstream response for {symbol}: {reason}")]
    Malformed { symbol: String, reason: String },
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. } | ProviderError::Unavailable { .. }
        )
    }
}

/// Failures raised by a record store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("bar for {symbol} on {date} is older than the series tail {last}")]
    OrderingViolation {
        symbol: String,
        date: NaiveDate,
        last: NaiveDate,
    },

    #[error("record store error: {reason}")]
    Backend { reason: String },
}

impl StoreError {
    pub fn backend(reason: impl std::fmt::Display) -> Self {
        StoreError::Backend {
            reason: reason.to_string(),
        }
    }
}

/// Failure to hand an alert to a notification sink.
#[derive(Debug, Clone, thiserror::Error)]
#[error("delivery through {sink} failed: {reason}")]
pub struct DeliveryError {
    pub sink: String,
    pub reason: String,
}

impl DeliveryError {
    pub fn new(sink: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self {
            sink: sink.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("missing configuration value {key}")]
    Missing { key: String },

    #[error("invalid configuration value {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ConfigError::Invalid {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

/// Stage-level error used by the orchestrator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error("insufficient data for {symbol}: {reason}")]
    InsufficientData { symbol: String, reason: String },

    #[error("upstream rate limited for {symbol}")]
    UpstreamRateLimited { symbol: String },

    #[error("upstream unavailable for {symbol}: {reason}")]
    UpstreamUnavailable { symbol: String, reason: String },

    #[error(transparent)]
    InvalidConfiguration(#[from] ConfigError),

    #[error(transparent)]
    DeliveryFailure(#[from] DeliveryError),

    #[error("out-of-order bar for {symbol} on {date} (series ends {last})")]
    DataOrderingViolation {
        symbol: String,
        date: NaiveDate,
        last: NaiveDate,
    },

    #[error("store failure: {reason}")]
    Store { reason: String },
}

impl PipelineError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::UpstreamRateLimited { .. } | PipelineError::UpstreamUnavailable { .. }
        )
    }
}

impl From<ProviderError> for PipelineError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited { symbol } => PipelineError::UpstreamRateLimited { symbol },
            ProviderError::Unavailable { symbol, reason }
            | ProviderError::Malformed { symbol, reason } => {
                PipelineError::UpstreamUnavailable { symbol, reason }
            }
        }
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::OrderingViolation { symbol, date, last } => {
                PipelineError::DataOrderingViolation { symbol, date, last }
            }
            StoreError::Backend { reason } => PipelineError::Store { reason },
        }
    }
}
