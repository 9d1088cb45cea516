//! Environment-driven configuration

pub mod thresholds;

pub use thresholds::SignalThresholds;

use crate::core::calendar::TradingCalendar;
use crate::core::scheduler::schedule_for_interval;
use crate::dedup::Cooldowns;
use crate::error::ConfigError;
use crate::indicators::IndicatorConfig;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn get_database_url() -> Option<String> {
    env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub symbols: Vec<String>,
    pub ingest_interval_seconds: u64,
    pub compute_interval_seconds: u64,
    pub evaluate_interval_seconds: u64,
    pub indicators: IndicatorConfig,
    pub thresholds: SignalThresholds,
    pub symbol_thresholds: HashMap<String, SignalThresholds>,
    pub cooldowns: Cooldowns,
    pub lookback_bars: usize,
    pub fetch_retry_attempts: usize,
    pub fetch_retry_delay: Duration,
    pub discord_webhook_url: Option<String>,
    pub discord_enabled: bool,
    pub database_url: Option<String>,
    pub dedup_restore: bool,
    pub skip_non_trading_days: bool,
    pub calendar: TradingCalendar,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            ingest_interval_seconds: 60,
            compute_interval_seconds: 300,
            evaluate_interval_seconds: 900,
            indicators: IndicatorConfig::default(),
            thresholds: SignalThresholds::default(),
            symbol_thresholds: HashMap::new(),
            cooldowns: Cooldowns::default(),
            lookback_bars: 365,
            fetch_retry_attempts: 3,
            fetch_retry_delay: Duration::from_millis(2000),
            discord_webhook_url: None,
            discord_enabled: false,
            database_url: None,
            dedup_restore: false,
            skip_non_trading_days: false,
            calendar: TradingCalendar::default(),
        }
    }
}

impl Config {
    /// Config for the given symbols with every other setting at its default.
    pub fn for_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Load and validate the configuration from process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let symbols = parse_symbols(&required("MONITORED_SYMBOLS")?);
        let defaults = Config::default();

        let mut indicators = IndicatorConfig::default();
        if let Some(raw) = optional("MA_WINDOWS") {
            indicators.ma_windows = parse_windows("MA_WINDOWS", &raw)?;
        }
        indicators.volume_window = parse_or("VOLUME_AVERAGE_WINDOW", indicators.volume_window)?;

        let base = SignalThresholds::default();
        let thresholds = SignalThresholds {
            rsi_oversold: parse_or("RSI_OVERSOLD", base.rsi_oversold)?,
            rsi_overbought: parse_or("RSI_OVERBOUGHT", base.rsi_overbought)?,
            price_change_threshold_pct: parse_or(
                "PRICE_CHANGE_THRESHOLD_PCT",
                base.price_change_threshold_pct,
            )?,
            volume_spike_multiplier: parse_or("VOLUME_SPIKE_MULTIPLIER", base.volume_spike_multiplier)?,
            volatility_threshold: parse_or("VOLATILITY_THRESHOLD", base.volatility_threshold)?,
        };

        let symbol_thresholds = match optional("SYMBOL_THRESHOLDS") {
            Some(raw) => parse_symbol_thresholds(&raw, &thresholds)?,
            None => HashMap::new(),
        };

        let cooldown = |key: &str, fallback: Duration| -> Result<Duration, ConfigError> {
            parse_or(key, fallback.as_secs()).map(Duration::from_secs)
        };
        let base_cooldowns = Cooldowns::default();
        let cooldowns = Cooldowns {
            price_move: cooldown("COOLDOWN_PRICE_MOVE_SECS", base_cooldowns.price_move)?,
            rsi_extreme: cooldown("COOLDOWN_RSI_EXTREME_SECS", base_cooldowns.rsi_extreme)?,
            macd_cross: cooldown("COOLDOWN_MACD_CROSS_SECS", base_cooldowns.macd_cross)?,
            volume_spike: cooldown("COOLDOWN_VOLUME_SPIKE_SECS", base_cooldowns.volume_spike)?,
            signal_change: cooldown("COOLDOWN_SIGNAL_CHANGE_SECS", base_cooldowns.signal_change)?,
        };

        let mut calendar = TradingCalendar::default();
        if let Some(raw) = optional("MARKET_HOLIDAYS") {
            calendar = TradingCalendar::parse_holidays(&raw)
                .map_err(|e| ConfigError::invalid("MARKET_HOLIDAYS", e))?;
        }

        let discord_webhook_url = optional("DISCORD_WEBHOOK_URL");
        let config = Config {
            symbols,
            ingest_interval_seconds: parse_or("UPDATE_INTERVAL", defaults.ingest_interval_seconds)?,
            compute_interval_seconds: parse_or("INDICATOR_INTERVAL", defaults.compute_interval_seconds)?,
            evaluate_interval_seconds: parse_or(
                "AI_ANALYSIS_INTERVAL",
                defaults.evaluate_interval_seconds,
            )?,
            indicators,
            thresholds,
            symbol_thresholds,
            cooldowns,
            lookback_bars: parse_or("LOOKBACK_BARS", defaults.lookback_bars)?,
            fetch_retry_attempts: parse_or("FETCH_RETRY_ATTEMPTS", defaults.fetch_retry_attempts)?,
            fetch_retry_delay: Duration::from_millis(parse_or(
                "FETCH_RETRY_DELAY_MS",
                defaults.fetch_retry_delay.as_millis() as u64,
            )?),
            discord_enabled: parse_bool("DISCORD_ENABLED", discord_webhook_url.is_some())?,
            discord_webhook_url,
            database_url: get_database_url(),
            dedup_restore: parse_bool("DEDUP_RESTORE", false)?,
            skip_non_trading_days: parse_bool("SKIP_NON_TRADING_DAYS", false)?,
            calendar,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::invalid("MONITORED_SYMBOLS", "at least one symbol is required"));
        }
        for (key, value) in [
            ("UPDATE_INTERVAL", self.ingest_interval_seconds),
            ("INDICATOR_INTERVAL", self.compute_interval_seconds),
            ("AI_ANALYSIS_INTERVAL", self.evaluate_interval_seconds),
        ] {
            if let Err(ConfigError::Invalid { reason, .. }) = schedule_for_interval(value) {
                return Err(ConfigError::invalid(key, reason));
            }
        }
        if self.indicators.ma_windows.iter().any(|w| *w == 0) {
            return Err(ConfigError::invalid("MA_WINDOWS", "windows must be > 0"));
        }
        for (key, value) in [
            ("VOLUME_AVERAGE_WINDOW", self.indicators.volume_window),
            ("RSI_PERIOD", self.indicators.rsi_period),
            ("BOLLINGER_PERIOD", self.indicators.bollinger_period),
            ("LOOKBACK_BARS", self.lookback_bars),
            ("FETCH_RETRY_ATTEMPTS", self.fetch_retry_attempts),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(key, "must be > 0"));
            }
        }
        if self.indicators.macd_fast >= self.indicators.macd_slow || self.indicators.macd_signal == 0 {
            return Err(ConfigError::invalid(
                "MACD",
                format!(
                    "fast {} must be below slow {} and signal must be > 0",
                    self.indicators.macd_fast, self.indicators.macd_slow
                ),
            ));
        }
        if self.discord_enabled && self.discord_webhook_url.is_none() {
            return Err(ConfigError::Missing {
                key: "DISCORD_WEBHOOK_URL".to_string(),
            });
        }

        self.thresholds.validate("thresholds")?;
        for (symbol, thresholds) in &self.symbol_thresholds {
            thresholds.validate(&format!("SYMBOL_THRESHOLDS.{}", symbol))?;
        }
        Ok(())
    }

    /// Thresholds for a symbol, falling back to the defaults.
    pub fn thresholds_for(&self, symbol: &str) -> SignalThresholds {
        self.symbol_thresholds
            .get(symbol)
            .copied()
            .unwrap_or(self.thresholds)
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(key: &str) -> Result<String, ConfigError> {
    optional(key).ok_or_else(|| ConfigError::Missing {
        key: key.to_string(),
    })
}

fn parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(key) {
        Some(raw) => raw.parse().map_err(|e| ConfigError::invalid(key, e)),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    match optional(key) {
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::invalid(key, format!("not a boolean: {}", other))),
        },
        None => Ok(default),
    }
}

pub fn parse_symbols(raw: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for symbol in raw.split(',').map(|s| s.trim().to_uppercase()) {
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

fn parse_windows(key: &str, raw: &str) -> Result<Vec<usize>, ConfigError> {
    let mut windows = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().map_err(|e| ConfigError::invalid(key, e)))
        .collect::<Result<Vec<_>, _>>()?;
    windows.sort_unstable();
    windows.dedup();
    Ok(windows)
}

/// Parse `{"AAPL": {"rsi_oversold": 25}, ...}`; unspecified fields inherit `base`.
pub fn parse_symbol_thresholds(
    raw: &str,
    base: &SignalThresholds,
) -> Result<HashMap<String, SignalThresholds>, ConfigError> {
    let parsed: HashMap<String, serde_json::Value> =
        serde_json::from_str(raw).map_err(|e| ConfigError::invalid("SYMBOL_THRESHOLDS", e))?;

    let base_value =
        serde_json::to_value(base).map_err(|e| ConfigError::invalid("SYMBOL_THRESHOLDS", e))?;

    let mut overrides = HashMap::with_capacity(parsed.len());
    for (symbol, patch) in parsed {
        let serde_json::Value::Object(patch) = patch else {
            return Err(ConfigError::invalid(
                format!("SYMBOL_THRESHOLDS.{}", symbol),
                "expected an object",
            ));
        };
        let mut merged = base_value.clone();
        if let serde_json::Value::Object(ref mut fields) = merged {
            fields.extend(patch);
        }
        let thresholds: SignalThresholds = serde_json::from_value(merged)
            .map_err(|e| ConfigError::invalid(format!("SYMBOL_THRESHOLDS.{}", symbol), e))?;
        overrides.insert(symbol.trim().to_uppercase(), thresholds);
    }
    Ok(overrides)
}
