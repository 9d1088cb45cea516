//! External collaborators: market data and notification delivery.

pub mod market_data;
pub mod notifications;
pub mod yahoo;

pub use market_data::{MarketDataProvider, PlaceholderMarketDataProvider};
pub use notifications::{DiscordWebhookSink, FanoutSink, LogSink, NotificationSink};
pub use yahoo::YahooFinanceProvider;
