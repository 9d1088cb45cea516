pub mod engine;
pub mod volume;

pub mod momentum;
pub mod trend;
pub mod volatility;

pub use engine::{IndicatorConfig, IndicatorEngine};
