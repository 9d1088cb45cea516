pub mod bollinger;

pub use bollinger::*;
