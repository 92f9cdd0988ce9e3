pub mod config;
pub mod money;

pub use config::{ConfigError, ExtractorConfig, Granularity};
pub use money::Money;
