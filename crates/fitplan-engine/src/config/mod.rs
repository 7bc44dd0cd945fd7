pub mod loader;
pub mod schema;

pub use loader::{ConfigError, ConfigLoader};
pub use schema::{
    ApiConfig, FitplanConfig, LoggingConfig, OutputFormat, RenderConfig, SessionConfig,
};
