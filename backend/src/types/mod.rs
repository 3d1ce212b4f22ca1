mod environment;
mod error;
mod extractors;
mod store_config;

pub use environment::Environment;
pub use error::{ApiErrorResponse, AppError};
pub use extractors::ValidatedJson;
pub use store_config::{ensure_credentials, ConfigError, StoreConfig};
