//! Configuration utility types.
//!
//! | Module  | Purpose                                      |
//! |---------|----------------------------------------------|
//! | `error` | Configuration error types and diagnostics    |
//! | `key`   | Known configuration keys and their defaults  |
//! | `value` | Scalar / list configuration values           |

mod error;
mod key;
mod value;

pub use error::{ConfigDiagnostics, ConfigError};
pub use key::{
    ConfigKey, DEFAULT_MANIFEST_FILE, DEFAULT_OUTPUT_DIR, DEFAULT_WEB_ROOT, DEVELOPMENT,
};
pub use value::{ConfigValue, parse_bool};
