//! Unified configuration layer.
//!
//! Every environment read goes through this module; engine code consumes typed
//! config structs instead of calling `std::env::var` directly.
//!
//! - `loader`: env_or, env_optional, env_bool helpers and `.env` loading
//! - `schema`: NodeSettings, PythonSettings, ExecutionConfig, PathsConfig, ObservabilityConfig
//! - `env_keys`: key constants (with legacy aliases)

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv, load_dotenv_from_path};
pub use schema::{ExecutionConfig, NodeSettings, ObservabilityConfig, PathsConfig, PythonSettings};
