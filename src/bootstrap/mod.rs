pub mod config;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use self::tracing::init_tracing_subscriber;
pub use config::{default_config_path, load_config, resolve_config};
pub use run::run_command;
pub use wiring::{build_storage, wire_runtime, WiredRuntime};
