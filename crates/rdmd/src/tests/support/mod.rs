//! Shared helpers for the server behavioural suites.

mod config_loader;
mod reporter;
mod server_world;
mod world;

pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use server_world::{ServerWorld, StepResult};
pub use world::{TestWorld, world};
