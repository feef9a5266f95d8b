pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use error::{Result, StoreError};
pub use models::{Task, TaskList, UserStats};
pub use store::Storage;
