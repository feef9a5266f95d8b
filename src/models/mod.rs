pub mod user;

pub use user::{Task, TaskList, UserDoc, UserStats};
