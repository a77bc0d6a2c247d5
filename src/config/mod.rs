pub mod cli;
pub mod job;

pub use cli::CliArgs;
pub use job::{JobConfig, UnmatchedContentPolicy};
