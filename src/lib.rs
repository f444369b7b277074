//! Generate text from commit diffs with a pretrained language model and keep
//! the results in an in-memory history keyed by prompt.

pub mod ai;
pub mod app;
pub mod config;
pub mod error;
pub mod git;
pub mod prompt;
pub mod record;
pub mod utils;

pub use ai::AI;
pub use error::ScribeError;
pub use record::{Commit, Hunk, Node};
