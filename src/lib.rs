pub mod cli;
pub mod document;
pub mod gitinfo;
pub mod load_config;
pub mod markup;
pub mod report;
pub mod tree;

pub use cli::{run, Cli, Commands};
