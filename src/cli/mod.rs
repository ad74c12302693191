pub mod commands;
pub mod output;

pub use commands::{AnalyzeArgs, CliArgs, Commands, DiscoverArgs};
pub use output::{OutputFormat, OutputFormatter};
