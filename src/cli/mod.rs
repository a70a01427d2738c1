mod commands;

pub use commands::{Cli, Commands, ConvertSource, HistoryCommand, run, run_with};
