pub mod cli;
pub mod settings;

pub use cli::{build_cli_command, parse_point, CatalogCommands, Cli, Commands, OutputFormat};
pub use settings::{LoggingConfig, Settings, StudyConfig};
