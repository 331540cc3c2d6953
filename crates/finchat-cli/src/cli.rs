//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use finchat_registry::DownloadFormat;
use std::path::PathBuf;

/// Finchat - Ask questions about annual reports and registry entities.
#[derive(Debug, Parser)]
#[command(name = "finchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "FINCHAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enter interactive report chat (default)
    Repl,

    /// List the reports available in the store
    List,

    /// Ask one question about one or more reports
    Ask(AskArgs),

    /// Brønnøysund Register Centre lookups and questions
    Registry(RegistryArgs),

    /// Inspect or create the configuration file
    Config(ConfigArgs),
}

/// Arguments for the ask command.
#[derive(Debug, Parser)]
pub struct AskArgs {
    /// Reports to use, e.g. "Equinor 2020, Equinor 2021"
    #[arg(short, long)]
    pub reports: String,

    /// The question
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

/// Arguments for the registry command.
#[derive(Debug, Parser)]
pub struct RegistryArgs {
    #[command(subcommand)]
    pub action: RegistryAction,
}

/// Registry actions.
#[derive(Debug, Subcommand)]
pub enum RegistryAction {
    /// Search entities by name
    Search {
        /// Entity name
        name: String,

        /// Also write the results to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Show one entity by organisation number
    Entity {
        /// Organisation number
        orgnr: String,

        /// Show the entity's roles instead
        #[arg(long)]
        roles: bool,
    },

    /// Ask one question about an entity
    Ask {
        /// Entity name
        #[arg(short, long)]
        entity: String,

        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Interactive registry chat
    Repl {
        /// Entity to start with
        #[arg(short, long)]
        entity: Option<String>,
    },

    /// Bulk download from the registry
    Download {
        /// What to download
        #[arg(value_enum)]
        target: DownloadTarget,

        /// File format (entity registers only)
        #[arg(short, long, value_enum, default_value = "json")]
        format: FormatArg,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Bulk download targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DownloadTarget {
    /// All entities
    Entities,
    /// All sub-entities
    SubEntities,
    /// All political parties (CSV)
    Parties,
    /// All non-profit organisations (CSV)
    NonProfits,
}

/// Download format argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// Gzipped JSON
    Json,
    /// Gzipped CSV
    Csv,
    /// Spreadsheet
    Xlsx,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (secrets masked)
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<FormatArg> for DownloadFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => DownloadFormat::Json,
            FormatArg::Csv => DownloadFormat::Csv,
            FormatArg::Xlsx => DownloadFormat::Xlsx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_is_repl() {
        let cli = Cli::parse_from(["finchat"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_ask_command() {
        let cli = Cli::parse_from([
            "finchat",
            "ask",
            "--reports",
            "Equinor 2020, Equinor 2021",
            "How",
            "did",
            "revenue",
            "change?",
        ]);
        match cli.command {
            Some(Command::Ask(args)) => {
                assert_eq!(args.reports, "Equinor 2020, Equinor 2021");
                assert_eq!(args.question.join(" "), "How did revenue change?");
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["finchat", "-vv", "--no-color", "list"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_color);
        assert!(matches!(cli.command, Some(Command::List)));
    }

    #[test]
    fn test_registry_search_with_csv() {
        let cli = Cli::parse_from(["finchat", "registry", "search", "Equinor", "--csv", "out.csv"]);
        match cli.command {
            Some(Command::Registry(RegistryArgs {
                action: RegistryAction::Search { name, csv },
            })) => {
                assert_eq!(name, "Equinor");
                assert_eq!(csv, Some(PathBuf::from("out.csv")));
            }
            _ => panic!("Expected registry search"),
        }
    }

    #[test]
    fn test_registry_download() {
        let cli = Cli::parse_from([
            "finchat", "registry", "download", "sub-entities", "--format", "csv", "-o", "u.csv.gz",
        ]);
        match cli.command {
            Some(Command::Registry(RegistryArgs {
                action: RegistryAction::Download { target, format, .. },
            })) => {
                assert_eq!(target, DownloadTarget::SubEntities);
                assert_eq!(DownloadFormat::from(format), DownloadFormat::Csv);
            }
            _ => panic!("Expected registry download"),
        }
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Cli::try_parse_from(["finchat", "ask", "--reports", "Equinor 2020"]).is_err());
    }
}
