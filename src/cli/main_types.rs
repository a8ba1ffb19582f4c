use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cnx-cli")]
#[command(about = "Command line interface for exploring connectome graph databases via the neuPrint API")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    #[arg(long, global = true, env = "CNX_TOKEN")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authentication commands
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Dataset discovery
    Dataset {
        #[command(subcommand)]
        command: DatasetCommands,
    },
    /// Query plugin listing and execution
    Query {
        #[command(subcommand)]
        command: QueryCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store a bearer token for the active profile
    Login,
    /// Clear the stored bearer token
    Logout,
    /// Show authentication status
    Status,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set a configuration value (server, dataset)
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DatasetCommands {
    /// List datasets available on the server
    List,
}

#[derive(Subcommand, Debug)]
pub enum QueryCommands {
    /// List registered query plugins
    List {
        /// Show only reconstruction-related queries
        #[arg(long)]
        recon: bool,
    },
    /// Execute a query plugin by slug
    Run {
        /// Plugin slug, as shown by `query list`
        slug: String,
        /// Dataset to query (defaults to the profile's dataset)
        #[arg(long)]
        dataset: Option<String>,
        /// Plugin parameters in key=value format
        #[arg(long, action = clap::ArgAction::Append)]
        param: Vec<String>,
        /// Comma-separated ROIs known for the dataset, for form validation
        #[arg(long)]
        rois: Option<String>,
        /// Sort column index (0-based)
        #[arg(long)]
        sort: Option<usize>,
        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,
        /// Page to display (0-based)
        #[arg(long, default_value = "0")]
        page: usize,
        /// Rows per page; omit to show all rows
        #[arg(long)]
        page_size: Option<usize>,
        /// Export all result tables as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Follow the embedded query of a result cell, as row:column of the
        /// first table; may be repeated
        #[arg(long, action = clap::ArgAction::Append)]
        follow: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_query_run() {
        let cli = Cli::parse_from([
            "cnx-cli",
            "query",
            "run",
            "neurons-in-rois",
            "--dataset",
            "hemibrain",
            "--param",
            "input_rois=EB",
            "--param",
            "output_rois=PB",
            "--sort",
            "3",
            "--desc",
            "--follow",
            "0:3",
        ]);

        let Commands::Query {
            command:
                QueryCommands::Run {
                    slug,
                    dataset,
                    param,
                    sort,
                    desc,
                    follow,
                    ..
                },
        } = cli.command
        else {
            panic!("expected query run");
        };
        assert_eq!(slug, "neurons-in-rois");
        assert_eq!(dataset.as_deref(), Some("hemibrain"));
        assert_eq!(param.len(), 2);
        assert_eq!(sort, Some(3));
        assert!(desc);
        assert_eq!(follow, vec!["0:3"]);
    }
}
