use clap::Parser;
use cnx_cli::cli::dispatcher::Dispatcher;
use cnx_cli::cli::main_types::Cli;
use cnx_cli::core::registry::PluginRegistry;
use cnx_cli::plugins::builtin_plugins;
use cnx_cli::storage::config::Config;
use cnx_cli::storage::credentials::Credentials;
use std::path::PathBuf;

const DEFAULT_SERVER: &str = "https://neuprint.janelia.org";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load Config
    let config_path = cli
        .config_dir
        .as_ref()
        .map(|dir| PathBuf::from(dir).join("config.toml"));

    let mut config = match Config::load(config_path.clone()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading config: {}", err);
            std::process::exit(1);
        }
    };

    // Determine the profile to use
    let profile_name = cli
        .profile
        .or(config.default_profile.clone())
        .unwrap_or_else(|| "default".to_string());

    // Create a default profile if it doesn't exist
    if config.get_profile(&profile_name).is_none() {
        if cli.verbose {
            println!("Creating default profile: {}", profile_name);
        }

        use cnx_cli::storage::config::Profile;
        config.set_profile(
            profile_name.clone(),
            Profile {
                server: DEFAULT_SERVER.to_string(),
                data_set: None,
            },
        );

        if config.default_profile.is_none() {
            config.default_profile = Some(profile_name.clone());
        }

        if let Err(err) = config.save(config_path.clone()) {
            if cli.verbose {
                println!("Warning: Failed to save config: {}", err);
            }
        }
    }

    if cli.verbose {
        println!("Verbose mode is enabled");
        println!("Using profile: {}", profile_name);

        if let Some(config_dir) = &cli.config_dir {
            println!("Using config directory: {}", config_dir);
        }
    }

    // The registry is built once; an ambiguous catalog must not run.
    let registry = match PluginRegistry::new(builtin_plugins()) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("🚨 {}", err);
            std::process::exit(1);
        }
    };

    // Load Credentials
    let credentials = match Credentials::load(&profile_name) {
        Ok(creds) => creds,
        Err(err) => {
            eprintln!("Error loading credentials: {}", err);
            Credentials::new(profile_name.clone())
        }
    };

    let dispatcher = Dispatcher::new(
        config,
        credentials,
        registry,
        cli.verbose,
        cli.token,
        config_path,
    );

    if let Err(e) = dispatcher.dispatch(cli.command).await {
        eprintln!("{} Error: {}", e.severity().emoji(), e);
        if let Some(hint) = e.troubleshooting_hint() {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }

    Ok(())
}
