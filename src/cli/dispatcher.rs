use crate::api::client::NeuprintClient;
use crate::cli::command_handlers::{QueryRunArgs, run_query};
use crate::cli::main_types::{AuthCommands, Commands, ConfigCommands, DatasetCommands, QueryCommands};
use crate::core::auth::TokenInput;
use crate::core::registry::{PluginCategory, PluginRegistry};
use crate::display::TableDisplay;
use crate::error::{AppError, ConfigError};
use crate::storage::config::{Config, Profile};
use crate::storage::credentials::{AuthMode, Credentials};
use crate::utils::logging::VerboseLogger;
use crate::utils::validation::validate_server_url;

pub struct Dispatcher {
    config: Config,
    credentials: Credentials,
    registry: PluginRegistry,
    logger: VerboseLogger,
    token_override: Option<String>,
    config_path: Option<std::path::PathBuf>,
}

impl Dispatcher {
    pub fn new(
        config: Config,
        credentials: Credentials,
        registry: PluginRegistry,
        verbose: bool,
        token_override: Option<String>,
        config_path: Option<std::path::PathBuf>,
    ) -> Self {
        let logger = VerboseLogger::new(verbose);
        if token_override.is_some() {
            logger.log("Using bearer token provided via flag or environment");
        }

        Self {
            config,
            credentials,
            registry,
            logger,
            token_override,
            config_path,
        }
    }

    fn profile(&self) -> Result<&Profile, AppError> {
        self.config
            .get_profile(&self.credentials.profile_name)
            .ok_or_else(|| {
                AppError::Config(ConfigError::ProfileNotFound {
                    name: self.credentials.profile_name.clone(),
                })
            })
    }

    fn effective_token(&self) -> Option<String> {
        self.token_override
            .clone()
            .or_else(|| self.credentials.token())
    }

    fn client(&self) -> Result<NeuprintClient, AppError> {
        let profile = self.profile()?;
        validate_server_url(&profile.server)?;
        let client = match self.effective_token() {
            Some(token) => NeuprintClient::with_token(profile.server.clone(), token)?,
            None => NeuprintClient::new(profile.server.clone())?,
        };
        Ok(client)
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Auth { command } => self.handle_auth_command(command).await,
            Commands::Config { command } => self.handle_config_command(command),
            Commands::Dataset { command } => self.handle_dataset_command(command).await,
            Commands::Query { command } => self.handle_query_command(command).await,
        }
    }

    async fn handle_auth_command(&self, command: AuthCommands) -> Result<(), AppError> {
        match command {
            AuthCommands::Login => {
                self.logger.log("Attempting auth login command");
                let profile = self.profile()?;

                let input = TokenInput::collect()?;
                input.validate()?;
                Credentials::save_token_for_profile(&self.credentials.profile_name, &input.token)?;

                println!(
                    "✅ Token stored for profile: {}",
                    self.credentials.profile_name
                );
                println!("Connected to: {}", profile.server);
                Ok(())
            }
            AuthCommands::Logout => {
                self.logger.log("Attempting auth logout command");
                Credentials::clear_token_for_profile(&self.credentials.profile_name)?;
                println!(
                    "✅ Token cleared for profile: {}",
                    self.credentials.profile_name
                );
                Ok(())
            }
            AuthCommands::Status => {
                self.logger.log("Attempting auth status command");

                println!("Authentication Status:");
                println!("=====================");

                match self.credentials.auth_mode() {
                    AuthMode::EnvToken => {
                        println!("Authentication Mode: environment token (CNX_TOKEN)");
                    }
                    AuthMode::Stored => {
                        println!("Authentication Mode: stored token");
                    }
                }
                match self.effective_token() {
                    Some(token) => {
                        let masked = if token.len() > 8 {
                            format!("{}...{}", &token[..4], &token[token.len() - 4..])
                        } else {
                            "*****".to_string()
                        };
                        println!("Token: {}", masked);
                    }
                    None => println!("Token: (not set)"),
                }
                println!("\nActive Profile: {}", self.credentials.profile_name);
                Ok(())
            }
        }
    }

    fn handle_config_command(&self, command: ConfigCommands) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => {
                self.logger.log("Attempting config show command");

                println!("Current Configuration:");
                println!("=====================");

                match &self.config.default_profile {
                    Some(profile) => println!("Default Profile: {}", profile),
                    None => println!("Default Profile: (not set)"),
                }

                println!("\nProfiles:");
                if self.config.profiles.is_empty() {
                    println!("  No profiles configured");
                } else {
                    for (name, profile) in &self.config.profiles {
                        println!(
                            "  {}: {} (dataset: {})",
                            name,
                            profile.server,
                            profile.data_set.as_deref().unwrap_or("-")
                        );
                    }
                }
                Ok(())
            }
            ConfigCommands::Set { key, value } => {
                self.logger.log("Attempting config set command");

                let mut config = self.config.clone();
                let name = self.credentials.profile_name.clone();
                let mut profile = config.get_profile(&name).cloned().unwrap_or(Profile {
                    server: String::new(),
                    data_set: None,
                });

                match key.as_str() {
                    "server" => {
                        validate_server_url(&value)?;
                        profile.server = value;
                    }
                    "dataset" => profile.data_set = Some(value),
                    other => {
                        return Err(AppError::Config(ConfigError::InvalidValue {
                            field: other.to_string(),
                            value,
                            reason: "supported keys are 'server' and 'dataset'".to_string(),
                        }));
                    }
                }

                config.set_profile(name.clone(), profile);
                if config.default_profile.is_none() {
                    config.default_profile = Some(name.clone());
                }
                config.save(self.config_path.clone())?;
                println!("✅ Updated profile: {}", name);
                Ok(())
            }
        }
    }

    async fn handle_dataset_command(&self, command: DatasetCommands) -> Result<(), AppError> {
        match command {
            DatasetCommands::List => {
                self.logger.log("Attempting dataset list command");
                let client = self.client()?;
                let datasets = client.list_datasets().await?;

                let mut names: Vec<&String> = datasets.keys().collect();
                names.sort();
                for name in names {
                    let info = &datasets[name];
                    println!(
                        "{} (rois: {}, last modified: {})",
                        name,
                        info.rois.len(),
                        info.last_mod.as_deref().unwrap_or("-")
                    );
                }
                Ok(())
            }
        }
    }

    async fn handle_query_command(&self, command: QueryCommands) -> Result<(), AppError> {
        match command {
            QueryCommands::List { recon } => {
                self.logger.log("Attempting query list command");
                let category = recon.then_some(PluginCategory::Reconstruction);
                let display = TableDisplay::new();
                println!("{}", display.render_query_list(&self.registry.list(category))?);
                Ok(())
            }
            QueryCommands::Run {
                slug,
                dataset,
                param,
                rois,
                sort,
                desc,
                page,
                page_size,
                csv,
                follow,
            } => {
                self.logger.log("Attempting query run command");
                let client = self.client()?;
                let default_data_set = self.profile()?.data_set.clone();

                run_query(
                    &self.registry,
                    client,
                    &self.credentials.profile_name,
                    default_data_set,
                    &self.logger,
                    QueryRunArgs {
                        slug,
                        dataset,
                        param,
                        rois,
                        sort,
                        desc,
                        page,
                        page_size,
                        csv,
                        follow,
                    },
                )
                .await
            }
        }
    }
}
