use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ApiError: {0}")]
    Api(#[from] ApiError),
    #[error("AuthError: {0}")]
    Auth(#[from] AuthError),
    #[error("RegistryError: {0}")]
    Registry(#[from] RegistryError),
    #[error("ResultError: {0}")]
    Result(#[from] ResultError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
    #[error("DisplayError: {0}")]
    Display(#[from] DisplayError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Unknown query plugin '{slug}'")]
    UnknownPlugin { slug: String, available: Vec<String> },
    #[error("Cell at row {row}, column {column} has no follow-up query")]
    NotActionable { row: usize, column: usize },
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64, endpoint: String },
    #[error("HTTP error: {status} {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },
    #[error("Authentication failed")]
    Unauthorized {
        status: u16,
        endpoint: String,
        server_message: String,
    },
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Session expired or invalid, user must re-authenticate")]
    ReauthRequired,
    #[error("No bearer token configured")]
    TokenMissing,
    #[error("Bearer token rejected by server")]
    TokenInvalid,
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Plugins '{first}' and '{second}' both slug to '{slug}'")]
    SlugCollision {
        first: String,
        second: String,
        slug: String,
    },
}

#[derive(Error, Debug)]
pub enum ResultError {
    #[error("Table '{table}': row has {got} cells but header has {expected}")]
    RowLength {
        table: String,
        expected: usize,
        got: usize,
    },
    #[error("Column '{column}' missing from query response")]
    MissingColumn { column: String },
    #[error("Result processing failed: {0}")]
    Processing(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String, hint: String },
    #[error("Invalid configuration value for '{field}': {value}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Keyring error: {0}")]
    KeyringError(String),
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Sort column {column} out of range for table with {columns} columns")]
    SortColumn { column: usize, columns: usize },
    #[error("Pagination error: {0}")]
    Pagination(String),
    #[error("Table formatting failed: {0}")]
    TableFormat(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl ErrorSeverity {
    pub fn emoji(&self) -> &'static str {
        match self {
            ErrorSeverity::Critical => "🚨",
            ErrorSeverity::High => "❌",
            ErrorSeverity::Medium => "⚠️",
            ErrorSeverity::Low => "ℹ️",
        }
    }
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // An ambiguous registry means the process must not continue.
            AppError::Registry(_) => ErrorSeverity::Critical,
            AppError::Api(api_error) => match api_error {
                ApiError::Unauthorized { .. } => ErrorSeverity::High,
                ApiError::Timeout { .. } => ErrorSeverity::Medium,
                ApiError::Http { status, .. } if *status >= 500 => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            AppError::Auth(_) => ErrorSeverity::High,
            AppError::Result(_) => ErrorSeverity::High,
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Storage(_) => ErrorSeverity::Medium,
            AppError::Display(_) => ErrorSeverity::Low,
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Auth(_) | AppError::Api(ApiError::Unauthorized { .. }) => {
                Some("'cnx-cli auth login' to store a fresh bearer token".to_string())
            }
            AppError::Api(ApiError::Timeout { .. }) => {
                Some("Check your internet or neuPrint server connection and try again".to_string())
            }
            AppError::Cli(CliError::UnknownPlugin { available, .. }) => Some(format!(
                "'cnx-cli query list' shows available queries: {}",
                available.join(", ")
            )),
            AppError::Config(ConfigError::FileNotFound { .. }) => {
                Some("'cnx-cli config set server <url>' to create a configuration".to_string())
            }
            _ => None,
        }
    }
}
