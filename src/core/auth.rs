use crate::error::{AppError, CliError};
use rpassword::read_password;
use std::io::{self, Write};

/// Interactive bearer-token input handler for `auth login`.
///
/// neuPrint servers issue long-lived bearer tokens from their account page;
/// the token is read without echo, like a password.
pub struct TokenInput {
    pub token: String,
}

impl TokenInput {
    /// Prompt for the bearer token on the terminal.
    pub fn collect() -> Result<Self, AppError> {
        print!("Bearer token: ");
        io::stdout().flush().map_err(|e| {
            AppError::Cli(CliError::InvalidArguments(format!(
                "Failed to flush stdout: {}",
                e
            )))
        })?;

        let token = read_password().map_err(|e| {
            AppError::Cli(CliError::InvalidArguments(format!(
                "Failed to read token: {}",
                e
            )))
        })?;

        Ok(Self {
            token: token.trim().to_string(),
        })
    }

    /// Validate that the token is plausible before storing it.
    pub fn validate(&self) -> Result<(), AppError> {
        crate::utils::validation::validate_token(&self.token)
    }
}
