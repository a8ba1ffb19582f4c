//! Input validation for user-supplied connection and query parameters.

use crate::error::CliError;

/// Validate that a server URL is plausibly usable before building a client.
pub fn validate_server_url(url: &str) -> crate::Result<()> {
    if url.is_empty() {
        return Err(CliError::InvalidArguments("server URL cannot be empty".to_string()).into());
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CliError::InvalidArguments(format!(
            "Invalid URL '{}': URL must start with http:// or https://",
            url
        ))
        .into());
    }

    Ok(())
}

/// Validate bearer token shape; neuPrint tokens are long JWT-style strings.
pub fn validate_token(token: &str) -> crate::Result<()> {
    if token.is_empty() {
        return Err(CliError::InvalidArguments("token cannot be empty".to_string()).into());
    }

    if token.len() < 10 {
        return Err(CliError::InvalidArguments(
            "token appears to be too short (minimum 10 characters)".to_string(),
        )
        .into());
    }

    Ok(())
}

/// Split a `key=value` command-line parameter.
pub fn parse_key_value(raw: &str) -> crate::Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(CliError::InvalidArguments(format!(
            "parameter '{}' is not in key=value format",
            raw
        ))
        .into()),
    }
}

/// Parse a `row:column` cell coordinate used by `--follow`.
pub fn parse_cell_coordinate(raw: &str) -> crate::Result<(usize, usize)> {
    let parse = |part: &str| part.trim().parse::<usize>().ok();
    match raw.split_once(':') {
        Some((row, column)) => match (parse(row), parse(column)) {
            (Some(row), Some(column)) => Ok((row, column)),
            _ => Err(CliError::InvalidArguments(format!(
                "cell coordinate '{}' is not in row:column format",
                raw
            ))
            .into()),
        },
        None => Err(CliError::InvalidArguments(format!(
            "cell coordinate '{}' is not in row:column format",
            raw
        ))
        .into()),
    }
}
