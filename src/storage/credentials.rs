use super::Result;
use std::env;

#[cfg(not(test))]
use keyring::Entry;

/// Bearer-token storage, one secret per profile. The keyring is the source
/// of truth; the CNX_TOKEN environment variable overrides it when set.
#[derive(Debug, Clone)]
pub struct Credentials {
    token: Option<String>,
    pub profile_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    EnvToken,
    Stored,
}

impl Credentials {
    pub fn new(profile_name: String) -> Self {
        Self {
            token: None,
            profile_name,
        }
    }

    pub fn load(profile_name: &str) -> Result<Self> {
        let mut credentials = Self::new(profile_name.to_string());
        credentials.token = credentials.load_secret("token")?;
        Ok(credentials)
    }

    #[cfg(not(test))]
    fn load_secret(&self, key_type: &str) -> Result<Option<String>> {
        let entry = Entry::new("cnx-cli", &format!("{}-{}", key_type, self.profile_name))
            .map_err(|e| crate::error::StorageError::KeyringError(e.to_string()))?;

        match entry.get_password() {
            Ok(v) => Ok(Some(v)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(crate::error::StorageError::KeyringError(e.to_string())),
        }
    }

    #[cfg(test)]
    fn load_secret(&self, key_type: &str) -> Result<Option<String>> {
        println!(
            "MOCK: Loading {} for profile {}",
            key_type, self.profile_name
        );
        Ok(None)
    }

    // use auth login
    pub fn save_token_for_profile(profile_name: &str, token: &str) -> Result<()> {
        let mut credentials = Self::new(profile_name.to_string());
        credentials.token = Some(token.to_string());
        credentials.save_secret("token", &credentials.token)?;
        Ok(())
    }

    // use auth logout, and the re-authentication side effect
    pub fn clear_token_for_profile(profile_name: &str) -> Result<()> {
        let credentials = Self::new(profile_name.to_string());
        credentials.delete_secret("token")?;
        Ok(())
    }

    #[cfg(not(test))]
    fn save_secret(&self, key_type: &str, value: &Option<String>) -> Result<()> {
        if let Some(v) = value {
            let key_name = format!("{}-{}", key_type, self.profile_name);

            let entry = Entry::new("cnx-cli", &key_name)
                .map_err(|e| crate::error::StorageError::KeyringError(e.to_string()))?;

            entry
                .set_password(v)
                .map_err(|e| crate::error::StorageError::KeyringError(e.to_string()))?;
        }

        Ok(())
    }

    #[cfg(not(test))]
    fn delete_secret(&self, key_type: &str) -> Result<()> {
        let key_name = format!("{}-{}", key_type, self.profile_name);

        let entry = Entry::new("cnx-cli", &key_name)
            .map_err(|e| crate::error::StorageError::KeyringError(e.to_string()))?;

        match entry.delete_credential() {
            Ok(_) => Ok(()),
            // Entry doesn't exist, which is fine for logout
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(crate::error::StorageError::KeyringError(e.to_string())),
        }
    }

    #[cfg(test)]
    fn save_secret(&self, key_type: &str, value: &Option<String>) -> Result<()> {
        println!(
            "MOCK: Saving {} = {:?} for profile {}",
            key_type, value, self.profile_name
        );
        Ok(())
    }

    #[cfg(test)]
    fn delete_secret(&self, key_type: &str) -> Result<()> {
        println!(
            "MOCK: Deleting {} for profile {}",
            key_type, self.profile_name
        );
        Ok(())
    }

    #[cfg(not(test))]
    fn env_token() -> Option<String> {
        env::var("CNX_TOKEN").ok().filter(|token| !token.is_empty())
    }

    #[cfg(test)]
    fn env_token() -> Option<String> {
        env::var("TEST_CNX_TOKEN")
            .ok()
            .filter(|token| !token.is_empty())
    }

    pub fn auth_mode(&self) -> AuthMode {
        if Self::env_token().is_some() {
            AuthMode::EnvToken
        } else {
            AuthMode::Stored
        }
    }

    /// Effective token: environment first, then the stored secret.
    pub fn token(&self) -> Option<String> {
        Self::env_token().or_else(|| self.token.clone())
    }
}
