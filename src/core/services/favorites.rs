//! Bookmark service for result panels.
//!
//! Saving a favorite is the one user-scoped call in the pipeline: an expired
//! bearer token answers 401, which must invalidate the session and surface a
//! recoverable outcome instead of an error.

use std::sync::Arc;

use chrono::Utc;

use crate::api::client::NeuprintClient;
use crate::api::models::FavoritePayload;
use crate::core::state::AppState;
use crate::error::{ApiError, AppError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFavorite {
    Saved,
    /// Credential rejected; the re-authentication side effect has fired and
    /// the user must log in again before retrying.
    ReauthRequired,
}

pub struct FavoriteService {
    client: NeuprintClient,
    state: Arc<AppState>,
}

impl FavoriteService {
    pub fn new(client: NeuprintClient, state: Arc<AppState>) -> Self {
        FavoriteService { client, state }
    }

    /// Bookmark a resolved panel's query under a user-chosen name.
    pub async fn save(
        &self,
        name: &str,
        url: &str,
        cypher: &str,
    ) -> Result<SaveFavorite, AppError> {
        let payload = FavoritePayload {
            name: name.to_string(),
            url: url.to_string(),
            cypher: cypher.to_string(),
            timestamp: Utc::now(),
        };

        match self.client.save_favorite(&payload).await {
            Ok(()) => Ok(SaveFavorite::Saved),
            Err(ApiError::Unauthorized { .. }) => {
                self.state.require_reauth();
                Ok(SaveFavorite::ReauthRequired)
            }
            Err(error) => Err(AppError::Api(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::StateEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reauth_counter(state: &AppState) -> Arc<AtomicUsize> {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        state.subscribe(Box::new(move |event| {
            if matches!(event, StateEvent::ReauthRequired) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));
        fired
    }

    #[tokio::test]
    async fn test_save_with_valid_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/user/favorites"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let state = Arc::new(AppState::new());
        let client = NeuprintClient::with_token(server.uri(), "tok".to_string()).unwrap();
        let service = FavoriteService::new(client, Arc::clone(&state));

        let outcome = service
            .save("my neurons", "/results?qt=find-neurons", "MATCH (n) RETURN n")
            .await
            .unwrap();
        assert_eq!(outcome, SaveFavorite::Saved);
        assert!(!state.needs_reauth());
    }

    #[tokio::test]
    async fn test_401_fires_reauth_once_without_escaping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/user/favorites"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
            .mount(&server)
            .await;

        let state = Arc::new(AppState::new());
        let fired = reauth_counter(&state);
        let client = NeuprintClient::with_token(server.uri(), "stale".to_string()).unwrap();
        let service = FavoriteService::new(client, Arc::clone(&state));

        // No error escapes; the outcome reports the required re-auth.
        let outcome = service
            .save("bookmark", "/results", "MATCH (n) RETURN n")
            .await
            .unwrap();
        assert_eq!(outcome, SaveFavorite::ReauthRequired);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(state.needs_reauth());
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/user/favorites"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let state = Arc::new(AppState::new());
        let fired = reauth_counter(&state);
        let client = NeuprintClient::with_token(server.uri(), "tok".to_string()).unwrap();
        let service = FavoriteService::new(client, Arc::clone(&state));

        let err = service
            .save("bookmark", "/results", "MATCH (n) RETURN n")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Api(ApiError::Http { status: 500, .. })));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
