use crate::api::models::{CypherRequest, CypherResponse, DatasetInfo, FavoritePayload};
use crate::error::ApiError;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("cnx-cli/", env!("CARGO_PKG_VERSION"));

const CUSTOM_ENDPOINT: &str = "/api/custom/custom";
const DATASETS_ENDPOINT: &str = "/api/dbmeta/datasets";
const FAVORITES_ENDPOINT: &str = "/api/user/favorites";

#[derive(Debug, Clone)]
pub struct NeuprintClient {
    client: Client,
    pub base_url: String,
    pub token: Option<String>,
}

impl NeuprintClient {
    // Create base client with default settings
    pub fn new(base_url: String) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Http {
                status: 0,
                endpoint: "client_init".to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(NeuprintClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(base_url: String, token: String) -> Result<Self, ApiError> {
        let mut client = NeuprintClient::new(base_url)?;
        client.token = Some(token);
        Ok(client)
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn build_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        request
    }

    pub async fn handle_response<T>(
        &self,
        response: Response,
        endpoint: &str,
    ) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();

        if status.is_success() {
            response.json::<T>().await.map_err(|e| ApiError::Http {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            match status.as_u16() {
                401 | 403 => Err(ApiError::Unauthorized {
                    status: status.as_u16(),
                    endpoint: endpoint.to_string(),
                    server_message: error_text,
                }),
                408 | 504 => Err(ApiError::Timeout {
                    timeout_secs: DEFAULT_TIMEOUT_SECS,
                    endpoint: endpoint.to_string(),
                }),
                _ => Err(ApiError::Http {
                    status: status.as_u16(),
                    endpoint: endpoint.to_string(),
                    message: error_text,
                }),
            }
        }
    }

    /// Execute Cypher text against one dataset. The response is returned
    /// uninterpreted.
    pub async fn execute_cypher(
        &self,
        dataset: &str,
        cypher: &str,
        parameters: &HashMap<String, Value>,
    ) -> Result<CypherResponse, ApiError> {
        let body = CypherRequest {
            cypher: cypher.to_string(),
            dataset: dataset.to_string(),
            parameters: parameters.clone(),
        };

        let response = self
            .build_request(Method::POST, CUSTOM_ENDPOINT)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(e, CUSTOM_ENDPOINT))?;

        self.handle_response(response, CUSTOM_ENDPOINT).await
    }

    /// Dataset metadata, including the ROIs available per dataset.
    pub async fn list_datasets(&self) -> Result<HashMap<String, DatasetInfo>, ApiError> {
        let response = self
            .build_request(Method::GET, DATASETS_ENDPOINT)
            .send()
            .await
            .map_err(|e| request_error(e, DATASETS_ENDPOINT))?;

        self.handle_response(response, DATASETS_ENDPOINT).await
    }

    /// Save a bookmark against the user account. Requires a bearer token;
    /// expired credentials surface as `ApiError::Unauthorized`.
    pub async fn save_favorite(&self, payload: &FavoritePayload) -> Result<(), ApiError> {
        let response = self
            .build_request(Method::POST, FAVORITES_ENDPOINT)
            .json(payload)
            .send()
            .await
            .map_err(|e| request_error(e, FAVORITES_ENDPOINT))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Reuse the standard status mapping for the error arm.
        self.handle_response::<serde_json::Value>(response, FAVORITES_ENDPOINT)
            .await
            .map(|_| ())
    }
}

fn request_error(error: reqwest::Error, endpoint: &str) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoint: endpoint.to_string(),
        }
    } else {
        ApiError::Http {
            status: 0,
            endpoint: endpoint.to_string(),
            message: format!("Request failed: {}", error),
        }
    }
}
