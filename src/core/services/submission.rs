//! Query submission controller.
//!
//! Executes exactly one descriptor's database call, hands the raw response
//! to the descriptor's processor, and returns the normalized tables plus the
//! child flag. Panel placement is the caller's decision. Submissions are not
//! queued or coalesced; callers disable re-submission UI off the shared
//! querying flag.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::client::NeuprintClient;
use crate::api::models::CypherResponse;
use crate::core::query::{QueryDescriptor, VisType};
use crate::core::results::Table;
use crate::core::state::{AppState, QueryFailure, StateEvent};
use crate::error::{ApiError, AppError, AuthError};

/// Database connector seam; the production implementation is the neuPrint
/// HTTP client.
#[async_trait]
pub trait CypherExecutor: Send + Sync {
    async fn execute(
        &self,
        data_set: &str,
        cypher: &str,
        parameters: &HashMap<String, Value>,
    ) -> Result<CypherResponse, ApiError>;
}

#[async_trait]
impl CypherExecutor for NeuprintClient {
    async fn execute(
        &self,
        data_set: &str,
        cypher: &str,
        parameters: &HashMap<String, Value>,
    ) -> Result<CypherResponse, ApiError> {
        self.execute_cypher(data_set, cypher, parameters).await
    }
}

/// Normalized result of one resolved submission.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub tables: Vec<Table>,
    /// True when the descriptor was a chained follow-up; governs panel
    /// placement in the caller, nothing else.
    pub is_child: bool,
    pub source_query: String,
    pub vis_type: VisType,
    pub title: String,
}

#[derive(Debug)]
pub enum Submission {
    Resolved(SubmissionOutcome),
    /// The response arrived after its generation was superseded and was
    /// discarded without being processed into a panel.
    Stale,
}

pub struct SubmissionService<E> {
    executor: E,
    state: Arc<AppState>,
}

impl<E: CypherExecutor> SubmissionService<E> {
    pub fn new(executor: E, state: Arc<AppState>) -> Self {
        SubmissionService { executor, state }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Execute one descriptor. Produces exactly one error or one resolved
    /// outcome; the querying flag is cleared on every exit path.
    pub async fn submit(&self, descriptor: QueryDescriptor) -> crate::Result<Submission> {
        descriptor.validate()?;

        let generation = self.state.current_generation();
        self.state.set_querying(true);
        self.state.emit(StateEvent::QueryStarted { generation });

        let result = self
            .executor
            .execute(
                &descriptor.data_set,
                &descriptor.cypher,
                &descriptor.parameters,
            )
            .await;

        let response = match result {
            Ok(response) => response,
            Err(ApiError::Unauthorized { status, .. }) => {
                self.state.require_reauth();
                self.state.record_failure(QueryFailure::new(
                    status.to_string(),
                    "User must re-authenticate",
                ));
                self.finish();
                return Err(AppError::Auth(AuthError::ReauthRequired));
            }
            Err(error) => {
                self.state.record_failure(failure_from(&error));
                self.finish();
                return Err(AppError::Api(error));
            }
        };

        if self.state.current_generation() != generation {
            self.finish();
            return Ok(Submission::Stale);
        }

        let tables = match descriptor.process(response) {
            Ok(tables) => tables,
            Err(error) => {
                self.state
                    .record_failure(QueryFailure::new("ResultError", error.to_string()));
                self.finish();
                return Err(AppError::Result(error));
            }
        };

        self.state.clear_failure();
        self.finish();

        Ok(Submission::Resolved(SubmissionOutcome {
            tables,
            is_child: descriptor.is_child,
            source_query: descriptor.cypher,
            vis_type: descriptor.vis_type,
            title: descriptor.title,
        }))
    }

    fn finish(&self) {
        self.state.set_querying(false);
        self.state.emit(StateEvent::QueryFinished);
    }
}

fn failure_from(error: &ApiError) -> QueryFailure {
    match error {
        ApiError::Http {
            status, message, ..
        } => QueryFailure::new(status.to_string(), message.clone()),
        ApiError::Timeout { endpoint, .. } => {
            QueryFailure::new("timeout", format!("request to {} timed out", endpoint))
        }
        ApiError::Unauthorized { status, .. } => {
            QueryFailure::new(status.to_string(), "User must re-authenticate")
        }
    }
}
