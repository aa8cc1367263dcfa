//! GraphQL client for the primary site.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use alextras_cache::keys::{USER_ID_TTL, USER_IDS_STORE, user_id_key};
use alextras_core::traits::{ExpiringCache, ExpiringCacheExt};
use alextras_core::types::{IdKind, MediaType};
use alextras_core::{AppError, AppResult};

use crate::client::ApiClient;

const USER_ID_QUERY: &str = "query ($username: String) { User(name: $username) { id } }";

/// Primary-site GraphQL API.
#[derive(Debug, Clone)]
pub struct AniListApi {
    client: ApiClient,
    endpoint: String,
    cache: Arc<dyn ExpiringCache>,
    token: Option<String>,
}

impl AniListApi {
    /// Create an API handle on the configured endpoint.
    pub fn new(client: ApiClient, cache: Arc<dyn ExpiringCache>) -> Self {
        let endpoint = client.config().anilist_url.clone();
        Self {
            client,
            endpoint,
            cache,
            token: None,
        }
    }

    /// Authenticate requests with a user's access token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Run a GraphQL query and return its `data` member.
    ///
    /// A "not found" answer yields `data: null` rather than an error.
    pub async fn query(&self, query: &str, variables: Value) -> AppResult<Value> {
        let mut request = self
            .client
            .http()
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = self.client.execute("anilist", request).await?;

        match response.status {
            StatusCode::OK | StatusCode::NOT_FOUND => {
                if let Some(errors) = response.body.get("errors") {
                    debug!(errors = %errors, "GraphQL errors in response");
                }
                Ok(response.body.get("data").cloned().unwrap_or(Value::Null))
            }
            StatusCode::BAD_REQUEST => Err(AppError::validation(format!(
                "anilist rejected query: {}",
                first_error(&response.body)
            ))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::external_service(
                format!("anilist rejected credentials: {}", first_error(&response.body)),
            )),
            status => Err(AppError::external_service(format!(
                "anilist returned {status}: {}",
                first_error(&response.body)
            ))),
        }
    }

    /// Look up the `to` identifier of an entry known by its `from` identifier.
    #[instrument(skip(self), fields(from = %from, to = %to))]
    pub async fn media_id(
        &self,
        from_id: u64,
        from: IdKind,
        to: IdKind,
        media_type: MediaType,
    ) -> AppResult<Option<u64>> {
        let query = format!(
            "query ($id: Int, $type: MediaType) {{ Media({}: $id, type: $type) {{ {} }} }}",
            from.graphql_field(),
            to.graphql_field()
        );
        let data = self
            .query(&query, json!({ "id": from_id, "type": media_type.as_graphql() }))
            .await?;

        Ok(data
            .get("Media")
            .and_then(|media| media.get(to.graphql_field()))
            .and_then(Value::as_u64))
    }

    /// Resolve a username to its user id. Matches are cached for an hour.
    #[instrument(skip(self))]
    pub async fn resolve_user_id(&self, username: &str) -> AppResult<Option<u64>> {
        if username.trim().is_empty() {
            return Err(AppError::validation("Missing username"));
        }

        let key = user_id_key(username);
        if let Some(id) = self.cache.get_typed::<u64>(USER_IDS_STORE, &key).await? {
            return Ok(Some(id));
        }

        let data = self.query(USER_ID_QUERY, json!({ "username": key })).await?;
        let Some(id) = data
            .get("User")
            .and_then(|user| user.get("id"))
            .and_then(Value::as_u64)
        else {
            return Ok(None);
        };

        self.cache.set_typed(USER_IDS_STORE, &key, &id, USER_ID_TTL).await?;
        Ok(Some(id))
    }
}

fn first_error(body: &Value) -> String {
    body.pointer("/errors/0/message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string()
}
