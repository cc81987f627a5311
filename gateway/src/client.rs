//! Gateway REST client implementation

use crate::{
    error::GatewayError,
    types::{AuthUser, Filter, OrderBy, Session},
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Typed REST client for the hosted persistence + auth gateway.
///
/// Table operations speak the gateway's `rest/v1` dialect: equality and
/// membership filters as `column=op.value` query pairs, ordering via the
/// `order` parameter, and `Prefer: return=representation` to get inserted
/// or updated rows back. Auth operations speak the `auth/v1` session
/// endpoints.
///
/// Signing in stores the session token; subsequent requests use it as the
/// bearer credential, falling back to the public API key when no session
/// is held.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    api_key: String,
    session_token: Arc<RwLock<Option<String>>>,
}

impl RestClient {
    /// Create a new client with service URL and API key from the environment
    ///
    /// Reads `GATEWAY_URL` and `GATEWAY_ANON_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingConfig`] if either variable is not set.
    pub fn from_env() -> Result<Self, GatewayError> {
        let base_url = std::env::var("GATEWAY_URL")
            .map_err(|_| GatewayError::MissingConfig("GATEWAY_URL"))?;
        let api_key = std::env::var("GATEWAY_ANON_KEY")
            .map_err(|_| GatewayError::MissingConfig("GATEWAY_ANON_KEY"))?;

        Ok(Self::new(base_url, api_key))
    }

    /// Create a new client with an explicit service URL and API key
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            client: Client::new(),
            base_url,
            api_key: api_key.into(),
            session_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Store a session token to use as the bearer credential
    pub async fn set_session(&self, access_token: impl Into<String>) {
        *self.session_token.write().await = Some(access_token.into());
    }

    /// Forget the stored session token
    pub async fn clear_session(&self) {
        *self.session_token.write().await = None;
    }

    /// Whether a session token is currently held
    pub async fn has_session(&self) -> bool {
        self.session_token.read().await.is_some()
    }

    async fn bearer(&self) -> String {
        self.session_token
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.api_key.clone())
    }

    async fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer().await)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn query_pairs(filters: &[Filter], order: Option<&OrderBy>) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> =
            filters.iter().map(Filter::to_query_pair).collect();
        if let Some(order) = order {
            pairs.push(("order".to_string(), order.to_query_value()));
        }
        pairs
    }

    /// Read all rows matching the filters
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RequestFailed`] for network failures,
    /// [`GatewayError::Unauthorized`] for credential problems, and
    /// [`GatewayError::ApiError`] for other gateway failures.
    #[tracing::instrument(skip(self, filters, order))]
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&OrderBy>,
    ) -> Result<Vec<T>, GatewayError> {
        let request = self
            .authed(self.client.get(self.table_url(table)))
            .await
            .query(&Self::query_pairs(filters, order));

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        read_json(response).await
    }

    /// Read exactly one row matching the filters
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] when no row (or more than one row)
    /// matches, plus the same failures as [`RestClient::select`].
    #[tracing::instrument(skip(self, filters))]
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<T, GatewayError> {
        let request = self
            .authed(self.client.get(self.table_url(table)))
            .await
            .header("accept", "application/vnd.pgrst.object+json")
            .query(&Self::query_pairs(filters, None));

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        read_json(response).await
    }

    /// Insert one or many rows, returning the inserted rows
    ///
    /// # Errors
    ///
    /// Same failure modes as [`RestClient::select`].
    #[tracing::instrument(skip(self, rows))]
    pub async fn insert<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        rows: &B,
    ) -> Result<Vec<T>, GatewayError> {
        let request = self
            .authed(self.client.post(self.table_url(table)))
            .await
            .header("prefer", "return=representation")
            .json(rows);

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        read_json(response).await
    }

    /// Insert a single row, returning it
    ///
    /// # Errors
    ///
    /// Same failure modes as [`RestClient::select_one`].
    #[tracing::instrument(skip(self, row))]
    pub async fn insert_one<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T, GatewayError> {
        let request = self
            .authed(self.client.post(self.table_url(table)))
            .await
            .header("prefer", "return=representation")
            .header("accept", "application/vnd.pgrst.object+json")
            .json(row);

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        read_json(response).await
    }

    /// Update fields on rows matching the filters, returning updated rows
    ///
    /// # Errors
    ///
    /// Same failure modes as [`RestClient::select`].
    #[tracing::instrument(skip(self, patch, filters))]
    pub async fn update<T: DeserializeOwned>(
        &self,
        table: &str,
        patch: &serde_json::Value,
        filters: &[Filter],
    ) -> Result<Vec<T>, GatewayError> {
        let request = self
            .authed(self.client.patch(self.table_url(table)))
            .await
            .header("prefer", "return=representation")
            .query(&Self::query_pairs(filters, None))
            .json(patch);

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        read_json(response).await
    }

    /// Update exactly one row matching the filters, returning it
    ///
    /// # Errors
    ///
    /// Same failure modes as [`RestClient::select_one`].
    #[tracing::instrument(skip(self, patch, filters))]
    pub async fn update_one<T: DeserializeOwned>(
        &self,
        table: &str,
        patch: &serde_json::Value,
        filters: &[Filter],
    ) -> Result<T, GatewayError> {
        let request = self
            .authed(self.client.patch(self.table_url(table)))
            .await
            .header("prefer", "return=representation")
            .header("accept", "application/vnd.pgrst.object+json")
            .query(&Self::query_pairs(filters, None))
            .json(patch);

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        read_json(response).await
    }

    /// Delete rows matching the filters
    ///
    /// # Errors
    ///
    /// Same failure modes as [`RestClient::select`].
    #[tracing::instrument(skip(self, filters))]
    pub async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), GatewayError> {
        let request = self
            .authed(self.client.delete(self.table_url(table)))
            .await
            .query(&Self::query_pairs(filters, None));

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        read_empty(response).await
    }

    /// Register a new credential pair, returning the opened session
    ///
    /// The session token is stored for subsequent requests.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`RestClient::select`].
    #[tracing::instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let response = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        let session: Session = read_json(response).await?;
        self.set_session(session.access_token.clone()).await;
        Ok(session)
    }

    /// Open a session with an existing credential pair
    ///
    /// The session token is stored for subsequent requests.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] for bad credentials, plus the
    /// same failures as [`RestClient::select`].
    #[tracing::instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        let session: Session = read_json(response).await?;
        self.set_session(session.access_token.clone()).await;
        Ok(session)
    }

    /// Close the current session
    ///
    /// The stored session token is cleared even if the remote call fails.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`RestClient::select`].
    #[tracing::instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), GatewayError> {
        let request = self.authed(self.client.post(self.auth_url("logout"))).await;
        self.clear_session().await;

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        read_empty(response).await
    }

    /// Fetch the user behind the stored session token
    ///
    /// Resolves to `None` when no session is held or the session has
    /// expired; an absent session is not an error.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`RestClient::select`], except that
    /// unauthorized responses resolve to `Ok(None)`.
    #[tracing::instrument(skip(self))]
    pub async fn current_user(&self) -> Result<Option<AuthUser>, GatewayError> {
        if !self.has_session().await {
            return Ok(None);
        }

        let response = self
            .authed(self.client.get(self.auth_url("user")))
            .await
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }

        read_json(response).await.map(Some)
    }
}

/// Map a gateway response to a deserialized body or an error
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    match status {
        s if s.is_success() => response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::ResponseParseFailed(e.to_string())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GatewayError::Unauthorized),
        StatusCode::NOT_FOUND | StatusCode::NOT_ACCEPTABLE => Err(GatewayError::NotFound),
        status => {
            let body = response.text().await.unwrap_or_default();
            Err(GatewayError::ApiError {
                status: status.as_u16(),
                message: body,
            })
        },
    }
}

/// Map a gateway response with no interesting body to `()` or an error
async fn read_empty(response: Response) -> Result<(), GatewayError> {
    let status = response.status();
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GatewayError::Unauthorized),
        StatusCode::NOT_FOUND | StatusCode::NOT_ACCEPTABLE => Err(GatewayError::NotFound),
        status => {
            let body = response.text().await.unwrap_or_default();
            Err(GatewayError::ApiError {
                status: status.as_u16(),
                message: body,
            })
        },
    }
}
