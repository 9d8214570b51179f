//! Authenticated request helper and endpoint wrappers.
//!
//! ERROR HANDLING
//! ==============
//! Every call returns `Result<_, ApiError>`. Non-success statuses become
//! `ApiError::Status` with the message the backend put in its body; showing
//! that message to the user is the controller's job.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::request::{RequestOptions, default_headers, error_message_from_body, merge_headers};
use super::types::{
    CurrentUser, Link, LinkList, LoginRequest, LoginResponse, MessageResponse, NewLink, SignupRequest,
};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::Session;

// =============================================================================
// ENDPOINTS
// =============================================================================

pub const SIGNUP_PATH: &str = "/signup";
pub const LOGIN_PATH: &str = "/login";
pub const USER_PATH: &str = "/user";
pub const ADD_LINK_PATH: &str = "/add_link";
pub const USER_LINKS_PATH: &str = "/user_links";
pub const HEALTH_PATH: &str = "/test";

fn delete_link_path(link_id: &str) -> String {
    format!("/delete_link/{link_id}")
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client bound to one backend origin.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the base URL is not absolute or the HTTP client
    /// cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim_end_matches('/').to_owned();
        Url::parse(&base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.clone()))?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send one request and return the raw success body.
    ///
    /// Attaches the default headers for `session`, overlaid with
    /// `options.headers`.
    ///
    /// # Errors
    ///
    /// `ApiError::Network` if no response arrives, `ApiError::Status` on a
    /// non-success status.
    pub async fn request(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<String, ApiError> {
        let headers = merge_headers(default_headers(session.token())?, &options.headers);
        let mut builder = self.http.request(method.clone(), self.url(path)).headers(headers);
        if let Some(body) = &options.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.inspect_err(|e| {
            warn!(%method, path, error = %e, "request failed before response");
        })?;
        let status = response.status();
        let text = response.text().await?;
        debug!(%method, path, status = status.as_u16(), "response received");

        if !status.is_success() {
            let message = error_message_from_body(status.as_u16(), &text);
            warn!(%method, path, status = status.as_u16(), %message, "request rejected");
            return Err(ApiError::Status { status: status.as_u16(), message });
        }
        Ok(text)
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let text = self.request(session, method, path, options).await?;
        parse_body(&text)
    }

    /// `POST /signup`.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn signup(&self, session: &Session, body: &SignupRequest<'_>) -> Result<MessageResponse, ApiError> {
        self.request_json(session, Method::POST, SIGNUP_PATH, RequestOptions::json(to_value(body)?))
            .await
    }

    /// `POST /login`. A success response without a token is
    /// `ApiError::MissingToken`.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn login(&self, session: &Session, body: &LoginRequest<'_>) -> Result<String, ApiError> {
        let response: LoginResponse = self
            .request_json(session, Method::POST, LOGIN_PATH, RequestOptions::json(to_value(body)?))
            .await?;
        response.token.filter(|t| !t.is_empty()).ok_or(ApiError::MissingToken)
    }

    /// `GET /user`.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn current_user(&self, session: &Session) -> Result<CurrentUser, ApiError> {
        self.request_json(session, Method::GET, USER_PATH, RequestOptions::default()).await
    }

    /// `POST /add_link`. The backend may echo the link or just a message;
    /// only the message is kept.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn add_link(&self, session: &Session, body: &NewLink<'_>) -> Result<MessageResponse, ApiError> {
        let text = self
            .request(session, Method::POST, ADD_LINK_PATH, RequestOptions::json(to_value(body)?))
            .await?;
        Ok(parse_body::<MessageResponse>(&text).unwrap_or_default())
    }

    /// `GET /user_links`.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn user_links(&self, session: &Session) -> Result<Vec<Link>, ApiError> {
        let list: LinkList = self
            .request_json(session, Method::GET, USER_LINKS_PATH, RequestOptions::default())
            .await?;
        Ok(list.links)
    }

    /// `DELETE /delete_link/{id}`.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn delete_link(&self, session: &Session, link_id: &str) -> Result<MessageResponse, ApiError> {
        let text = self
            .request(session, Method::DELETE, &delete_link_path(link_id), RequestOptions::default())
            .await?;
        Ok(parse_body::<MessageResponse>(&text).unwrap_or_default())
    }

    /// `GET /test`, the backend's health endpoint.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn ping(&self, session: &Session) -> Result<MessageResponse, ApiError> {
        let text = self
            .request(session, Method::GET, HEALTH_PATH, RequestOptions::default())
            .await?;
        Ok(parse_body::<MessageResponse>(&text).unwrap_or_default())
    }
}

fn to_value<T: serde::Serialize>(body: &T) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}
