//! Authenticated JSON transport shared by the platform clients

use std::time::Duration;

use beacon_core::error::ForgeError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::Result;

const USER_AGENT_VALUE: &str = concat!("beacon/", env!("CARGO_PKG_VERSION"));

/// A reqwest client bound to one API root and one credential
#[derive(Clone)]
pub(crate) struct ApiTransport {
    client: Client,
    api_url: String,
}

impl ApiTransport {
    /// Build a transport. `auth` is the full `Authorization` header value.
    pub(crate) fn new(api_url: &str, auth: Option<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(auth) = auth {
            let mut value = HeaderValue::from_str(&auth)
                .map_err(|_| ForgeError::InvalidOptions("token contains invalid characters".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `path` and decode the body. `resource` names the request in errors.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        resource: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.api_url, path);
        debug!(url = %url, ?query, "API request");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let rate_limit_exhausted = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == "0");
            let message = response.text().await.unwrap_or_default();
            return Err(status_error(status, rate_limit_exhausted, resource, message));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ForgeError::InvalidResponse {
            resource: resource.to_string(),
            message: e.to_string(),
        })
    }

    /// Like [`get_json`](Self::get_json) but a 404 yields `None`
    pub(crate) async fn get_json_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        resource: &str,
    ) -> Result<Option<T>> {
        match self.get_json(path, &[], resource).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Page size for a listing bounded by `max`, capped at `cap`
pub(crate) fn page_size(max: usize, cap: u32) -> u32 {
    u32::try_from(max.max(1)).unwrap_or(u32::MAX).min(cap)
}

fn status_error(
    status: StatusCode,
    rate_limit_exhausted: bool,
    resource: &str,
    message: String,
) -> ForgeError {
    let resource = resource.to_string();
    match status {
        StatusCode::NOT_FOUND => ForgeError::NotFound { resource },
        StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited { resource },
        StatusCode::FORBIDDEN if rate_limit_exhausted => ForgeError::RateLimited { resource },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ForgeError::Unauthorized { resource, message }
        }
        _ => ForgeError::Api {
            resource,
            status: status.as_u16(),
            message,
        },
    }
}
