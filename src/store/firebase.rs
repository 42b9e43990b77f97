use async_trait::async_trait;
use reqwest::header::{ETAG, IF_MATCH};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde_json::Value;

use super::{CounterStore, PROBE_PATH, probe_document};
use crate::allowlist::{MetricTarget, Namespace};
use crate::error::StoreError;
use crate::models::coerce_count;

// Same bound the Firebase SDKs put on a transaction
pub const MAX_TRANSACTION_ATTEMPTS: u32 = 25;

const ETAG_REQUEST_HEADER: &str = "X-Firebase-ETag";

/// Firebase Realtime Database over its REST API.
///
/// Increments are conditional writes: read the value together with its ETag,
/// `PUT` the successor with `if-match`, and start over on `412`. The database
/// only accepts the write if nobody changed the value in between, so
/// concurrent writers on any number of processes never lose an update.
pub struct FirebaseStore {
    client: reqwest::Client,
    base: Url,
    auth: Option<String>,
    max_attempts: u32,
}

impl FirebaseStore {
    pub fn new(
        client: reqwest::Client,
        database_url: &str,
        auth: Option<String>,
    ) -> Result<Self, StoreError> {
        let base = Url::parse(database_url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(database_url.to_string()));
        }

        Ok(Self {
            client,
            base,
            auth,
            max_attempts: MAX_TRANSACTION_ATTEMPTS,
        })
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    // "sources/resume" -> https://<db>/sources/resume.json[?auth=...]
    pub fn url(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            let mut parts = path.split('/').filter(|p| !p.is_empty()).peekable();
            while let Some(part) = parts.next() {
                if parts.peek().is_some() {
                    segments.push(part);
                } else {
                    segments.push(&format!("{part}.json"));
                }
            }
        }
        if let Some(auth) = &self.auth {
            url.query_pairs_mut().append_pair("auth", auth);
        }
        url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    async fn get_value(&self, path: &str) -> Result<Value, StoreError> {
        let res = self.request(Method::GET, path).send().await?;
        if !res.status().is_success() {
            return Err(StoreError::Status(res.status().as_u16()));
        }
        let bytes = res.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    // Value plus the ETag the next conditional write must match
    async fn get_with_etag(&self, path: &str) -> Result<(Value, String), StoreError> {
        let res = self
            .request(Method::GET, path)
            .header(ETAG_REQUEST_HEADER, "true")
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(StoreError::Status(res.status().as_u16()));
        }

        let etag = res
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or(StoreError::Protocol("missing ETag on conditional read"))?;

        let bytes = res.bytes().await?;
        Ok((serde_json::from_slice(&bytes)?, etag))
    }
}

#[async_trait]
impl CounterStore for FirebaseStore {
    async fn read_namespace(&self, namespace: Namespace) -> Result<Value, StoreError> {
        self.get_value(namespace.as_str()).await
    }

    async fn increment(&self, target: &MetricTarget) -> Result<u64, StoreError> {
        let path = target.path();

        for attempt in 1..=self.max_attempts {
            let (current, etag) = self.get_with_etag(&path).await?;
            let next = coerce_count(Some(&current))
                .checked_add(1)
                .ok_or_else(|| StoreError::Overflow { path: path.clone() })?;

            let res = self
                .request(Method::PUT, &path)
                .header(IF_MATCH, etag)
                .json(&next)
                .send()
                .await?;

            match res.status() {
                status if status.is_success() => return Ok(next),
                StatusCode::PRECONDITION_FAILED => {
                    tracing::debug!(%path, attempt, "conditional write lost a race, retrying");
                }
                status => return Err(StoreError::Status(status.as_u16())),
            }
        }

        Err(StoreError::Contention {
            attempts: self.max_attempts,
        })
    }

    async fn probe(&self) -> Result<Value, StoreError> {
        let res = self
            .request(Method::PUT, PROBE_PATH)
            .json(&probe_document())
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(StoreError::Status(res.status().as_u16()));
        }

        self.get_value(PROBE_PATH).await
    }
}
