// Table store HTTP client
//
// Wraps `reqwest::Client` with store-specific URL construction and
// envelope unwrapping. Endpoint families (coupons, offers) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use std::time::Duration;

use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::table::records::{Record, RecordList, StoreErrorBody, UpdateRequest};
use crate::transport::TransportConfig;

/// Connection settings for the table store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store base URL (e.g. `https://tables.lacuponera.com`).
    pub base_url: Url,
    /// Bearer token for the store API.
    pub api_token: SecretString,
    /// Request timeout.
    pub timeout: Duration,
}

/// Raw HTTP client for the table store.
///
/// Handles the `{"records": [...]}` envelope and the
/// `{"error": {"type", "message"}}` failure body. All methods return
/// unwrapped record payloads -- the envelope is stripped before the
/// caller sees it.
pub struct TableClient {
    http: reqwest::Client,
    base_url: Url,
}

impl TableClient {
    /// Create a new client from a `StoreConfig`.
    pub fn new(config: &StoreConfig) -> Result<Self, Error> {
        let transport = TransportConfig {
            timeout: config.timeout,
        };
        let http = transport.build_client(&config.api_token)?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Used by tests that want to point an unauthenticated client at a
    /// mock server.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The store base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/v1/tables/{table}/records`.
    pub(crate) fn records_url(&self, table: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/v1/tables/{table}/records"))?)
    }

    /// Build `{base}/v1/tables/{table}/records/{id}`.
    pub(crate) fn record_url(&self, table: &str, id: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/v1/tables/{table}/records/{id}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET a record list, optionally filtered on one column:
    /// `?field=<name>&equals=<value>`.
    pub(crate) async fn get_records<T: DeserializeOwned>(
        &self,
        table: &str,
        filter: Option<(&str, &str)>,
    ) -> Result<Vec<Record<T>>, Error> {
        let mut url = self.records_url(table)?;
        if let Some((field, value)) = filter {
            url.query_pairs_mut()
                .append_pair("field", field)
                .append_pair("equals", value);
        }
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let list: RecordList<T> = Self::parse_body(resp).await?;
        Ok(list.records)
    }

    /// GET a single record by id. A 404 maps to `Error::RecordNotFound`.
    pub(crate) async fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<Record<T>, Error> {
        let url = self.record_url(table, id)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::RecordNotFound {
                table: table.into(),
                id: id.into(),
            });
        }
        Self::parse_body(resp).await
    }

    /// POST a JSON body to the table's records collection.
    pub(crate) async fn post_records<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<R, Error> {
        let url = self.records_url(table)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::parse_body(resp).await
    }

    /// PATCH a single record's fields.
    pub(crate) async fn patch_record<T: Serialize + Sync, R: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        fields: T,
    ) -> Result<Record<R>, Error> {
        let url = self.record_url(table, id)?;
        debug!("PATCH {}", url);

        let resp = self
            .http
            .patch(url)
            .json(&UpdateRequest { fields })
            .send()
            .await
            .map_err(Error::Transport)?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::RecordNotFound {
                table: table.into(),
                id: id.into(),
            });
        }
        Self::parse_body(resp).await
    }

    /// Decode a response body, translating non-2xx statuses and the
    /// store's error envelope into `Error` values.
    async fn parse_body<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            let body = resp.text().await.unwrap_or_default();
            let message = decode_error_message(&body)
                .unwrap_or_else(|| "token rejected by the store".into());
            return Err(Error::Authentication { message });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let (kind, message) = match serde_json::from_str::<StoreErrorBody>(&body) {
                Ok(StoreErrorBody { error: Some(inner) }) => (
                    inner.kind,
                    inner.message.unwrap_or_else(|| format!("HTTP {status}")),
                ),
                _ => (None, format!("HTTP {status}: {}", preview(&body))),
            };
            return Err(Error::Store {
                message,
                kind,
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

fn decode_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<StoreErrorBody>(body)
        .ok()?
        .error?
        .message
}

fn preview(body: &str) -> &str {
    &body[..body.len().min(200)]
}
