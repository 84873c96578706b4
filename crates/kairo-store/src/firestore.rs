//! Firestore REST client for per-user schedules.
//!
//! Documents live at `users/{uid}/schedules/{id}`, one per entry, every
//! field a string. A replace is one `:commit` holding a delete for each
//! existing document and an update for each new entry.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

use kairo_core::config::StoreConfig;
use kairo_core::types::ScheduleEntry;

use crate::{validate_user_id, ScheduleStore, StoreError};

const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime requested for the signed assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh the access token this long before it expires.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;
const LIST_PAGE_SIZE: &str = "300";

// ─────────────────────────────────────────────
// Access tokens
// ─────────────────────────────────────────────

/// Claims of the service-account assertion.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Clone, Debug)]
struct CachedToken {
    value: String,
    expires_at: i64,
}

impl CachedToken {
    fn is_fresh(&self, now: i64) -> bool {
        self.expires_at - TOKEN_REFRESH_MARGIN_SECS > now
    }
}

enum TokenSource {
    /// Exchange a signed JWT for an access token at `token_uri`.
    ServiceAccount {
        client_email: String,
        token_uri: String,
        key: EncodingKey,
    },
    /// A fixed bearer token (emulator).
    Static(String),
}

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<DocumentRef>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentRef {
    name: String,
}

// ─────────────────────────────────────────────
// FirestoreStore
// ─────────────────────────────────────────────

pub struct FirestoreStore {
    client: reqwest::Client,
    api_base: String,
    project_id: String,
    source: TokenSource,
    token: RwLock<Option<CachedToken>>,
}

impl FirestoreStore {
    /// Build a store from service-account settings.
    ///
    /// Fails when the private key is not a valid RSA PEM.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())
            .map_err(|e| StoreError::Auth(format!("invalid private key: {e}")))?;
        Ok(Self::with_source(
            &config.api_base,
            &config.project_id,
            TokenSource::ServiceAccount {
                client_email: config.client_email.clone(),
                token_uri: config.token_uri.clone(),
                key,
            },
        ))
    }

    /// Build a store that always sends `token` (e.g. `"owner"` for the emulator).
    pub fn with_access_token(api_base: &str, project_id: &str, token: &str) -> Self {
        Self::with_source(api_base, project_id, TokenSource::Static(token.to_string()))
    }

    fn with_source(api_base: &str, project_id: &str, source: TokenSource) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            source,
            token: RwLock::new(None),
        }
    }

    /// Resource name of the database's document root.
    fn documents_root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    /// Resource name of a user's schedule collection.
    fn schedules_path(&self, user_id: &str) -> String {
        format!("{}/users/{}/schedules", self.documents_root(), user_id)
    }

    /// List URL of a user's schedule collection, each segment percent-encoded.
    fn schedules_url(&self, user_id: &str) -> Result<reqwest::Url, StoreError> {
        let invalid = || StoreError::InvalidApiBase(self.api_base.clone());
        let mut url = reqwest::Url::parse(&self.api_base).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend([
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                "users",
                user_id,
                "schedules",
            ]);
        Ok(url)
    }

    /// Current bearer token, refreshed when close to expiry.
    async fn access_token(&self) -> Result<String, StoreError> {
        let (client_email, token_uri, key) = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::ServiceAccount {
                client_email,
                token_uri,
                key,
            } => (client_email, token_uri, key),
        };

        let now = chrono::Utc::now().timestamp();
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
                return Ok(token.value.clone());
            }
        }

        let mut cached = self.token.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let claims = AssertionClaims {
            iss: client_email,
            scope: DATASTORE_SCOPE,
            aud: token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, key)
            .map_err(|e| StoreError::Auth(format!("failed to sign assertion: {e}")))?;

        debug!(token_uri = %token_uri, "Requesting Firestore access token");
        let response = self
            .client
            .post(token_uri.as_str())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let response = check_status(response).await.map_err(|e| match e {
            StoreError::Status { status, body } => {
                StoreError::Auth(format!("token endpoint returned {status}: {body}"))
            }
            other => other,
        })?;
        let token: TokenResponse = response.json().await?;

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: now + token.expires_in,
        });
        Ok(token.access_token)
    }

    /// Full resource names of every document in the user's collection.
    async fn list_document_names(
        &self,
        user_id: &str,
        token: &str,
    ) -> Result<Vec<String>, StoreError> {
        let url = self.schedules_url(user_id)?;
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(url.clone())
                .bearer_auth(token)
                .query(&[("pageSize", LIST_PAGE_SIZE)]);
            if let Some(page) = &page_token {
                request = request.query(&[("pageToken", page.as_str())]);
            }

            let response = request.send().await?;
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                break;
            }
            let page: ListDocumentsResponse = check_status(response).await?.json().await?;
            names.extend(page.documents.into_iter().map(|d| d.name));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(names)
    }
}

#[async_trait]
impl ScheduleStore for FirestoreStore {
    async fn replace_all(
        &self,
        user_id: &str,
        entries: &[ScheduleEntry],
    ) -> Result<(), StoreError> {
        validate_user_id(user_id)?;
        let token = self.access_token().await?;
        let existing = self.list_document_names(user_id, &token).await?;

        let collection = self.schedules_path(user_id);
        let mut writes: Vec<Value> = existing
            .iter()
            .map(|name| json!({ "delete": name }))
            .collect();
        writes.extend(entries.iter().map(|entry| {
            json!({
                "update": {
                    "name": format!("{}/{}", collection, uuid::Uuid::new_v4().simple()),
                    "fields": entry_fields(entry),
                }
            })
        }));

        if writes.is_empty() {
            debug!(user_id, "Nothing to write");
            return Ok(());
        }

        let url = format!("{}/{}:commit", self.api_base, self.documents_root());
        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({ "writes": writes }))
            .send()
            .await?;
        check_status(response).await?;

        info!(
            user_id,
            deleted = existing.len(),
            written = entries.len(),
            "Schedule replaced"
        );
        Ok(())
    }

    fn display_name(&self) -> &str {
        "firestore"
    }
}

/// Firestore `fields` map for one entry; every value is a `stringValue`.
fn entry_fields(entry: &ScheduleEntry) -> Map<String, Value> {
    [
        ("name", &entry.name),
        ("day_of_week", &entry.day_of_week),
        ("start_time", &entry.start_time),
        ("end_time", &entry.end_time),
        ("room", &entry.room),
        ("specific_date", &entry.specific_date),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), json!({ "stringValue": value })))
    .collect()
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body: kairo_core::utils::truncate_string(&body, 300),
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
