//! HTTP client for the hosted document platform.
//!
//! Thin JSON-over-REST client in front of the platform's document API and
//! callable functions. Requests are issued one at a time on a runtime the
//! store owns; there are no retries, and the platform's own timeout
//! defaults apply on top of the client-side deadline here.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use url::Url;

use crate::error::{CoreError, StoreError};

use super::{contact_path, user_path, ContactRecord, Directory, DocumentStore, InviteDetails, UserRecord};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// reqwest-backed [`DocumentStore`] and [`Directory`].
pub struct HttpStore {
    base_url: Url,
    token: String,
    client: Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpStore {
    /// Build a client against `base_url` with a bearer session token.
    pub fn new(base_url: &str, token: &str) -> Result<Self, CoreError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            CoreError::Custom(format!("invalid platform base URL '{base_url}': {e}"))
        })?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(StoreError::Network)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            base_url,
            token: token.to_string(),
            client,
            runtime,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(path)
            .map_err(|e| StoreError::MalformedResponse {
                path: path.to_string(),
                message: format!("invalid endpoint: {e}"),
            })
    }

    fn require_token(&self) -> Result<(), StoreError> {
        if self.token.is_empty() {
            return Err(StoreError::NotAuthenticated);
        }
        Ok(())
    }

    fn check_status(status: StatusCode, path: &str) -> Result<(), StoreError> {
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(StoreError::SessionInvalidated),
            StatusCode::FORBIDDEN => Err(StoreError::PermissionDenied {
                path: path.to_string(),
            }),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                Err(StoreError::Timeout {
                    path: path.to_string(),
                })
            }
            other => Err(StoreError::MalformedResponse {
                path: path.to_string(),
                message: format!("unexpected HTTP status {other}"),
            }),
        }
    }

    fn wrap_transport(err: reqwest::Error, path: &str) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout {
                path: path.to_string(),
            }
        } else {
            StoreError::Network(err)
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        self.require_token()?;
        let url = self.endpoint(path)?;
        let resp = self
            .runtime
            .block_on(self.client.get(url).bearer_auth(&self.token).send())
            .map_err(|e| Self::wrap_transport(e, path))?;
        Self::check_status(resp.status(), path)?;
        self.runtime
            .block_on(resp.json::<T>())
            .map_err(|e| StoreError::MalformedResponse {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    fn send_json<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), StoreError> {
        self.require_token()?;
        let url = self.endpoint(path)?;
        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let resp = self
            .runtime
            .block_on(request.send())
            .map_err(|e| Self::wrap_transport(e, path))?;
        Self::check_status(resp.status(), path)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        self.require_token()?;
        let url = self.endpoint(path)?;
        let resp = self
            .runtime
            .block_on(
                self.client
                    .post(url)
                    .bearer_auth(&self.token)
                    .json(body)
                    .send(),
            )
            .map_err(|e| Self::wrap_transport(e, path))?;
        Self::check_status(resp.status(), path)?;
        self.runtime
            .block_on(resp.json::<T>())
            .map_err(|e| StoreError::MalformedResponse {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    fn encoded_user_path(user_id: &str) -> String {
        format!("users/{}", urlencoding::encode(user_id))
    }

    fn encoded_contact_path(owner_id: &str, contact_id: &str) -> String {
        format!(
            "users/{}/contacts/{}",
            urlencoding::encode(owner_id),
            urlencoding::encode(contact_id)
        )
    }
}

impl DocumentStore for HttpStore {
    fn get_user_record(&self, user_id: &str) -> Result<UserRecord, StoreError> {
        self.get_json(&Self::encoded_user_path(user_id))
            .map_err(|e| rewrite_not_found(e, user_path(user_id)))
    }

    fn create_user_record(&self, record: &UserRecord) -> Result<(), StoreError> {
        self.send_json(
            reqwest::Method::PUT,
            &Self::encoded_user_path(&record.user_id),
            Some(record),
        )
    }

    fn update_user_record(&self, record: &UserRecord) -> Result<(), StoreError> {
        self.send_json(
            reqwest::Method::PATCH,
            &Self::encoded_user_path(&record.user_id),
            Some(record),
        )
    }

    fn list_contacts(&self, owner_id: &str) -> Result<Vec<ContactRecord>, StoreError> {
        self.get_json(&format!(
            "users/{}/contacts",
            urlencoding::encode(owner_id)
        ))
    }

    fn get_contact(&self, owner_id: &str, contact_id: &str) -> Result<ContactRecord, StoreError> {
        self.get_json(&Self::encoded_contact_path(owner_id, contact_id))
            .map_err(|e| rewrite_not_found(e, contact_path(owner_id, contact_id)))
    }

    fn put_contact(&self, owner_id: &str, record: &ContactRecord) -> Result<(), StoreError> {
        self.send_json(
            reqwest::Method::PUT,
            &Self::encoded_contact_path(owner_id, &record.contact_id),
            Some(record),
        )
    }

    fn delete_contact(&self, owner_id: &str, contact_id: &str) -> Result<(), StoreError> {
        self.send_json::<()>(
            reqwest::Method::DELETE,
            &Self::encoded_contact_path(owner_id, contact_id),
            None,
        )
    }
}

impl Directory for HttpStore {
    fn lookup_invite(&self, code: &str) -> Result<InviteDetails, StoreError> {
        self.post_json("functions/lookupInvite", &json!({ "code": code }))
    }
}

/// Error paths carry the un-encoded document path for readability.
fn rewrite_not_found(err: StoreError, path: String) -> StoreError {
    match err {
        StoreError::NotFound { .. } => StoreError::NotFound { path },
        other => other,
    }
}
