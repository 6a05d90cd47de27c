use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use posewave_domain::account::{Account, AccountService, Credentials};
use posewave_domain::session::SubscriptionHandle;
use posewave_domain::shared::{AccountId, DomainError};

use crate::config::TimeoutConfig;

/// Client for the hosted account & data service.
///
/// Authentication state lives here: a signed-in session holds the bearer
/// token every data call is made with. The value tree is addressed by
/// slash-separated paths (`histories/<uid>/<date>`), documents by
/// collection and id.
#[derive(Clone)]
pub struct DataServiceClient {
    inner: Arc<Inner>,
}

struct Inner {
    client: Client,
    stream_client: Client,
    base_url: String,
    session: RwLock<Option<AuthSession>>,
}

#[derive(Clone)]
struct AuthSession {
    account: Account,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    uid: String,
    id_token: String,
    email: String,
    #[serde(default)]
    email_verified: bool,
}

#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn text(&self) -> &str {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("unknown error")
    }
}

fn read_failed(e: impl std::fmt::Display) -> DomainError {
    DomainError::RemoteReadFailed(e.to_string())
}

fn write_failed(e: impl std::fmt::Display) -> DomainError {
    DomainError::RemoteWriteFailed(e.to_string())
}

impl DataServiceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DomainError> {
        let base_url = base_url.into();
        url::Url::parse(&base_url).map_err(|e| {
            DomainError::Validation(format!("Invalid data service URL {}: {}", base_url, e))
        })?;

        let timeouts = TimeoutConfig::global();
        let client = crate::http::build_client(timeouts.http_request)
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;
        let stream_client = crate::http::build_stream_client()
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                stream_client,
                base_url: base_url.trim_end_matches('/').to_string(),
                session: RwLock::new(None),
            }),
        })
    }

    fn auth_url(&self, action: &str) -> String {
        format!("{}/v1/auth:{}", self.inner.base_url, action)
    }

    fn data_url(&self, path: &str) -> String {
        format!(
            "{}/data/{}.json",
            self.inner.base_url,
            path.trim_matches('/')
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/documents/{}/{}", self.inner.base_url, collection, id)
    }

    fn bearer(&self) -> Option<String> {
        self.inner
            .session
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| s.id_token.clone())
    }

    fn store_session(&self, account: Account, id_token: String) {
        *self.inner.session.write().expect("session lock poisoned") =
            Some(AuthSession { account, id_token });
    }

    async fn auth_call(&self, action: &str, body: Value) -> Result<Account, DomainError> {
        let response = self
            .inner
            .client
            .post(self.auth_url(action))
            .json(&body)
            .send()
            .await
            .map_err(read_failed)?;

        let status = response.status();
        if status.is_success() {
            let auth: AuthResponse = response.json().await.map_err(read_failed)?;
            let account = Account::new(
                AccountId::from_string(&auth.uid),
                auth.email,
                auth.email_verified,
            )?;
            self.store_session(account.clone(), auth.id_token);
            return Ok(account);
        }

        let error: ErrorBody = response.json().await.unwrap_or_default();
        Err(match status {
            StatusCode::CONFLICT => DomainError::EmailAlreadyRegistered(error.text().to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST => {
                if error.text().contains("EMAIL_EXISTS") {
                    DomainError::EmailAlreadyRegistered(error.text().to_string())
                } else {
                    DomainError::InvalidCredentials(error.text().to_string())
                }
            }
            _ => DomainError::RemoteReadFailed(format!("{}: {}", status, error.text())),
        })
    }

    /// Read the value stored at a tree path; `None` when nothing is there.
    pub async fn read_value_at_path(&self, path: &str) -> Result<Option<Value>, DomainError> {
        let mut request = self.inner.client.get(self.data_url(path));
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(read_failed)?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DomainError::RemoteReadFailed(format!(
                "GET {} returned {}",
                path, status
            )));
        }

        let value: Value = response.json().await.map_err(read_failed)?;
        Ok(if value.is_null() { None } else { Some(value) })
    }

    /// Overwrite the value at a tree path.
    pub async fn set_value_at_path(&self, path: &str, value: &Value) -> Result<(), DomainError> {
        let mut request = self.inner.client.put(self.data_url(path)).json(value);
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(write_failed)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::RemoteWriteFailed(format!(
                "PUT {} returned {}",
                path, status
            )));
        }
        Ok(())
    }

    /// Append `value` under a tree path; the service generates and returns
    /// a unique child key, so concurrent appends never collide.
    pub async fn append_under_path(&self, path: &str, value: &Value) -> Result<String, DomainError> {
        let mut request = self.inner.client.post(self.data_url(path)).json(value);
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(write_failed)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::RemoteWriteFailed(format!(
                "POST {} returned {}",
                path, status
            )));
        }

        #[derive(Deserialize)]
        struct AppendResponse {
            name: String,
        }

        let body: AppendResponse = response.json().await.map_err(write_failed)?;
        Ok(body.name)
    }

    /// Find the first document in `collection` whose `field` equals `value`.
    pub async fn read_document(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, DomainError> {
        let url = format!("{}/documents/{}", self.inner.base_url, collection);
        let mut request = self
            .inner
            .client
            .get(url)
            .query(&[("field", field), ("value", value)]);
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(read_failed)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DomainError::RemoteReadFailed(format!(
                "Query {} returned {}",
                collection, status
            )));
        }

        let mut matches: Vec<Value> = response.json().await.map_err(read_failed)?;
        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.remove(0))
        })
    }

    /// Create or overwrite a document.
    pub async fn write_document(
        &self,
        collection: &str,
        id: &str,
        fields: &Value,
    ) -> Result<(), DomainError> {
        let mut request = self
            .inner
            .client
            .put(self.document_url(collection, id))
            .json(fields);
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(write_failed)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::RemoteWriteFailed(format!(
                "PUT {}/{} returned {}",
                collection, id, status
            )));
        }
        Ok(())
    }

    /// Watch a tree path for changes.
    ///
    /// Opens an event-stream connection; every change notification triggers
    /// a fresh read of the full value, which is handed to `on_change`.
    /// Dropping the returned handle tears the pump task down.
    pub fn subscribe(
        &self,
        path: &str,
        on_change: Box<dyn Fn(Value) + Send + Sync>,
    ) -> SubscriptionHandle {
        let client = self.clone();
        let path = path.to_string();
        let reconnect = TimeoutConfig::global().subscribe_reconnect;

        let task = tokio::spawn(async move {
            loop {
                match client.pump_events(&path, on_change.as_ref()).await {
                    Ok(()) => debug!("[subscribe] stream for {} closed, reconnecting", path),
                    Err(e) => warn!("[subscribe] stream for {} failed: {}", path, e),
                }
                tokio::time::sleep(reconnect).await;
            }
        });

        SubscriptionHandle::new(Box::new(move || task.abort()))
    }

    async fn pump_events(
        &self,
        path: &str,
        on_change: &(dyn Fn(Value) + Send + Sync),
    ) -> Result<(), DomainError> {
        let mut request = self
            .inner
            .stream_client
            .get(self.data_url(path))
            .header(reqwest::header::ACCEPT, "text/event-stream");
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(read_failed)?;
        if !response.status().is_success() {
            return Err(DomainError::RemoteReadFailed(format!(
                "Stream {} returned {}",
                path,
                response.status()
            )));
        }

        let mut stream = response.bytes_stream();
        let mut buffer = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(read_failed)?;
            buffer.extend_from_slice(&chunk);

            while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                let line = String::from_utf8_lossy(&line);
                let line = line.trim();

                // Keep-alives and event-type lines carry no payload
                if let Some(data) = line.strip_prefix("data:") {
                    if data.trim() == "null" || data.trim().is_empty() {
                        continue;
                    }
                    if let Some(value) = self.read_value_at_path(path).await? {
                        on_change(value);
                    }
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl AccountService for DataServiceClient {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Account, DomainError> {
        self.auth_call(
            "signIn",
            serde_json::json!({
                "email": credentials.email(),
                "password": credentials.password(),
            }),
        )
        .await
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<Account, DomainError> {
        self.auth_call(
            "signUp",
            serde_json::json!({
                "email": credentials.email(),
                "password": credentials.password(),
            }),
        )
        .await
    }

    async fn sign_out(&self) -> Result<(), DomainError> {
        *self.inner.session.write().expect("session lock poisoned") = None;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), DomainError> {
        let response = self
            .inner
            .client
            .post(self.auth_url("sendPasswordReset"))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .map_err(write_failed)?;

        if !response.status().is_success() {
            return Err(DomainError::RemoteWriteFailed(format!(
                "Password reset returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn send_email_verification(&self, account: &Account) -> Result<(), DomainError> {
        let mut request = self
            .inner
            .client
            .post(self.auth_url("sendVerification"))
            .json(&serde_json::json!({ "uid": account.id().as_str() }));
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(write_failed)?;
        if !response.status().is_success() {
            return Err(DomainError::RemoteWriteFailed(format!(
                "Verification mail returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn reload_account(&self, account: &Account) -> Result<Account, DomainError> {
        let mut request = self.inner.client.get(self.auth_url("account"));
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(read_failed)?;
        if !response.status().is_success() {
            return Err(DomainError::RemoteReadFailed(format!(
                "Account reload returned {}",
                response.status()
            )));
        }

        #[derive(Deserialize)]
        struct AccountBody {
            email: String,
            #[serde(default)]
            email_verified: bool,
        }

        let body: AccountBody = response.json().await.map_err(read_failed)?;
        let reloaded = Account::restore(
            account.id().clone(),
            body.email,
            body.email_verified,
            account.signed_in_at(),
        );

        // Keep the cached session in step with the fresh flags
        let mut session = self.inner.session.write().expect("session lock poisoned");
        if let Some(existing) = session.as_mut() {
            if existing.account.id() == account.id() {
                existing.account = reloaded.clone();
            }
        }

        Ok(reloaded)
    }

    fn current_account(&self) -> Option<Account> {
        self.inner
            .session
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| s.account.clone())
    }
}
