//! Identity store backed by the hosted auth admin API.

use anyhow::Context as _;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campus_domain::id::UserId;

use crate::domain::repository::IdentityStore;
use crate::domain::types::{Identity, NewIdentity};
use crate::error::ProvisioningError;

const ADMIN_USERS_PATH: &str = "/auth/v1/admin/users";

#[derive(Clone)]
pub struct HttpIdentityStore {
    pub client: reqwest::Client,
    /// Base URL without trailing slash, e.g. `https://project.example.co`.
    pub base_url: String,
    pub service_key: String,
}

#[derive(Serialize)]
struct CreateUserBody<'a> {
    email: &'a str,
    password: &'a str,
    email_confirm: bool,
    user_metadata: UserMetadata<'a>,
}

#[derive(Serialize)]
struct UserMetadata<'a> {
    full_name: &'a str,
    role: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
}

#[derive(Deserialize)]
struct CreatedUser {
    id: Uuid,
    email: Option<String>,
}

/// Error payload of the admin API. Field names differ between versions.
#[derive(Debug, Default, Deserialize)]
struct AdminError {
    error_code: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
}

impl AdminError {
    fn message(&self) -> Option<&str> {
        self.msg
            .as_deref()
            .or(self.message.as_deref())
            .or(self.error_description.as_deref())
    }
}

impl HttpIdentityStore {
    pub fn new(client: reqwest::Client, base_url: &str, service_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            service_key,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

impl IdentityStore for HttpIdentityStore {
    async fn create_identity(&self, identity: &NewIdentity) -> Result<Identity, ProvisioningError> {
        let body = CreateUserBody {
            email: &identity.login,
            password: &identity.password,
            email_confirm: true,
            user_metadata: UserMetadata {
                full_name: &identity.full_name,
                role: identity.role.as_str(),
                phone: identity.phone.as_deref(),
            },
        };

        let response = self
            .request(reqwest::Method::POST, ADMIN_USERS_PATH)
            .json(&body)
            .send()
            .await
            .context("send create identity request")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_create_failure(status, &text));
        }

        let created: CreatedUser = response
            .json()
            .await
            .context("decode created identity")?;
        Ok(Identity {
            id: UserId(created.id),
            login: created.email.unwrap_or_else(|| identity.login.clone()),
        })
    }

    async fn delete_identity(&self, id: UserId) -> Result<(), ProvisioningError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("{ADMIN_USERS_PATH}/{id}"),
            )
            .send()
            .await
            .context("send delete identity request")?;

        let status = response.status();
        // Already gone is as good as deleted.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(anyhow::anyhow!("delete identity {id} failed with {status}: {text}").into())
    }
}

/// Map a non-2xx response from `POST /admin/users` to a provisioning error.
fn classify_create_failure(status: StatusCode, body: &str) -> ProvisioningError {
    let parsed: AdminError = serde_json::from_str(body).unwrap_or_default();
    let message = parsed.message().unwrap_or(body).trim();

    let duplicate = parsed.error_code.as_deref() == Some("email_exists")
        || message.to_ascii_lowercase().contains("already been registered");

    match status {
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY if duplicate => {
            ProvisioningError::IdentityConflict
        }
        StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST if !message.is_empty() => {
            ProvisioningError::Validation(message.to_owned())
        }
        _ => anyhow::anyhow!("create identity failed with {status}: {message}").into(),
    }
}
