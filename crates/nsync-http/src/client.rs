//! reqwest-backed notification scheme client

use crate::config::HttpConfig;
use async_trait::async_trait;
use nsync_core::{ApiError, FieldDeployer, NotificationApi};
use nsync_model::{Change, NotificationId, SchemeId};
use nsync_wire::{without_fields, AddNotificationsRequest, EVENTS_FIELD, SCHEME_ID_FIELD};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

/// HTTP client for the notification scheme endpoints
#[derive(Debug, Clone)]
pub struct HttpNotificationClient {
    client: Client,
    root: String,
    token: Option<String>,
}

impl HttpNotificationClient {
    /// Create client from configuration
    ///
    /// # Errors
    /// [`ApiError::Transport`] if the HTTP client cannot be constructed
    pub fn new(config: &HttpConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            root: config.root().to_string(),
            token: config.token.clone(),
        })
    }

    /// Full URL for `path` (leading slash included)
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.root)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let response = req
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::status(status, body))
        }
    }

    async fn send_json(&self, req: RequestBuilder) -> Result<Value, ApiError> {
        self.send(req)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl NotificationApi for HttpNotificationClient {
    async fn add_notifications(
        &self,
        scheme_id: SchemeId,
        body: &AddNotificationsRequest,
    ) -> Result<(), ApiError> {
        let path = format!("/notificationscheme/{scheme_id}/notification");
        tracing::debug!(path = %path, "PUT");
        self.send(self.request(Method::PUT, &path).json(body)).await?;
        Ok(())
    }

    async fn get_scheme(&self, scheme_id: SchemeId) -> Result<Value, ApiError> {
        let req = self
            .request(Method::GET, "/notificationscheme")
            .query(&[("id", scheme_id.to_string().as_str()), ("expand", EVENTS_FIELD)]);
        tracing::debug!(scheme_id = %scheme_id, "GET read-back");
        self.send_json(req).await
    }

    async fn delete_notification(
        &self,
        scheme_id: SchemeId,
        notification_id: NotificationId,
    ) -> Result<(), ApiError> {
        let path = format!("/notificationscheme/{scheme_id}/notification/{notification_id}");
        tracing::debug!(path = %path, "DELETE");
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}

#[async_trait]
impl FieldDeployer for HttpNotificationClient {
    async fn deploy_fields(
        &self,
        change: &Change<Value>,
        exclude: &[String],
    ) -> Result<Option<SchemeId>, ApiError> {
        match change {
            Change::Addition { after } => {
                let body = field_body(after, exclude);
                let created = self
                    .send_json(self.request(Method::POST, "/notificationscheme").json(&body))
                    .await?;
                let id = scheme_id_of(&created)
                    .ok_or_else(|| ApiError::Decode(format!("no scheme id in response: {created}")))?;
                tracing::info!(scheme_id = %id, "notification scheme created");
                Ok(Some(id))
            }
            Change::Modification { before, after } => {
                let id = scheme_id_of(after)
                    .or_else(|| scheme_id_of(before))
                    .ok_or_else(|| ApiError::Decode("modified scheme has no id".into()))?;
                let body = field_body(after, exclude);
                if body == field_body(before, exclude) {
                    tracing::debug!(scheme_id = %id, "scheme fields unchanged, skipping update");
                    return Ok(Some(id));
                }
                self.send(
                    self.request(Method::PUT, &format!("/notificationscheme/{id}"))
                        .json(&body),
                )
                .await?;
                Ok(Some(id))
            }
            Change::Removal { before } => {
                let id = scheme_id_of(before)
                    .ok_or_else(|| ApiError::Decode("removed scheme has no id".into()))?;
                self.send(self.request(Method::DELETE, &format!("/notificationscheme/{id}")))
                    .await?;
                Ok(None)
            }
        }
    }
}

/// Request body for scheme field updates
fn field_body(scheme: &Value, exclude: &[String]) -> Value {
    let mut fields: Vec<&str> = exclude.iter().map(String::as_str).collect();
    fields.extend(["id", SCHEME_ID_FIELD]);
    without_fields(scheme, &fields)
}

/// Scheme id from `schemeId` or `id`, as number or numeric string
fn scheme_id_of(value: &Value) -> Option<SchemeId> {
    [SCHEME_ID_FIELD, "id"]
        .iter()
        .filter_map(|field| value.get(field))
        .find_map(|id| match id {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .map(SchemeId)
}
