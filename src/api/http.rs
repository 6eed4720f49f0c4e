//! reqwest implementation of [`TicketBackend`].
//!
//! # Security Note - Logging
//!
//! The bearer token is held as a [`SecretString`] and the header built from it
//! is marked sensitive, so it renders as `Sensitive` if reqwest's request
//! logging is enabled (`RUST_LOG=reqwest=debug`). Avoid enabling that in
//! production regardless; other request details are still logged.

use std::fmt;
use std::time::Duration;

use reqwest::header;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::types::{Agent, Campaign, Customer, Ticket, TicketId, Yard};

use super::{
    ApiError, Attachment, ListResponse, NewTicket, TicketBackend, TicketFields, TicketPatch,
    decode_envelope,
};

/// Wrapper for the authorization value that redacts it when formatted.
struct RedactedHeader {
    value: SecretString,
}

impl RedactedHeader {
    fn bearer(token: &SecretString) -> Self {
        Self {
            value: SecretString::from(format!("Bearer {}", token.expose_secret())),
        }
    }

    fn as_header_value(&self) -> Result<header::HeaderValue> {
        let mut value = header::HeaderValue::from_str(self.value.expose_secret())
            .map_err(|_| DeskError::Config("auth token contains invalid characters".into()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactedHeader")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// HTTP client for the ticket backend.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    auth: Option<RedactedHeader>,
}

impl fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url.as_str())
            .field("auth", &self.auth)
            .finish()
    }
}

fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("ticketdesk/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

impl HttpBackend {
    /// Create a backend rooted at `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| DeskError::Config(format!("invalid api_url '{base_url}': {e}")))?;

        Ok(Self {
            client: build_client(Duration::from_secs(crate::config::DEFAULT_REQUEST_TIMEOUT))?,
            base_url,
            auth: None,
        })
    }

    /// Create a backend from configuration (URL, token and timeout).
    pub fn from_config(config: &Config) -> Result<Self> {
        let url = config.api_url().ok_or_else(|| {
            DeskError::Config(
                "api_url not configured. Set TICKETDESK_API_URL or run: ticketdesk config set api_url <url>"
                    .to_string(),
            )
        })?;

        let mut backend = Self::new(&url)?.with_timeout(config.request_timeout())?;
        if let Some(token) = config.auth_token() {
            backend = backend.with_token(token);
        }
        Ok(backend)
    }

    pub fn with_token(mut self, token: SecretString) -> Self {
        self.auth = Some(RedactedHeader::bearer(&token));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| DeskError::InvalidUrl(format!("{path}: {e}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        let mut builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");
        if let Some(auth) = &self.auth {
            builder = builder.header(header::AUTHORIZATION, auth.as_header_value()?);
        }
        Ok(builder)
    }

    /// Send a request and read the body, keeping HTTP failures as
    /// [`ApiError`] so callers can inspect the status.
    async fn execute_checked(
        &self,
        builder: RequestBuilder,
    ) -> Result<std::result::Result<String, ApiError>> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "backend request failed");
            return Ok(Err(ApiError::from_response(status, &body)));
        }

        tracing::debug!(%url, status = status.as_u16(), bytes = body.len(), "backend response");
        Ok(Ok(body))
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<String> {
        Ok(self.execute_checked(builder).await??)
    }

    async fn send_enveloped<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let body = self.execute(builder).await?;
        decode_envelope(&body)
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let body = self.execute(self.request(Method::GET, path)?).await?;
        let response: ListResponse<T> = serde_json::from_str(&body)?;
        response.into_data()
    }
}

fn attachments_form(files: &[Attachment]) -> Result<Form> {
    let mut form = Form::new();
    for file in files {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }
        form = form.part("files[]", part);
    }
    Ok(form)
}

impl TicketBackend for HttpBackend {
    async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        self.send_enveloped(self.request(Method::GET, "api/tickets")?)
            .await
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Ticket> {
        let builder = self.request(Method::GET, &format!("api/tickets/{id}"))?;
        match self.execute_checked(builder).await? {
            Ok(body) => decode_envelope(&body),
            Err(err) if err.is_not_found() => Err(DeskError::TicketNotFound(id)),
            Err(err) => Err(err.into()),
        }
    }

    async fn update_ticket(&self, id: TicketId, patch: &TicketPatch) -> Result<TicketFields> {
        let builder = self
            .request(Method::PATCH, &format!("api/tickets/{id}"))?
            .json(patch);
        self.send_enveloped(builder).await
    }

    async fn create_ticket(&self, form: &NewTicket) -> Result<Ticket> {
        let builder = self.request(Method::POST, "api/tickets")?.json(form);
        self.send_enveloped(builder).await
    }

    async fn upload_attachments(&self, id: TicketId, files: &[Attachment]) -> Result<TicketFields> {
        let form = attachments_form(files)?;
        let builder = self
            .request(Method::POST, &format!("api/tickets/{id}/attachments"))?
            .multipart(form);
        self.send_enveloped(builder).await
    }

    async fn list_agents(&self) -> Result<Vec<Agent>> {
        self.get_list("api/agents").await
    }

    async fn list_users(&self) -> Result<Vec<Agent>> {
        self.get_list("api/users").await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        self.get_list("api/customers").await
    }

    async fn list_campaigns(&self) -> Result<Vec<Campaign>> {
        self.get_list("campaign").await
    }

    async fn list_yards(&self) -> Result<Vec<Yard>> {
        self.get_list("yards").await
    }
}
