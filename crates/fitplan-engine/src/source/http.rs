use super::{SourceError, SuggestionSource};
use async_trait::async_trait;
use fitplan_common::Session;
use fitplan_common::protocol::{
    AuthToken, PlanKind, ProfileUpdate, Suggestion, SuggestionsHistory, UserLogin, UserProfile,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Suggestion service client.
///
/// Every request carries the session's bearer token when there is one. A 401
/// answer clears the session; nothing is retried.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl HttpSource {
    pub fn new(base_url: &str, session: Session, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, session, client)
    }

    /// Uses a caller-configured client (proxy, TLS, timeouts).
    pub fn with_client(
        base_url: &str,
        session: Session,
        client: reqwest::Client,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client,
            base_url: normalize_base(base_url)?,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Exchanges credentials for a token and switches the session to it.
    ///
    /// A 401 here means wrong credentials, not an expired session.
    pub async fn login(&mut self, credentials: &UserLogin) -> Result<AuthToken, SourceError> {
        let url = self.endpoint("api/auth/login")?;
        let response = self.client.post(url).json(credentials).send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SourceError::InvalidCredentials);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.reject(status, &body));
        }
        let token: AuthToken = response.json().await?;
        self.session = Session::from_auth_token(&token);
        info!("Logged in as {}", credentials.email);
        Ok(token)
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match self.session.bearer() {
            Some(bearer) => builder.header(reqwest::header::AUTHORIZATION, bearer),
            None => builder,
        }
    }

    async fn send(&mut self, builder: RequestBuilder) -> Result<Response, SourceError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(self.reject(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(
        &mut self,
        builder: RequestBuilder,
    ) -> Result<T, SourceError> {
        let response = self.send(builder).await?;
        Ok(response.json::<T>().await?)
    }

    fn reject(&mut self, status: StatusCode, body: &str) -> SourceError {
        if status == StatusCode::UNAUTHORIZED {
            warn!("Service rejected the session token, clearing it");
            self.session.invalidate();
            return SourceError::Unauthorized;
        }
        SourceError::Status {
            status: status.as_u16(),
            message: error_message(status, body),
        }
    }
}

fn normalize_base(base_url: &str) -> Result<Url, SourceError> {
    let mut url = Url::parse(base_url.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Pulls the service's `detail` field out of an error body, falling back to
/// the raw body and then the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return match parsed.detail {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        };
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl SuggestionSource for HttpSource {
    async fn generate(&mut self, kind: PlanKind) -> Result<Suggestion, SourceError> {
        let url = self.endpoint(&format!("api/suggestions/{}", kind.as_str()))?;
        info!("Requesting a new {} plan", kind);
        let builder = self.request(Method::POST, url);
        self.send_json(builder).await
    }

    async fn history(&mut self) -> Result<SuggestionsHistory, SourceError> {
        let url = self.endpoint("api/suggestions/history")?;
        let builder = self.request(Method::GET, url);
        let history: SuggestionsHistory = self.send_json(builder).await?;
        debug!(
            "Fetched history: {} workouts, {} nutrition",
            history.workouts.len(),
            history.nutrition.len()
        );
        Ok(history)
    }

    async fn delete(&mut self, id: &str) -> Result<(), SourceError> {
        let url = self.endpoint(&format!("api/suggestions/{}", id))?;
        let builder = self.request(Method::DELETE, url);
        self.send(builder).await?;
        info!("Deleted suggestion {}", id);
        Ok(())
    }

    async fn profile(&mut self) -> Result<UserProfile, SourceError> {
        let url = self.endpoint("api/profile")?;
        let builder = self.request(Method::GET, url);
        self.send_json(builder).await
    }

    async fn update_profile(&mut self, update: &ProfileUpdate) -> Result<UserProfile, SourceError> {
        update.validate()?;
        let url = self.endpoint("api/profile")?;
        let builder = self.request(Method::PUT, url).json(update);
        self.send_json(builder).await
    }
}
