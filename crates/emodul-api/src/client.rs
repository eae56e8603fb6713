// eModul HTTP client
//
// Wraps `reqwest::Client` with URL construction, the session cookie, and
// the single re-authenticate-and-retry policy. Endpoint methods live in
// `module.rs` to keep this file focused on transport mechanics.

use std::sync::Arc;

use reqwest::header::COOKIE;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::session::{Credentials, SessionManager, preview};
use crate::transport::TransportConfig;

/// Build `{base}/{path}`, keeping any path prefix the base URL carries.
pub(crate) fn endpoint(base_url: &Url, path: &str) -> Result<Url, Error> {
    let base = base_url.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Ok(Url::parse(&format!("{base}/{path}"))?)
}

fn is_auth_rejection(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Raw HTTP client for the eModul web backend.
///
/// Every request goes through [`SessionManager`]: the cookie is attached,
/// and a 401/403 answer triggers exactly one fresh login and one retry.
pub struct ModuleClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<SessionManager>,
}

impl ModuleClient {
    /// Create a client and its session manager from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `https://emodul.pl`).
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let session = Arc::new(SessionManager::new(http.clone(), &base_url, credentials)?);
        Ok(Self::with_session(http, base_url, session))
    }

    /// Create a client around an existing HTTP client and session.
    pub fn with_session(http: reqwest::Client, base_url: Url, session: Arc<SessionManager>) -> Self {
        Self {
            http,
            base_url,
            session,
        }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The session manager shared by all requests of this client.
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        endpoint(&self.base_url, path)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Authenticated GET, decoding the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.send_authenticated(|http| http.get(url.clone())).await?;
        let body = resp.text().await.map_err(Error::Transport)?;

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    /// Authenticated POST with a JSON body; the response body is ignored.
    pub(crate) async fn post_json(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        debug!("POST {}", url);
        self.send_authenticated(|http| http.post(url.clone()).json(body))
            .await?;
        Ok(())
    }

    /// Send with the current cookie. On an auth rejection invalidate the
    /// session, log in once, retry once; a second rejection is final.
    async fn send_authenticated<F>(&self, build: F) -> Result<Response, Error>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder + Sync,
    {
        let cookie = self.session.ensure_session().await?;
        let resp = self.send_with_cookie(&build, &cookie).await?;
        if !is_auth_rejection(resp.status()) {
            return Self::check_status(resp).await;
        }

        warn!(status = %resp.status(), "session rejected, re-authenticating");
        self.session.invalidate().await;
        let cookie = self.session.authorize().await?;

        let resp = self.send_with_cookie(&build, &cookie).await?;
        let status = resp.status();
        if is_auth_rejection(status) {
            self.session.invalidate().await;
            return Err(Error::SessionRejected {
                status: status.as_u16(),
            });
        }
        Self::check_status(resp).await
    }

    async fn send_with_cookie<F>(&self, build: &F, cookie: &str) -> Result<Response, Error>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder + Sync,
    {
        build(&self.http)
            .header(COOKIE, cookie)
            .send()
            .await
            .map_err(Error::Transport)
    }

    async fn check_status(resp: Response) -> Result<Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Error::Http {
            status: status.as_u16(),
            message: preview(&body),
        })
    }
}
