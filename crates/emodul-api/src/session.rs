// eModul session authentication
//
// Cookie-based login. `POST /login` answers with a `Set-Cookie` whose name
// contains "session"; its `key=value` pair is replayed as the `Cookie`
// header on every later request until the backend answers 401/403.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, SET_COOKIE};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use crate::client::endpoint;
use crate::error::Error;
use crate::models::LoginRequest;

/// Account credentials, supplied once and never mutated.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

#[derive(Debug, Default)]
struct SessionState {
    cookie: String,
    authorized: bool,
}

/// Owns the session cookie and the authorized flag.
///
/// The state lives behind an async mutex held for the whole login round
/// trip, so concurrent callers of [`ensure_session`](Self::ensure_session)
/// trigger at most one login.
pub struct SessionManager {
    http: reqwest::Client,
    login_url: Url,
    credentials: Credentials,
    state: Mutex<SessionState>,
}

impl SessionManager {
    pub fn new(
        http: reqwest::Client,
        base_url: &Url,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            login_url: endpoint(base_url, "login")?,
            credentials,
            state: Mutex::new(SessionState::default()),
        })
    }

    /// Return the current cookie, logging in first if not authorized.
    pub async fn ensure_session(&self) -> Result<String, Error> {
        let mut state = self.state.lock().await;
        if state.authorized && !state.cookie.is_empty() {
            return Ok(state.cookie.clone());
        }
        self.login(&mut state).await
    }

    /// Log in unconditionally and return the fresh cookie.
    pub async fn authorize(&self) -> Result<String, Error> {
        let mut state = self.state.lock().await;
        self.login(&mut state).await
    }

    /// Mark the session unauthenticated. The stale cookie text is kept
    /// until the next successful login overwrites it.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        if state.authorized {
            debug!("session invalidated");
        }
        state.authorized = false;
    }

    pub async fn is_authorized(&self) -> bool {
        self.state.lock().await.authorized
    }

    /// The last cookie received, authorized or not.
    pub async fn cookie(&self) -> Option<String> {
        let state = self.state.lock().await;
        (!state.cookie.is_empty()).then(|| state.cookie.clone())
    }

    async fn login(&self, state: &mut SessionState) -> Result<String, Error> {
        state.authorized = false;

        debug!(url = %self.login_url, username = self.credentials.username(), "logging in");

        let body = LoginRequest {
            username: &self.credentials.username,
            password: self.credentials.password.expose_secret(),
            remember_me: true,
            language_id: "en",
        };

        let resp = self
            .http
            .post(self.login_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
            });
        }

        let cookie = session_cookie(resp.headers()).ok_or_else(|| Error::Authentication {
            message: "login response carried no session cookie".into(),
        })?;

        state.cookie.clone_from(&cookie);
        state.authorized = true;
        info!(username = self.credentials.username(), "logged in to eModul");
        Ok(cookie)
    }
}

/// Pick the `key=value` pair of the first `Set-Cookie` whose name
/// contains "session" (case-insensitive), dropping its attributes.
pub(crate) fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| raw.split(';').next())
        .map(str::trim)
        .find(|pair| {
            pair.split_once('=').is_some_and(|(name, _)| {
                name.trim().to_ascii_lowercase().contains("session")
            })
        })
        .map(String::from)
}

pub(crate) fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    fn headers(cookies: &[&'static str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for c in cookies {
            map.append(SET_COOKIE, HeaderValue::from_static(*c));
        }
        map
    }

    #[test]
    fn picks_session_cookie_and_strips_attributes() {
        let map = headers(&[
            "lang=en; Path=/",
            "session=abc123; Path=/; HttpOnly; Secure",
        ]);
        assert_eq!(session_cookie(&map).as_deref(), Some("session=abc123"));
    }

    #[test]
    fn session_name_match_is_case_insensitive() {
        let map = headers(&["EMODUL_SESSION_ID=xyz; Max-Age=3600"]);
        assert_eq!(session_cookie(&map).as_deref(), Some("EMODUL_SESSION_ID=xyz"));
    }

    #[test]
    fn no_session_cookie_yields_none() {
        assert_eq!(session_cookie(&headers(&["lang=en"])), None);
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }
}
