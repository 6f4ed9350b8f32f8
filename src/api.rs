use crate::entities::{AuthData, SynologyResponse};
use crate::error::{Result, SynoError};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;

const AUTH_API: &str = "SYNO.API.Auth";
const AUTH_API_VERSION: &str = "2";
const AUTH_CGI: &str = "auth.cgi";

/// Session name identifying this consumer to the NAS
pub const SESSION_NAME: &str = "DownloadStation";

/// Authenticated session against the Synology API gateway.
///
/// The session is logged out when the client is dropped, unless
/// [`SessionClient::logout`] already did it. Requests, and therefore drop,
/// block the current thread and must not run on an async runtime thread.
pub struct SessionClient {
    base_url: String,
    username: String,
    password: String,
    client: Client,
    sid: String,
}

impl SessionClient {
    /// Creates a client for `{scheme}://{host}:{port}/webapi`. No request is sent.
    #[must_use]
    pub fn new(
        host: &str,
        port: u16,
        use_https: bool,
        username: String,
        password: String,
        client: Client,
    ) -> Self {
        let scheme = if use_https { "https" } else { "http" };
        Self {
            base_url: format!("{scheme}://{host}:{port}/webapi"),
            username,
            password,
            client,
            sid: String::new(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn is_authorized(&self) -> bool {
        !self.sid.is_empty()
    }

    /// Current session ID, `None` until [`SessionClient::login`] succeeds
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.is_authorized().then_some(self.sid.as_str())
    }

    /// Logs in and stores the session ID.
    ///
    /// Does nothing while a session is active, so every session ID ever
    /// issued is the one [`SessionClient::logout`] ends.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Network request fails or the body isn't JSON ([`SynoError::Transport`])
    /// - The server rejects the credentials or answers without a session ID
    ///   ([`SynoError::Authentication`])
    pub fn login(&mut self) -> Result<()> {
        if self.is_authorized() {
            debug!("Already logged in to {}", self.base_url);
            return Ok(());
        }

        let params = [
            ("api", AUTH_API),
            ("version", AUTH_API_VERSION),
            ("method", "login"),
            ("account", self.username.as_str()),
            ("passwd", self.password.as_str()),
            ("session", SESSION_NAME),
            ("format", "sid"),
        ];

        debug!("Logging in to {} as {}", self.base_url, self.username);
        let body = self.dispatch(self.client.get(self.url(AUTH_CGI)).query(&params))?;
        let response = parse_auth_response(body)?;

        let data = response
            .data
            .and_then(|data| serde_json::from_value::<AuthData>(data).ok())
            .filter(|data| !data.sid.is_empty())
            .ok_or(SynoError::Authentication { code: None })?;

        self.sid = data.sid;
        debug!("Logged in to {}", self.base_url);
        Ok(())
    }

    /// Ends the session.
    ///
    /// The session ID is forgotten before the request is sent, so it is never
    /// reused whatever the server answers.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - There is no active session ([`SynoError::Authentication`], nothing is sent)
    /// - Network request fails ([`SynoError::Transport`])
    /// - The server reports a failure ([`SynoError::Authentication`])
    pub fn logout(&mut self) -> Result<()> {
        let sid = std::mem::take(&mut self.sid);
        if sid.is_empty() {
            return Err(SynoError::Authentication { code: None });
        }

        let params = [
            ("api", AUTH_API),
            ("version", AUTH_API_VERSION),
            ("method", "logout"),
            ("session", SESSION_NAME),
            ("_sid", sid.as_str()),
        ];

        debug!("Logging out from {}", self.base_url);
        let body = self.dispatch(self.client.get(self.url(AUTH_CGI)).query(&params))?;
        parse_auth_response(body).map(|_| ())
    }

    /// Sends a signed GET request to `cgi`, relative to the base URL
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - There is no active session ([`SynoError::Authentication`], nothing is sent)
    /// - Network request fails or the body isn't JSON ([`SynoError::Transport`])
    /// - The body isn't a Synology response envelope ([`SynoError::MalformedResponse`])
    pub fn request(&self, cgi: &str, params: &[(&str, &str)]) -> Result<SynologyResponse<Value>> {
        let params = self.sign(params)?;
        debug!("GET {} ({})", self.url(cgi), method_of(&params));
        let body = self.dispatch(self.client.get(self.url(cgi)).query(&params))?;
        into_envelope(body)
    }

    /// Sends a signed form POST request to `cgi`, relative to the base URL
    ///
    /// # Errors
    ///
    /// Same as [`SessionClient::request`]
    pub fn request_post(
        &self,
        cgi: &str,
        data: &[(&str, &str)],
    ) -> Result<SynologyResponse<Value>> {
        let data = self.sign(data)?;
        debug!("POST {} ({})", self.url(cgi), method_of(&data));
        let body = self.dispatch(self.client.post(self.url(cgi)).form(&data))?;
        into_envelope(body)
    }

    fn url(&self, cgi: &str) -> String {
        format!("{}/{}", self.base_url, cgi)
    }

    /// Appends `_sid` to the parameters
    fn sign<'a>(&'a self, params: &[(&'a str, &'a str)]) -> Result<Vec<(&'a str, &'a str)>> {
        if !self.is_authorized() {
            return Err(SynoError::Authentication { code: None });
        }
        let mut signed = params.to_vec();
        signed.push(("_sid", self.sid.as_str()));
        Ok(signed)
    }

    fn dispatch(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send()?;

        let status = response.status();
        debug!("API request status: {status}");
        if !status.is_success() {
            return Err(SynoError::Transport(format!(
                "HTTP request failed with status: {} ({})",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let text = response.text()?;
        serde_json::from_str(&text)
            .map_err(|e| SynoError::Transport(format!("Failed to parse API response: {e}")))
    }
}

impl Drop for SessionClient {
    fn drop(&mut self) {
        if self.is_authorized() {
            if let Err(e) = self.logout() {
                debug!("Ignoring logout failure during teardown: {e}");
            }
        }
    }
}

fn method_of<'a>(params: &[(&str, &'a str)]) -> &'a str {
    params
        .iter()
        .find(|(key, _)| *key == "method")
        .map_or("", |(_, value)| *value)
}

fn into_envelope(body: Value) -> Result<SynologyResponse<Value>> {
    serde_json::from_value(body).map_err(|e| SynoError::MalformedResponse(e.to_string()))
}

/// Any response that isn't a successful envelope is an authentication failure
fn parse_auth_response(body: Value) -> Result<SynologyResponse<Value>> {
    let response = serde_json::from_value::<SynologyResponse<Value>>(body)
        .map_err(|_| SynoError::Authentication { code: None })?;
    if response.success {
        Ok(response)
    } else {
        Err(SynoError::Authentication {
            code: response.error_code(),
        })
    }
}
