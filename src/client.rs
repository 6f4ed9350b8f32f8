use crate::api::SessionClient;
use crate::entities::{Acknowledgement, TaskInfo, TaskList};
use crate::error::{Result, SynoError};
use crate::error::SynoError::{Configuration, InvalidInput};
use log::debug;
use reqwest::blocking::Client;
use std::time::Duration;

const TASK_API: &str = "SYNO.DownloadStation.Task";
const TASK_API_VERSION: &str = "1";
const TASK_CGI: &str = "DownloadStation/task.cgi";
const ADDITIONAL_FIELDS: &str = "detail,transfer";

/// Default port of the DSM web interface over HTTP
pub const DEFAULT_PORT: u16 = 5000;

/// Synology Download Station client
///
/// Owns the [`SessionClient`] that signs its requests. The session is closed
/// by [`DownloadStation::close`], or on drop if `close` was never called.
///
/// All calls block, dropping included since it may send the logout. Use the
/// client outside async contexts, or inside
/// [`tokio::task::spawn_blocking`](https://docs.rs/tokio/latest/tokio/task/fn.spawn_blocking.html)
/// from async code: the underlying blocking HTTP client panics when it runs
/// on an async runtime thread.
pub struct DownloadStation {
    session: SessionClient,
}

impl DownloadStation {
    /// Wraps an existing session
    #[must_use]
    pub fn new(session: SessionClient) -> Self {
        Self { session }
    }

    /// Creates a new `DownloadStation` client with a builder pattern
    #[must_use]
    pub fn builder() -> DownloadStationBuilder {
        DownloadStationBuilder::default()
    }

    /// Logs in, see [`SessionClient::login`]
    ///
    /// # Errors
    ///
    /// Returns an error if the login fails
    pub fn login(&mut self) -> Result<()> {
        self.session.login()
    }

    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.session.is_authorized()
    }

    #[must_use]
    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    /// Logs out and consumes the client
    ///
    /// # Errors
    ///
    /// Returns an error if the logout fails, see [`SessionClient::logout`]
    pub fn close(mut self) -> Result<()> {
        self.session.logout()
    }

    /// Gets all Download Station tasks, in the order the server returns them
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Session is missing, invalid or expired
    /// - Network request fails
    /// - API returns an error response
    /// - Response has no `data.tasks`
    pub fn list(&self) -> Result<TaskList> {
        self.ensure_session()?;
        let params = [
            ("api", TASK_API),
            ("version", TASK_API_VERSION),
            ("method", "list"),
            ("additional", ADDITIONAL_FIELDS),
        ];

        self.session.request(TASK_CGI, &params)?.into_data()
    }

    /// Gets detailed information about specific task(s)
    ///
    /// Unknown ids are silently left out by the server.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Session is missing, invalid or expired
    /// - IDs are empty
    /// - Network request fails
    /// - API returns an error response
    /// - Response has no `data.tasks`
    pub fn get_details<S: AsRef<str>>(&self, ids: &[S]) -> Result<TaskInfo> {
        self.ensure_session()?;
        let id_string = join_ids(ids)?;
        let params = [
            ("api", TASK_API),
            ("version", TASK_API_VERSION),
            ("method", "getinfo"),
            ("id", id_string.as_str()),
            ("additional", ADDITIONAL_FIELDS),
        ];

        self.session.request(TASK_CGI, &params)?.into_data()
    }

    /// Creates a new download task from a URL.
    ///
    /// `user` and `password` authenticate against the download source and are
    /// only sent when both are given. Returns as soon as the task is queued.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Session is missing
    /// - URL is empty
    /// - Network request fails
    /// - Response isn't a Synology response envelope
    ///
    /// A rejected task is not an error here, check the returned [`Acknowledgement`].
    pub fn add(
        &self,
        url: &str,
        destination: Option<&str>,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<Acknowledgement> {
        self.ensure_session()?;
        if url.is_empty() {
            return Err(InvalidInput("URL cannot be empty".into()));
        }

        let mut data = vec![
            ("api", TASK_API),
            ("version", TASK_API_VERSION),
            ("method", "create"),
            ("uri", url),
        ];
        if let Some(destination) = destination {
            data.push(("destination", destination));
        }
        if let (Some(user), Some(password)) = (user, password) {
            data.push(("username", user));
            data.push(("password", password));
        }

        debug!("Creating download task. URI: {url}, Destination: {destination:?}");
        self.session.request_post(TASK_CGI, &data)
    }

    /// Deletes task(s). Unfinished tasks are only removed when `force` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Session is missing
    /// - IDs are empty
    /// - Network request fails
    /// - Response isn't a Synology response envelope
    ///
    /// Tasks the server refused to delete are reported in the returned
    /// [`Acknowledgement`], see [`Acknowledgement::failed_tasks`].
    pub fn delete<S: AsRef<str>>(&self, ids: &[S], force: bool) -> Result<Acknowledgement> {
        self.ensure_session()?;
        let id_string = join_ids(ids)?;

        let mut data = vec![
            ("api", TASK_API),
            ("version", TASK_API_VERSION),
            ("method", "delete"),
            ("id", id_string.as_str()),
        ];
        if force {
            data.push(("force_complete", "true"));
        }

        debug!("Deleting download tasks {id_string}, force: {force}");
        self.session.request_post(TASK_CGI, &data)
    }

    fn ensure_session(&self) -> Result<()> {
        if self.session.is_authorized() {
            Ok(())
        } else {
            Err(SynoError::Authentication { code: None })
        }
    }
}

fn join_ids<S: AsRef<str>>(ids: &[S]) -> Result<String> {
    if ids.is_empty() {
        return Err(InvalidInput("Task IDs cannot be empty".into()));
    }
    Ok(ids.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(","))
}

/// Builder for [`DownloadStation`] client
#[derive(Default)]
pub struct DownloadStationBuilder {
    host: Option<String>,
    port: Option<u16>,
    https: bool,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<Duration>,
    accept_invalid_certs: bool,
}

impl DownloadStationBuilder {
    /// Sets the host name or IP address of the NAS
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the port, defaults to [`DEFAULT_PORT`]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Uses https instead of http
    #[must_use]
    pub fn https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    /// Sets the username
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the password
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the request timeout. Requests never time out unless set.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Accepts self-signed certificates, common on NAS devices
    #[must_use]
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Builds the [`DownloadStation`] client without logging in
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required fields (host, username, password) are not provided or empty
    /// - The HTTP client can't be created
    pub fn build(self) -> Result<DownloadStation> {
        let host = required(self.host, "Host")?;
        let username = required(self.username, "Username")?;
        let password = required(self.password, "Password")?;

        let client = Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| Configuration(format!("Failed to create HTTP client: {e}")))?;

        let session = SessionClient::new(
            &host,
            self.port.unwrap_or(DEFAULT_PORT),
            self.https,
            username,
            password,
            client,
        );
        Ok(DownloadStation::new(session))
    }

    /// Builds the [`DownloadStation`] client and logs in
    ///
    /// # Errors
    ///
    /// Returns an error if building fails or the login is rejected
    pub fn connect(self) -> Result<DownloadStation> {
        let mut client = self.build()?;
        client.login()?;
        Ok(client)
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        Some(_) => Err(Configuration(format!("{name} cannot be empty"))),
        None => Err(Configuration(format!("{name} is required"))),
    }
}
