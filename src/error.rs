use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, SynoError>;

/// Error codes shared by every Synology API
const SESSION_CODES: [i32; 4] = [105, 106, 107, 119];

/// Custom error types for the [`crate::client::DownloadStation`] client
#[derive(Error, Debug)]
pub enum SynoError {
    #[error("Authentication error: {}", auth_error_message(.code))]
    Authentication { code: Option<i32> },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Download Station error: {}", task_error_message(.code))]
    Api { code: Option<i32> },

    #[error("Invalid input parameter: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SynoError {
    /// Builds the error for an unsuccessful task API envelope.
    ///
    /// Codes that mean the session is gone are reported as
    /// [`SynoError::Authentication`].
    #[must_use]
    pub fn from_task_code(code: Option<i32>) -> Self {
        match code {
            Some(code) if SESSION_CODES.contains(&code) => Self::Authentication { code: Some(code) },
            _ => Self::Api { code },
        }
    }

    /// Server-reported error code, if any
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Authentication { code } | Self::Api { code } => *code,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SynoError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

fn common_error_message(code: i32) -> Option<&'static str> {
    let message = match code {
        100 => "unknown error",
        101 => "invalid parameter",
        102 => "the requested API does not exist",
        103 => "the requested method does not exist",
        104 => "the requested version does not support the functionality",
        105 => "the logged in session does not have permission",
        106 => "session timeout",
        107 => "session interrupted by duplicate login",
        119 => "session id not found",
        _ => return None,
    };
    Some(message)
}

#[allow(clippy::ref_option)]
fn auth_error_message(code: &Option<i32>) -> String {
    let Some(code) = *code else {
        return "login rejected or no active session".into();
    };
    let message = common_error_message(code).unwrap_or(match code {
        400 => "no such account or incorrect password",
        401 => "account disabled",
        402 => "permission denied",
        403 => "2-step verification code required",
        404 => "failed to authenticate 2-step verification code",
        _ => "unrecognized error",
    });
    format!("code={code}, {message}")
}

#[allow(clippy::ref_option)]
fn task_error_message(code: &Option<i32>) -> String {
    let Some(code) = *code else {
        return "request failed, no error code reported".into();
    };
    let message = common_error_message(code).unwrap_or(match code {
        400 => "file upload failed",
        401 => "max number of tasks reached",
        402 => "destination denied",
        403 => "destination does not exist",
        404 => "invalid task id",
        405 => "invalid task action",
        406 => "no default destination",
        407 => "set destination failed",
        408 => "file does not exist",
        _ => "unrecognized error",
    });
    format!("code={code}, {message}")
}
