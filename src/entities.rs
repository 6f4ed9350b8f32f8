use crate::error::{Result, SynoError};
use chrono::serde::ts_seconds_option;
use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Response from Synology API
#[derive(Deserialize, Debug)]
pub struct SynologyResponse<D> {
    /// Any falsy or missing value is a failure
    #[serde(default, deserialize_with = "truthy")]
    pub success: bool,
    pub data: Option<D>,
    pub error: Option<ApiError>,
}

/// Raw response of a mutating call (`create`, `delete`)
pub type Acknowledgement = SynologyResponse<Value>;

impl<D> SynologyResponse<D> {
    /// Error code reported by the server, if any
    #[must_use]
    pub fn error_code(&self) -> Option<i32> {
        self.error.as_ref().map(|error| error.code)
    }
}

impl SynologyResponse<Value> {
    /// Decodes `data` into a typed payload.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `success` is missing or falsy (see [`SynoError::from_task_code`])
    /// - `data` is missing or doesn't have the expected shape
    pub fn into_data<D: DeserializeOwned>(self) -> Result<D> {
        if !self.success {
            return Err(SynoError::from_task_code(self.error_code()));
        }
        let data = self
            .data
            .ok_or_else(|| SynoError::MalformedResponse("No data received".into()))?;
        serde_json::from_value(data).map_err(|e| SynoError::MalformedResponse(e.to_string()))
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Turns a failed acknowledgement into an error
    ///
    /// # Errors
    ///
    /// Returns an error if `success` is missing or falsy
    pub fn into_result(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(SynoError::from_task_code(self.error_code()))
        }
    }

    /// Per-task failures carried by a `delete` acknowledgement
    #[must_use]
    pub fn failed_tasks(&self) -> Vec<FailedTask> {
        self.data
            .as_ref()
            .and_then(|data| Vec::<FailedTask>::deserialize(data).ok())
            .map(|tasks| tasks.into_iter().filter(|task| task.error != 0).collect())
            .unwrap_or_default()
    }
}

/// Error information from Synology API
#[derive(Deserialize, Debug)]
pub struct ApiError {
    pub code: i32,
}

/// Authentication response data
#[derive(Deserialize, Debug)]
pub struct AuthData {
    /// Session ID used for authenticated requests
    pub sid: String,
}

/// Collection of download tasks
#[derive(Deserialize, Debug)]
pub struct TaskList {
    #[serde(default)]
    pub offset: u32,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub total: u32,
}

/// Detailed information about specific tasks
#[derive(Deserialize, Debug)]
pub struct TaskInfo {
    pub tasks: Vec<Task>,
}

/// Individual download task information
#[derive(Deserialize, Debug)]
pub struct Task {
    /// Unique identifier for the task
    pub id: String,
    #[serde(default)]
    pub username: String,
    /// Type of download task (e.g., "bt" for `BitTorrent`)
    #[serde(rename = "type", default)]
    pub task_type: String,
    /// Task title/name
    pub title: String,
    /// Total size in bytes
    #[serde(default, deserialize_with = "lenient_u64")]
    pub size: u64,
    /// Current status of the task, as reported by the server
    pub status: String,
    /// Additional detailed information about the task
    pub additional: Option<AdditionalTaskInfo>,
}

/// Additional detailed information about a task
#[derive(Deserialize, Default, Debug)]
pub struct AdditionalTaskInfo {
    pub detail: Option<Detail>,
    pub transfer: Option<Transfer>,
}

/// Detailed task information
#[derive(Deserialize, Default, Debug)]
pub struct Detail {
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default, with = "ts_seconds_option")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub total_peers: u32,
    #[serde(default)]
    pub connected_seeders: u32,
    #[serde(default)]
    pub connected_leechers: u32,
}

/// Transfer statistics
#[derive(Deserialize, Default, Debug)]
pub struct Transfer {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub size_downloaded: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub size_uploaded: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub speed_download: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub speed_upload: u64,
}

#[derive(Deserialize, Debug)]
pub struct FailedTask {
    pub error: i32,
    pub id: String,
}

fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
    })
}

/// Byte counts come back as numbers on most firmware and as strings on some
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Integer(u64),
        Float(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Integer(value) => Ok(value),
        Raw::Float(value) if value >= 0.0 => Ok(value as u64),
        Raw::Float(value) => Err(de::Error::custom(format!("negative byte count: {value}"))),
        Raw::Text(text) => text.trim().parse().map_err(de::Error::custom),
    }
}
