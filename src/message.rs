//! Timestamped, typed log messages for reporters.
//!
//! A [`Message`] is a reporter-facing value object. The runner never creates
//! one; [`LogReporter`](crate::report::LogReporter) turns each outcome record
//! into a message line.
//!
//! Wire form is `content|kind|timestamp`, where `kind` is the integer code of
//! [`MessageKind`] and `timestamp` is seconds since the UNIX epoch. The
//! human-readable [`Message::format`] shows the timestamp in local time.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Local, TimeZone};
use thiserror::Error;

use crate::outcome::{OutcomeRecord, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageKind {
    #[default]
    Unknown,
    Fail,
    Success,
    Warning,
    Info,
}

impl MessageKind {
    pub fn code(&self) -> i32 {
        match self {
            MessageKind::Unknown => -1,
            MessageKind::Fail => 0,
            MessageKind::Success => 1,
            MessageKind::Warning => 2,
            MessageKind::Info => 3,
        }
    }

    /// Unrecognised codes map to `Unknown`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => MessageKind::Fail,
            1 => MessageKind::Success,
            2 => MessageKind::Warning,
            3 => MessageKind::Info,
            _ => MessageKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Unknown => "UNKNOWN",
            MessageKind::Fail => "FAIL",
            MessageKind::Success => "SUCCESS",
            MessageKind::Warning => "WARNING",
            MessageKind::Info => "INFO",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Status> for MessageKind {
    fn from(status: Status) -> Self {
        match status {
            Status::Pending => MessageKind::Info,
            Status::Passed => MessageKind::Success,
            Status::Failed | Status::Errored => MessageKind::Fail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageParseError {
    #[error("message is missing its {0} field")]
    MissingField(&'static str),
    #[error("invalid message kind `{0}`")]
    InvalidKind(String),
    #[error("invalid message timestamp `{0}`")]
    InvalidTimestamp(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub content: String,
    pub kind: MessageKind,
    /// Seconds since the UNIX epoch.
    pub timestamp: u64,
}

impl Message {
    /// A message stamped with the current time.
    pub fn new(content: impl Into<String>, kind: MessageKind) -> Self {
        Self::at(content, kind, now())
    }

    pub fn at(content: impl Into<String>, kind: MessageKind, timestamp: u64) -> Self {
        Self {
            content: content.into(),
            kind,
            timestamp,
        }
    }

    pub fn from_record(record: &OutcomeRecord) -> Self {
        let content = if record.message().is_empty() {
            format!("{}: {}", record.name(), record.status())
        } else {
            format!("{}: {} {}", record.name(), record.status(), record.message())
        };
        Self::new(content, record.status().into())
    }

    /// `[YYYY-MM-DD HH:MM:SS] [KIND] content`, in local time.
    pub fn format(&self) -> String {
        format!("[{}] [{}] {}", self.local_time(), self.kind, self.content)
    }

    /// The timestamp as local wall-clock time. Falls back to the raw seconds
    /// when the value is outside chrono's range.
    pub fn local_time(&self) -> String {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(|secs| Local.timestamp_opt(secs, 0).single())
            .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.timestamp.to_string())
    }

    pub fn serialize(&self) -> String {
        format!("{}|{}|{}", self.content, self.kind.code(), self.timestamp)
    }

    /// Parses the `content|kind|timestamp` form.
    ///
    /// Fields are split from the right, so the content may itself contain `|`.
    pub fn deserialize(data: &str) -> Result<Self, MessageParseError> {
        let mut fields = data.rsplitn(3, '|');
        let timestamp = fields
            .next()
            .ok_or(MessageParseError::MissingField("timestamp"))?;
        let kind = fields.next().ok_or(MessageParseError::MissingField("kind"))?;
        let content = fields
            .next()
            .ok_or(MessageParseError::MissingField("content"))?;

        let kind = kind
            .trim()
            .parse::<i32>()
            .map_err(|_| MessageParseError::InvalidKind(kind.to_string()))?;
        let timestamp = timestamp
            .trim()
            .parse::<u64>()
            .map_err(|_| MessageParseError::InvalidTimestamp(timestamp.to_string()))?;

        Ok(Self::at(content, MessageKind::from_code(kind), timestamp))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
