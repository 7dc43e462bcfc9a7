//! Zoom API payloads and the domain types built from them.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One page of `GET /users`.
#[derive(Debug, Deserialize)]
pub struct UserPage {
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub users: Vec<ApiUser>,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
    pub email: String,
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// One window of `GET /users/{id}/recordings`.
#[derive(Debug, Deserialize)]
pub struct RecordingListPage {
    #[serde(default)]
    pub meetings: Vec<ApiMeeting>,
}

#[derive(Debug, Deserialize)]
pub struct ApiMeeting {
    pub uuid: String,
    #[serde(default)]
    pub topic: String,
    pub start_time: String,
    #[serde(default)]
    pub recording_files: Vec<ApiRecordingFile>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRecordingFile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub file_extension: String,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub recording_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub email: String,
    pub internal_id: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<ApiUser> for Account {
    fn from(user: ApiUser) -> Self {
        Self {
            email: user.email,
            internal_id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

impl Account {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            format!("{} ({})", name, self.email)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    /// Zoom reports an empty file type while a recording is still processing.
    Incomplete,
    Timeline,
    Named(String),
}

impl FileType {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "" => Self::Incomplete,
            "TIMELINE" => Self::Timeline,
            other => Self::Named(other.to_string()),
        }
    }
}

pub const INCOMPLETE_RECORDING_TYPE: &str = "incomplete";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingFile {
    pub file_type: FileType,
    pub file_extension: String,
    pub download_url: String,
    pub recording_type: String,
    pub file_id: String,
}

impl RecordingFile {
    pub fn is_incomplete(&self) -> bool {
        self.file_type == FileType::Incomplete
    }
}

impl From<ApiRecordingFile> for RecordingFile {
    fn from(file: ApiRecordingFile) -> Self {
        let file_type = FileType::from_raw(&file.file_type);
        let recording_type = match &file_type {
            FileType::Incomplete => INCOMPLETE_RECORDING_TYPE.to_string(),
            FileType::Timeline => file.file_type.clone(),
            FileType::Named(_) => file.recording_type,
        };
        Self {
            file_type,
            file_extension: file.file_extension,
            download_url: file.download_url,
            recording_type,
            file_id: file.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingEntry {
    pub meeting_uuid: String,
    pub topic: String,
    pub start_time: DateTime<Utc>,
    pub files: Vec<RecordingFile>,
}

impl TryFrom<ApiMeeting> for RecordingEntry {
    type Error = chrono::ParseError;

    fn try_from(meeting: ApiMeeting) -> Result<Self, Self::Error> {
        let start_time = DateTime::parse_from_rfc3339(&meeting.start_time)?.with_timezone(&Utc);
        Ok(Self {
            meeting_uuid: meeting.uuid,
            topic: meeting.topic,
            start_time,
            files: meeting
                .recording_files
                .into_iter()
                .map(RecordingFile::from)
                .collect(),
        })
    }
}
