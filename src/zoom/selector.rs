use super::models::{RecordingEntry, RecordingFile};

/// Only this container is archived.
pub const PRIMARY_EXTENSION: &str = "MP4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Files to download, in catalog order.
    Files(Vec<RecordingFile>),
    /// Every video file is still being processed by Zoom.
    Incomplete { file_ids: Vec<String> },
    /// The meeting has no video file at all.
    Empty,
}

impl Selection {
    pub fn files(&self) -> &[RecordingFile] {
        match self {
            Self::Files(files) => files,
            _ => &[],
        }
    }
}

/// Pick the downloadable video files of a meeting.
///
/// Other containers are dropped silently. Incomplete files are never
/// downloaded; when nothing else is left the meeting is reported as
/// incomplete rather than as an empty selection.
pub fn select_files(entry: &RecordingEntry) -> Selection {
    let (incomplete, ready): (Vec<&RecordingFile>, Vec<&RecordingFile>) = entry
        .files
        .iter()
        .filter(|file| file.file_extension.eq_ignore_ascii_case(PRIMARY_EXTENSION))
        .partition(|file| file.is_incomplete());

    if !ready.is_empty() {
        return Selection::Files(ready.into_iter().cloned().collect());
    }
    if !incomplete.is_empty() {
        return Selection::Incomplete {
            file_ids: incomplete.into_iter().map(|f| f.file_id.clone()).collect(),
        };
    }
    Selection::Empty
}
