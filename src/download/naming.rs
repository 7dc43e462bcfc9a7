use crate::zoom::{RecordingEntry, RecordingFile};
use std::path::{Path, PathBuf};

const MEETING_TIME_FORMAT: &str = "%Y.%m.%d - %I.%M %p UTC";

/// `<dir>/<topic> - <time>/<time> - <topic> - <Type> - <file_id>.<ext>`
pub fn target_path(download_dir: &Path, entry: &RecordingEntry, file: &RecordingFile) -> PathBuf {
    let meeting_time = entry.start_time.format(MEETING_TIME_FORMAT).to_string();
    let topic = sanitize(&entry.topic);
    let recording_type = title_case(&file.recording_type.replace('_', " "));

    let folder = format!("{} - {}", topic, meeting_time);
    let filename = format!(
        "{} - {} - {} - {}.{}",
        meeting_time,
        topic,
        recording_type,
        sanitize(&file.file_id),
        file.file_extension.to_lowercase()
    );
    download_dir.join(folder).join(filename)
}

/// Display name for an archived file: its stem without the trailing file id.
pub fn display_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let name = match stem.rsplit_once(" - ") {
        Some((name, _file_id)) => name,
        None => stem,
    };
    Some(name.to_string())
}

fn sanitize(component: &str) -> String {
    component.replace(['/', '\\'], "&")
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for ch in text.chars() {
        if previous_is_letter {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        previous_is_letter = ch.is_alphabetic();
    }
    out
}
