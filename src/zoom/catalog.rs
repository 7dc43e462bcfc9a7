use super::models::{Account, RecordingEntry, RecordingListPage};
use super::ZoomClient;
use crate::error::{ArchiveError, ArchiveResult};
use chrono::{Days, NaiveDate};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Inclusive calendar range the recordings are listed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `[today - lookback_days, today]`.
    pub fn lookback(today: NaiveDate, lookback_days: u32) -> Self {
        let start = today
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .unwrap_or(today);
        Self { start, end: today }
    }
}

/// Split `[start, end]` into consecutive windows of at most `days` days.
///
/// Each window ends where the next one starts; the last one is clipped to
/// `end`. A single-day range is one `(day, day)` window, since the API treats
/// both ends as inclusive. An inverted range produces no windows.
pub fn date_windows(start: NaiveDate, end: NaiveDate, days: u32) -> Vec<(NaiveDate, NaiveDate)> {
    if start == end {
        return vec![(start, end)];
    }
    let step = Days::new(u64::from(days.max(1)));
    let mut windows = Vec::new();
    let mut current = start;
    while current < end {
        let next = current.checked_add_days(step).map_or(end, |d| d.min(end));
        windows.push((current, next));
        current = next;
    }
    windows
}

pub struct RecordingCatalog<'a> {
    client: &'a ZoomClient,
    range: DateRange,
    window_days: u32,
    page_size: u32,
}

impl<'a> RecordingCatalog<'a> {
    pub fn new(client: &'a ZoomClient, range: DateRange, window_days: u32, page_size: u32) -> Self {
        Self {
            client,
            range,
            window_days,
            page_size,
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// List the account's recordings window by window, oldest window first.
    ///
    /// The API treats both ends of a window as inclusive, so a meeting on a
    /// boundary day can be returned twice; only its first occurrence is kept.
    pub async fn list_recordings(&self, account: &Account) -> ArchiveResult<Vec<RecordingEntry>> {
        let path = format!(
            "/users/{}/recordings",
            urlencoding::encode(&account.internal_id)
        );
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for (from, to) in date_windows(self.range.start, self.range.end, self.window_days) {
            let query = [
                ("page_size", self.page_size.to_string()),
                ("from", from.to_string()),
                ("to", to.to_string()),
            ];
            let page: RecordingListPage =
                self.client
                    .get_json(&path, &query)
                    .await
                    .map_err(|err| ArchiveError::CatalogFailure {
                        user: account.email.clone(),
                        from: from.to_string(),
                        to: to.to_string(),
                        reason: err.to_string(),
                    })?;
            debug!(
                "{} meeting(s) for {} between {} and {}",
                page.meetings.len(),
                account.email,
                from,
                to
            );

            for meeting in page.meetings {
                if !seen.insert(meeting.uuid.clone()) {
                    continue;
                }
                let uuid = meeting.uuid.clone();
                match RecordingEntry::try_from(meeting) {
                    Ok(entry) => entries.push(entry),
                    Err(err) => warn!("Ignoring meeting {} with unreadable start time: {}", uuid, err),
                }
            }
        }

        Ok(entries)
    }
}
