/// Where a single meeting ended up during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingOutcome {
    /// Already in the completed log.
    Skipped,
    /// Recorded as complete.
    Completed { downloaded: usize, failed: usize },
    /// Downloads did not satisfy the success policy; retried next run.
    Failed { downloaded: usize, failed: usize },
    /// Zoom is still processing every video file of the meeting.
    Incomplete,
    /// The meeting has no video file.
    NothingToDownload,
    /// The run was interrupted while this meeting was in flight.
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub accounts: usize,
    pub meetings: usize,
    pub skipped: usize,
    pub completed: usize,
    pub failed: usize,
    pub incomplete: usize,
    pub nothing_to_download: usize,
    pub files_downloaded: usize,
    pub files_failed: usize,
    pub skipped_user_pages: usize,
    /// Emails of accounts whose recordings could not be listed.
    pub catalog_failures: Vec<String>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn record(&mut self, outcome: MeetingOutcome) {
        self.meetings += 1;
        match outcome {
            MeetingOutcome::Skipped => self.skipped += 1,
            MeetingOutcome::Completed { downloaded, failed } => {
                self.completed += 1;
                self.files_downloaded += downloaded;
                self.files_failed += failed;
            }
            MeetingOutcome::Failed { downloaded, failed } => {
                self.failed += 1;
                self.files_downloaded += downloaded;
                self.files_failed += failed;
            }
            MeetingOutcome::Incomplete => self.incomplete += 1,
            MeetingOutcome::NothingToDownload => self.nothing_to_download += 1,
            MeetingOutcome::Cancelled => self.cancelled = true,
        }
    }

    /// Meetings that went through a download attempt this run.
    pub fn processed(&self) -> usize {
        self.completed + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_outcomes() {
        let mut report = RunReport::default();
        report.record(MeetingOutcome::Skipped);
        report.record(MeetingOutcome::Completed {
            downloaded: 1,
            failed: 1,
        });
        report.record(MeetingOutcome::Failed {
            downloaded: 0,
            failed: 2,
        });
        report.record(MeetingOutcome::Incomplete);

        assert_eq!(report.meetings, 4);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.processed(), 2);
        assert_eq!(report.files_downloaded, 1);
        assert_eq!(report.files_failed, 3);
        assert_eq!(report.incomplete, 1);
        assert!(!report.cancelled);
    }
}
