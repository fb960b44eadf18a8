/// Progress reporting for extraction runs

/// A progress update
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Progress {
    /// 1-based track number, 0 for the final run summary
    pub track_number: usize,
    /// Number of tracks in the run
    pub total_tracks: usize,
    /// Percent of the current track processed
    pub track_percent: u8,
    /// Percent of the whole run processed
    pub overall_percent: u8,
    /// Human-readable status
    pub status: String,
}

/// Overall run percentage from completed tracks and the current track
pub fn overall_percent(completed_tracks: usize, track_percent: u8, total_tracks: usize) -> u8 {
    if total_tracks == 0 {
        return 0;
    }
    let percent = (completed_tracks * 100 + track_percent as usize) / total_tracks;
    percent.min(100) as u8
}

/// Percentage of `done` out of `total`, 100 when there is nothing to do
pub fn percent_of(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (done.saturating_mul(100) / total).min(100) as u8
}

/// Suppresses repeated reports of the same percentage.
///
/// One throttle is owned per extraction run and reset for each track.
#[derive(Debug, Default)]
pub struct ProgressThrottle {
    last: Option<u8>,
}

impl ProgressThrottle {
    /// Create a throttle that reports the first value it sees
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last reported value
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Returns true if `percent` differs from the last reported value
    pub fn should_report(&mut self, percent: u8) -> bool {
        if self.last == Some(percent) {
            return false;
        }
        self.last = Some(percent);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_percent() {
        assert_eq!(overall_percent(0, 0, 4), 0);
        assert_eq!(overall_percent(1, 50, 4), 37);
        assert_eq!(overall_percent(3, 100, 4), 100);
        assert_eq!(overall_percent(0, 50, 0), 0);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(3, 3), 100);
        assert_eq!(percent_of(0, 0), 100);
    }

    #[test]
    fn test_throttle() {
        let mut throttle = ProgressThrottle::new();
        assert!(throttle.should_report(0));
        assert!(!throttle.should_report(0));
        assert!(throttle.should_report(1));
        assert!(!throttle.should_report(1));

        throttle.reset();
        assert!(throttle.should_report(1));
    }
}
