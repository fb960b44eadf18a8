/// On-disc time code (minutes, seconds, frames at 75 frames per second)

use crate::format::constants::FRAME_RATE;
use std::fmt;

const FRAMES_PER_MINUTE: u64 = 60 * FRAME_RATE as u64;
const MAX_FRAMES: u64 = 255 * FRAMES_PER_MINUTE + 59 * FRAME_RATE as u64 + (FRAME_RATE as u64 - 1);

/// A time position or duration as stored in the track time list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
pub struct SacdTime {
    /// Minutes
    pub minutes: u8,
    /// Seconds (0-59)
    pub seconds: u8,
    /// Frames (0-74)
    pub frames: u8,
}

impl SacdTime {
    /// Create a new time code
    pub fn new(minutes: u8, seconds: u8, frames: u8) -> Self {
        Self {
            minutes,
            seconds,
            frames,
        }
    }

    /// Build a time code from a frame count, saturating at 255:59.74
    pub fn from_frames(frames: u64) -> Self {
        let frames = frames.min(MAX_FRAMES);
        Self {
            minutes: (frames / FRAMES_PER_MINUTE) as u8,
            seconds: ((frames / FRAME_RATE as u64) % 60) as u8,
            frames: (frames % FRAME_RATE as u64) as u8,
        }
    }

    /// Total number of frames
    pub fn total_frames(&self) -> u64 {
        self.minutes as u64 * FRAMES_PER_MINUTE
            + self.seconds as u64 * FRAME_RATE as u64
            + self.frames as u64
    }

    /// Convert to floating-point seconds
    pub fn to_seconds(&self) -> f64 {
        self.minutes as f64 * 60.0 + self.seconds as f64 + self.frames as f64 / FRAME_RATE as f64
    }

    /// Convert from floating-point seconds, quantized to the nearest frame.
    /// Negative and non-finite inputs give zero.
    pub fn from_seconds(seconds: f64) -> Self {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Self::default();
        }
        let frames = (seconds * FRAME_RATE as f64).round();
        if frames >= MAX_FRAMES as f64 {
            return Self::from_frames(MAX_FRAMES);
        }
        Self::from_frames(frames as u64)
    }
}

impl fmt::Display for SacdTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}.{:02}", self.minutes, self.seconds, self.frames)
    }
}

/// Convert an on-disc time code to seconds
pub fn time_to_seconds(time: &SacdTime) -> f64 {
    time.to_seconds()
}

/// Convert seconds to an on-disc time code
pub fn seconds_to_time(seconds: f64) -> SacdTime {
    SacdTime::from_seconds(seconds)
}
