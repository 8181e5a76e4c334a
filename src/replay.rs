//! Detectors that play back landmarks and ball detections recorded earlier.
//!
//! A recording is a JSON document with the frames of one video:
//!
//! ```json
//! {
//!   "fps": 30.0,
//!   "frames": [
//!     {"landmarks": {"left_wrist": {"x": 0.4, "y": 0.6, "visibility": 0.9}},
//!      "ball_detections": []},
//!     {"landmarks": null}
//!   ]
//! }
//! ```

use crate::{
    detection::{BallDetection, TrailState},
    detector::{BallDetector, PoseDetector, VideoSource},
    error::Error,
    pose::Landmarks,
    sequence::frame_interval,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// One recorded frame; it plays the role of the image in the analysis pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub landmarks: Option<Landmarks>,
    #[serde(default)]
    pub ball_detections: Vec<BallDetection>,
    /// Ball boxes drawn onto this frame, most recent first.
    #[serde(skip)]
    pub trail: Vec<[f64; 4]>,
}

impl RecordedFrame {
    pub fn new(landmarks: Option<Landmarks>, ball_detections: Vec<BallDetection>) -> Self {
        Self {
            landmarks,
            ball_detections,
            trail: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Frame rate the frames were recorded at; absent when they are already sampled.
    #[serde(default)]
    pub fps: Option<f64>,
    pub frames: Vec<RecordedFrame>,
    #[serde(skip)]
    samples_per_second: Option<f64>,
}

impl Recording {
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| Error::ReadFile(e, path.to_path_buf()))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, Error> {
        serde_json::from_str(contents).map_err(Error::ParseJson)
    }

    /// Sample the recording down to this rate when it is read as a video.
    pub fn sampled(mut self, samples_per_second: f64) -> Self {
        self.samples_per_second = Some(samples_per_second);
        self
    }
}

impl VideoSource<RecordedFrame> for Recording {
    fn frames(&mut self) -> Result<Vec<RecordedFrame>, Error> {
        let interval = match (self.fps, self.samples_per_second) {
            (Some(fps), Some(samples_per_second)) => frame_interval(fps, samples_per_second),
            _ => 1,
        };
        debug!(recorded = self.frames.len(), interval, "sampling recording");
        Ok(self.frames.iter().step_by(interval).cloned().collect())
    }
}

/// Reports the landmarks stored in each frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayPose;

impl PoseDetector<RecordedFrame> for ReplayPose {
    fn detect_pose(&mut self, frame: &RecordedFrame) -> Result<(Option<Landmarks>, RecordedFrame), Error> {
        Ok((frame.landmarks.clone(), frame.clone()))
    }
}

/// Reports the ball detections stored in each frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayBall;

impl BallDetector<RecordedFrame> for ReplayBall {
    fn detect(&mut self, frame: &RecordedFrame) -> Result<Vec<BallDetection>, Error> {
        Ok(frame.ball_detections.clone())
    }

    fn annotate(
        &self,
        frame: &mut RecordedFrame,
        detections: &[BallDetection],
        trail: &mut TrailState,
    ) -> Result<(), Error> {
        trail.record(detections);
        frame.trail = trail.iter().map(|(_, bbox)| *bbox).collect();
        Ok(())
    }
}
