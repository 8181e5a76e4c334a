//! Frame-by-frame analysis of a whole pass.

use crate::{
    config::AnalyzerConfig,
    detection::{BallDetection, TrailState},
    detector::{BallDetector, PoseDetector, VideoSource},
    error::Error,
    pose::{KeypointKind, Landmarks},
};
use indicatif::ProgressBar;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

pub mod metrics;
pub mod summary;

pub use metrics::{BallTrajectory, Trajectory};
pub use summary::SequenceSummary;

/// What was observed in one analyzed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame_idx: usize,
    pub landmarks: Option<Landmarks>,
    pub has_pose: bool,
    pub ball_detections: Vec<BallDetection>,
}

#[derive(Debug, Serialize)]
pub struct SequenceResult<F> {
    pub frames_data: Vec<FrameRecord>,
    pub trajectories: BTreeMap<KeypointKind, Trajectory>,
    pub ball_trajectory: Option<BallTrajectory>,
    pub smoothness_score: f64,
    pub completeness_score: f64,
    pub consistency_score: f64,
    pub best_frame_idx: usize,
    /// Frames as returned by the pose detector, with ball markers when drawn.
    #[serde(skip)]
    pub annotated_frames: Vec<F>,
    pub ball_detection_enabled: bool,
}

impl<F> SequenceResult<F> {
    pub fn summary(&self) -> SequenceSummary {
        SequenceSummary::new(self)
    }

    pub fn best_frame(&self) -> Option<&FrameRecord> {
        self.frames_data.get(self.best_frame_idx)
    }
}

pub enum SequenceInput<'a, F> {
    /// Frames that were already decoded and sampled.
    Frames(Vec<F>),
    Video(&'a mut dyn VideoSource<F>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Overrides the analyzer's default for this run.
    pub detect_ball: Option<bool>,
    pub draw_ball: bool,
}

/// Keep one frame out of this many to sample `samples_per_second` from a video at `fps`.
pub fn frame_interval(fps: f64, samples_per_second: f64) -> usize {
    (fps / samples_per_second)
        .floor()
        .to_usize()
        .unwrap_or_default()
        .max(1)
}

pub type BallDetectorLoader<B> = Box<dyn FnMut() -> Result<B, Error>>;

pub struct SequenceAnalyzer<P, B> {
    pose_detector: P,
    ball_detector: Option<B>,
    ball_loader: Option<BallDetectorLoader<B>>,
    enable_ball_detection: bool,
    config: AnalyzerConfig,
}

impl<P, B> SequenceAnalyzer<P, B> {
    pub fn new(pose_detector: P, config: AnalyzerConfig) -> Self {
        Self {
            pose_detector,
            ball_detector: None,
            ball_loader: None,
            enable_ball_detection: false,
            config,
        }
    }

    /// Use an already constructed ball detector and enable ball detection.
    pub fn with_ball_detector(mut self, ball_detector: B) -> Self {
        self.ball_detector = Some(ball_detector);
        self.enable_ball_detection = true;
        self
    }

    /// Construct the ball detector on first use and enable ball detection.
    pub fn with_ball_loader<L>(mut self, loader: L) -> Self
    where
        L: FnMut() -> Result<B, Error> + 'static,
    {
        self.ball_loader = Some(Box::new(loader));
        self.enable_ball_detection = true;
        self
    }

    pub fn enable_ball_detection(mut self, enable: bool) -> Self {
        self.enable_ball_detection = enable;
        self
    }

    pub fn ball_detector_ready(&self) -> bool {
        self.ball_detector.is_some()
    }

    fn ensure_ball_detector(&mut self) -> bool {
        if self.ball_detector.is_some() {
            return true;
        }
        let loader = match self.ball_loader.as_mut() {
            Some(loader) => loader,
            None => {
                warn!("ball detection requested without a ball detector");
                return false;
            }
        };
        match loader() {
            Ok(ball_detector) => {
                info!("ball detector initialized");
                self.ball_detector = Some(ball_detector);
                true
            }
            Err(e) => {
                warn!(error = %e, "ball detection disabled for this run");
                false
            }
        }
    }

    fn detect_chunk<F>(&mut self, chunk: &[F]) -> Vec<Vec<BallDetection>>
    where
        B: BallDetector<F>,
    {
        let max_batch = self.config.detector_batch_size;
        let detections = match self.ball_detector.as_mut() {
            Some(ball_detector) => ball_detector.detect_batch(chunk, max_batch),
            None => Ok(vec![Vec::new(); chunk.len()]),
        };
        detections.unwrap_or_else(|e| {
            warn!(error = %e, frames = chunk.len(), "ball detection failed for chunk");
            vec![Vec::new(); chunk.len()]
        })
    }

    /// Run pose and, when enabled, ball detection over every frame.
    ///
    /// Only a video source that fails or yields no frames is an error; any
    /// detector failure degrades to an empty observation for that frame.
    #[instrument(name = "SequenceAnalyzer::analyze", skip(self, input, progress))]
    pub fn analyze<F>(
        &mut self,
        input: SequenceInput<'_, F>,
        options: AnalyzeOptions,
        progress: Option<&ProgressBar>,
    ) -> Result<SequenceResult<F>, Error>
    where
        F: Clone,
        P: PoseDetector<F>,
        B: BallDetector<F>,
    {
        let frames = match input {
            SequenceInput::Frames(frames) => frames,
            SequenceInput::Video(source) => {
                let frames = source.frames()?;
                if frames.is_empty() {
                    return Err(Error::NoFramesExtracted);
                }
                frames
            }
        };

        let requested = options.detect_ball.unwrap_or(self.enable_ball_detection);
        let use_ball = requested && self.ensure_ball_detector();
        let draw_ball = options.draw_ball && use_ball;
        debug!(frames = frames.len(), use_ball, draw_ball, "analyzing sequence");

        if let Some(progress) = progress {
            progress.set_length(frames.len().to_u64().unwrap_or_default());
        }

        let mut trail = TrailState::new(self.config.trail_len);
        let mut frames_data = Vec::with_capacity(frames.len());
        let mut annotated_frames = Vec::with_capacity(frames.len());
        let chunk_size = self.config.chunk_size.max(1);

        for (chunk_idx, chunk) in frames.chunks(chunk_size).enumerate() {
            let start = chunk_idx * chunk_size;
            let chunk_detections = if use_ball {
                self.detect_chunk(chunk)
            } else {
                vec![Vec::new(); chunk.len()]
            };

            for (offset, (frame, ball_detections)) in chunk.iter().zip(chunk_detections).enumerate() {
                let frame_idx = start + offset;
                let (landmarks, mut annotated) = self.pose_detector.detect_pose(frame).unwrap_or_else(|e| {
                    warn!(frame_idx, error = %e, "pose detection failed");
                    (None, frame.clone())
                });

                if draw_ball {
                    if let Some(ball_detector) = self.ball_detector.as_ref() {
                        if let Err(e) = ball_detector.annotate(&mut annotated, &ball_detections, &mut trail) {
                            warn!(frame_idx, error = %e, "failed to draw ball");
                        }
                    }
                }

                frames_data.push(FrameRecord {
                    frame_idx,
                    has_pose: landmarks.is_some(),
                    landmarks,
                    ball_detections,
                });
                annotated_frames.push(annotated);

                if let Some(progress) = progress {
                    progress.inc(1);
                }
            }
        }

        let landmarks: Vec<Option<&Landmarks>> =
            frames_data.iter().map(|frame| frame.landmarks.as_ref()).collect();
        let trajectories = metrics::trajectories(&landmarks);
        let smoothness_score = metrics::smoothness(&landmarks);
        let completeness_score = metrics::completeness(&landmarks);
        let consistency_score = metrics::consistency(&landmarks);
        let best_frame_idx = metrics::best_frame(&landmarks);
        let ball_trajectory = if use_ball {
            Some(metrics::ball_trajectory(
                frames_data.iter().map(|frame| frame.ball_detections.as_slice()),
            ))
        } else {
            None
        };

        info!(
            frames = frames_data.len(),
            valid = landmarks.iter().filter(|landmarks| landmarks.is_some()).count(),
            best_frame_idx,
            "sequence analyzed"
        );

        Ok(SequenceResult {
            frames_data,
            trajectories,
            ball_trajectory,
            smoothness_score,
            completeness_score,
            consistency_score,
            best_frame_idx,
            annotated_frames,
            ball_detection_enabled: use_ball,
        })
    }
}
