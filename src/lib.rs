//! Technique scoring for volleyball forearm passes.
//!
//! Per-frame body landmarks and optional ball detections go in; a 0-100
//! score with feedback, and sequence-level motion metrics, come out.

pub mod config;
pub mod curves;
pub mod detection;
pub mod detector;
pub mod error;
pub mod grade;
pub mod point;
pub mod pose;
pub mod replay;
pub mod scorer;
pub mod sequence;
pub mod standards;
#[cfg(feature = "video")]
pub mod video;

pub use config::Config;
pub use detection::BallDetection;
pub use error::Error;
pub use grade::{get_grade, Grade};
pub use pose::{KeypointKind, Landmark, Landmarks};
pub use scorer::{PoseScorer, ScoreResult, ScoringContext, SequenceScore, WeightTable};
pub use sequence::{AnalyzeOptions, SequenceAnalyzer, SequenceInput, SequenceResult};
