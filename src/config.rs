use crate::{error::Error, standards::Standards};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuned constants of the ball-contact scorer.
///
/// These are empirical values that have not been fitted against labeled
/// passes; keep them here rather than inline so they can be recalibrated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BallContactConfig {
    /// A detection must score strictly above this to switch to ball-aware weights.
    pub presence_threshold: f64,
    pub vertical_ideal: f64,
    pub vertical_tolerance: f64,
    pub vertical_below_penalty: f64,
    pub vertical_high_penalty: f64,
    pub horizontal_tolerance: f64,
    pub horizontal_centered: f64,
    pub horizontal_drifting: f64,
    pub overshoot_distance: f64,
    pub distance_threshold: f64,
    pub distance_steepness: f64,
    pub distance_far: f64,
    pub low_confidence: f64,
    pub fair_confidence: f64,
}

impl Default for BallContactConfig {
    fn default() -> Self {
        Self {
            presence_threshold: 0.5,
            vertical_ideal: 0.15,
            vertical_tolerance: 0.12,
            vertical_below_penalty: 0.5,
            vertical_high_penalty: 0.7,
            horizontal_tolerance: 0.12,
            horizontal_centered: 0.08,
            horizontal_drifting: 0.18,
            overshoot_distance: 0.02,
            distance_threshold: 0.10,
            distance_steepness: 20.0,
            distance_far: 0.18,
            low_confidence: 0.4,
            fair_confidence: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Frames held in memory per outer chunk.
    pub chunk_size: usize,
    /// Frames handed to the ball model per inference call.
    pub detector_batch_size: usize,
    /// Frames kept per second of video.
    pub samples_per_second: f64,
    /// Past ball positions drawn as a trail.
    pub trail_len: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 300,
            detector_batch_size: 64,
            samples_per_second: 2.0,
            trail_len: 8,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub standards: Standards,
    pub ball: BallContactConfig,
    pub analyzer: AnalyzerConfig,
}

impl Config {
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
}
