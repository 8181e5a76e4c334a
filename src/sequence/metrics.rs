//! Reductions over the per-frame landmarks of a sequence.
//!
//! Every function here takes one entry per analyzed frame, `None` where no
//! pose was found, and is total: short or empty sequences get a fixed
//! neutral value instead of an error.

use crate::{
    detection::{best_detection, BallDetection},
    pose::{
        constants::{BEST_FRAME_KEYPOINTS, COMPLETENESS_KEYPOINTS, TRAJECTORY_KEYPOINTS, WRISTS},
        KeypointKind, Landmarks,
    },
};
use ndarray::Array1;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Score of metrics that cannot be computed from too few frames.
pub const NEUTRAL_SCORE: f64 = 50.0;

const SMOOTHNESS_MIN_FRAMES: usize = 3;
const SMOOTHNESS_SCALE: f64 = 1000.0;
const CONSISTENCY_MIN_FRAMES: usize = 2;
const SYMMETRY_SCALE: f64 = 200.0;
const CONSISTENCY_STD_WEIGHT: f64 = 0.5;
const MIDDLE_BIAS: f64 = 0.2;

fn count(n: usize) -> f64 {
    n.to_f64().unwrap_or_default()
}

/// Positions of one keypoint over time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    pub visibility: Vec<Option<f64>>,
}

/// Center and confidence of the best ball detection of every frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BallTrajectory {
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    pub confidence: Vec<f64>,
}

pub fn trajectories(frames: &[Option<&Landmarks>]) -> BTreeMap<KeypointKind, Trajectory> {
    TRAJECTORY_KEYPOINTS
        .iter()
        .map(|&kind| {
            let mut trajectory = Trajectory::default();
            for landmark in frames.iter().map(|landmarks| landmarks.and_then(|l| l.try_get(kind))) {
                trajectory.x.push(landmark.map(|l| l.x));
                trajectory.y.push(landmark.map(|l| l.y));
                trajectory.visibility.push(landmark.map(|l| l.visibility));
            }
            (kind, trajectory)
        })
        .collect()
}

pub fn ball_trajectory<'a, I>(frames: I) -> BallTrajectory
where
    I: IntoIterator<Item = &'a [BallDetection]>,
{
    let mut trajectory = BallTrajectory::default();
    for detections in frames {
        match best_detection(detections) {
            Some(best) => {
                let center = best.center();
                trajectory.x.push(Some(center.x));
                trajectory.y.push(Some(center.y));
                trajectory.confidence.push(best.score);
            }
            None => {
                trajectory.x.push(None);
                trajectory.y.push(None);
                trajectory.confidence.push(0.0);
            }
        }
    }
    trajectory
}

fn wrist_smoothness(frames: &[Option<&Landmarks>], wrist: KeypointKind) -> Option<f64> {
    let positions: Vec<(f64, f64)> = frames
        .iter()
        .filter_map(|landmarks| landmarks.and_then(|l| l.try_get(wrist)))
        .map(|l| (l.x, l.y))
        .collect();
    if positions.len() < SMOOTHNESS_MIN_FRAMES {
        return None;
    }

    let speeds: Vec<f64> = positions
        .windows(2)
        .map(|pair| {
            let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
            (x1 - x0).hypot(y1 - y0)
        })
        .collect();
    let accelerations: Array1<f64> = speeds.windows(2).map(|pair| (pair[1] - pair[0]).abs()).collect();

    Some((100.0 - SMOOTHNESS_SCALE * accelerations.std(0.0)).max(0.0))
}

/// How evenly the wrists accelerate, 100 for constant speed.
pub fn smoothness(frames: &[Option<&Landmarks>]) -> f64 {
    if frames.len() < SMOOTHNESS_MIN_FRAMES {
        return NEUTRAL_SCORE;
    }
    let scores: Array1<f64> = WRISTS
        .iter()
        .filter_map(|&wrist| wrist_smoothness(frames, wrist))
        .collect();
    scores.mean().unwrap_or(NEUTRAL_SCORE)
}

/// Share of frames with a pose, averaged with how visible the arms were.
pub fn completeness(frames: &[Option<&Landmarks>]) -> f64 {
    if frames.is_empty() {
        return 0.0;
    }

    let valid = frames.iter().filter(|landmarks| landmarks.is_some()).count();
    let coverage = count(valid) / count(frames.len()) * 100.0;
    if valid == 0 {
        return coverage;
    }

    let per_frame: Array1<f64> = frames
        .iter()
        .flatten()
        .filter_map(|landmarks| {
            let visibilities: Array1<f64> = landmarks.visibilities(&COMPLETENESS_KEYPOINTS).collect();
            visibilities.mean()
        })
        .collect();

    match per_frame.mean() {
        Some(visibility) => (coverage + visibility * 100.0) / 2.0,
        None => coverage,
    }
}

/// Stability of the left/right wrist height symmetry over the sequence.
pub fn consistency(frames: &[Option<&Landmarks>]) -> f64 {
    if frames.len() < CONSISTENCY_MIN_FRAMES {
        return NEUTRAL_SCORE;
    }

    let symmetry: Array1<f64> = frames
        .iter()
        .flatten()
        .filter_map(|landmarks| {
            let left = landmarks.try_get(KeypointKind::LeftWrist)?;
            let right = landmarks.try_get(KeypointKind::RightWrist)?;
            Some((100.0 - SYMMETRY_SCALE * (left.y - right.y).abs()).max(0.0))
        })
        .collect();

    match symmetry.mean() {
        Some(mean) => (mean - CONSISTENCY_STD_WEIGHT * symmetry.std(0.0)).clamp(0.0, 100.0),
        None => NEUTRAL_SCORE,
    }
}

/// Index of the clearest frame, favoring the middle of the sequence.
///
/// The first of equally good frames wins; without any pose the result is 0.
pub fn best_frame(frames: &[Option<&Landmarks>]) -> usize {
    let half = count(frames.len()) / 2.0;
    let mut best: Option<(usize, f64)> = None;

    for (idx, landmarks) in frames.iter().enumerate() {
        let landmarks = match landmarks {
            Some(landmarks) => landmarks,
            None => continue,
        };
        let visibilities: Array1<f64> = landmarks.visibilities(&BEST_FRAME_KEYPOINTS).collect();
        let visibility = match visibilities.mean() {
            Some(visibility) => visibility,
            None => continue,
        };

        let middle_bonus = 1.0 - (count(idx) - half).abs() / half * MIDDLE_BIAS;
        let score = visibility * middle_bonus;
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((idx, score));
        }
    }

    best.map_or(0, |(idx, _)| idx)
}
