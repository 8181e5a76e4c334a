//! Ideal ranges for the measured joint angles and ball offsets, rescaled by body height.

use crate::pose::{
    constants::BODY_HEIGHT_FACTOR,
    KeypointKind::{self, *},
    Landmarks,
};
use serde::{Deserialize, Serialize};

/// Normalized height of the reference subject.
pub const REFERENCE_BODY_HEIGHT: f64 = 0.7;

/// Height returned when the landmarks do not allow an estimate.
pub const DEFAULT_BODY_HEIGHT: f64 = 1.0;

pub const TALL_HEIGHT_FACTOR: f64 = 1.1;
pub const SHORT_HEIGHT_FACTOR: f64 = 0.9;

/// Inclusive `(min, max)` interval.
pub type Range = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Standards {
    pub arm_angle_range: Range,
    pub arm_gap_range: Range,
    pub knee_angle_range: Range,
    pub wrist_hip_ratio_range: Range,
    pub torso_angle_range: Range,
    pub ball_vertical_offset_range: Range,
    pub ball_horizontal_offset_max: f64,
    pub ball_contact_distance_max: f64,
}

impl Default for Standards {
    fn default() -> Self {
        Self {
            arm_angle_range: (140.0, 175.0),
            arm_gap_range: (20.0, 40.0),
            knee_angle_range: (80.0, 110.0),
            wrist_hip_ratio_range: (0.8, 1.5),
            torso_angle_range: (75.0, 105.0),
            ball_vertical_offset_range: (0.05, 0.18),
            ball_horizontal_offset_max: 0.12,
            ball_contact_distance_max: 0.12,
        }
    }
}

impl Standards {
    /// Copy of these standards adjusted for a subject of the given normalized height.
    ///
    /// Tall subjects get a slightly more bent arm range and a more open knee
    /// range, short subjects a deeper knee range. Anything within 10% of the
    /// reference height is returned unchanged.
    pub fn adapt(&self, body_height: f64) -> Self {
        let height_factor = body_height / REFERENCE_BODY_HEIGHT;
        let mut adjusted = *self;

        if height_factor > TALL_HEIGHT_FACTOR {
            adjusted.arm_angle_range = (135.0, 170.0);
            adjusted.knee_angle_range = (85.0, 115.0);
        } else if height_factor < SHORT_HEIGHT_FACTOR {
            adjusted.arm_angle_range = (140.0, 175.0);
            adjusted.knee_angle_range = (75.0, 105.0);
        }

        adjusted
    }
}

pub fn get_adaptive_standards(base: &Standards, body_height: f64) -> Standards {
    base.adapt(body_height)
}

fn mean_y(landmarks: &Landmarks, left: KeypointKind, right: KeypointKind) -> Option<f64> {
    let left = landmarks.try_get(left)?;
    let right = landmarks.try_get(right)?;
    Some((left.y + right.y) / 2.0)
}

/// Normalized body height estimated from the head and shoulder spans to the ankles.
///
/// Falls back to [`DEFAULT_BODY_HEIGHT`] when any required landmark is missing.
pub fn calculate_body_height(landmarks: &Landmarks) -> f64 {
    let estimate = || {
        let nose_y = landmarks.try_get(Nose)?.y;
        let ankle_y = mean_y(landmarks, LeftAnkle, RightAnkle)?;
        let shoulder_y = mean_y(landmarks, LeftShoulder, RightShoulder)?;

        let head_span = (ankle_y - nose_y).abs();
        let shoulder_span = (ankle_y - shoulder_y).abs() * BODY_HEIGHT_FACTOR;
        Some((head_span + shoulder_span) / 2.0)
    };

    estimate()
        .filter(|height| height.is_finite())
        .unwrap_or(DEFAULT_BODY_HEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Landmark;
    use assert_approx_eq::assert_approx_eq;

    fn standing(nose_y: f64, shoulder_y: f64, ankle_y: f64) -> Landmarks {
        Landmarks::new()
            .with(Nose, Landmark::new(0.5, nose_y, 1.0))
            .with(LeftShoulder, Landmark::new(0.45, shoulder_y, 1.0))
            .with(RightShoulder, Landmark::new(0.55, shoulder_y, 1.0))
            .with(LeftAnkle, Landmark::new(0.45, ankle_y, 1.0))
            .with(RightAnkle, Landmark::new(0.55, ankle_y, 1.0))
    }

    mod body_height_tests {
        use super::*;

        #[test]
        fn averages_both_spans() {
            let height = calculate_body_height(&standing(0.1, 0.2, 0.8));
            assert_approx_eq!(height, (0.7 + 0.6 * 1.15) / 2.0);
        }

        #[test]
        fn missing_landmark_is_neutral() {
            let mut landmarks = Landmarks::new();
            landmarks.insert(Nose, Landmark::new(0.5, 0.1, 1.0));
            assert_eq!(calculate_body_height(&landmarks), DEFAULT_BODY_HEIGHT);
        }
    }

    mod adapt_tests {
        use super::*;

        #[test]
        fn average_height_is_unchanged() {
            let base = Standards::default();
            assert_eq!(base.adapt(0.7), base);
            assert_eq!(base.adapt(0.65), base);
        }

        #[test]
        fn tall_subject() {
            let adjusted = Standards::default().adapt(0.8);
            assert_eq!(adjusted.arm_angle_range, (135.0, 170.0));
            assert_eq!(adjusted.knee_angle_range, (85.0, 115.0));
            assert_eq!(adjusted.arm_gap_range, Standards::default().arm_gap_range);
        }

        #[test]
        fn short_subject() {
            let adjusted = get_adaptive_standards(&Standards::default(), 0.5);
            assert_eq!(adjusted.arm_angle_range, (140.0, 175.0));
            assert_eq!(adjusted.knee_angle_range, (75.0, 105.0));
        }

        #[test]
        fn base_table_is_not_mutated() {
            let base = Standards::default();
            let _ = base.adapt(2.0);
            assert_eq!(base, Standards::default());
            assert_eq!(base.adapt(0.3), base.adapt(0.3));
        }
    }
}
