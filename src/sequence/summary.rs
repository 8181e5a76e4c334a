use super::SequenceResult;
use serde::{Deserialize, Serialize};

const SMOOTHNESS_WEIGHT: f64 = 0.4;
const COMPLETENESS_WEIGHT: f64 = 0.3;
const CONSISTENCY_WEIGHT: f64 = 0.3;
const GOOD: f64 = 80.0;
const FAIR: f64 = 60.0;

/// Headline numbers and feedback of a whole sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceSummary {
    pub sequence_score: f64,
    pub smoothness_score: f64,
    pub completeness_score: f64,
    pub consistency_score: f64,
    pub feedback: Vec<String>,
    pub total_frames: usize,
    pub valid_frames: usize,
}

fn banded(value: f64, good: &str, fair: &str, poor: &str) -> String {
    if value >= GOOD {
        format!("✅ {}", good)
    } else if value >= FAIR {
        format!("⚠️ {}", fair)
    } else {
        format!("❌ {}", poor)
    }
}

impl SequenceSummary {
    pub fn new<F>(result: &SequenceResult<F>) -> Self {
        let total_frames = result.frames_data.len();
        let valid_frames = result.frames_data.iter().filter(|frame| frame.has_pose).count();
        let smoothness = result.smoothness_score;
        let completeness = result.completeness_score;
        let consistency = result.consistency_score;

        let feedback = vec![
            format!("📹 Analyzed {} frames, {} with a usable pose", total_frames, valid_frames),
            banded(
                smoothness,
                "Motion is smooth",
                "Motion is a little uneven, keep it continuous",
                "Motion is not smooth, practice the basic movement",
            ),
            banded(
                completeness,
                "The whole movement was captured",
                "Some frames were not recognized clearly",
                "Movement is incomplete, keep your whole body in frame",
            ),
            banded(
                consistency,
                "Posture is consistent",
                "Posture stability needs work",
                "Posture is unstable, keep both arms level",
            ),
        ];

        Self {
            sequence_score: smoothness * SMOOTHNESS_WEIGHT
                + completeness * COMPLETENESS_WEIGHT
                + consistency * CONSISTENCY_WEIGHT,
            smoothness_score: smoothness,
            completeness_score: completeness,
            consistency_score: consistency,
            feedback,
            total_frames,
            valid_frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{FrameRecord, SequenceResult};
    use assert_approx_eq::assert_approx_eq;
    use std::collections::BTreeMap;

    fn result(smoothness: f64, completeness: f64, consistency: f64) -> SequenceResult<()> {
        SequenceResult {
            frames_data: vec![
                FrameRecord {
                    frame_idx: 0,
                    landmarks: None,
                    has_pose: false,
                    ball_detections: vec![],
                },
                FrameRecord {
                    frame_idx: 1,
                    landmarks: Some(Default::default()),
                    has_pose: true,
                    ball_detections: vec![],
                },
            ],
            trajectories: BTreeMap::new(),
            ball_trajectory: None,
            smoothness_score: smoothness,
            completeness_score: completeness,
            consistency_score: consistency,
            best_frame_idx: 1,
            annotated_frames: vec![(), ()],
            ball_detection_enabled: false,
        }
    }

    #[test]
    fn weighted_score() {
        let summary = SequenceSummary::new(&result(100.0, 50.0, 80.0));
        assert_approx_eq!(summary.sequence_score, 40.0 + 15.0 + 24.0);
        assert_eq!(summary.total_frames, 2);
        assert_eq!(summary.valid_frames, 1);
    }

    #[test]
    fn feedback_bands() {
        let summary = SequenceSummary::new(&result(80.0, 60.0, 59.9));
        assert!(summary.feedback[0].contains("2 frames"));
        assert!(summary.feedback[1].starts_with("✅"));
        assert!(summary.feedback[2].starts_with("⚠️"));
        assert!(summary.feedback[3].starts_with("❌"));
    }
}
