use super::{Evaluator, SubScore, Subject};
use crate::{
    curves::gaussian_score,
    error::Error,
    pose::KeypointKind::*,
};

/// Ideal wrist height as a fraction of the shoulder-to-knee span.
pub const IDEAL_WRIST_POSITION: f64 = 0.8;
pub const WRIST_POSITION_TOLERANCE: f64 = 0.3;
const ABOVE_SHOULDERS_PENALTY: f64 = 0.5;
const BELOW_KNEES_PENALTY: f64 = 0.7;
const MIN_SPAN: f64 = 1e-9;

/// Where the platform meets the ball relative to the torso.
pub(crate) struct TouchPosition;

impl Evaluator for TouchPosition {
    fn label(&self) -> &'static str {
        "Touch position"
    }

    fn evaluate(&self, subject: &Subject<'_>, budget: f64) -> Result<SubScore, Error> {
        let landmarks = subject.landmarks;
        let wrist_y = landmarks.midpoint(LeftWrist, RightWrist)?.y();
        let shoulder_y = landmarks.midpoint(LeftShoulder, RightShoulder)?.y();
        let hip_y = landmarks.midpoint(LeftHip, RightHip)?.y();
        let knee_y = landmarks.midpoint(LeftKnee, RightKnee)?.y();

        let span = (knee_y - shoulder_y).abs();
        if span < MIN_SPAN {
            return Err(Error::DegenerateGeometry("shoulders and knees at the same height"));
        }
        let position = (wrist_y - shoulder_y) / span;
        let mut score = gaussian_score(position, IDEAL_WRIST_POSITION, WRIST_POSITION_TOLERANCE, budget);

        // image y grows downwards
        let feedback = if (hip_y..=knee_y).contains(&wrist_y) {
            "✅ Contact point is standard, in front of and below the waist"
        } else if wrist_y < shoulder_y {
            score *= ABOVE_SHOULDERS_PENALTY;
            "❌ Contact point is too high"
        } else if wrist_y > knee_y {
            score *= BELOW_KNEES_PENALTY;
            "❌ Contact point is too low"
        } else {
            "⚠️ Contact point is slightly off"
        };

        Ok(SubScore::new(score, vec![feedback.to_owned()]))
    }
}
