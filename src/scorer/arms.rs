use super::{Evaluator, SubScore, Subject};
use crate::{
    curves::range_gaussian_score,
    error::Error,
    point::angle,
    pose::KeypointKind::{self, *},
};

const TOO_BENT: f64 = 130.0;
const STRAIGHT_ENOUGH: f64 = 140.0;
const TOO_STRAIGHT: f64 = 175.0;
const GAP_NARROW: f64 = 20.0;
const GAP_STANDARD: f64 = 40.0;
const GAP_WIDE: f64 = 45.0;

/// Elbow extension of both arms and the angle between them.
pub(crate) struct Arms;

fn elbow_angle(subject: &Subject<'_>, shoulder: KeypointKind, elbow: KeypointKind, wrist: KeypointKind) -> Result<f64, Error> {
    let landmarks = subject.landmarks;
    angle(
        landmarks.point(shoulder)?,
        landmarks.point(elbow)?,
        landmarks.point(wrist)?,
    )
}

fn arm_feedback(side: &str, angle: f64) -> String {
    if angle < TOO_BENT {
        format!("⚠️ {} arm is bent too much, the platform will be unstable", side)
    } else if angle < STRAIGHT_ENOUGH {
        format!("⚠️ {} arm could be a little straighter", side)
    } else if angle <= TOO_STRAIGHT {
        format!("✅ {} arm posture is standard", side)
    } else {
        format!("⚠️ {} arm is locked straight, keep a slight bend", side)
    }
}

fn gap_feedback(gap: f64) -> Option<&'static str> {
    if (GAP_NARROW..=GAP_STANDARD).contains(&gap) {
        Some("✅ Arm gap is standard")
    } else if gap < GAP_NARROW {
        Some("⚠️ Arm gap is narrow, open the arms a little (20-40°)")
    } else if gap > GAP_WIDE {
        Some("⚠️ Arm gap is too wide, bring the arms to shoulder width")
    } else {
        None
    }
}

impl Evaluator for Arms {
    fn label(&self) -> &'static str {
        "Arm posture"
    }

    fn evaluate(&self, subject: &Subject<'_>, budget: f64) -> Result<SubScore, Error> {
        let left = elbow_angle(subject, LeftShoulder, LeftElbow, LeftWrist)?;
        let right = elbow_angle(subject, RightShoulder, RightElbow, RightWrist)?;

        let landmarks = subject.landmarks;
        let shoulder_center = landmarks.midpoint(LeftShoulder, RightShoulder)?;
        let gap = angle(
            landmarks.point(LeftWrist)?,
            shoulder_center,
            landmarks.point(RightWrist)?,
        )?;

        let (arm_min, arm_max) = subject.standards.arm_angle_range;
        let (gap_min, gap_max) = subject.standards.arm_gap_range;
        let score = range_gaussian_score(left, arm_min, arm_max, budget * 0.4)
            + range_gaussian_score(right, arm_min, arm_max, budget * 0.4)
            + range_gaussian_score(gap, gap_min, gap_max, budget * 0.2);

        let mut feedback = vec![arm_feedback("Left", left), arm_feedback("Right", right)];
        feedback.extend(gap_feedback(gap).map(str::to_owned));

        Ok(SubScore::new(score, feedback))
    }
}
