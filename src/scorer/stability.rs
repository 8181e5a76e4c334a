use super::{Evaluator, SubScore, Subject};
use crate::{curves::sigmoid_score, error::Error, pose::constants::STABILITY_KEYPOINTS};
use num_traits::ToPrimitive;

const VISIBILITY_THRESHOLD: f64 = 0.5;
const VISIBILITY_STEEPNESS: f64 = 10.0;
const CLEAR_VISIBILITY: f64 = 0.75;

/// How clearly the pose detector saw the upper and lower body.
pub(crate) struct Stability;

impl Evaluator for Stability {
    fn label(&self) -> &'static str {
        "Stability"
    }

    fn evaluate(&self, subject: &Subject<'_>, budget: f64) -> Result<SubScore, Error> {
        let mut total = 0.0;
        for &kind in STABILITY_KEYPOINTS.iter() {
            total += subject.landmarks.get(kind)?.visibility;
        }
        let count = STABILITY_KEYPOINTS.len().to_f64().ok_or(Error::ConvertToF64)?;
        let average = total / count;

        let score = sigmoid_score(average, VISIBILITY_THRESHOLD, VISIBILITY_STEEPNESS, budget);
        let feedback = if average > CLEAR_VISIBILITY {
            "✅ Pose is clearly visible"
        } else if average > VISIBILITY_THRESHOLD {
            "⚠️ Pose is only partly visible"
        } else {
            "❌ Pose is not clearly visible"
        };

        Ok(SubScore::new(score, vec![feedback.to_owned()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pose::{Landmark, Landmarks},
        standards::Standards,
    };
    use assert_approx_eq::assert_approx_eq;

    fn all_visible(visibility: f64) -> Landmarks {
        STABILITY_KEYPOINTS
            .iter()
            .fold(Landmarks::new(), |landmarks, &kind| {
                landmarks.with(kind, Landmark::new(0.5, 0.5, visibility))
            })
    }

    fn evaluate(landmarks: &Landmarks) -> Result<SubScore, Error> {
        let standards = Standards::default();
        let subject = Subject {
            landmarks,
            standards: &standards,
        };
        Stability.evaluate(&subject, 10.0)
    }

    #[test]
    fn threshold_visibility_scores_half() {
        let result = evaluate(&all_visible(0.5)).unwrap();
        assert_approx_eq!(result.score, 5.0);
        assert!(result.feedback[0].starts_with("❌"));
    }

    #[test]
    fn clear_pose() {
        let result = evaluate(&all_visible(0.9)).unwrap();
        assert!(result.score > 9.5);
        assert!(result.feedback[0].starts_with("✅"));
    }

    #[test]
    fn partial_visibility() {
        let result = evaluate(&all_visible(0.6)).unwrap();
        assert!(result.feedback[0].starts_with("⚠️"));
    }

    #[test]
    fn missing_joint_fails() {
        assert!(matches!(evaluate(&Landmarks::new()), Err(Error::MissingLandmark(_))));
    }
}
