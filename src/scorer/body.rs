use super::{Evaluator, SubScore, Subject};
use crate::{
    curves::{gaussian_score, range_gaussian_score},
    error::Error,
    point::angle,
    pose::KeypointKind::{self, *},
};

/// Knee angle difference still considered balanced.
const BALANCE_TOLERANCE: f64 = 15.0;
const TOO_DEEP: f64 = 70.0;
const TOO_UPRIGHT: f64 = 120.0;
const STANDARD_KNEE: (f64, f64) = (80.0, 110.0);

/// Knee bend of both legs and their symmetry.
pub(crate) struct Body;

fn knee_angle(subject: &Subject<'_>, hip: KeypointKind, knee: KeypointKind, ankle: KeypointKind) -> Result<f64, Error> {
    let landmarks = subject.landmarks;
    angle(
        landmarks.point(hip)?,
        landmarks.point(knee)?,
        landmarks.point(ankle)?,
    )
}

fn knee_feedback(side: &str, angle: f64) -> String {
    let (standard_min, standard_max) = STANDARD_KNEE;
    if (standard_min..=standard_max).contains(&angle) {
        format!("✅ {} knee bend is standard, weight is stable", side)
    } else if angle > TOO_UPRIGHT {
        format!("⚠️ {} knee is too straight, lower into a half squat", side)
    } else if angle < TOO_DEEP {
        format!("⚠️ {} knee is too deep, a low stance slows your movement", side)
    } else {
        format!("⚠️ {} knee bend is slightly off", side)
    }
}

impl Evaluator for Body {
    fn label(&self) -> &'static str {
        "Body posture"
    }

    fn evaluate(&self, subject: &Subject<'_>, budget: f64) -> Result<SubScore, Error> {
        let left = knee_angle(subject, LeftHip, LeftKnee, LeftAnkle)?;
        let right = knee_angle(subject, RightHip, RightKnee, RightAnkle)?;
        let difference = (left - right).abs();

        let (knee_min, knee_max) = subject.standards.knee_angle_range;
        let score = range_gaussian_score(left, knee_min, knee_max, budget * 0.4)
            + range_gaussian_score(right, knee_min, knee_max, budget * 0.4)
            + gaussian_score(difference, 0.0, BALANCE_TOLERANCE, budget * 0.2);

        let balance = if difference < BALANCE_TOLERANCE {
            "✅ Legs are balanced"
        } else {
            "⚠️ Keep the weight even on both legs"
        };
        let feedback = vec![
            knee_feedback("Left", left),
            knee_feedback("Right", right),
            balance.to_owned(),
        ];

        Ok(SubScore::new(score, feedback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pose::Landmark, scorer::tests::textbook_landmarks, standards::Standards};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn textbook_knees_score_full_budget() {
        let landmarks = textbook_landmarks();
        let standards = Standards::default();
        let subject = Subject {
            landmarks: &landmarks,
            standards: &standards,
        };
        let result = Body.evaluate(&subject, 33.0).unwrap();

        assert_approx_eq!(result.score, 33.0, 1e-9);
        assert!(result.feedback.iter().all(|line| line.starts_with("✅")));
    }

    #[test]
    fn straight_legs_lose_points() {
        let mut landmarks = textbook_landmarks();
        landmarks.insert(LeftKnee, Landmark::new(0.44, 0.75, 0.9));
        landmarks.insert(RightKnee, Landmark::new(0.56, 0.75, 0.9));
        let standards = Standards::default();
        let subject = Subject {
            landmarks: &landmarks,
            standards: &standards,
        };
        let result = Body.evaluate(&subject, 30.0).unwrap();

        assert!(result.score < 30.0);
        assert!(result.feedback[0].contains("too straight"));
        assert!(result.feedback[1].contains("too straight"));
        assert_eq!(result.feedback[2], "✅ Legs are balanced");
    }

    #[test]
    fn feedback_bands() {
        assert!(knee_feedback("Left", 60.0).contains("too deep"));
        assert!(knee_feedback("Left", 75.0).contains("slightly off"));
        assert!(knee_feedback("Left", 115.0).contains("slightly off"));
        assert!(knee_feedback("Left", 110.0).starts_with("✅"));
    }
}
