//! Relation between the detected ball and the subject's platform.
//!
//! Vertical offsets are measured as the height of the ball above the wrist
//! midpoint, positive when the ball is higher in the image. The ball has
//! reached the platform once its center is within the overshoot distance of
//! the wrist midpoint; otherwise closeness is scored on the gap between the
//! wrists and the surface of the ball.

use super::{Evaluator, SubScore, Subject};
use crate::{
    config::BallContactConfig,
    curves::{gaussian_score, sigmoid_score},
    detection::BallDetection,
    error::Error,
    pose::KeypointKind::*,
};

/// Shares of the ball budget; 10, 8 and 7 points of the usual 25.
const VERTICAL_SHARE: f64 = 0.4;
const HORIZONTAL_SHARE: f64 = 0.32;
const DISTANCE_SHARE: f64 = 0.28;

pub(crate) struct BallContact<'a> {
    detection: &'a BallDetection,
    config: &'a BallContactConfig,
}

/// Zero points when no ball was detected at all.
pub(crate) fn absent() -> SubScore {
    SubScore::new(0.0, vec!["⚪ No ball detected, scored on body pose only".to_owned()])
}

/// Zero points for a detection too unsure to take part in scoring.
pub(crate) fn ignored(detection: &BallDetection) -> SubScore {
    SubScore::new(
        0.0,
        vec![format!(
            "⚪ Ball detection confidence {:.2} is too low to score, scored on body pose only",
            detection.score
        )],
    )
}

impl<'a> BallContact<'a> {
    pub(crate) fn new(detection: &'a BallDetection, config: &'a BallContactConfig) -> Self {
        Self { detection, config }
    }

    fn vertical(&self, subject: &Subject<'_>, height_above: f64, max_score: f64) -> (f64, &'static str) {
        let config = self.config;
        let (band_min, band_max) = subject.standards.ball_vertical_offset_range;
        let score = gaussian_score(height_above, config.vertical_ideal, config.vertical_tolerance, max_score);

        if (band_min..=band_max).contains(&height_above) {
            (score, "✅ Ball height is ideal")
        } else if height_above < 0.0 {
            (
                score * config.vertical_below_penalty,
                "⚠️ Ball dropped below the wrists, meet it earlier",
            )
        } else if height_above > band_max {
            (
                score * config.vertical_high_penalty,
                "⚠️ Ball is still high above the platform, get set earlier",
            )
        } else {
            (score, "⚠️ Ball is level with the wrists, start the platform a little earlier")
        }
    }

    fn horizontal(&self, subject: &Subject<'_>, offset: f64, max_score: f64) -> (f64, &'static str) {
        let config = self.config;
        let score = gaussian_score(offset, 0.0, config.horizontal_tolerance, max_score);

        let feedback = if offset < config.horizontal_centered {
            "✅ Ball is right in front of the body"
        } else if offset < subject.standards.ball_horizontal_offset_max {
            "⚠️ Ball is slightly off the midline, adjust your stance"
        } else if offset < config.horizontal_drifting {
            "⚠️ Move so the ball comes to your midline"
        } else {
            "❌ Ball is far off to the side, move into position quickly"
        };
        (score, feedback)
    }

    fn distance(&self, center_distance: f64, max_score: f64) -> (f64, &'static str) {
        let config = self.config;
        if center_distance < config.overshoot_distance {
            return (
                max_score / 2.0,
                "⚠️ Ball is already at the wrists, prepare the platform earlier",
            );
        }

        let distance = (center_distance - self.detection.radius()).max(0.0);

        let score = sigmoid_score(
            -distance,
            -config.distance_threshold,
            config.distance_steepness,
            max_score,
        );
        let feedback = if distance < config.distance_threshold {
            "✅ Ball is close to the platform"
        } else if distance < config.distance_far {
            "⚠️ Ball is a little far from the arms"
        } else {
            "❌ Ball is too far from the arms"
        };
        (score, feedback)
    }
}

impl Evaluator for BallContact<'_> {
    fn label(&self) -> &'static str {
        "Ball contact"
    }

    fn evaluate(&self, subject: &Subject<'_>, budget: f64) -> Result<SubScore, Error> {
        let landmarks = subject.landmarks;
        let ball = self.detection.center_point()?;
        let wrists = landmarks.midpoint(LeftWrist, RightWrist)?;
        let body_center_x = landmarks.midpoint(LeftShoulder, RightShoulder)?.x();

        let height_above = wrists.y() - ball.y();
        let offset = (ball.x() - body_center_x).abs();
        let distance = ball.distance(wrists);

        let (vertical, vertical_feedback) = self.vertical(subject, height_above, budget * VERTICAL_SHARE);
        let (horizontal, horizontal_feedback) = self.horizontal(subject, offset, budget * HORIZONTAL_SHARE);
        let (contact, contact_feedback) = self.distance(distance, budget * DISTANCE_SHARE);

        // NaN confidence is treated as zero
        let confidence = self.detection.score.max(0.0).min(1.0).sqrt();
        let score = (vertical + horizontal + contact) * confidence;

        let mut feedback = vec![
            vertical_feedback.to_owned(),
            horizontal_feedback.to_owned(),
            contact_feedback.to_owned(),
        ];
        if self.detection.score < self.config.low_confidence {
            feedback.push("⚠️ Ball detection confidence is low, this score is less reliable".to_owned());
        } else if self.detection.score < self.config.fair_confidence {
            feedback.push("ℹ️ Ball detection confidence is moderate".to_owned());
        }

        Ok(SubScore::new(score, feedback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        scorer::{
            tests::{ball_near, ball_sized, textbook_landmarks},
            PoseScorer,
        },
        standards::Standards,
    };
    use assert_approx_eq::assert_approx_eq;

    fn score(detection: &BallDetection) -> SubScore {
        let landmarks = textbook_landmarks();
        let standards = Standards::default();
        let config = BallContactConfig::default();
        let subject = Subject {
            landmarks: &landmarks,
            standards: &standards,
        };
        BallContact::new(detection, &config).score(&subject, 25.0)
    }

    #[test]
    fn well_placed_ball_scores_high() {
        let landmarks = textbook_landmarks();
        let result = score(&ball_near(&landmarks, 0.15, 0.03, 0.9));

        assert!(result.score >= 20.0, "{}", result.score);
        assert!(result.score <= 25.0);
        assert_eq!(result.feedback[0], "✅ Ball height is ideal");
        assert_eq!(result.feedback[1], "✅ Ball is right in front of the body");
        assert_eq!(result.feedback.len(), 3);
    }

    #[test]
    fn well_placed_ball_across_sizes() {
        let landmarks = textbook_landmarks();
        for &half in &[0.05, 0.06, 0.1, 0.16, 0.3] {
            let result = score(&ball_sized(&landmarks, 0.15, 0.03, 0.9, half));
            assert!(result.score >= 20.0, "half {}: {}", half, result.score);
            assert!(result.score <= 25.0);
            assert_eq!(result.feedback[0], "✅ Ball height is ideal");
            assert!(
                !result.feedback.iter().any(|line| line.contains("already at the wrists")),
                "half {}: {:?}",
                half,
                result.feedback
            );
        }
    }

    #[test]
    fn point_like_ball_is_scored_on_center_distance() {
        let landmarks = textbook_landmarks();
        let result = score(&ball_sized(&landmarks, 0.15, 0.03, 0.9, 0.0));

        // 0.153 from the wrists: full height, near-full alignment, distance below half
        assert!(result.score > 18.0 && result.score < 19.0, "{}", result.score);
        assert_eq!(result.feedback[2], "⚠️ Ball is a little far from the arms");
    }

    #[test]
    fn ball_centered_on_wrists_is_overshoot() {
        let landmarks = textbook_landmarks();
        for &half in &[0.0, 0.06, 0.16] {
            let result = score(&ball_sized(&landmarks, 0.01, 0.0, 1.0, half));
            assert!(result.feedback[2].contains("already at the wrists"));
        }
    }

    #[test]
    fn confidence_scales_by_square_root() {
        let landmarks = textbook_landmarks();
        let sure = score(&ball_near(&landmarks, 0.15, 0.03, 1.0));
        let unsure = score(&ball_near(&landmarks, 0.15, 0.03, 0.25));
        assert_approx_eq!(unsure.score, sure.score * 0.5, 1e-9);
        assert!(unsure.feedback.iter().any(|line| line.contains("confidence is low")));
    }

    #[test]
    fn zero_confidence_detection_is_not_absence() {
        let landmarks = textbook_landmarks();
        let detection = ball_near(&landmarks, 0.15, 0.0, 0.0);
        let scorer = PoseScorer::default();

        let zero = scorer.score_ball_contact(&landmarks, Some(&detection));
        let none = scorer.score_ball_contact(&landmarks, None);
        assert_eq!(zero.score, 0.0);
        assert_eq!(none.score, 0.0);
        assert_eq!(none.feedback, absent().feedback);
        assert_ne!(zero.feedback, none.feedback);
    }

    #[test]
    fn ball_below_wrists_is_penalized() {
        let landmarks = textbook_landmarks();
        let result = score(&ball_near(&landmarks, -0.1, 0.0, 1.0));
        assert!(result.feedback[0].contains("below the wrists"));
        assert!(result.score < score(&ball_near(&landmarks, 0.15, 0.0, 1.0)).score);
    }

    #[test]
    fn ball_at_wrists_gets_half_distance_points() {
        let landmarks = textbook_landmarks();
        let detection = ball_near(&landmarks, 0.0, 0.0, 1.0);
        let config = BallContactConfig::default();
        let contact = BallContact::new(&detection, &config);
        let (points, feedback) = contact.distance(0.0, 7.0);
        assert_approx_eq!(points, 3.5);
        assert!(feedback.contains("already at the wrists"));
    }

    #[test]
    fn far_to_the_side() {
        let landmarks = textbook_landmarks();
        let result = score(&ball_near(&landmarks, 0.15, 0.3, 1.0));
        assert!(result.feedback[1].starts_with("❌"));
    }

    #[test]
    fn never_exceeds_budget() {
        let landmarks = textbook_landmarks();
        for &above in &[-0.2, 0.0, 0.06, 0.15, 0.3] {
            for &left in &[0.0, 0.05, 0.2] {
                let result = score(&ball_near(&landmarks, above, left, 1.0));
                assert!(result.score <= 25.0);
                assert!(result.score >= 0.0);
            }
        }
    }
}
