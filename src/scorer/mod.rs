//! Technique scoring of a single pose, with or without a ball.

use crate::{
    config::{BallContactConfig, Config},
    detection::{best_detection, BallDetection},
    error::Error,
    grade::Grade,
    pose::Landmarks,
    sequence::FrameRecord,
    standards::{calculate_body_height, Standards},
};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

mod arms;
mod ball;
mod body;
mod position;
mod stability;

pub(crate) use arms::Arms;
pub(crate) use ball::BallContact;
pub(crate) use body::Body;
pub(crate) use position::TouchPosition;
pub(crate) use stability::Stability;

/// Score and feedback of one category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubScore {
    pub score: f64,
    pub feedback: Vec<String>,
}

impl SubScore {
    pub(crate) fn new(score: f64, feedback: Vec<String>) -> Self {
        Self { score, feedback }
    }

    fn failed(message: String) -> Self {
        Self::new(0.0, vec![message])
    }
}

/// What every category scorer gets to look at.
pub(crate) struct Subject<'a> {
    pub(crate) landmarks: &'a Landmarks,
    pub(crate) standards: &'a Standards,
}

pub(crate) trait Evaluator {
    /// Name of the category, used in the diagnostic when evaluation fails.
    fn label(&self) -> &'static str;

    /// Score the subject against a budget of `budget` points.
    fn evaluate(&self, subject: &Subject<'_>, budget: f64) -> Result<SubScore, Error>;

    /// Evaluate, turning a failure into zero points and a single diagnostic.
    fn score(&self, subject: &Subject<'_>, budget: f64) -> SubScore {
        match self.evaluate(subject, budget) {
            Ok(SubScore { score, feedback }) => SubScore::new(score.min(budget).max(0.0), feedback),
            Err(e) => {
                warn!(category = self.label(), error = %e, "evaluation failed");
                SubScore::failed(format!("❌ {} analysis failed: {}", self.label(), e))
            }
        }
    }
}

/// Allocation of the 100 available points across categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTable {
    pub arm: u8,
    pub body: u8,
    pub position: u8,
    pub ball: u8,
    pub stability: u8,
}

impl WeightTable {
    /// Legwork outweighs armwork; the ball takes a quarter.
    pub const WITH_BALL: Self = Self {
        arm: 28,
        body: 30,
        position: 12,
        ball: 25,
        stability: 5,
    };

    pub const POSE_ONLY: Self = Self {
        arm: 32,
        body: 33,
        position: 25,
        ball: 0,
        stability: 10,
    };

    pub fn total(&self) -> u32 {
        [self.arm, self.body, self.position, self.ball, self.stability]
            .iter()
            .copied()
            .map(u32::from)
            .sum()
    }
}

/// Whether a usable ball is part of the scoring, decided once per pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoringContext<'a> {
    PoseOnly,
    PoseAndBall(&'a BallDetection),
}

impl<'a> ScoringContext<'a> {
    /// A detection takes part when its score is strictly above `presence_threshold`.
    pub fn resolve(detection: Option<&'a BallDetection>, presence_threshold: f64) -> Self {
        match detection {
            Some(detection) if detection.score > presence_threshold => Self::PoseAndBall(detection),
            _ => Self::PoseOnly,
        }
    }

    pub fn weights(&self) -> WeightTable {
        match self {
            Self::PoseOnly => WeightTable::POSE_ONLY,
            Self::PoseAndBall(_) => WeightTable::WITH_BALL,
        }
    }

    fn banner(&self) -> &'static str {
        match self {
            Self::PoseOnly => "📋 [Standard scoring: body pose only]",
            Self::PoseAndBall(_) => "🏐 [Smart scoring: volleyball detected]",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub arm: f64,
    pub body: f64,
    pub position: f64,
    pub ball: f64,
    pub stability: f64,
}

impl ComponentScores {
    pub fn sum(&self) -> f64 {
        self.arm + self.body + self.position + self.ball + self.stability
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total_score: u8,
    pub component_scores: ComponentScores,
    pub max_scores: WeightTable,
    pub has_ball: bool,
    pub feedback: Vec<String>,
}

impl ScoreResult {
    fn no_pose() -> Self {
        Self {
            total_score: 0,
            component_scores: ComponentScores::default(),
            max_scores: WeightTable::POSE_ONLY,
            has_ball: false,
            feedback: vec!["No body pose detected, make sure your whole body is in frame".to_owned()],
        }
    }

    pub fn grade(&self) -> Grade {
        Grade::from_score(self.total_score)
    }
}

/// Result of scoring every frame of a sequence and keeping the best one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceScore {
    pub total_score: u8,
    pub best_frame_score: u8,
    pub best_frame_idx: usize,
    pub has_ball_frames: usize,
    pub ball_detection_rate: f64,
    pub component_scores: ComponentScores,
    pub max_scores: WeightTable,
    pub feedback: Vec<String>,
}

fn total_points(components: &ComponentScores) -> u8 {
    // floor then clamp, so 99.9 never rounds up into a perfect score
    components
        .sum()
        .floor()
        .clamp(0.0, 100.0)
        .to_u8()
        .unwrap_or_default()
}

pub struct PoseScorer {
    standards: Standards,
    ball: BallContactConfig,
}

impl Default for PoseScorer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl PoseScorer {
    pub fn new(config: &Config) -> Self {
        Self {
            standards: config.standards,
            ball: config.ball,
        }
    }

    pub fn standards(&self) -> &Standards {
        &self.standards
    }

    /// Standards rescaled for a subject of the given normalized height.
    pub fn adaptive_standards(&self, body_height: f64) -> Standards {
        self.standards.adapt(body_height)
    }

    /// Score the relation between the ball and the subject's platform, out of 25.
    pub fn score_ball_contact(
        &self,
        landmarks: &Landmarks,
        detection: Option<&BallDetection>,
    ) -> SubScore {
        let detection = match detection {
            Some(detection) => detection,
            None => return ball::absent(),
        };
        let standards = self.adaptive_standards(calculate_body_height(landmarks));
        let subject = Subject {
            landmarks,
            standards: &standards,
        };
        BallContact::new(detection, &self.ball).score(&subject, f64::from(WeightTable::WITH_BALL.ball))
    }

    /// Score one pose, switching to ball-aware weights when a confident detection is given.
    pub fn score_pose_with_ball(
        &self,
        landmarks: Option<&Landmarks>,
        detection: Option<&BallDetection>,
    ) -> ScoreResult {
        let landmarks = match landmarks {
            Some(landmarks) => landmarks,
            None => return ScoreResult::no_pose(),
        };

        let body_height = calculate_body_height(landmarks);
        let standards = self.adaptive_standards(body_height);
        let subject = Subject {
            landmarks,
            standards: &standards,
        };

        let context = ScoringContext::resolve(detection, self.ball.presence_threshold);
        let weights = context.weights();
        let mut feedback = vec![context.banner().to_owned()];

        let arm = Arms.score(&subject, f64::from(weights.arm));
        let body = Body.score(&subject, f64::from(weights.body));
        let position = TouchPosition.score(&subject, f64::from(weights.position));
        let ball = match context {
            ScoringContext::PoseAndBall(detection) => {
                BallContact::new(detection, &self.ball).score(&subject, f64::from(weights.ball))
            }
            ScoringContext::PoseOnly => match detection {
                Some(detection) => ball::ignored(detection),
                None => ball::absent(),
            },
        };
        let stability = Stability.score(&subject, f64::from(weights.stability));

        let component_scores = ComponentScores {
            arm: arm.score,
            body: body.score,
            position: position.score,
            ball: ball.score,
            stability: stability.score,
        };

        feedback.extend(
            arm.feedback
                .into_iter()
                .chain(body.feedback)
                .chain(position.feedback)
                .chain(ball.feedback)
                .chain(stability.feedback),
        );

        let total_score = total_points(&component_scores);
        debug!(
            total_score,
            body_height,
            has_ball = matches!(context, ScoringContext::PoseAndBall(_)),
            "scored pose"
        );

        ScoreResult {
            total_score,
            component_scores,
            max_scores: weights,
            has_ball: matches!(context, ScoringContext::PoseAndBall(_)),
            feedback,
        }
    }

    /// Score every frame and report the best one.
    ///
    /// Each frame uses its highest-confidence detection as the ball. Frames
    /// without landmarks score zero; the first of equally good frames wins.
    pub fn score_sequence(&self, frames: &[FrameRecord]) -> SequenceScore {
        if frames.is_empty() {
            return SequenceScore {
                total_score: 0,
                best_frame_score: 0,
                best_frame_idx: 0,
                has_ball_frames: 0,
                ball_detection_rate: 0.0,
                component_scores: ComponentScores::default(),
                max_scores: WeightTable::POSE_ONLY,
                feedback: vec!["No usable motion sequence was detected".to_owned()],
            };
        }

        let mut best: Option<(usize, ScoreResult)> = None;
        let mut has_ball_frames = 0;

        for (idx, frame) in frames.iter().enumerate() {
            let result = self.score_pose_with_ball(
                frame.landmarks.as_ref(),
                best_detection(&frame.ball_detections),
            );
            if result.has_ball {
                has_ball_frames += 1;
            }
            if best
                .as_ref()
                .map_or(true, |(_, best)| result.total_score > best.total_score)
            {
                best = Some((idx, result));
            }
        }

        let (best_frame_idx, best) = best.unwrap_or_else(|| (0, ScoreResult::no_pose()));
        let ball_detection_rate = match (has_ball_frames.to_f64(), frames.len().to_f64()) {
            (Some(with_ball), Some(total)) => with_ball / total,
            _ => 0.0,
        };

        SequenceScore {
            total_score: best.total_score,
            best_frame_score: best.total_score,
            best_frame_idx,
            has_ball_frames,
            ball_detection_rate,
            component_scores: best.component_scores,
            max_scores: best.max_scores,
            feedback: best.feedback,
        }
    }
}
