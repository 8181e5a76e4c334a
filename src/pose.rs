use crate::{error::Error, point::Point};
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, str::FromStr};

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    num_derive::FromPrimitive,
    num_derive::ToPrimitive,
)]
#[serde(rename_all = "snake_case")]
pub enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

pub const NUM_KEYPOINTS: usize = 17;

impl KeypointKind {
    pub fn idx(self) -> usize {
        // every variant is a small non-negative discriminant
        self.to_usize().unwrap_or_default()
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..NUM_KEYPOINTS).filter_map(Self::from_usize)
    }

    pub fn name(self) -> &'static str {
        use KeypointKind::*;

        match self {
            Nose => "nose",
            LeftEye => "left_eye",
            RightEye => "right_eye",
            LeftEar => "left_ear",
            RightEar => "right_ear",
            LeftShoulder => "left_shoulder",
            RightShoulder => "right_shoulder",
            LeftElbow => "left_elbow",
            RightElbow => "right_elbow",
            LeftWrist => "left_wrist",
            RightWrist => "right_wrist",
            LeftHip => "left_hip",
            RightHip => "right_hip",
            LeftKnee => "left_knee",
            RightKnee => "right_knee",
            LeftAnkle => "left_ankle",
            RightAnkle => "right_ankle",
        }
    }
}

impl FromStr for KeypointKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown keypoint: {}", s))
    }
}

/// A single normalized body joint.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }

    pub fn point(&self) -> Result<Point, Error> {
        Point::new(self.x, self.y)
    }
}

/// The landmarks detected for one frame.
///
/// Only keypoints the detector reported are present; lookups of anything else
/// fail with [`Error::MissingLandmark`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Landmark>", into = "BTreeMap<String, Landmark>")]
pub struct Landmarks {
    points: BTreeMap<KeypointKind, Landmark>,
}

impl Landmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: KeypointKind, landmark: Landmark) -> Self {
        self.insert(kind, landmark);
        self
    }

    pub fn insert(&mut self, kind: KeypointKind, landmark: Landmark) {
        self.points.insert(kind, landmark);
    }

    pub fn get(&self, kind: KeypointKind) -> Result<Landmark, Error> {
        self.points
            .get(&kind)
            .copied()
            .ok_or(Error::MissingLandmark(kind))
    }

    pub fn try_get(&self, kind: KeypointKind) -> Option<&Landmark> {
        self.points.get(&kind)
    }

    pub fn point(&self, kind: KeypointKind) -> Result<Point, Error> {
        self.get(kind)?.point()
    }

    /// Mean of the left/right pair of a joint.
    pub fn midpoint(&self, left: KeypointKind, right: KeypointKind) -> Result<Point, Error> {
        Ok(self.point(left)?.midpoint(self.point(right)?))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeypointKind, &Landmark)> {
        self.points.iter().map(|(&kind, landmark)| (kind, landmark))
    }

    /// Visibilities of the requested keypoints that are present.
    pub fn visibilities<'a>(&'a self, kinds: &'a [KeypointKind]) -> impl Iterator<Item = f64> + 'a {
        kinds
            .iter()
            .filter_map(move |kind| self.points.get(kind))
            .map(|landmark| landmark.visibility)
    }
}

impl From<BTreeMap<String, Landmark>> for Landmarks {
    fn from(named: BTreeMap<String, Landmark>) -> Self {
        // detectors with a richer vocabulary (hands, feet) are fine, extra points are dropped
        let points = named
            .into_iter()
            .filter_map(|(name, landmark)| Some((name.parse().ok()?, landmark)))
            .collect();
        Self { points }
    }
}

impl From<Landmarks> for BTreeMap<String, Landmark> {
    fn from(landmarks: Landmarks) -> Self {
        landmarks
            .points
            .into_iter()
            .map(|(kind, landmark)| (kind.name().to_owned(), landmark))
            .collect()
    }
}

pub mod constants {
    use crate::pose::KeypointKind::{self, *};

    pub const BODY_HEIGHT_FACTOR: f64 = 1.15;

    /// Joints averaged for the stability score.
    pub const STABILITY_KEYPOINTS: [KeypointKind; 10] = [
        LeftShoulder,
        RightShoulder,
        LeftElbow,
        RightElbow,
        LeftWrist,
        RightWrist,
        LeftHip,
        RightHip,
        LeftKnee,
        RightKnee,
    ];

    /// Joints whose motion is tracked across a sequence.
    pub const TRAJECTORY_KEYPOINTS: [KeypointKind; 10] = [
        LeftWrist,
        RightWrist,
        LeftElbow,
        RightElbow,
        LeftShoulder,
        RightShoulder,
        LeftHip,
        RightHip,
        LeftKnee,
        RightKnee,
    ];

    pub const BEST_FRAME_KEYPOINTS: [KeypointKind; 8] = [
        LeftWrist,
        RightWrist,
        LeftElbow,
        RightElbow,
        LeftShoulder,
        RightShoulder,
        LeftKnee,
        RightKnee,
    ];

    pub const COMPLETENESS_KEYPOINTS: [KeypointKind; 4] =
        [LeftWrist, RightWrist, LeftShoulder, RightShoulder];

    pub const WRISTS: [KeypointKind; 2] = [LeftWrist, RightWrist];
}
