use crate::{error::Error, point::Point};
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A ball found in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DetectionRecord", into = "DetectionRecord")]
pub struct BallDetection {
    pub label: String,
    pub score: f64,
    /// Pixel box `(x_min, y_min, x_max, y_max)`.
    pub bbox: [i32; 4],
    /// The same box divided by the frame size.
    pub bbox_normalized: [f64; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize)]
struct DetectionRecord {
    label: String,
    score: f64,
    bbox: [i32; 4],
    bbox_normalized: [f64; 4],
    // recomputed on the way in
    #[serde(default, skip_deserializing)]
    center: Option<Center>,
}

impl From<DetectionRecord> for BallDetection {
    fn from(record: DetectionRecord) -> Self {
        Self {
            label: record.label,
            score: record.score,
            bbox: record.bbox,
            bbox_normalized: record.bbox_normalized,
        }
    }
}

impl From<BallDetection> for DetectionRecord {
    fn from(detection: BallDetection) -> Self {
        let center = Some(detection.center());
        Self {
            label: detection.label,
            score: detection.score,
            bbox: detection.bbox,
            bbox_normalized: detection.bbox_normalized,
            center,
        }
    }
}

impl BallDetection {
    pub fn new(label: impl Into<String>, score: f64, bbox: [i32; 4], bbox_normalized: [f64; 4]) -> Self {
        Self {
            label: label.into(),
            score,
            bbox,
            bbox_normalized,
        }
    }

    /// Build a detection from a pixel `(x, y, width, height)` box.
    ///
    /// The box is clipped to the frame; an empty box after clipping yields `None`.
    pub fn from_xywh(
        label: impl Into<String>,
        score: f64,
        (x, y, width, height): (f64, f64, f64, f64),
        (frame_width, frame_height): (u32, u32),
    ) -> Option<Self> {
        let max_x = i64::from(frame_width) - 1;
        let max_y = i64::from(frame_height) - 1;
        // truncation matches how detectors report integral pixel boxes
        let x_min = (x as i64).max(0);
        let y_min = (y as i64).max(0);
        let x_max = ((x + width) as i64).min(max_x);
        let y_max = ((y + height) as i64).min(max_y);

        if x_min >= x_max || y_min >= y_max {
            return None;
        }

        let frame_width = f64::from(frame_width);
        let frame_height = f64::from(frame_height);
        // clipped to the frame, so these fit in i32 for any real frame size
        let bbox = [x_min as i32, y_min as i32, x_max as i32, y_max as i32];
        let bbox_normalized = [
            f64::from(bbox[0]) / frame_width,
            f64::from(bbox[1]) / frame_height,
            f64::from(bbox[2]) / frame_width,
            f64::from(bbox[3]) / frame_height,
        ];

        Some(Self::new(label, score, bbox, bbox_normalized))
    }

    pub fn center(&self) -> Center {
        let [x_min, y_min, x_max, y_max] = self.bbox_normalized;
        Center {
            x: (x_min + x_max) / 2.0,
            y: (y_min + y_max) / 2.0,
        }
    }

    pub fn center_point(&self) -> Result<Point, Error> {
        let Center { x, y } = self.center();
        Point::new(x, y)
    }

    /// Half the larger side of the normalized box.
    pub fn radius(&self) -> f64 {
        let [x_min, y_min, x_max, y_max] = self.bbox_normalized;
        (x_max - x_min).abs().max((y_max - y_min).abs()) / 2.0
    }
}

/// The highest-scoring detection, ignoring NaN scores.
pub fn best_detection(detections: &[BallDetection]) -> Option<&BallDetection> {
    let mut best: Option<(NotNan<f64>, &BallDetection)> = None;
    for detection in detections {
        let score = match NotNan::new(detection.score) {
            Ok(score) => score,
            Err(_) => continue,
        };
        // first of equal maxima wins
        if best.map_or(true, |(best_score, _)| score > best_score) {
            best = Some((score, detection));
        }
    }
    best.map(|(_, detection)| detection)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Box,
}

/// Recent ball boxes, most recent first, threaded through successive `annotate` calls.
///
/// One value belongs to one analysis run; start a new one for each video.
#[derive(Debug, Clone)]
pub struct TrailState {
    boxes: VecDeque<Option<[f64; 4]>>,
    capacity: usize,
}

impl TrailState {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            boxes: std::iter::repeat(None).take(capacity).collect(),
            capacity,
        }
    }

    /// Record the first detection of a frame, or a gap when there is none.
    pub fn record(&mut self, detections: &[BallDetection]) {
        self.boxes
            .push_front(detections.first().map(|detection| detection.bbox_normalized));
        self.boxes.truncate(self.capacity);
    }

    /// Normalized boxes, most recent first, with their age in frames.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f64; 4])> {
        self.boxes
            .iter()
            .enumerate()
            .filter_map(|(age, bbox)| bbox.as_ref().map(|bbox| (age, bbox)))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn ball(score: f64, bbox_normalized: [f64; 4]) -> BallDetection {
        BallDetection::new("volleyball", score, [0, 0, 0, 0], bbox_normalized)
    }

    #[test]
    fn center_survives_serialization() {
        let detection = ball(0.83, [0.125, 0.25, 0.3125, 0.4375]);
        let value = serde_json::to_value(&detection).unwrap();

        let stored_x = value["center"]["x"].as_f64().unwrap();
        let stored_y = value["center"]["y"].as_f64().unwrap();
        let bbox: Vec<f64> = serde_json::from_value(value["bbox_normalized"].clone()).unwrap();
        assert_approx_eq!((bbox[0] + bbox[2]) / 2.0, stored_x);
        assert_approx_eq!((bbox[1] + bbox[3]) / 2.0, stored_y);

        let parsed: BallDetection = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, detection);
    }

    #[test]
    fn stale_center_is_recomputed() {
        let parsed: BallDetection = serde_json::from_str(
            r#"{"label": "ball", "score": 1.0, "bbox": [0, 0, 10, 10],
                "bbox_normalized": [0.0, 0.0, 0.2, 0.4], "center": {"x": 9.0, "y": 9.0}}"#,
        )
        .unwrap();
        assert_approx_eq!(parsed.center().x, 0.1);
        assert_approx_eq!(parsed.center().y, 0.2);
    }

    mod from_xywh_tests {
        use super::*;

        #[test]
        fn normalizes() {
            let detection =
                BallDetection::from_xywh("volleyball", 0.7, (64.0, 48.0, 32.0, 24.0), (640, 480)).unwrap();
            assert_eq!(detection.bbox, [64, 48, 96, 72]);
            assert_approx_eq!(detection.bbox_normalized[0], 0.1);
            assert_approx_eq!(detection.bbox_normalized[3], 0.15);
        }

        #[test]
        fn clips_to_frame() {
            let detection =
                BallDetection::from_xywh("volleyball", 0.7, (-10.0, 400.0, 50.0, 200.0), (640, 480)).unwrap();
            assert_eq!(detection.bbox, [0, 400, 40, 479]);
        }

        #[test]
        fn empty_box() {
            assert!(BallDetection::from_xywh("volleyball", 0.7, (10.0, 10.0, 0.0, 5.0), (640, 480)).is_none());
            assert!(BallDetection::from_xywh("volleyball", 0.7, (700.0, 10.0, 5.0, 5.0), (640, 480)).is_none());
        }
    }

    #[test]
    fn best_detection_prefers_first_maximum() {
        let detections = vec![
            ball(0.4, [0.0; 4]),
            ball(0.9, [0.1; 4]),
            ball(f64::NAN, [0.2; 4]),
            ball(0.9, [0.3; 4]),
        ];
        assert_eq!(best_detection(&detections).unwrap().bbox_normalized, [0.1; 4]);
        assert!(best_detection(&[]).is_none());
    }

    #[test]
    fn radius_uses_larger_side() {
        assert_approx_eq!(ball(1.0, [0.1, 0.1, 0.2, 0.4]).radius(), 0.15);
    }

    #[test]
    fn trail_keeps_most_recent() {
        let mut trail = TrailState::new(3);
        trail.record(&[ball(1.0, [0.1; 4])]);
        trail.record(&[]);
        trail.record(&[ball(1.0, [0.2; 4])]);
        trail.record(&[ball(1.0, [0.3; 4])]);

        let kept: Vec<_> = trail.iter().map(|(age, bbox)| (age, bbox[0])).collect();
        assert_eq!(kept, vec![(0, 0.3), (1, 0.2)]);
        assert_eq!(trail.capacity(), 3);
    }
}
