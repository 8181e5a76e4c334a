//! OpenCV frame source and ball drawing.

use crate::{
    detection::{BallDetection, Marker, TrailState},
    detector::{BallDetector, VideoSource},
    error::Error,
    sequence::frame_interval,
};
use num_traits::ToPrimitive;
use opencv::{
    core::{Mat, Point, Rect, Scalar, CV_8UC3},
    imgproc::{FILLED, LINE_8},
    prelude::{MatExprTrait, MatTrait, VideoCaptureTrait},
    videoio::{VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
};
use std::{
    convert::TryFrom,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

const ORANGE: (f64, f64, f64) = (0.0, 165.0, 255.0);
const YELLOW: (f64, f64, f64) = (0.0, 255.0, 255.0);

/// Frames of a video file, sampled at a fixed rate.
pub struct CaptureSource {
    path: PathBuf,
    samples_per_second: f64,
}

impl CaptureSource {
    pub fn new<P>(path: P, samples_per_second: f64) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            path: path.as_ref().to_path_buf(),
            samples_per_second,
        }
    }
}

fn property(capture: &VideoCapture, id: i32) -> Result<f64, Error> {
    capture.get(id).map_err(Error::GetVideoProperty)
}

fn dimension(capture: &VideoCapture, id: i32) -> Result<i32, Error> {
    let value = property(capture, id)?;
    value.to_i32().ok_or(Error::ConvertFrameDimension(value))
}

impl VideoSource<Mat> for CaptureSource {
    fn frames(&mut self) -> Result<Vec<Mat>, Error> {
        let filename = self
            .path
            .to_str()
            .ok_or_else(|| Error::OpenVideo(self.path.clone()))?;
        let mut capture =
            VideoCapture::from_file(filename, CAP_ANY).map_err(|_| Error::OpenVideo(self.path.clone()))?;
        if !capture.is_opened().map_err(Error::GetVideoProperty)? {
            return Err(Error::OpenVideo(self.path.clone()));
        }

        let fps = property(&capture, CAP_PROP_FPS)?;
        let width = dimension(&capture, CAP_PROP_FRAME_WIDTH)?;
        let height = dimension(&capture, CAP_PROP_FRAME_HEIGHT)?;
        let interval = frame_interval(fps, self.samples_per_second);
        info!(path = ?self.path, fps, width, height, interval, "opened video");

        let mut frames = Vec::new();
        for frame_num in 0.. {
            if frame_num % interval != 0 {
                if !capture.grab().map_err(Error::ReadFrame)? {
                    break;
                }
                continue;
            }

            let mut frame = Mat::zeros(height, width, CV_8UC3)
                .map_err(Error::AllocateFrame)?
                .to_mat()
                .map_err(Error::AllocateFrame)?;
            if !capture.read(&mut frame).map_err(Error::ReadFrame)? {
                break;
            }
            frames.push(frame);
        }

        debug!(frames = frames.len(), "sampled video");
        Ok(frames)
    }
}

fn pixel(value: f64) -> i32 {
    value.round().to_i32().unwrap_or_default()
}

/// Draw the ball trail onto `frame`, the most recent entry highlighted.
///
/// Circles get a ring for the current position and shrinking dots for the
/// history; boxes are outlined with a thickness that fades with age.
pub fn draw_ball(frame: &mut Mat, trail: &TrailState, marker: Marker) -> Result<(), Error> {
    let size = frame.size().map_err(Error::GetFrameSize)?;
    let (width, height) = (f64::from(size.width), f64::from(size.height));

    for (age, &[x_min, y_min, x_max, y_max]) in trail.iter() {
        let (left, top) = (pixel(x_min * width), pixel(y_min * height));
        let (right, bottom) = (pixel(x_max * width), pixel(y_max * height));
        let current = age == 0;
        let color = Scalar::from(if current { ORANGE } else { YELLOW });

        match marker {
            Marker::Circle => {
                let center = Point::new((left + right) / 2, (top + bottom) / 2);
                let radius = ((right - left).max(bottom - top) / 2).max(1);
                let (radius, thickness) = if current {
                    (radius, 2)
                } else {
                    // history dots shrink with age
                    let age = i32::try_from(age).unwrap_or(i32::MAX);
                    ((radius / 4 - age).max(2), FILLED)
                };
                opencv::imgproc::circle(frame, center, radius, color, thickness, LINE_8, 0)
                    .map_err(Error::DrawCircle)?;
            }
            Marker::Box => {
                let thickness = if current { 2 } else { 1 };
                opencv::imgproc::rectangle(
                    frame,
                    Rect::new(left, top, right - left, bottom - top),
                    color,
                    thickness,
                    LINE_8,
                    0,
                )
                .map_err(Error::DrawRectangle)?;
            }
        }
    }

    Ok(())
}

/// A ball detector whose annotations are drawn onto OpenCV frames.
pub struct Drawing<D> {
    inner: D,
    marker: Marker,
}

impl<D> Drawing<D> {
    pub fn new(inner: D, marker: Marker) -> Self {
        Self { inner, marker }
    }
}

impl<D> BallDetector<Mat> for Drawing<D>
where
    D: BallDetector<Mat>,
{
    fn detect(&mut self, frame: &Mat) -> Result<Vec<BallDetection>, Error> {
        self.inner.detect(frame)
    }

    fn infer_batch(&mut self, frames: &[Mat]) -> Result<Vec<Vec<BallDetection>>, Error> {
        self.inner.infer_batch(frames)
    }

    fn release_cache(&mut self) {
        self.inner.release_cache()
    }

    fn annotate(
        &self,
        frame: &mut Mat,
        detections: &[BallDetection],
        trail: &mut TrailState,
    ) -> Result<(), Error> {
        trail.record(detections);
        draw_ball(frame, trail, self.marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> Mat {
        Mat::zeros(100, 100, CV_8UC3).unwrap().to_mat().unwrap()
    }

    fn ball(bbox_normalized: [f64; 4]) -> BallDetection {
        BallDetection::new("volleyball", 0.9, [0; 4], bbox_normalized)
    }

    #[test]
    fn draws_both_markers() {
        let mut trail = TrailState::new(4);
        trail.record(&[ball([0.1, 0.1, 0.3, 0.3])]);
        trail.record(&[ball([0.5, 0.5, 0.7, 0.7])]);

        let mut frame = blank();
        draw_ball(&mut frame, &trail, Marker::Circle).unwrap();
        draw_ball(&mut frame, &trail, Marker::Box).unwrap();
        assert_eq!(frame.size().unwrap().width, 100);
    }

    #[test]
    fn missing_video() {
        let mut source = CaptureSource::new("/nonexistent/pass.mp4", 2.0);
        assert!(source.frames().is_err());
    }
}
