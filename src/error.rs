use crate::pose::KeypointKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing landmark: {}", .0.name())]
    MissingLandmark(KeypointKind),

    #[error("failed to construct NotNan from f64: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f64),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    #[error("failed to convert value to f64")]
    ConvertToF64,

    #[error("ball detector returned {got} results for a batch of {expected} frames")]
    BatchLengthMismatch { expected: usize, got: usize },

    #[error("ball detector failed: {0}")]
    BallDetector(String),

    #[error("pose detector failed: {0}")]
    PoseDetector(String),

    #[error("failed to initialize ball detector: {0}")]
    InitBallDetector(String),

    #[error("video source yielded no frames")]
    NoFramesExtracted,

    #[error("failed to read file: {1:?}")]
    ReadFile(#[source] std::io::Error, std::path::PathBuf),

    #[error("failed to parse json")]
    ParseJson(#[source] serde_json::Error),

    #[cfg(feature = "video")]
    #[error("failed to open video: {0:?}")]
    OpenVideo(std::path::PathBuf),

    #[cfg(feature = "video")]
    #[error("failed to read video frame")]
    ReadFrame(#[source] opencv::Error),

    #[cfg(feature = "video")]
    #[error("failed to get video property")]
    GetVideoProperty(#[source] opencv::Error),

    #[cfg(feature = "video")]
    #[error("failed to allocate frame")]
    AllocateFrame(#[source] opencv::Error),

    #[cfg(feature = "video")]
    #[error("video frame dimension {0} does not fit in i32")]
    ConvertFrameDimension(f64),

    #[cfg(feature = "video")]
    #[error("failed to get frame size")]
    GetFrameSize(#[source] opencv::Error),

    #[cfg(feature = "video")]
    #[error("failed to draw circle")]
    DrawCircle(#[source] opencv::Error),

    #[cfg(feature = "video")]
    #[error("failed to draw rectangle")]
    DrawRectangle(#[source] opencv::Error),
}
