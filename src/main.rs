use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use volley_pass::{
    detection::best_detection,
    replay::{RecordedFrame, Recording, ReplayBall, ReplayPose},
    scorer::SequenceScore,
    sequence::SequenceSummary,
    AnalyzeOptions, Config, Grade, PoseScorer, ScoreResult, SequenceAnalyzer, SequenceInput,
    SequenceResult,
};

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(structopt::StructOpt)]
struct Opt {
    /// Recorded landmarks and ball detections of one video, as JSON.
    #[structopt(parse(from_os_str))]
    recording: PathBuf,

    /// JSON file overriding the scoring standards and analyzer settings.
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Score on body pose only, ignoring recorded ball detections.
    #[structopt(long)]
    no_ball: bool,

    /// Sample the recording down to the configured rate using its frame rate.
    #[structopt(long)]
    sample: bool,

    /// Pretty-print the JSON report.
    #[structopt(short, long)]
    pretty: bool,

    #[structopt(short, long, default_value = DEFAULT_LOG_LEVEL, env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(short, long)]
    show_progress: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    best_frame: ScoreResult,
    grade: Grade,
    grade_message: &'static str,
    sequence_score: SequenceScore,
    summary: SequenceSummary,
    analysis: &'a SequenceResult<RecordedFrame>,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(opt.log_level),
    )?;

    let config = match opt.config.as_ref() {
        Some(path) => Config::from_path(path).context("failed loading config")?,
        None => Config::default(),
    };

    let mut recording = Recording::from_path(&opt.recording).context("failed loading recording")?;
    if opt.sample {
        recording = recording.sampled(config.analyzer.samples_per_second);
    }

    let pb = if opt.show_progress {
        Some(
            ProgressBar::new(0).with_style(
                ProgressStyle::default_bar()
                    .template("{prefix:.bold.dim} {bar:40} {pos}/{len} frames {wide_msg}"),
            ),
        )
    } else {
        None
    };

    let mut analyzer = SequenceAnalyzer::new(ReplayPose, config.analyzer)
        .with_ball_loader(|| Ok(ReplayBall))
        .enable_ball_detection(!opt.no_ball);
    let analysis = analyzer
        .analyze(
            SequenceInput::Video(&mut recording),
            AnalyzeOptions::default(),
            pb.as_ref(),
        )
        .context("failed analyzing recording")?;

    if let Some(pb) = pb.as_ref() {
        pb.finish_and_clear();
    }

    let scorer = PoseScorer::new(&config);
    let best_frame = analysis
        .best_frame()
        .map(|frame| {
            scorer.score_pose_with_ball(frame.landmarks.as_ref(), best_detection(&frame.ball_detections))
        })
        .unwrap_or_else(|| scorer.score_pose_with_ball(None, None));
    let grade = best_frame.grade();
    let sequence_score = scorer.score_sequence(&analysis.frames_data);
    let summary = analysis.summary();

    info!(
        best_frame_idx = analysis.best_frame_idx,
        total_score = best_frame.total_score,
        %grade,
        sequence_score = summary.sequence_score,
        "scored recording"
    );

    let report = Report {
        best_frame,
        grade,
        grade_message: grade.message(),
        sequence_score,
        summary,
        analysis: &analysis,
    };
    let json = if opt.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed serializing report")?;
    println!("{}", json);

    Ok(())
}
