use crate::command::{build_args, render_command_line};
use crate::error::{ExtractError, Result};
use crate::ffmpeg::{FfmpegLocator, FfmpegRunner, FfprobeDuration};
use crate::naming::{avoid_collision, default_output};
use crate::open::{Opener, SystemOpener};
use crate::request::{ExtractionRequest, Mode, ValidatedRequest};
use crate::validate::{check_media_bounds, validate};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reports the media length in seconds, or `None` when it cannot tell.
pub trait DurationProbe {
    fn probe(&self, input: &Path) -> Option<f64>;
}

/// Finds the ffmpeg binary, given the user's explicit path if any.
pub trait ToolResolver {
    fn resolve(&self, explicit: Option<&Path>) -> Result<PathBuf>;
}

/// Executes a resolved plan.
pub trait Runner {
    fn run(&self, plan: &ResolvedPlan) -> Result<()>;
}

/// Where the pipeline sends user-facing messages.
pub trait Reporter {
    fn status(&mut self, message: &str);
    fn warning(&mut self, message: &str);
    fn command(&mut self, line: &str);
}

/// Prints status to stdout, everything else to stderr.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn status(&mut self, message: &str) {
        println!("{message}");
    }

    fn warning(&mut self, message: &str) {
        eprintln!("warning: {message}");
    }

    fn command(&mut self, line: &str) {
        eprintln!("{line}");
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedPlan {
    pub tool: PathBuf,
    pub output: PathBuf,
    pub args: Vec<OsString>,
    pub mode: Mode,
    /// Expected output length in seconds when a progress bar is wanted.
    pub progress_total: Option<f64>,
}

#[derive(Debug)]
pub struct ExtractionResult {
    pub success: bool,
    /// 0 on success, the tool's code when it failed, `None` if it never ran
    /// or was killed.
    pub exit_code: Option<i32>,
    pub output: Option<PathBuf>,
    pub error: Option<ExtractError>,
}

impl ExtractionResult {
    fn from_outcome(outcome: Result<PathBuf>) -> Self {
        match outcome {
            Ok(output) => Self {
                success: true,
                exit_code: Some(0),
                output: Some(output),
                error: None,
            },
            Err(err) => Self {
                success: false,
                exit_code: match &err {
                    ExtractError::ToolExecutionFailed { code } => *code,
                    _ => None,
                },
                output: None,
                error: Some(err),
            },
        }
    }

    pub fn message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

/// The extraction pipeline with its external collaborators.
pub struct Pipeline {
    probe: Option<Box<dyn DurationProbe>>,
    resolver: Box<dyn ToolResolver>,
    runner: Box<dyn Runner>,
    opener: Box<dyn Opener>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            probe: None,
            resolver: Box::new(FfmpegLocator),
            runner: Box::new(FfmpegRunner),
            opener: Box::new(SystemOpener),
        }
    }
}

impl Pipeline {
    pub fn new(runner: Box<dyn Runner>, opener: Box<dyn Opener>) -> Self {
        Self {
            probe: None,
            resolver: Box::new(FfmpegLocator),
            runner,
            opener,
        }
    }

    pub fn with_resolver(mut self, resolver: Box<dyn ToolResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Use this probe instead of ffprobe.
    pub fn with_probe(mut self, probe: Box<dyn DurationProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Like [`Pipeline::execute`], but reports the output path on success and
    /// folds the outcome into an [`ExtractionResult`].
    pub fn run(&self, request: ExtractionRequest, reporter: &mut dyn Reporter) -> ExtractionResult {
        let outcome = self.execute(request, reporter);
        if let Ok(output) = &outcome {
            reporter.status(&output.display().to_string());
        }
        ExtractionResult::from_outcome(outcome)
    }

    /// Validate, probe, pick the output, resolve ffmpeg, run it, and
    /// optionally open the result.
    pub fn execute(&self, request: ExtractionRequest, reporter: &mut dyn Reporter) -> Result<PathBuf> {
        let validated = validate(request)?;
        let req = &validated.request;

        let media = match &self.probe {
            Some(probe) => probe.probe(&req.input),
            None => FfprobeDuration::beside(req.ffmpeg_path.as_deref()).probe(&req.input),
        };
        match media {
            Some(media) => check_media_bounds(&validated.range, media)?,
            None => debug!("media duration unknown, range not checked against it"),
        }

        let output = output_path(req);
        let tool = self.resolver.resolve(req.ffmpeg_path.as_deref())?;
        debug!(tool = %tool.display(), "resolved ffmpeg");

        let plan = build_plan(&validated, tool, output, media);
        if req.verbose {
            reporter.command(&render_command_line(&plan.tool, &plan.args));
        }

        info!(
            input = %req.input.display(),
            output = %plan.output.display(),
            mode = %plan.mode,
            "running ffmpeg"
        );
        self.runner.run(&plan)?;

        if req.autoplay {
            if let Err(warning) = self.opener.open(&plan.output) {
                reporter.warning(&warning.to_string());
            }
        }
        Ok(plan.output)
    }
}

fn output_path(req: &ExtractionRequest) -> PathBuf {
    let output = req.output.clone().unwrap_or_else(|| {
        default_output(
            &req.input,
            req.mode,
            req.start.as_deref(),
            req.end.as_deref(),
            req.duration.as_deref(),
        )
    });
    if req.force {
        output
    } else {
        avoid_collision(&output)
    }
}

fn build_plan(validated: &ValidatedRequest, tool: PathBuf, output: PathBuf, media: Option<f64>) -> ResolvedPlan {
    let req = &validated.request;
    let progress_total = if req.show_progress && !req.verbose {
        validated.range.expected_seconds(media)
    } else {
        None
    };
    let args = build_args(validated, &output, progress_total.is_some());

    ResolvedPlan {
        tool,
        output,
        args,
        mode: req.mode,
        progress_total,
    }
}
