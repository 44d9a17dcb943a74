use crate::request::Mode;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::io::{self, BufRead, BufReader, Read};
use std::sync::LazyLock;
use std::thread::{self, JoinHandle};
use std::time::Duration;

static PROGRESS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)=([\w\-\.:]+)$").expect("valid progress regex"));

/// Stage the extraction is in, judged by how far through the segment ffmpeg is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Seeking,
    Working,
    Writing,
}

impl Stage {
    fn at(done: f64) -> Self {
        if done < 0.05 {
            Stage::Seeking
        } else if done < 0.95 {
            Stage::Working
        } else {
            Stage::Writing
        }
    }

    fn label(self, mode: Mode) -> &'static str {
        match (self, mode) {
            (Stage::Seeking, _) => "seeking",
            (Stage::Working, Mode::Speech) => "filtering speech",
            (Stage::Working, Mode::PassThrough) => "decoding audio",
            (Stage::Writing, _) => "writing wav",
        }
    }
}

/// Terminal bar measured in milliseconds of output audio.
pub struct ExtractProgress {
    bar: ProgressBar,
    total_ms: u64,
    mode: Mode,
    stage: Option<Stage>,
}

impl ExtractProgress {
    pub fn new(total_ms: u64, mode: Mode) -> Self {
        let bar = ProgressBar::new(total_ms);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner} {prefix:>16} [{bar:40.green/bright-black}] {percent:>3}%  ETA {eta}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        let mut progress = Self {
            bar,
            total_ms,
            mode,
            stage: None,
        };
        progress.advance(0);
        progress
    }

    fn advance(&mut self, pos_ms: u64) {
        let pos_ms = pos_ms.min(self.total_ms);
        self.bar.set_position(pos_ms);
        let stage = Stage::at(pos_ms as f64 / self.total_ms.max(1) as f64);
        if self.stage != Some(stage) {
            self.bar.set_prefix(stage.label(self.mode));
            self.stage = Some(stage);
        }
    }

    fn done(&self) {
        self.bar.set_prefix("done");
        self.bar.finish();
    }
}

/// Read ffmpeg's `-progress` key/value stream on a background thread.
pub fn spawn_progress_reader<R>(stream: R, mut progress: ExtractProgress) -> JoinHandle<io::Result<()>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        for line in BufReader::new(stream).lines() {
            match parse_line(&line?) {
                // ffmpeg reports microseconds under both names
                Some(("out_time_us" | "out_time_ms", value)) => {
                    if let Ok(us) = value.parse::<u64>() {
                        progress.advance(us / 1000);
                    }
                }
                Some(("progress", "end")) => progress.done(),
                _ => {}
            }
        }
        if !progress.bar.is_finished() {
            progress.bar.abandon();
        }
        Ok(())
    })
}

fn parse_line(line: &str) -> Option<(&str, &str)> {
    let caps = PROGRESS_LINE.captures(line.trim_end())?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}
