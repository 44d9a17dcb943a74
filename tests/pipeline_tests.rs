use audio_extract::open::{OpenWarning, Opener};
use audio_extract::pipeline::{DurationProbe, ResolvedPlan, Runner, ToolResolver};
use audio_extract::{ExtractError, ExtractionRequest, Mode, Pipeline, Reporter};
use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<ResolvedPlan>>>);

impl Runner for Recorder {
    fn run(&self, plan: &ResolvedPlan) -> audio_extract::Result<()> {
        self.0.borrow_mut().push(plan.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct CountingOpener(Rc<RefCell<Vec<PathBuf>>>);

impl Opener for CountingOpener {
    fn open(&self, path: &Path) -> Result<(), OpenWarning> {
        self.0.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

struct InstalledFfmpeg;

impl ToolResolver for InstalledFfmpeg {
    fn resolve(&self, _explicit: Option<&Path>) -> audio_extract::Result<PathBuf> {
        Ok(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
    }
}

struct MediaLength(f64);

impl DurationProbe for MediaLength {
    fn probe(&self, _input: &Path) -> Option<f64> {
        Some(self.0)
    }
}

#[derive(Default)]
struct Silent {
    statuses: Vec<String>,
}

impl Reporter for Silent {
    fn status(&mut self, message: &str) {
        self.statuses.push(message.to_string());
    }
    fn warning(&mut self, _message: &str) {}
    fn command(&mut self, _line: &str) {}
}

struct Harness {
    dir: TempDir,
    recorder: Recorder,
    opener: CountingOpener,
    pipeline: Pipeline,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let recorder = Recorder::default();
        let opener = CountingOpener::default();
        let pipeline = Pipeline::new(Box::new(recorder.clone()), Box::new(opener.clone()))
            .with_probe(Box::new(MediaLength(3600.0)))
            .with_resolver(Box::new(InstalledFfmpeg));
        Self {
            dir,
            recorder,
            opener,
            pipeline,
        }
    }

    fn request(&self, name: &str) -> ExtractionRequest {
        let input = self.dir.path().join(name);
        fs::write(&input, b"").unwrap();
        ExtractionRequest::new(input)
    }

    fn last_args(&self) -> Vec<String> {
        let plans = self.recorder.0.borrow();
        let plan = plans.last().expect("runner was called");
        plan.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

fn value_after(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1).cloned())
}

#[test]
fn speech_extraction_of_whole_file() {
    let h = Harness::new();
    let req = h.request("lockdown.mp4");
    let mut sink = Silent::default();

    let result = h.pipeline.run(req, &mut sink);

    assert!(result.success);
    let expected = h.dir.path().join("lockdown_tts.wav");
    assert_eq!(result.output.as_deref(), Some(expected.as_path()));
    assert_eq!(sink.statuses, vec![expected.display().to_string()]);

    let args = h.last_args();
    assert_eq!(
        value_after(&args, "-af").as_deref(),
        Some("highpass=f=80,lowpass=f=11000,aresample=24000,loudnorm=I=-16:TP=-1.5:LRA=11")
    );
    assert_eq!(value_after(&args, "-ac").as_deref(), Some("1"));
    assert_eq!(value_after(&args, "-ar").as_deref(), Some("24000"));
    assert_eq!(value_after(&args, "-acodec").as_deref(), Some("pcm_s16le"));
    assert!(!args.iter().any(|a| a == "-ss" || a == "-t"));
    assert_eq!(args.last().map(String::as_str), Some(expected.to_str().unwrap()));
}

#[test]
fn segment_with_duration_gets_tagged_name() {
    let h = Harness::new();
    let mut req = h.request("podcast.mp4");
    req.start = Some("00:05:30".into());
    req.duration = Some("00:00:20".into());

    let output = h.pipeline.execute(req, &mut Silent::default()).unwrap();

    assert_eq!(
        output,
        h.dir.path().join("podcast_tts_s00-05-30_d00-00-20.wav")
    );
    let args = h.last_args();
    assert_eq!(value_after(&args, "-ss").as_deref(), Some("00:05:30"));
    assert_eq!(value_after(&args, "-t").as_deref(), Some("00:00:20"));
    let ss = args.iter().position(|a| a == "-ss").unwrap();
    let input = args.iter().position(|a| a == "-i").unwrap();
    assert!(ss < input);
}

#[test]
fn end_time_becomes_length() {
    let h = Harness::new();
    let mut req = h.request("talk.mp4");
    req.start = Some("1:00".into());
    req.end = Some("1:30.5".into());

    h.pipeline.execute(req, &mut Silent::default()).unwrap();

    assert_eq!(value_after(&h.last_args(), "-t").as_deref(), Some("30.500"));
}

#[test]
fn end_before_start_never_runs() {
    let h = Harness::new();
    let mut req = h.request("talk.mp4");
    req.start = Some("00:01:00".into());
    req.end = Some("00:00:59".into());

    let result = h.pipeline.run(req, &mut Silent::default());

    assert!(!result.success);
    assert_eq!(result.exit_code, None);
    assert!(matches!(result.error, Some(ExtractError::EndBeforeStart { .. })));
    assert!(h.recorder.0.borrow().is_empty());
}

#[test]
fn existing_output_gets_numbered_name() {
    let h = Harness::new();
    let req = h.request("lockdown.mp4");
    fs::write(h.dir.path().join("lockdown_tts.wav"), b"taken").unwrap();

    let output = h.pipeline.execute(req.clone(), &mut Silent::default()).unwrap();
    assert_eq!(output, h.dir.path().join("lockdown_tts_001.wav"));
    assert!(h.last_args().iter().any(|a| a == "-n"));

    let mut forced = req;
    forced.force = true;
    let output = h.pipeline.execute(forced, &mut Silent::default()).unwrap();
    assert_eq!(output, h.dir.path().join("lockdown_tts.wav"));
    assert!(h.last_args().iter().any(|a| a == "-y"));
}

#[test]
fn pass_through_keeps_source_audio() {
    let h = Harness::new();
    let mut req = h.request("music.mkv");
    req.mode = Mode::PassThrough;
    req.sample_rate = Some(44_100);
    req.channels = Some(2);

    let output = h.pipeline.execute(req, &mut Silent::default()).unwrap();

    assert_eq!(output, h.dir.path().join("music_out.wav"));
    let args = h.last_args();
    assert!(!args.iter().any(|a| a == "-af"));
    assert_eq!(value_after(&args, "-ar").as_deref(), Some("44100"));
    assert_eq!(value_after(&args, "-ac").as_deref(), Some("2"));
}

#[test]
fn speech_mode_rejects_sample_rate() {
    let h = Harness::new();
    let mut req = h.request("talk.mp4");
    req.sample_rate = Some(44_100);

    let err = h.pipeline.execute(req, &mut Silent::default()).unwrap_err();

    assert!(matches!(err, ExtractError::PassThroughOnly(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(h.recorder.0.borrow().is_empty());
}

#[test]
fn range_beyond_probed_length_fails() {
    let h = Harness::new();
    let mut req = h.request("talk.mp4");
    req.start = Some("00:59:50".into());
    req.duration = Some("20".into());

    let err = h.pipeline.execute(req, &mut Silent::default()).unwrap_err();

    assert!(matches!(
        err,
        ExtractError::RangeExceedsMedia {
            bound: "start + duration",
            ..
        }
    ));
}

#[test]
fn autoplay_opens_result() {
    let h = Harness::new();
    let mut req = h.request("talk.mp4");
    req.autoplay = true;

    let output = h.pipeline.execute(req, &mut Silent::default()).unwrap();

    assert_eq!(*h.opener.0.borrow(), vec![output]);
}

#[test]
fn explicit_output_is_used() {
    let h = Harness::new();
    let mut req = h.request("talk.mp4");
    let wanted = h.dir.path().join("custom.wav");
    req.output = Some(wanted.clone());

    let output = h.pipeline.execute(req, &mut Silent::default()).unwrap();

    assert_eq!(output, wanted);
    let args: Vec<OsString> = h.recorder.0.borrow()[0].args.clone();
    assert_eq!(args.last(), Some(&OsString::from(wanted.as_os_str())));
}
