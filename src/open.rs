use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Non-fatal failure to open a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenWarning(pub String);

impl fmt::Display for OpenWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not open output: {}", self.0)
    }
}

/// Opens a file with the user's default application.
pub trait Opener {
    fn open(&self, path: &Path) -> Result<(), OpenWarning>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, path: &Path) -> Result<(), OpenWarning> {
        debug!("opening {}", path.display());
        launch(open_command(path))
    }
}

/// Spawn without waiting on the caller's thread; the child is reaped in the
/// background.
fn launch(mut cmd: Command) -> Result<(), OpenWarning> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| OpenWarning(e.to_string()))?;
    thread::spawn(move || {
        if let Err(e) = child.wait() {
            debug!("opener did not exit cleanly: {e}");
        }
    });
    Ok(())
}

#[cfg(target_os = "windows")]
fn open_command(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(target_os = "macos")]
fn open_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn open_command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}
