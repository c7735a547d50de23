//! Spawning and reaping the external decoder process.
//!
//! The decoder is any program honouring the ffmpeg command-line contract: read
//! the input file, down-mix to one channel, resample, and write raw signed
//! 16-bit little-endian PCM to stdout. [`DecoderProcess`] owns the child for the
//! duration of one decode call and tears it down when dropped.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{DecoderConfig, WaveformError};

const REAP_POLL_INTERVAL: Duration = Duration::from_millis(10);
const MAX_STDERR_BYTES: u64 = 4 * 1024;

/// Resolve `program` to an executable file without spawning anything.
///
/// Bare names are searched on `PATH`; anything with a directory component is
/// used as given.
pub fn locate_decoder(program: &Path) -> Result<PathBuf, WaveformError> {
    find_executable(program).ok_or_else(|| WaveformError::ToolNotFound {
        program: program.display().to_string(),
    })
}

fn find_executable(program: &Path) -> Option<PathBuf> {
    if program.as_os_str().is_empty() {
        return None;
    }
    if program.components().count() > 1 || program.is_absolute() {
        return is_executable(program).then(|| program.to_path_buf());
    }
    let search_path = std::env::var_os("PATH")?;
    std::env::split_paths(&search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidate_names(program).map(move |name| dir.join(name)))
        .find(|candidate| is_executable(candidate))
}

#[cfg(windows)]
fn candidate_names(program: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    let with_exe = program.with_extension("exe");
    [program.to_path_buf(), with_exe].into_iter()
}

#[cfg(not(windows))]
fn candidate_names(program: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    std::iter::once(program.to_path_buf())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Arguments asking the decoder for mono PCM16LE at `sample_rate` on stdout.
pub fn decoder_args(input: &Path, sample_rate: u32) -> Vec<OsString> {
    vec![
        "-v".into(),
        "error".into(),
        "-i".into(),
        input.as_os_str().to_owned(),
        "-ac".into(),
        "1".into(),
        "-ar".into(),
        sample_rate.to_string().into(),
        "-f".into(),
        "s16le".into(),
        "-acodec".into(),
        "pcm_s16le".into(),
        "-".into(),
    ]
}

/// How a decoder process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderExit {
    /// The process exited on its own.
    Exited(ExitStatus),
    /// The process outlived the teardown timeout and was killed.
    Killed,
}

/// A running decoder whose stdout is readable as a PCM byte stream.
///
/// The process is reaped on drop: stdout is closed, the process gets a bounded
/// wait to exit, and it is killed if it is still running afterwards.
pub struct DecoderProcess {
    program: PathBuf,
    child: Child,
    stdout: Option<ChildStdout>,
    stderr_log: Option<File>,
    teardown_timeout: Duration,
    exit: Option<DecoderExit>,
}

impl DecoderProcess {
    /// Locate the configured decoder and start it on `input`.
    pub fn spawn(input: &Path, config: &DecoderConfig) -> Result<Self, WaveformError> {
        let program = locate_decoder(config.decoder_program())?;
        let launch_error = |source: io::Error| WaveformError::DecodeLaunch {
            program: program.clone(),
            source,
        };
        // Stderr goes to an unlinked temp file so a chatty decoder can never stall on
        // a full pipe that nobody drains.
        let stderr_log = tempfile::tempfile().map_err(launch_error)?;
        let stderr_handle = stderr_log.try_clone().map_err(launch_error)?;

        let mut child = Command::new(&program)
            .args(decoder_args(input, config.sample_rate()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::from(stderr_handle))
            .spawn()
            .map_err(launch_error)?;
        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(launch_error(io::Error::other("decoder stdout pipe unavailable")));
        };
        debug!(
            "Spawned decoder {} (pid {}) for {} at {} Hz",
            program.display(),
            child.id(),
            input.display(),
            config.sample_rate()
        );
        Ok(Self {
            program,
            child,
            stdout: Some(stdout),
            stderr_log: Some(stderr_log),
            teardown_timeout: config.teardown_timeout(),
            exit: None,
        })
    }

    /// Resolved path of the running decoder.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Close stdout, reap the process, and report an unsuccessful exit.
    ///
    /// Call this only after draining stdout; a decoder that is still writing sees
    /// a broken pipe and exits with an error.
    pub fn finish(&mut self) -> Result<(), WaveformError> {
        match self.shutdown() {
            DecoderExit::Exited(status) if status.success() => Ok(()),
            DecoderExit::Exited(status) => Err(WaveformError::DecoderFailed {
                status,
                stderr: self.take_stderr(),
            }),
            DecoderExit::Killed => {
                warn!(
                    "Decoder {} had to be killed after its output was drained",
                    self.program.display()
                );
                Ok(())
            }
        }
    }

    fn shutdown(&mut self) -> DecoderExit {
        if let Some(exit) = self.exit {
            return exit;
        }
        drop(self.stdout.take());
        let exit = match wait_with_timeout(&mut self.child, self.teardown_timeout) {
            Ok(Some(status)) => DecoderExit::Exited(status),
            Ok(None) => {
                warn!(
                    "Decoder {} still running after {:?}; killing it",
                    self.program.display(),
                    self.teardown_timeout
                );
                self.kill()
            }
            Err(err) => {
                warn!("Failed to poll decoder {}: {err}", self.program.display());
                self.kill()
            }
        };
        debug!("Decoder {} finished: {exit:?}", self.program.display());
        self.exit = Some(exit);
        exit
    }

    fn kill(&mut self) -> DecoderExit {
        if let Err(err) = self.child.kill() {
            warn!("Failed to kill decoder {}: {err}", self.program.display());
        }
        match self.child.wait() {
            Ok(status) if !status.success() => DecoderExit::Killed,
            Ok(status) => DecoderExit::Exited(status),
            Err(_) => DecoderExit::Killed,
        }
    }

    fn take_stderr(&mut self) -> String {
        let Some(mut log) = self.stderr_log.take() else {
            return String::new();
        };
        let mut bytes = Vec::new();
        let read = log
            .seek(SeekFrom::Start(0))
            .and_then(|_| log.take(MAX_STDERR_BYTES).read_to_end(&mut bytes));
        if let Err(err) = read {
            warn!("Failed to read decoder stderr: {err}");
        }
        String::from_utf8_lossy(&bytes).trim().to_string()
    }
}

impl Read for DecoderProcess {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stdout.as_mut() {
            Some(stdout) => stdout.read(buf),
            None => Ok(0),
        }
    }
}

impl Drop for DecoderProcess {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(REAP_POLL_INTERVAL);
    }
}
