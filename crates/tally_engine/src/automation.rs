//! Word counts for legacy `.doc` files via an external word processor.
//!
//! Only one automation session may be alive per process. [`count_words_with`]
//! holds [`AUTOMATION_LOCK`] for the whole launch/open/count/close sequence and
//! wraps the session in a guard that closes it on every exit path.

use std::io::{self, BufRead, BufReader, Read};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tally_logging::{tally_debug, tally_warn};

use crate::decode::{decode_console_output, parse_word_count, DecodeError};

static AUTOMATION_LOCK: Mutex<()> = Mutex::new(());

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Prefix of the stdout line carrying Word's process id.
const WORD_PID_MARKER: &str = "WORDPID:";

#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to open {path}: {message}")]
    Open { path: PathBuf, message: String },
    #[error("word count query failed: {0}")]
    Query(String),
    #[error("automation did not finish within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Output(#[from] DecodeError),
    #[error("failed to close automation session: {0}")]
    Close(String),
    #[error("io error while talking to automation process: {0}")]
    Io(#[from] io::Error),
}

/// An external application able to report a document's word count.
pub trait DocumentAutomation: Send + Sync {
    fn launch(&self) -> Result<Box<dyn AutomationSession>, AutomationError>;
}

/// One live application instance. `close` must release it.
pub trait AutomationSession: Send {
    fn open(&mut self, path: &Path) -> Result<(), AutomationError>;
    fn word_count(&mut self) -> Result<u64, AutomationError>;
    fn close(&mut self) -> Result<(), AutomationError>;
}

/// Closes the wrapped session when dropped unless it was closed explicitly.
pub struct SessionGuard {
    session: Box<dyn AutomationSession>,
    closed: bool,
}

impl SessionGuard {
    pub fn new(session: Box<dyn AutomationSession>) -> Self {
        Self {
            session,
            closed: false,
        }
    }

    pub fn close(mut self) -> Result<(), AutomationError> {
        self.closed = true;
        self.session.close()
    }
}

impl Deref for SessionGuard {
    type Target = dyn AutomationSession;

    fn deref(&self) -> &Self::Target {
        self.session.as_ref()
    }
}

impl DerefMut for SessionGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session.as_mut()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.session.close() {
            tally_warn!("Failed to release automation session: {}", err);
        }
    }
}

/// Runs one exclusive launch/open/count/close sequence.
///
/// A failing close after a successful count is logged and the count kept.
pub fn count_words_with(
    automation: &dyn DocumentAutomation,
    path: &Path,
) -> Result<u64, AutomationError> {
    let _exclusive = AUTOMATION_LOCK
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    let mut session = SessionGuard::new(automation.launch()?);
    session.open(path)?;
    let count = session.word_count()?;
    if let Err(err) = session.close() {
        tally_warn!("Counted {} but close failed: {}", path.display(), err);
    }
    Ok(count)
}

#[derive(Debug, Clone)]
pub struct AutomationSettings {
    pub program: String,
    pub timeout: Duration,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            program: "powershell".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Drives Microsoft Word through COM from a PowerShell child process.
///
/// The script quits Word in a `finally` block and reports Word's process id
/// before opening the document. If the PowerShell process has to be killed
/// (timeout or a session dropped early) that `finally` never runs, so the
/// reported Word process is stopped as well.
#[derive(Debug, Clone, Default)]
pub struct PowerShellWordAutomation {
    settings: AutomationSettings,
}

impl PowerShellWordAutomation {
    pub fn new(settings: AutomationSettings) -> Self {
        Self { settings }
    }
}

impl DocumentAutomation for PowerShellWordAutomation {
    fn launch(&self) -> Result<Box<dyn AutomationSession>, AutomationError> {
        Ok(Box::new(PowerShellSession {
            settings: self.settings.clone(),
            path: None,
            script: None,
        }))
    }
}

/// A running script. Both pipes are drained on their own threads so a chatty
/// child never blocks on a full pipe.
struct RunningScript {
    child: Child,
    stdout: Option<JoinHandle<Vec<u8>>>,
    stderr: Option<JoinHandle<Vec<u8>>>,
    /// 0 until the script has reported it.
    word_pid: Arc<AtomicU32>,
}

struct PowerShellSession {
    settings: AutomationSettings,
    path: Option<PathBuf>,
    script: Option<RunningScript>,
}

impl PowerShellSession {
    /// Stops the script if it is still running, then the Word process it
    /// started, since its `finally` block will not run.
    fn abort(&self, mut script: RunningScript) -> Result<(), AutomationError> {
        let killed = stop_child(&mut script.child)
            .map_err(|err| AutomationError::Close(err.to_string()))?;
        if killed {
            match script.word_pid.load(Ordering::SeqCst) {
                0 => tally_debug!("Script killed before Word reported a process id"),
                pid => self.stop_word(pid)?,
            }
        }
        Ok(())
    }

    fn stop_word(&self, pid: u32) -> Result<(), AutomationError> {
        tally_debug!("Stopping orphaned Word process {}", pid);
        let command = format!("Stop-Process -Id {pid} -Force -ErrorAction SilentlyContinue");
        let status = Command::new(&self.settings.program)
            .args(["-NoProfile", "-NonInteractive", "-Command", &command])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|err| AutomationError::Close(format!("stopping Word {pid}: {err}")))?;
        if !status.success() {
            return Err(AutomationError::Close(format!(
                "stopping Word {pid}: {status}"
            )));
        }
        Ok(())
    }
}

impl AutomationSession for PowerShellSession {
    fn open(&mut self, path: &Path) -> Result<(), AutomationError> {
        let absolute = std::path::absolute(path).map_err(|err| AutomationError::Open {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let script = word_count_script(&absolute);
        tally_debug!(
            "Launching {} for {}",
            self.settings.program,
            absolute.display()
        );
        let mut child = Command::new(&self.settings.program)
            .args(["-NoProfile", "-NonInteractive", "-Command", &script])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| AutomationError::Launch {
                program: self.settings.program.clone(),
                source,
            })?;

        let word_pid = Arc::new(AtomicU32::new(0));
        let stdout = child.stdout.take().map(|pipe| {
            let word_pid = Arc::clone(&word_pid);
            thread::spawn(move || drain_stdout(pipe, &word_pid))
        });
        let stderr = child.stderr.take().map(|pipe| thread::spawn(move || drain(pipe)));
        self.script = Some(RunningScript {
            child,
            stdout,
            stderr,
            word_pid,
        });
        self.path = Some(absolute);
        Ok(())
    }

    fn word_count(&mut self) -> Result<u64, AutomationError> {
        let mut script = self
            .script
            .take()
            .ok_or_else(|| AutomationError::Query("no document is open".to_string()))?;

        let status = match wait_with_deadline(&mut script.child, self.settings.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                if let Err(err) = self.abort(script) {
                    tally_warn!("Cleanup after automation timeout failed: {}", err);
                }
                return Err(AutomationError::Timeout(self.settings.timeout));
            }
            Err(err) => {
                if let Err(cleanup) = self.abort(script) {
                    tally_warn!("Cleanup after automation wait error failed: {}", cleanup);
                }
                return Err(err.into());
            }
        };

        let stdout = join_output(script.stdout)?;
        let stderr = join_output(script.stderr)?;

        if !status.success() {
            let message = decode_console_output(&stderr)
                .unwrap_or_else(|_| String::from_utf8_lossy(&stderr).into_owned());
            let path = self.path.clone().unwrap_or_default();
            return Err(AutomationError::Open {
                path,
                message: format!("{status}: {}", message.trim()),
            });
        }

        let output = decode_console_output(&stdout)?;
        Ok(parse_word_count(&output)?)
    }

    fn close(&mut self) -> Result<(), AutomationError> {
        match self.script.take() {
            Some(script) => self.abort(script),
            None => Ok(()),
        }
    }
}

/// Kills and reaps the child if it is still running. Returns whether it had
/// to be killed.
fn stop_child(child: &mut Child) -> io::Result<bool> {
    let killed = if child.try_wait()?.is_none() {
        child.kill()?;
        true
    } else {
        false
    };
    child.wait()?;
    Ok(killed)
}

/// Polls until the child exits. `None` once the deadline passes.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn join_output(reader: Option<JoinHandle<Vec<u8>>>) -> Result<Vec<u8>, AutomationError> {
    match reader {
        Some(handle) => handle
            .join()
            .map_err(|_| AutomationError::Query("automation output reader panicked".to_string())),
        None => Ok(Vec::new()),
    }
}

fn drain(mut pipe: impl Read) -> Vec<u8> {
    let mut output = Vec::new();
    if let Err(err) = pipe.read_to_end(&mut output) {
        tally_warn!("Failed to read automation output: {}", err);
    }
    output
}

/// Collects stdout, pulling out the Word process id line as it arrives.
fn drain_stdout(pipe: impl Read, word_pid: &AtomicU32) -> Vec<u8> {
    let mut reader = BufReader::new(pipe);
    let mut output = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => match parse_word_pid(&line) {
                Some(pid) => word_pid.store(pid, Ordering::SeqCst),
                None => output.extend_from_slice(&line),
            },
            Err(err) => {
                tally_warn!("Failed to read automation output: {}", err);
                break;
            }
        }
    }
    output
}

fn parse_word_pid(line: &[u8]) -> Option<u32> {
    let line = line.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(line);
    let text = std::str::from_utf8(line).ok()?.trim();
    text.strip_prefix(WORD_PID_MARKER)?.trim().parse().ok()
}

fn word_count_script(path: &Path) -> String {
    // Single-quoted PowerShell literal: only `'` needs escaping.
    let quoted = path.display().to_string().replace('\'', "''");
    format!(
        "$ErrorActionPreference = 'Stop'; \
         [Console]::OutputEncoding = [System.Text.Encoding]::UTF8; \
         $word = $null; $doc = $null; \
         try {{ \
             $before = @(Get-Process WINWORD -ErrorAction SilentlyContinue | ForEach-Object {{ $_.Id }}); \
             $word = New-Object -ComObject Word.Application; \
             $wordPid = Get-Process WINWORD -ErrorAction SilentlyContinue | \
                 Where-Object {{ $before -notcontains $_.Id }} | \
                 Select-Object -First 1 -ExpandProperty Id; \
             if ($wordPid) {{ [Console]::Out.WriteLine('{WORD_PID_MARKER}' + $wordPid); [Console]::Out.Flush() }}; \
             $word.Visible = $false; \
             $word.DisplayAlerts = 0; \
             $doc = $word.Documents.Open('{quoted}', $false, $true); \
             Write-Output $doc.Words.Count \
         }} finally {{ \
             if ($doc -ne $null) {{ $doc.Close(0) }}; \
             if ($word -ne $null) {{ $word.Quit(); [void][System.Runtime.InteropServices.Marshal]::ReleaseComObject($word) }} \
         }}"
    )
}
