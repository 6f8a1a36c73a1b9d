//! Lifecycle wrapper around one spawned bot process.
//!
//! Owns the child end-to-end: spawn with a best-effort execute-permission
//! fix-up, readiness handshake, liveness-checked line I/O, and an
//! idempotent graceful-then-forced teardown. A drop guard kills the child
//! if teardown never ran, so no bot outlives its judge.

use crate::config::JudgeConfig;
use crate::error::{ProcessError, StartupError};
use std::path::Path;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// Readiness token every bot must print on startup.
pub const READY_TOKEN: &str = "ready";

/// Token that tells the first-moving bot to open the game.
pub const START_TOKEN: &str = "start";

/// Shutdown notice written before termination.
pub const END_TOKEN: &str = "end";

/// One spawned bot process with captured streams.
#[derive(Debug)]
pub struct BotProcessHandle {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    stderr_buf: Arc<Mutex<String>>,
    shut_down: bool,
}

impl BotProcessHandle {
    /// Spawns the bot and completes the readiness handshake.
    #[instrument(skip(config), fields(path = %path.as_ref().display()))]
    pub async fn spawn(
        path: impl AsRef<Path>,
        config: &JudgeConfig,
    ) -> Result<Self, StartupError> {
        let path = path.as_ref();
        ensure_executable(path)?;

        debug!("Spawning bot process");
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| classify_spawn_error(e, path))?;

        let stdin = child.stdin.take().ok_or_else(|| {
            StartupError::CrashedDuringStartup {
                stderr: "input stream was not captured".to_string(),
            }
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            StartupError::CrashedDuringStartup {
                stderr: "output stream was not captured".to_string(),
            }
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            StartupError::CrashedDuringStartup {
                stderr: "diagnostic stream was not captured".to_string(),
            }
        })?;

        // Drain the diagnostic stream in the background so it never blocks
        // the bot and is available as a snapshot when a fault is classified.
        let stderr_buf = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&stderr_buf);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(bot_stderr = %line, "Bot diagnostic output");
                if let Ok(mut buf) = sink.lock() {
                    buf.push_str(&line);
                    buf.push('\n');
                }
            }
        });

        let mut handle = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            stderr_buf,
            shut_down: false,
        };

        handle.handshake(config.startup_timeout()).await?;
        Ok(handle)
    }

    /// Waits for the readiness token.
    async fn handshake(&mut self, deadline: Duration) -> Result<(), StartupError> {
        debug!("Waiting for readiness handshake");

        if self.has_exited() {
            return Err(StartupError::CrashedDuringStartup {
                stderr: self.diagnostics(),
            });
        }

        match timeout(deadline, self.stdout.next_line()).await {
            Err(_) => Err(StartupError::Timeout {
                seconds: deadline.as_secs(),
                stderr: self.diagnostics(),
            }),
            Ok(Ok(None)) | Ok(Err(_)) => Err(StartupError::CrashedDuringStartup {
                stderr: self.diagnostics(),
            }),
            Ok(Ok(Some(line))) => {
                let line = line.trim();
                if line == READY_TOKEN {
                    info!("Bot ready");
                    Ok(())
                } else {
                    warn!(line, "Bot sent something other than the readiness token");
                    Err(StartupError::UnexpectedHandshake {
                        line: line.to_string(),
                    })
                }
            }
        }
    }

    /// True when the process has exited.
    pub fn has_exited(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(Some(_)))
    }

    /// Snapshot of everything the bot has written to its diagnostic stream.
    pub fn diagnostics(&self) -> String {
        self.stderr_buf
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    /// Writes one newline-terminated line and flushes immediately.
    #[instrument(skip(self))]
    pub async fn write_line(&mut self, line: &str) -> Result<(), ProcessError> {
        let payload = format!("{line}\n");
        let result = async {
            self.stdin.write_all(payload.as_bytes()).await?;
            self.stdin.flush().await
        }
        .await;

        result.map_err(|e| {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                ProcessError::BrokenPipe
            } else {
                ProcessError::Died {
                    stderr: self.diagnostics(),
                }
            }
        })
    }

    /// Reads one reply line, checking liveness first.
    ///
    /// `Ok(None)` means the deadline elapsed with no data — a silent
    /// attempt the protocol layer classifies. EOF and a dead process are
    /// reported as [`ProcessError::Died`].
    pub async fn read_line(&mut self, deadline: Duration) -> Result<Option<String>, ProcessError> {
        if self.has_exited() {
            return Err(ProcessError::Died {
                stderr: self.diagnostics(),
            });
        }

        match timeout(deadline, self.stdout.next_line()).await {
            Err(_) => {
                debug!("Reply read deadline elapsed");
                Ok(None)
            }
            Ok(Ok(Some(line))) => Ok(Some(line)),
            Ok(Ok(None)) | Ok(Err(_)) => Err(ProcessError::Died {
                stderr: self.diagnostics(),
            }),
        }
    }

    /// Best-effort shutdown notice, graceful wait, then forced kill.
    ///
    /// Idempotent; runs exactly once per match on every exit path.
    #[instrument(skip(self))]
    pub async fn shutdown(&mut self, grace: Duration) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        // The bot may already be gone; the notice is best-effort.
        if let Err(e) = self.write_line(END_TOKEN).await {
            debug!(error = %e, "Shutdown notice not delivered");
        }

        match timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => info!(?status, "Bot exited"),
            Ok(Err(e)) => warn!(error = %e, "Failed waiting for bot exit"),
            Err(_) => {
                warn!("Bot still alive after grace period, killing");
                if let Err(e) = self.child.kill().await {
                    warn!(error = %e, "Failed to kill bot process");
                }
            }
        }
    }
}

impl Drop for BotProcessHandle {
    fn drop(&mut self) {
        if !self.shut_down {
            debug!("Bot handle dropped without teardown, killing process");
            let _ = self.child.start_kill();
        }
    }
}

/// Verifies the executable exists and is runnable, fixing permissions once.
fn ensure_executable(path: &Path) -> Result<(), StartupError> {
    let metadata = std::fs::metadata(path).map_err(|_| StartupError::NotFound {
        path: path.display().to_string(),
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mode = metadata.permissions().mode();
        if mode & 0o111 == 0 {
            warn!(path = %path.display(), "Bot executable lacks execute permission, attempting fix-up");
            let mut perms = metadata.permissions();
            perms.set_mode(mode | 0o755);
            std::fs::set_permissions(path, perms).map_err(|_| {
                StartupError::PermissionDenied {
                    path: path.display().to_string(),
                }
            })?;
        }
    }

    Ok(())
}

/// Maps a spawn failure onto the startup taxonomy.
fn classify_spawn_error(e: std::io::Error, path: &Path) -> StartupError {
    match e.kind() {
        std::io::ErrorKind::NotFound => StartupError::NotFound {
            path: path.display().to_string(),
        },
        std::io::ErrorKind::PermissionDenied => StartupError::PermissionDenied {
            path: path.display().to_string(),
        },
        _ => StartupError::CrashedDuringStartup {
            stderr: e.to_string(),
        },
    }
}
