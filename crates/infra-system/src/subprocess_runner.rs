// Subprocess runner implementation
// reason: async-trait, tokio for async process management
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};

use dde_bridge_core::application::connector::constants::GRACEFUL_SHUTDOWN_TIMEOUT;
use dde_bridge_core::port::time_provider::SystemTimeProvider;
use dde_bridge_core::port::{
    InvocationError, ProcessOutput, ProcessRequest, ProcessRunner, TimeProvider,
};

/// Subprocess runner
///
/// Executes the program directly with a discrete argument vector. No shell
/// is involved, so arguments are never re-parsed or expanded.
pub struct SubprocessRunner {
    time_provider: Arc<dyn TimeProvider>,
    grace_period: Duration,
}

impl Default for SubprocessRunner {
    fn default() -> Self {
        Self::new(Arc::new(SystemTimeProvider))
    }
}

impl SubprocessRunner {
    /// Create a new subprocess runner
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for duration tracking
    ///
    /// # Example
    /// ```ignore
    /// let runner = SubprocessRunner::new(Arc::new(SystemTimeProvider));
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            time_provider,
            grace_period: GRACEFUL_SHUTDOWN_TIMEOUT,
        }
    }

    /// Override the SIGTERM -> SIGKILL grace period for timed-out processes
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    fn spawn(&self, request: &ProcessRequest) -> Result<Child, InvocationError> {
        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so a timeout reaches anything the engine started
        #[cfg(unix)]
        command.process_group(0);

        if let Some(dir) = &request.working_dir {
            command.current_dir(dir);
        }

        command
            .spawn()
            .map_err(|e| InvocationError::SpawnFailed(format!("{}: {}", request.program, e)))
    }

    /// SIGTERM to the process group first, then SIGKILL once the grace period is over
    ///
    /// `pid` is captured at spawn time: the leader may already be reaped while
    /// a background process it started still holds the output pipes.
    async fn terminate(&self, child: &mut Child, pid: Option<u32>) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = pid {
                let group = Pid::from_raw(pid as i32);

                info!(pid = %pid, "Sending SIGTERM to process group");
                if let Err(e) = killpg(group, Signal::SIGTERM) {
                    warn!(pid = %pid, error = %e, "SIGTERM failed");
                }

                if timeout(self.grace_period, child.wait()).await.is_err() {
                    warn!(pid = %pid, "Process did not exit after SIGTERM, sending SIGKILL");
                }

                // Group members can outlive the leader; ESRCH means none are left
                let _ = killpg(group, Signal::SIGKILL);
            }
        }

        if let Ok(None) = child.try_wait() {
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill dialog engine process");
            }
        }
    }
}

fn collect<R>(pipe: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf).await?;
        }
        Ok(buf)
    })
}

async fn join_pipe(
    handle: &mut JoinHandle<std::io::Result<Vec<u8>>>,
) -> Result<String, InvocationError> {
    let bytes = handle
        .await
        .map_err(|e| InvocationError::Io(e.to_string()))?
        .map_err(|e| InvocationError::Io(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[async_trait]
impl ProcessRunner for SubprocessRunner {
    async fn run(&self, request: &ProcessRequest) -> Result<ProcessOutput, InvocationError> {
        let start_time = self.time_provider.now_millis();

        info!(
            program = %request.program,
            command_line = %shell_words::join(
                std::iter::once(request.program.as_str()).chain(request.args.iter().map(String::as_str))
            ),
            working_dir = ?request.working_dir,
            timeout_ms = ?request.timeout.map(|t| t.as_millis()),
            "Starting dialog engine"
        );

        let mut child = self.spawn(request)?;
        let pid = child.id();

        // Drain both pipes while waiting so a chatty process cannot block on a full pipe
        let mut stdout = collect(child.stdout.take());
        let mut stderr = collect(child.stderr.take());

        // Exit alone is not completion: the output is only whole once every
        // holder of the pipes has closed them
        let completion = async {
            let status = child
                .wait()
                .await
                .map_err(|e| InvocationError::Io(e.to_string()))?;
            let out = join_pipe(&mut stdout).await?;
            let err = join_pipe(&mut stderr).await?;
            Ok::<_, InvocationError>((status, out, err))
        };

        let finished = match request.timeout {
            Some(limit) => match timeout(limit, completion).await.ok() {
                Some(finished) => finished,
                None => {
                    warn!(
                        pid = ?pid,
                        timeout_ms = %limit.as_millis(),
                        "Dialog engine exceeded timeout, terminating"
                    );
                    stdout.abort();
                    stderr.abort();
                    self.terminate(&mut child, pid).await;
                    return Err(InvocationError::Timeout(limit.as_millis() as u64));
                }
            },
            None => completion.await,
        };

        let (status, stdout, stderr) = match finished {
            Ok(finished) => finished,
            Err(e) => {
                stdout.abort();
                stderr.abort();
                return Err(e);
            }
        };

        let duration_ms = self.time_provider.now_millis() - start_time;
        let exit_code = status.code();

        info!(
            program = %request.program,
            duration_ms = %duration_ms,
            exit_code = ?exit_code,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "Dialog engine completed"
        );

        Ok(ProcessOutput {
            exit_code,
            stdout,
            stderr,
            duration_ms,
        })
    }
}
