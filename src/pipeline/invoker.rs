use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::error::PipelineError;

/// One external command run: program, positional arguments, working dir.
#[derive(Debug, Clone)]
pub struct ProcessInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

/// What a finished child left behind. `exit_code` is -1 when the child was
/// terminated by a signal.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessInvocation {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Runs the command to completion, draining stdout and stderr as they
    /// are written. The child is killed if `timeout` expires first or if
    /// the returned future is dropped.
    pub async fn run(&self, timeout: Duration) -> Result<ProcessOutcome, PipelineError> {
        let start = Instant::now();
        info!("Spawning {} {:?} in {}", self.program, self.args, self.working_dir.display());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(PipelineError::Spawn)?;

        let stdout = child.stdout.take().ok_or_else(|| {
            PipelineError::Spawn(std::io::Error::other("child stdout was not captured"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            PipelineError::Spawn(std::io::Error::other("child stderr was not captured"))
        })?;

        let run = async {
            let (stdout, stderr, status) =
                tokio::join!(drain(stdout, "stdout"), drain(stderr, "stderr"), child.wait());
            Ok::<_, std::io::Error>((stdout?, stderr?, status?))
        };

        let (stdout, stderr, status) = match tokio::time::timeout(timeout, run).await {
            Ok(result) => result?,
            Err(_) => {
                // kill_on_drop takes the child down when `child` goes out of scope
                warn!("{} exceeded {:?}, killing it", self.program, timeout);
                return Err(PipelineError::Timeout(timeout));
            }
        };

        let exit_code = status.code().unwrap_or(-1);
        info!(
            "{} exited with code {} after {}ms",
            self.program,
            exit_code,
            start.elapsed().as_millis()
        );

        Ok(ProcessOutcome {
            exit_code,
            stdout,
            stderr,
        })
    }
}

async fn drain<R>(reader: R, stream: &'static str) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut collected = String::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&line);
        debug!(stream, "{}", text.trim_end());
        collected.push_str(&text);
    }

    Ok(collected)
}
