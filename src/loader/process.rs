//! Child-process configuration sources
//!
//! Each source runs as its own child process for the lifetime of its handle.
//! Format: one JSON request per line on stdin → one JSON response per line on
//! stdout. The first exchange is the `load` handshake; a source that cannot
//! complete it fails the load.
//!
//! A line that does not decode, or that answers a different request, means
//! the two sides no longer agree on which line answers which request. The
//! child is stopped at that point and every later query fails with
//! [`ModuleError::Stopped`]. A well-formed error response keeps it running.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use flagconf_protocol::ops::names;
use flagconf_protocol::{
    ConfRequest, ConfResponse, FlagsForFileRequest, FlagsResult, LoadRequest, LoadResponse,
    ProtocolError,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::search_path::SearchPath;
use super::{random_unit_name, FlagsModule, ModuleError, ModuleLoader};

/// Environment variable carrying the unit name into the source.
pub const UNIT_ENV: &str = "FLAGCONF_UNIT";

/// Environment variable carrying the search path into the source.
pub const SEARCH_PATH_ENV: &str = "FLAGCONF_PATH";

/// Loads configuration sources as child processes.
#[derive(Debug, Clone)]
pub struct ProcessLoader {
    /// Program used to run sources; None executes the source directly.
    interpreter: Option<String>,
    /// Directory of helper logic, put first on the search path during load.
    helper_dir: PathBuf,
    search_path: SearchPath,
}

impl ProcessLoader {
    pub fn new(helper_dir: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: None,
            helper_dir: helper_dir.into(),
            search_path: SearchPath::default(),
        }
    }

    /// Run sources through `interpreter` instead of executing them.
    pub fn with_interpreter(mut self, interpreter: Option<String>) -> Self {
        self.interpreter = interpreter.filter(|i| !i.trim().is_empty());
        self
    }

    /// Base search path shared by every load.
    pub fn with_search_path(mut self, search_path: SearchPath) -> Self {
        self.search_path = search_path;
        self
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    pub fn helper_dir(&self) -> &Path {
        &self.helper_dir
    }
}

/// Build the command that starts a source.
fn source_command(
    interpreter: Option<&str>,
    location: &Path,
    unit: &str,
    search_path: &SearchPath,
) -> Result<(Command, String), ModuleError> {
    let (mut command, program) = match interpreter {
        Some(interpreter) => {
            let mut command = Command::new(interpreter);
            command.arg(location);
            (command, interpreter.to_string())
        }
        None => (
            Command::new(location),
            location.to_string_lossy().into_owned(),
        ),
    };

    let joined = search_path
        .to_env_value()
        .map_err(|e| ModuleError::SearchPath(e.to_string()))?;

    command
        .env(UNIT_ENV, unit)
        .env(SEARCH_PATH_ENV, joined)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());

    Ok((command, program))
}

impl ModuleLoader for ProcessLoader {
    fn load(&mut self, location: &Path) -> Result<Box<dyn FlagsModule>, ModuleError> {
        let unit = random_unit_name();

        let guard = self.search_path.prioritize(&self.helper_dir);
        let (command, program) =
            source_command(self.interpreter.as_deref(), location, &unit, &guard)?;
        let module = ProcessModule::spawn(command, &program, location, unit)?;
        drop(guard);

        tracing::info!(
            location = %location.display(),
            unit = %module.unit,
            name = module.name.as_deref().unwrap_or(""),
            "loaded configuration source"
        );
        Ok(Box::new(module))
    }
}

/// A configuration source running as a child process.
#[derive(Debug)]
pub struct ProcessModule {
    unit: String,
    location: PathBuf,
    /// Name reported by the source in its handshake.
    name: Option<String>,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_request: u64,
    /// Set once the response stream can no longer be trusted.
    stopped: bool,
}

impl ProcessModule {
    /// Start the child and complete the `load` handshake.
    fn spawn(
        mut command: Command,
        program: &str,
        location: &Path,
        unit: String,
    ) -> Result<Self, ModuleError> {
        let mut child = command.spawn().map_err(|source| ModuleError::Spawn {
            program: program.to_string(),
            source,
        })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ModuleError::Exited("stdio pipes unavailable".to_string()));
            }
        };

        // From here on, Drop reaps the child on any error.
        let mut module = Self {
            unit,
            location: location.to_path_buf(),
            name: None,
            child,
            stdin,
            stdout: BufReader::new(stdout),
            next_request: 0,
            stopped: false,
        };

        let handshake = LoadRequest {
            unit: module.unit.clone(),
            location: location.to_string_lossy().into_owned(),
        };
        let ack: LoadResponse = module.call(names::LOAD, &handshake)?;
        module.name = ack.name;

        Ok(module)
    }

    /// One request/response exchange.
    fn call<P: Serialize, T: DeserializeOwned>(
        &mut self,
        op: &str,
        payload: &P,
    ) -> Result<T, ModuleError> {
        if self.stopped {
            return Err(ModuleError::Stopped);
        }

        let request_id = format!("{}-{}", self.unit, self.next_request);
        self.next_request += 1;

        let request = ConfRequest::new(op, request_id.clone(), payload)?;
        let line = request.to_line()?;
        if let Err(e) = writeln!(self.stdin, "{}", line).and_then(|_| self.stdin.flush()) {
            if e.kind() == ErrorKind::BrokenPipe {
                return Err(self.exited());
            }
            return Err(e.into());
        }

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(self.exited());
        }

        match ConfResponse::from_line(&line).and_then(|r| r.into_payload(&request_id)) {
            Ok(payload) => Ok(payload),
            Err(ProtocolError::Remote(e)) => Err(ProtocolError::Remote(e).into()),
            Err(e) => {
                self.stop(&e);
                Err(e.into())
            }
        }
    }

    fn stop(&mut self, reason: &ProtocolError) {
        tracing::warn!(
            location = %self.location.display(),
            unit = %self.unit,
            error = %reason,
            "stopping configuration source after protocol error"
        );
        self.stopped = true;
        let _ = self.child.kill();
        let _ = self.child.wait();
    }

    fn exited(&mut self) -> ModuleError {
        match self.child.try_wait() {
            Ok(Some(status)) => ModuleError::Exited(status.to_string()),
            _ => ModuleError::Exited("closed its output".to_string()),
        }
    }
}

impl FlagsModule for ProcessModule {
    fn unit_name(&self) -> &str {
        &self.unit
    }

    fn flags_for_file(&mut self, filename: &Path) -> Result<FlagsResult, ModuleError> {
        let request = FlagsForFileRequest {
            filename: filename.to_string_lossy().into_owned(),
        };
        self.call(names::FLAGS_FOR_FILE, &request)
    }
}

impl Drop for ProcessModule {
    fn drop(&mut self) {
        // Already-exited children make kill() fail; that's fine.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
