//! Cross-process loader adapter.
//!
//! A [`BridgeLoader`] lets a loader implemented in another language satisfy
//! the [`ResourceLoader`](crate::loader::ResourceLoader) contract. The
//! external implementation runs as a child process and speaks a line-oriented
//! JSON protocol on stdin/stdout: one request object per line in, one
//! response object per line out. Texture payloads travel base64-encoded, JSON
//! payloads as raw text. The adapter only marshals; it holds no resolution
//! logic of its own.
//!
//! The remote side reports "missing" distinctly from "broken"
//! (`{"err":{"kind":"notFound",...}}` vs `{"err":{"kind":"failure",...}}`),
//! and the adapter maps those onto `NotFound`/`Bridge`. Everything ambiguous
//! at the transport level (broken pipe, EOF, unparseable response, invalid
//! base64) is a `Bridge` failure.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::{ResolverError, Result};
use crate::loader::ResourceLoader;
use crate::path::ResourcePath;

#[derive(Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
enum Request<'a> {
    LoadTexture { path: &'a ResourcePath },
    LoadJson { path: &'a ResourcePath },
    Close,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum Response {
    Ok(Payload),
    Err(RemoteFault),
}

#[derive(Deserialize)]
struct Payload {
    /// Base64-encoded bytes, present for texture responses.
    #[serde(default)]
    data: Option<String>,
    /// Raw JSON text, present for JSON responses.
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteFault {
    kind: FaultKind,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
enum FaultKind {
    NotFound,
    Failure,
}

struct BridgeChild {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Adapter that forwards loader calls to an external process.
///
/// Owns the child's lifetime: `close` delivers the release signal, drops the
/// pipe and waits for the process so the remote side can free its own
/// resources. `close` is idempotent; after it, every load fails with a
/// `Bridge` error.
pub struct BridgeLoader {
    child: Mutex<Option<BridgeChild>>,
    command: String,
}

impl BridgeLoader {
    /// Spawns the external loader process with piped stdin/stdout.
    pub fn spawn(command: &mut Command) -> Result<Self> {
        let description = format!("{:?}", command.get_program());

        let mut process = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|err| {
                ResolverError::Bridge(format!("failed to spawn {}: {}", description, err))
            })?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| ResolverError::bridge("bridge child has no stdin"))?;
        let stdout = process
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| ResolverError::bridge("bridge child has no stdout"))?;

        debug!("spawned bridge loader {}", description);
        Ok(Self {
            child: Mutex::new(Some(BridgeChild {
                process,
                stdin,
                stdout,
            })),
            command: description,
        })
    }

    /// Convenience wrapper: runs `command` through `sh -c`.
    pub fn spawn_shell(command: &str) -> Result<Self> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        Self::spawn(&mut cmd)
    }

    fn request(&self, request: &Request<'_>, path: &ResourcePath) -> Result<Payload> {
        let mut guard = self.child.lock().unwrap_or_else(|e| e.into_inner());
        let child = guard
            .as_mut()
            .ok_or_else(|| ResolverError::bridge("bridge loader is already closed"))?;

        let line = serde_json::to_string(request)
            .map_err(|err| ResolverError::Bridge(format!("failed to encode request: {}", err)))?;
        trace!("bridge {} <- {}", self.command, line);

        writeln!(child.stdin, "{}", line)
            .and_then(|_| child.stdin.flush())
            .map_err(|err| {
                ResolverError::Bridge(format!("failed to write to {}: {}", self.command, err))
            })?;

        let mut response = String::new();
        let read = child.stdout.read_line(&mut response).map_err(|err| {
            ResolverError::Bridge(format!("failed to read from {}: {}", self.command, err))
        })?;
        if read == 0 {
            return Err(ResolverError::Bridge(format!(
                "{} closed the stream mid-request",
                self.command
            )));
        }
        trace!("bridge {} -> {}", self.command, response.trim_end());

        match serde_json::from_str::<Response>(&response).map_err(|err| {
            ResolverError::Bridge(format!("unparseable response from {}: {}", self.command, err))
        })? {
            Response::Ok(payload) => Ok(payload),
            Response::Err(fault) => match fault.kind {
                FaultKind::NotFound => Err(ResolverError::NotFound(path.clone())),
                FaultKind::Failure => Err(ResolverError::Bridge(format!(
                    "{} reported: {}",
                    self.command, fault.message
                ))),
            },
        }
    }
}

impl ResourceLoader for BridgeLoader {
    fn load_texture(&self, path: &ResourcePath) -> Result<Vec<u8>> {
        let payload = self.request(&Request::LoadTexture { path }, path)?;
        let data = payload.data.ok_or_else(|| {
            ResolverError::Bridge(format!("{} returned no texture payload", self.command))
        })?;
        BASE64.decode(data.trim()).map_err(|err| {
            ResolverError::Bridge(format!("invalid base64 from {}: {}", self.command, err))
        })
    }

    fn load_json(&self, path: &ResourcePath) -> Result<String> {
        let payload = self.request(&Request::LoadJson { path }, path)?;
        payload.text.ok_or_else(|| {
            ResolverError::Bridge(format!("{} returned no JSON payload", self.command))
        })
    }

    fn close(&mut self) -> Result<()> {
        let mut guard = self.child.lock().unwrap_or_else(|e| e.into_inner());
        let Some(mut child) = guard.take() else {
            return Ok(());
        };

        // The child may already have exited; the release signal is best-effort.
        if let Ok(line) = serde_json::to_string(&Request::Close) {
            let _ = writeln!(child.stdin, "{}", line);
            let _ = child.stdin.flush();
        }
        drop(child.stdin);

        match child.process.wait() {
            Ok(status) if status.success() => {
                debug!("bridge loader {} exited cleanly", self.command);
                Ok(())
            }
            Ok(status) => Err(ResolverError::Bridge(format!(
                "{} exited with {}",
                self.command, status
            ))),
            Err(err) => Err(ResolverError::Bridge(format!(
                "failed to wait for {}: {}",
                self.command, err
            ))),
        }
    }
}

impl Drop for BridgeLoader {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
