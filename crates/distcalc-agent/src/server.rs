//! Newline-delimited JSON server for the compute service.
//!
//! Each accepted connection gets its own handler thread. A connection may
//! carry any number of requests; every request line is answered with exactly
//! one response line. A connection that stays silent longer than the idle
//! timeout is closed.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use distcalc_core::constants::DEFAULT_IDLE_TIMEOUT_MS;
use distcalc_core::{ComputeRequest, ComputeResponse};

use crate::service::ComputeService;

/// Error type for the accept loop.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("bind failed: {0}")]
    Bind(io::Error),
    #[error("accept failed: {0}")]
    Accept(io::Error),
}

/// TCP front end for a `ComputeService`.
pub struct AgentServer {
    listener: TcpListener,
    service: Arc<ComputeService>,
    idle_timeout: Duration,
}

impl AgentServer {
    /// Bind to `addr`. Port 0 picks a free port.
    pub fn bind(addr: impl ToSocketAddrs, service: Arc<ComputeService>) -> Result<Self, ServeError> {
        let listener = TcpListener::bind(addr).map_err(ServeError::Bind)?;
        Ok(Self {
            listener,
            service,
            idle_timeout: Duration::from_millis(DEFAULT_IDLE_TIMEOUT_MS),
        })
    }

    /// Close connections that send nothing for `idle_timeout`.
    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails.
    pub fn serve(self) -> Result<(), ServeError> {
        self.serve_with_limit(None)
    }

    /// Accept at most `max_connections` connections, then return.
    pub fn serve_with_limit(self, max_connections: Option<usize>) -> Result<(), ServeError> {
        if let Ok(addr) = self.listener.local_addr() {
            info!(
                %addr,
                workers = self.service.config().workers(),
                idle_timeout = ?self.idle_timeout,
                "compute agent listening"
            );
        }

        let mut accepted = 0usize;
        for stream in self.listener.incoming() {
            let stream = stream.map_err(ServeError::Accept)?;
            let service = Arc::clone(&self.service);
            let peer = stream.peer_addr().ok();
            let idle_timeout = self.idle_timeout;
            let spawned = thread::Builder::new()
                .name("agent-connection".into())
                .spawn(move || {
                    if let Err(err) = handle_connection(stream, &service, idle_timeout) {
                        warn!(?peer, error = %err, "connection closed with error");
                    }
                });
            if let Err(err) = spawned {
                warn!(?peer, error = %err, "failed to spawn connection handler");
            }

            accepted += 1;
            if max_connections.is_some_and(|limit| accepted >= limit) {
                break;
            }
        }
        Ok(())
    }

    /// Serve on a background thread.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<Result<(), ServeError>> {
        thread::spawn(move || self.serve())
    }
}

fn handle_connection(
    stream: TcpStream,
    service: &ComputeService,
    idle_timeout: Duration,
) -> io::Result<()> {
    let peer = stream.peer_addr().ok();
    debug!(?peer, "connection accepted");
    stream.set_read_timeout(Some(idle_timeout))?;

    let reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) if is_idle(&err) => {
                debug!(?peer, ?idle_timeout, "idle connection closed");
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<ComputeRequest>(&line) {
            Ok(request) => service.handle(&request),
            Err(err) => {
                debug!(?peer, error = %err, "malformed request");
                ComputeResponse::Error {
                    error: format!("malformed request: {err}"),
                }
            }
        };
        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');
        writer.write_all(&payload)?;
        writer.flush()?;
    }

    debug!(?peer, "connection closed");
    Ok(())
}

/// Read timeouts surface as `WouldBlock` on Unix and `TimedOut` on Windows.
fn is_idle(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
