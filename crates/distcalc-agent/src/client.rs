//! TCP compute client.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::trace;

use distcalc_core::constants::DEFAULT_CALL_TIMEOUT_MS;
use distcalc_core::{CalcError, ComputeClient, ComputeRequest, ComputeResponse};

/// Calls a remote agent over newline-delimited JSON, one connection per call.
#[derive(Debug, Clone)]
pub struct TcpComputeClient {
    addr: String,
    timeout: Duration,
}

impl TcpComputeClient {
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
        }
    }

    /// Bound connect, read and write on each call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn transport(&self, err: impl std::fmt::Display) -> CalcError {
        CalcError::Transport(format!("{}: {err}", self.addr))
    }

    fn resolve(&self) -> Result<SocketAddr, CalcError> {
        self.addr
            .to_socket_addrs()
            .map_err(|e| self.transport(e))?
            .next()
            .ok_or_else(|| self.transport("address resolved to nothing"))
    }

    fn call(&self, request: &ComputeRequest) -> Result<ComputeResponse, CalcError> {
        let addr = self.resolve()?;
        let stream = TcpStream::connect_timeout(&addr, self.timeout).map_err(|e| self.transport(e))?;
        stream
            .set_read_timeout(Some(self.timeout))
            .and_then(|()| stream.set_write_timeout(Some(self.timeout)))
            .map_err(|e| self.transport(e))?;

        let mut payload = serde_json::to_vec(request).map_err(|e| self.transport(e))?;
        payload.push(b'\n');
        let mut writer = &stream;
        writer.write_all(&payload).map_err(|e| self.transport(e))?;
        writer.flush().map_err(|e| self.transport(e))?;

        let mut line = String::new();
        let read = BufReader::new(&stream)
            .read_line(&mut line)
            .map_err(|e| self.transport(e))?;
        if read == 0 {
            return Err(self.transport("connection closed before response"));
        }
        serde_json::from_str(line.trim_end()).map_err(|e| self.transport(format!("bad response: {e}")))
    }
}

impl ComputeClient for TcpComputeClient {
    fn compute(&self, request: &ComputeRequest) -> Result<f32, CalcError> {
        trace!(addr = %self.addr, ?request, "remote compute");
        self.call(request)?.into_result()
    }

    fn endpoint(&self) -> String {
        self.addr.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn refused_connection_is_transport_fault() {
        // Bind then drop to get a port nobody listens on.
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = TcpComputeClient::new(format!("127.0.0.1:{port}"))
            .with_timeout(Duration::from_millis(500));
        let err = client.compute(&ComputeRequest::new(1.0, 2.0, '+')).unwrap_err();
        assert!(matches!(err, CalcError::Transport(ref msg) if msg.starts_with("127.0.0.1:")));
    }

    #[test]
    fn closed_without_reply_is_transport_fault() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut line = String::new();
            BufReader::new(&stream).read_line(&mut line).unwrap();
        });
        let client = TcpComputeClient::new(addr.to_string()).with_timeout(Duration::from_secs(2));
        assert!(matches!(
            client.compute(&ComputeRequest::new(1.0, 2.0, '+')),
            Err(CalcError::Transport(_))
        ));
        server.join().unwrap();
    }

    #[test]
    fn unresolvable_address() {
        let client = TcpComputeClient::new("not an address");
        assert!(matches!(
            client.compute(&ComputeRequest::new(1.0, 2.0, '+')),
            Err(CalcError::Transport(_))
        ));
    }

    #[test]
    fn default_timeout() {
        let client = TcpComputeClient::new("127.0.0.1:1");
        assert_eq!(client.timeout(), Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS));
        assert_eq!(client.endpoint(), "127.0.0.1:1");
    }
}
