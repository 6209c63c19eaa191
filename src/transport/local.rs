use std::time::Duration;

use super::{Request, Transport, Value};
use crate::error::{ExecuteError, TransportError};
use crate::interpreter::InterpreterHandle;

/// Transport to an interpreter running in this process.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    handle: InterpreterHandle,
    timeout: Duration,
}

impl LocalTransport {
    pub fn new(handle: InterpreterHandle, timeout: Duration) -> Self {
        LocalTransport { handle, timeout }
    }

    pub fn handle(&self) -> &InterpreterHandle {
        &self.handle
    }
}

impl Transport for LocalTransport {
    async fn request(&self, request: Request) -> Result<Value, ExecuteError> {
        match tokio::time::timeout(self.timeout, self.handle.request(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.timeout).into()),
        }
    }
}
