use serde::{Deserialize, Serialize};

use super::Value;
use super::codec::{CompressionStrategy, Framed};
use crate::error::{ExecuteError, InterpreterException, TransportError};

/// What a client asks the companion to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// Evaluate Yail source (a code bundle or a single form).
    Execute { code: String },
    /// Call a global procedure by name with already-evaluated arguments.
    Invoke { procedure: String, args: Vec<Value> },
    /// Simulate a native component raising an event.
    Raise {
        component: String,
        event: String,
        args: Vec<Value>,
    },
}

impl Request {
    pub fn execute(code: impl Into<String>) -> Self {
        Request::Execute { code: code.into() }
    }

    pub fn invoke(procedure: impl Into<String>, args: Vec<Value>) -> Self {
        Request::Invoke {
            procedure: procedure.into(),
            args,
        }
    }
}

/// A request tagged with its sequence number on one connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionRequest {
    pub seq: u64,
    pub request: Request,
}

impl Framed for CompanionRequest {
    fn compression_strategy(&self) -> CompressionStrategy {
        match self.request {
            // code bundles can be large
            Request::Execute { .. } => CompressionStrategy::Always,
            Request::Invoke { .. } | Request::Raise { .. } => CompressionStrategy::Adaptive,
        }
    }
}

/// The companion's answer to the request with the same `seq`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CompanionResponse {
    Value {
        seq: u64,
        value: Value,
    },
    Exception {
        seq: u64,
        exception: InterpreterException,
    },
    /// The companion could not run the request at all.
    Error {
        seq: u64,
        message: String,
    },
}

impl CompanionResponse {
    pub fn from_result(seq: u64, result: Result<Value, ExecuteError>) -> Self {
        match result {
            Ok(value) => CompanionResponse::Value { seq, value },
            Err(ExecuteError::Interpreter(exception)) => CompanionResponse::Exception { seq, exception },
            Err(ExecuteError::Transport(e)) => CompanionResponse::Error {
                seq,
                message: e.to_string(),
            },
        }
    }

    pub fn seq(&self) -> u64 {
        match self {
            CompanionResponse::Value { seq, .. }
            | CompanionResponse::Exception { seq, .. }
            | CompanionResponse::Error { seq, .. } => *seq,
        }
    }

    pub fn into_result(self) -> Result<Value, ExecuteError> {
        match self {
            CompanionResponse::Value { value, .. } => Ok(value),
            CompanionResponse::Exception { exception, .. } => Err(exception.into()),
            CompanionResponse::Error { message, .. } => Err(TransportError::Io(message).into()),
        }
    }
}

impl Framed for CompanionResponse {}
