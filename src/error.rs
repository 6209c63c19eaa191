//! Error taxonomy shared by the editor, compiler, transport and bridge.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::blocks::{BlockId, Slot};
use crate::compiler::Warning;
use crate::transport::Value;

/// A rejected block graph mutation. The graph is left unchanged.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("cannot connect {target} to {slot} of {owner}: {reason}")]
    ConnectionType {
        owner: BlockId,
        slot: Slot,
        target: BlockId,
        reason: String,
    },

    #[error("connecting {target} under {owner} would create a cycle")]
    Cycle { owner: BlockId, target: BlockId },

    #[error("block {0} not found")]
    UnknownBlock(BlockId),

    #[error("unknown block type '{0}'")]
    UnknownBlockType(String),

    #[error("block {block} has no input '{input}'")]
    UnknownInput { block: BlockId, input: String },

    #[error("block {block} has no field '{field}'")]
    UnknownField { block: BlockId, field: String },

    #[error("another mutation is still being validated")]
    Busy,

    #[error("mutation rejected: {0}")]
    Rejected(String),

    #[error("the workspace changed while the deletion was being confirmed")]
    Stale,

    #[error("{requested} items exceed the limit of {limit}")]
    TooManyItems { requested: usize, limit: usize },

    #[error("'{value}' is not a valid name for field '{field}'")]
    InvalidName { field: String, value: String },
}

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("invalid workspace document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Strict assembly refused to emit a bundle.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("cannot assemble bundle: {} incomplete block(s)", warnings.len())]
pub struct AssemblyError {
    pub warnings: Vec<Warning>,
}

/// The channel to the interpreter failed. Transient, the caller may retry.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("no response from companion within {0:?}")]
    Timeout(Duration),

    #[error("companion connection closed")]
    Disconnected,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("codec error: {0}")]
    Codec(String),
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::NotConnected => TransportError::Disconnected,
            std::io::ErrorKind::InvalidData => TransportError::Codec(e.to_string()),
            _ => TransportError::Io(e.to_string()),
        }
    }
}

/// A structured failure raised by the interpreter while running code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{name} (irritants: {irritants:?})")]
pub struct InterpreterException {
    pub name: String,
    pub irritants: Vec<Value>,
}

impl InterpreterException {
    pub fn new(name: impl Into<String>, irritants: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            irritants,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExecuteError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("interpreter exception: {0}")]
    Interpreter(#[from] InterpreterException),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("no interpreter session attached")]
    NoInterpreter,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("a generator rule for '{0}' is already registered")]
    Duplicate(String),
}
