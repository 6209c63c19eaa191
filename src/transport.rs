//! Shipping Yail to an interpreter and getting results back.
//!
//! [`Transport`] is the seam: [`CompanionClient`] talks to a companion over
//! TCP, [`LocalTransport`] talks to an in-process interpreter thread.

use std::future::Future;
use std::sync::Arc;

mod value;
pub use value::Value;

pub mod message;
pub use message::{CompanionRequest, CompanionResponse, Request};

pub mod codec;
pub use codec::{CompressionStrategy, Framed};

mod client;
pub use client::CompanionClient;

mod local;
pub use local::LocalTransport;

use crate::compiler::CodeBundle;
use crate::error::ExecuteError;

/// An ordered channel to one interpreter session.
///
/// Requests issued one after another through the same transport are
/// executed by the interpreter in that order.
pub trait Transport: Send + Sync {
    fn request(&self, request: Request) -> impl Future<Output = Result<Value, ExecuteError>> + Send;

    fn execute_code(&self, code: &str) -> impl Future<Output = Result<Value, ExecuteError>> + Send {
        self.request(Request::execute(code))
    }

    /// Runs a whole bundle: definitions are in place before any handler.
    fn execute(&self, bundle: &CodeBundle) -> impl Future<Output = Result<Value, ExecuteError>> + Send {
        self.request(Request::execute(bundle.text()))
    }

    fn invoke(&self, procedure: &str, args: Vec<Value>) -> impl Future<Output = Result<Value, ExecuteError>> + Send {
        self.request(Request::invoke(procedure, args))
    }
}

impl<T: Transport> Transport for Arc<T> {
    fn request(&self, request: Request) -> impl Future<Output = Result<Value, ExecuteError>> + Send {
        (**self).request(request)
    }
}

#[cfg(test)]
mod tests;
