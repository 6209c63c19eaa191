use std::io;
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::eval::Interpreter;
use crate::error::{ExecuteError, TransportError};
use crate::transport::{Request, Value};

/// Interpreter frames are deep; give the thread room for nested Yail.
const INTERPRETER_STACK_SIZE: usize = 16 * 1024 * 1024;

struct Job {
    request: Request,
    reply: oneshot::Sender<Result<Value, ExecuteError>>,
}

/// Cloneable handle to an interpreter running on its own thread.
///
/// Jobs are queued on a single channel and run one at a time, so requests
/// sent through the same handle execute in submission order.
#[derive(Clone, Debug)]
pub struct InterpreterHandle {
    sender: Sender<Job>,
}

impl InterpreterHandle {
    /// Starts a fresh interpreter. It stops once every handle is dropped.
    pub fn spawn() -> io::Result<Self> {
        let (sender, receiver) = unbounded();
        thread::Builder::new()
            .name("yail-interpreter".into())
            .stack_size(INTERPRETER_STACK_SIZE)
            .spawn(move || run(receiver))?;
        Ok(InterpreterHandle { sender })
    }

    pub async fn request(&self, request: Request) -> Result<Value, ExecuteError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Job { request, reply })
            .map_err(|_| TransportError::Disconnected)?;
        response.await.map_err(|_| TransportError::Disconnected)?
    }
}

fn run(jobs: Receiver<Job>) {
    info!("interpreter started");
    let mut interpreter = Interpreter::new();
    for Job { request, reply } in jobs.iter() {
        debug!("running {:?}", request);
        let result = interpreter.run(request).map_err(|e| {
            warn!("{}", e);
            ExecuteError::from(e)
        });
        // The requester may have timed out and gone away.
        let _ = reply.send(result);
    }
    info!("interpreter stopped");
}
