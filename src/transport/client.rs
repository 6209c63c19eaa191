//! TCP client for a companion's REPL server.

use std::time::Duration;

use tokio::io::{BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::codec::{read_frame, write_frame};
use super::{CompanionRequest, CompanionResponse, Request, Transport, Value};
use crate::error::{ExecuteError, TransportError};

const QUEUE_DEPTH: usize = 64;

struct Job {
    request: Request,
    reply: oneshot::Sender<Result<Value, ExecuteError>>,
}

/// Handle to one companion connection.
///
/// Requests are queued and run strictly one at a time, in submission order,
/// by a background task owning the socket. Cloning the handle shares the
/// connection.
#[derive(Debug, Clone)]
pub struct CompanionClient {
    jobs: mpsc::Sender<Job>,
    timeout: Duration,
}

impl CompanionClient {
    /// Connects to `addr` and spawns the connection task. `timeout` bounds
    /// both the connection attempt and every later request.
    pub async fn connect<A: ToSocketAddrs>(addr: A, timeout: Duration) -> Result<Self, TransportError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| TransportError::Timeout(timeout))??;
        stream.set_nodelay(true)?;
        if let Ok(peer) = stream.peer_addr() {
            debug!("connected to companion at {}", peer);
        }
        let (reader, writer) = stream.into_split();
        let (responses_tx, responses_rx) = mpsc::channel(QUEUE_DEPTH);
        let (jobs_tx, jobs_rx) = mpsc::channel(QUEUE_DEPTH);
        tokio::spawn(read_responses(reader, responses_tx));
        tokio::spawn(run_jobs(writer, jobs_rx, responses_rx, timeout));
        Ok(CompanionClient {
            jobs: jobs_tx,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_closed(&self) -> bool {
        self.jobs.is_closed()
    }
}

impl Transport for CompanionClient {
    async fn request(&self, request: Request) -> Result<Value, ExecuteError> {
        let (reply, answer) = oneshot::channel();
        self.jobs
            .send(Job { request, reply })
            .await
            .map_err(|_| TransportError::Disconnected)?;
        match tokio::time::timeout(self.timeout, answer).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(TransportError::Disconnected.into()),
            Err(_) => Err(TransportError::Timeout(self.timeout).into()),
        }
    }
}

/// Forwards every decoded response until the socket closes.
async fn read_responses(reader: OwnedReadHalf, responses: mpsc::Sender<CompanionResponse>) {
    let mut reader = BufReader::new(reader);
    loop {
        match read_frame::<_, CompanionResponse>(&mut reader).await {
            Ok(Some(response)) => {
                if responses.send(response).await.is_err() {
                    break;
                }
            }
            Ok(None) => {
                debug!("companion closed the connection");
                break;
            }
            Err(e) => {
                warn!("failed to read companion response: {}", e);
                break;
            }
        }
    }
}

/// Sends queued requests one at a time and matches each with its reply.
///
/// A request that times out has already been sent, so its reply may still
/// arrive later. Such replies carry an older `seq` and are skipped.
async fn run_jobs(
    writer: OwnedWriteHalf,
    mut jobs: mpsc::Receiver<Job>,
    mut responses: mpsc::Receiver<CompanionResponse>,
    timeout: Duration,
) {
    let mut writer = BufWriter::new(writer);
    let mut seq: u64 = 0;
    while let Some(job) = jobs.recv().await {
        seq += 1;
        let frame = CompanionRequest {
            seq,
            request: job.request,
        };
        if let Err(e) = write_frame(&mut writer, &frame).await {
            warn!("failed to send request {}: {}", seq, e);
            let _ = job.reply.send(Err(TransportError::from(e).into()));
            break;
        }

        let deadline = Instant::now() + timeout;
        let outcome = loop {
            match tokio::time::timeout_at(deadline, responses.recv()).await {
                Err(_) => break Err(TransportError::Timeout(timeout).into()),
                Ok(None) => break Err(TransportError::Disconnected.into()),
                Ok(Some(response)) if response.seq() < seq => {
                    debug!("discarding late reply to request {}", response.seq());
                }
                Ok(Some(response)) => break response.into_result(),
            }
        };
        let disconnected = matches!(outcome, Err(ExecuteError::Transport(TransportError::Disconnected)));
        // the caller may have given up already
        let _ = job.reply.send(outcome);
        if disconnected {
            break;
        }
    }
}
