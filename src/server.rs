//! Companion REPL server: accepts framed requests over TCP and runs them
//! on one shared interpreter.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{self, BufReader, BufWriter};
use tokio::net::{TcpListener, TcpStream};
use tokio::{select, signal};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::dispatch::{DispatchBridge, DispatchEvent};
use crate::error::{DispatchError, ExecuteError, TransportError};
use crate::interpreter::InterpreterHandle;
use crate::transport::codec::{read_frame, write_frame};
use crate::transport::{CompanionRequest, CompanionResponse, LocalTransport, Request, Transport, Value};

pub struct CompanionServer {
    pub ip: String,
    pub port: u16,
    bridge: Arc<DispatchBridge<LocalTransport>>,
}

impl CompanionServer {
    /// Starts a fresh interpreter for the server. `timeout` bounds every
    /// request the server runs on it.
    pub fn new(ip: impl Into<String>, port: u16, timeout: Duration) -> io::Result<Self> {
        let transport = LocalTransport::new(InterpreterHandle::spawn()?, timeout);
        Ok(CompanionServer {
            ip: ip.into(),
            port,
            bridge: Arc::new(DispatchBridge::attached(transport)),
        })
    }

    /// Serves until Ctrl+C.
    pub async fn start(&self) -> io::Result<()> {
        let addr = format!("{}:{}", self.ip, self.port);
        let listener = TcpListener::bind(&addr).await?;
        info!("[+] Companion listening on {}", addr);
        self.serve(listener, async {
            if signal::ctrl_c().await.is_ok() {
                info!("[!] Ctrl+C received, shutting down companion...");
            }
        })
        .await
    }

    /// Accepts clients on `listener` until `shutdown` completes.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            select! {
                accepted = listener.accept() => {
                    let (socket, client_addr) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            error!("[!] Failed to accept connection: {}", e);
                            continue;
                        }
                    };
                    let session = Uuid::new_v4();
                    info!("[🔌] New connection from {} (session {})", client_addr, session);
                    let bridge = self.bridge.clone();
                    tokio::spawn(async move {
                        match process_client(socket, session, bridge).await {
                            Ok(()) => info!("[🔌] Session {} disconnected.", session),
                            Err(e) => error!("[!] Error handling session {}: {}", session, e),
                        }
                    });
                }
                _ = &mut shutdown => break,
            }
        }
        Ok(())
    }
}

async fn process_client(
    socket: TcpStream,
    session: Uuid,
    bridge: Arc<DispatchBridge<LocalTransport>>,
) -> io::Result<()> {
    socket.set_nodelay(true)?;
    let (reader, writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let mut writer = BufWriter::new(writer);

    while let Some(CompanionRequest { seq, request }) = read_frame(&mut reader).await? {
        debug!("request {} in session {}: {:?}", seq, session, request);
        let result = run(&bridge, request).await;
        write_frame(&mut writer, &CompanionResponse::from_result(seq, result)).await?;
    }
    Ok(())
}

async fn run(bridge: &DispatchBridge<LocalTransport>, request: Request) -> Result<Value, ExecuteError> {
    match request {
        Request::Raise {
            component,
            event,
            args,
        } => bridge
            .dispatch(DispatchEvent::new(component, event, args))
            .await
            .map(Value::Boolean)
            .map_err(|e| match e {
                DispatchError::Transport(e) => e.into(),
                DispatchError::NoInterpreter => TransportError::Disconnected.into(),
            }),
        request => match bridge.session() {
            Some(session) => session.request(request).await,
            None => Err(TransportError::Disconnected.into()),
        },
    }
}
