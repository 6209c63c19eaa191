use std::sync::Arc;
use std::time::Duration;

use tokio::io::ErrorKind;
use tokio::net::TcpListener;

use super::codec::{COMPRESSED_FLAG, decode, encode, read_frame, write_frame};
use super::*;
use crate::error::{ExecuteError, InterpreterException, TransportError};
use crate::interpreter::InterpreterHandle;

fn header(frame: &[u8]) -> u32 {
    u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]])
}

fn invoke(seq: u64) -> CompanionRequest {
    CompanionRequest {
        seq,
        request: Request::invoke("p$inc", vec![Value::Number(1.0)]),
    }
}

#[test]
fn test_small_frames_are_not_compressed() {
    let frame = encode(&invoke(1)).unwrap();
    let header = header(&frame);
    assert_eq!(header & COMPRESSED_FLAG, 0);
    assert_eq!(header as usize, frame.len() - 4);
    let decoded: CompanionRequest = decode(&frame[4..], false).unwrap();
    assert_eq!(decoded, invoke(1));
}

#[test]
fn test_large_bundles_are_compressed() {
    let code = "(def g$x 0)\n".repeat(200);
    let message = CompanionRequest {
        seq: 7,
        request: Request::execute(code.clone()),
    };
    let frame = encode(&message).unwrap();
    let header = header(&frame);
    assert_ne!(header & COMPRESSED_FLAG, 0);
    assert!(frame.len() < code.len());
    let decoded: CompanionRequest = decode(&frame[4..], true).unwrap();
    assert_eq!(decoded, message);
}

#[test]
fn test_corrupt_payload_is_invalid_data() {
    let err = decode::<CompanionRequest>(&[0xc1, 0xc1], false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[tokio::test]
async fn test_write_frame_emits_one_frame() {
    let frame = encode(&invoke(3)).unwrap();
    let mut writer = tokio_test::io::Builder::new().write(&frame).build();
    write_frame(&mut writer, &invoke(3)).await.unwrap();
}

#[tokio::test]
async fn test_read_frame_then_clean_eof() {
    let frame = encode(&invoke(4)).unwrap();
    let mut reader = tokio_test::io::Builder::new().read(&frame).build();
    let first: Option<CompanionRequest> = read_frame(&mut reader).await.unwrap();
    assert_eq!(first, Some(invoke(4)));
    let second: Option<CompanionRequest> = read_frame(&mut reader).await.unwrap();
    assert_eq!(second, None);
}

#[tokio::test]
async fn test_read_frame_rejects_zero_length() {
    let mut reader = tokio_test::io::Builder::new().read(&[0, 0, 0, 0]).build();
    let err = read_frame::<_, CompanionRequest>(&mut reader).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[tokio::test]
async fn test_read_frame_rejects_oversized_frames() {
    let mut reader = tokio_test::io::Builder::new()
        .read(&0x7FFF_FFFFu32.to_be_bytes())
        .build();
    let err = read_frame::<_, CompanionRequest>(&mut reader).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[tokio::test]
async fn test_truncated_payload_is_an_error() {
    let frame = encode(&invoke(5)).unwrap();
    let mut reader = tokio_test::io::Builder::new()
        .read(&frame[..frame.len() - 1])
        .build();
    let err = read_frame::<_, CompanionRequest>(&mut reader).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}

#[test]
fn test_response_from_result() {
    let ok = CompanionResponse::from_result(1, Ok(Value::Number(2.0)));
    assert_eq!(ok.seq(), 1);
    assert_eq!(ok.into_result(), Ok(Value::Number(2.0)));

    let exception = InterpreterException::new("divide-by-zero", vec![]);
    let raised = CompanionResponse::from_result(2, Err(exception.clone().into()));
    assert_eq!(raised.seq(), 2);
    assert_eq!(raised.into_result(), Err(ExecuteError::Interpreter(exception)));

    let failed = CompanionResponse::from_result(3, Err(TransportError::Disconnected.into()));
    assert!(matches!(
        failed.into_result(),
        Err(ExecuteError::Transport(TransportError::Io(_)))
    ));
}

#[test]
fn test_value_display() {
    assert_eq!(Value::Null.to_string(), "*nothing*");
    assert_eq!(Value::Number(3.0).to_string(), "3");
    assert_eq!(Value::Number(2.5).to_string(), "2.5");
    assert_eq!(
        Value::List(vec![Value::Boolean(true), Value::text("a")]).to_string(),
        "(true a)"
    );
}

fn local() -> LocalTransport {
    LocalTransport::new(InterpreterHandle::spawn().unwrap(), Duration::from_secs(5))
}

#[tokio::test]
async fn test_local_transport_keeps_state_between_requests() {
    let transport = Arc::new(local());
    transport
        .execute_code("(def (p$inc $x) (call-yail-primitive + (*list-for-runtime* (lexical-value $x) 1) '(number number) \"+\"))")
        .await
        .unwrap();
    let value = transport.invoke("inc", vec![Value::Number(41.0)]).await.unwrap();
    assert_eq!(value, Value::Number(42.0));
}

#[tokio::test]
async fn test_local_transport_times_out() {
    let transport = LocalTransport::new(InterpreterHandle::spawn().unwrap(), Duration::from_millis(50));
    let result = transport.execute_code("(while #t (begin))").await;
    assert_eq!(
        result,
        Err(ExecuteError::Transport(TransportError::Timeout(Duration::from_millis(50))))
    );
}

/// Answers each request with a canned response after `delay`.
async fn fake_companion(replies: Vec<(Duration, CompanionResponse)>) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        for (delay, reply) in replies {
            let request: Option<CompanionRequest> = read_frame(&mut socket).await.unwrap();
            if request.is_none() {
                return;
            }
            tokio::time::sleep(delay).await;
            write_frame(&mut socket, &reply).await.unwrap();
        }
        // keep the socket open until the client is done
        let _: Option<CompanionRequest> = read_frame(&mut socket).await.unwrap_or(None);
    });
    addr
}

#[tokio::test]
async fn test_client_round_trip() {
    let addr = fake_companion(vec![(
        Duration::ZERO,
        CompanionResponse::Value {
            seq: 1,
            value: Value::Boolean(true),
        },
    )])
    .await;
    let client = CompanionClient::connect(addr, Duration::from_secs(5)).await.unwrap();
    assert_eq!(client.execute_code("#t").await, Ok(Value::Boolean(true)));
}

#[tokio::test]
async fn test_client_skips_late_replies() {
    let addr = fake_companion(vec![
        (
            Duration::from_millis(750),
            CompanionResponse::Value {
                seq: 1,
                value: Value::text("late"),
            },
        ),
        (
            Duration::ZERO,
            CompanionResponse::Value {
                seq: 2,
                value: Value::text("fresh"),
            },
        ),
    ])
    .await;
    let client = CompanionClient::connect(addr, Duration::from_millis(500)).await.unwrap();
    let first = client.execute_code("1").await;
    assert!(matches!(first, Err(ExecuteError::Transport(TransportError::Timeout(_)))));
    // the reply to the first request arrives while the second is pending
    assert_eq!(client.execute_code("2").await, Ok(Value::text("fresh")));
}

#[tokio::test]
async fn test_client_reports_disconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        drop(socket);
    });
    let client = CompanionClient::connect(addr, Duration::from_secs(5)).await.unwrap();
    let result = client.execute_code("1").await;
    assert!(matches!(result, Err(ExecuteError::Transport(_))));
}
