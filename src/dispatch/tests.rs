use std::sync::Mutex;
use std::time::Duration;

use super::*;
use crate::error::{InterpreterException, TransportError};
use crate::interpreter::InterpreterHandle;
use crate::transport::{LocalTransport, Request};

/// Answers every request with the same result and records what it saw.
struct Scripted {
    reply: Result<Value, ExecuteError>,
    seen: Mutex<Vec<Request>>,
}

impl Scripted {
    fn new(reply: Result<Value, ExecuteError>) -> Self {
        Scripted {
            reply,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl Transport for Scripted {
    async fn request(&self, request: Request) -> Result<Value, ExecuteError> {
        self.seen.lock().unwrap().push(request);
        self.reply.clone()
    }
}

fn click() -> DispatchEvent {
    DispatchEvent::new("Button1", "Click", vec![Value::Number(3.0)])
}

async fn dispatch_with(reply: Result<Value, ExecuteError>) -> Result<bool, DispatchError> {
    DispatchBridge::attached(Scripted::new(reply)).dispatch(click()).await
}

#[tokio::test]
async fn test_no_interpreter() {
    let bridge: DispatchBridge<Scripted> = DispatchBridge::new();
    assert!(!bridge.is_attached());
    assert_eq!(bridge.dispatch(click()).await, Err(DispatchError::NoInterpreter));
    assert!(!bridge.dispatch_event(Value::Null, "Button1", "Click", vec![]).await);
}

#[tokio::test]
async fn test_invokes_dispatch_event_with_packed_arguments() {
    let bridge = DispatchBridge::attached(Scripted::new(Ok(Value::Boolean(true))));
    assert_eq!(bridge.dispatch(click()).await, Ok(true));
    let Some(session) = bridge.session() else {
        panic!("bridge lost its session");
    };
    let seen = session.seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![Request::invoke(
            "dispatchEvent",
            vec![
                Value::Component("Button1".into()),
                Value::text("Button1"),
                Value::text("Click"),
                Value::List(vec![Value::Number(3.0)]),
            ]
        )]
    );
}

#[tokio::test]
async fn test_result_coercion() {
    assert_eq!(dispatch_with(Ok(Value::Boolean(true))).await, Ok(true));
    assert_eq!(dispatch_with(Ok(Value::Boolean(false))).await, Ok(false));
    assert_eq!(dispatch_with(Ok(Value::Number(1.0))).await, Ok(true));
    assert_eq!(dispatch_with(Ok(Value::Number(0.0))).await, Ok(false));
    assert_eq!(dispatch_with(Ok(Value::text("ok"))).await, Ok(false));
    assert_eq!(dispatch_with(Ok(Value::Null)).await, Ok(false));
}

#[tokio::test]
async fn test_exception_is_unhandled() {
    let exception = InterpreterException::new("unbound-variable", vec![Value::Symbol("g$x".into())]);
    assert_eq!(dispatch_with(Err(exception.into())).await, Ok(false));
}

#[tokio::test]
async fn test_transport_failure_is_an_error() {
    let result = dispatch_with(Err(TransportError::Disconnected.into())).await;
    assert_eq!(result, Err(DispatchError::Transport(TransportError::Disconnected)));

    let bridge = DispatchBridge::attached(Scripted::new(Err(TransportError::Disconnected.into())));
    assert!(!bridge.dispatch_event(Value::Null, "Button1", "Click", vec![]).await);
}

#[tokio::test]
async fn test_detach() {
    let bridge = DispatchBridge::attached(Scripted::new(Ok(Value::Boolean(true))));
    assert!(bridge.is_attached());
    bridge.detach();
    assert_eq!(bridge.dispatch(click()).await, Err(DispatchError::NoInterpreter));
}

#[tokio::test]
async fn test_runs_handler_in_interpreter() {
    let transport = LocalTransport::new(InterpreterHandle::spawn().unwrap(), Duration::from_secs(5));
    transport
        .execute_code(
            "(define-event Button1 Click($n)(set-this-form)\n    \
             (set-and-coerce-property! 'Label1 'Text (lexical-value $n) 'text))",
        )
        .await
        .unwrap();
    let bridge = DispatchBridge::attached(transport);
    assert_eq!(bridge.dispatch(click()).await, Ok(true));
    assert_eq!(
        bridge.dispatch(DispatchEvent::new("Button1", "LongClick", vec![])).await,
        Ok(false)
    );
    let Some(session) = bridge.session() else {
        panic!("bridge lost its session");
    };
    let label = session.execute_code("(get-property 'Label1 'Text)").await.unwrap();
    assert_eq!(label, Value::text("3"));
}
