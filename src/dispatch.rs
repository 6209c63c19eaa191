//! Routes runtime events raised by native components into the Yail
//! `dispatchEvent` procedure of the attached interpreter session.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, warn};

use crate::error::{DispatchError, ExecuteError};
use crate::transport::{Transport, Value};

/// Name of the interpreter entry point every event goes through.
pub const DISPATCH_PROCEDURE: &str = "dispatchEvent";

/// One component callback. Consumed by a single dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchEvent {
    pub component: Value,
    pub component_name: String,
    pub event_name: String,
    pub args: Vec<Value>,
}

impl DispatchEvent {
    pub fn new(component_name: impl Into<String>, event_name: impl Into<String>, args: Vec<Value>) -> Self {
        let component_name = component_name.into();
        DispatchEvent {
            component: Value::Component(component_name.clone()),
            component_name,
            event_name: event_name.into(),
            args,
        }
    }
}

/// `#t` means a handler ran. Numbers count as true when non-zero and
/// anything else as false.
pub fn coerce_handled(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0,
        _ => false,
    }
}

pub struct DispatchBridge<T> {
    session: Mutex<Option<Arc<T>>>,
}

impl<T> Default for DispatchBridge<T> {
    fn default() -> Self {
        DispatchBridge {
            session: Mutex::new(None),
        }
    }
}

impl<T: Transport> DispatchBridge<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridge already attached to `session`.
    pub fn attached(session: T) -> Self {
        let bridge = Self::new();
        bridge.attach(session);
        bridge
    }

    /// Routes later events to `session`, replacing any previous one.
    pub fn attach(&self, session: T) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(session));
    }

    pub fn detach(&self) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_attached(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The attached session, if any.
    pub fn session(&self) -> Option<Arc<T>> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Hands `event` to the interpreter. `Ok(true)` when a handler ran.
    ///
    /// Interpreter exceptions are logged and reported as unhandled; only
    /// a missing session or a failed transport is an error.
    pub async fn dispatch(&self, event: DispatchEvent) -> Result<bool, DispatchError> {
        let Some(session) = self.session() else {
            warn!(
                "dropping {}.{}: no interpreter attached",
                event.component_name, event.event_name
            );
            return Err(DispatchError::NoInterpreter);
        };
        debug!("dispatching {}.{}", event.component_name, event.event_name);
        let DispatchEvent {
            component,
            component_name,
            event_name,
            args,
        } = event;
        let args = vec![
            component,
            Value::Text(component_name.clone()),
            Value::Text(event_name.clone()),
            Value::List(args),
        ];
        match session.invoke(DISPATCH_PROCEDURE, args).await {
            Ok(value) => Ok(coerce_handled(&value)),
            Err(ExecuteError::Interpreter(exception)) => {
                error!(
                    "{}.{} raised {} with irritants {:?}",
                    component_name, event_name, exception.name, exception.irritants
                );
                Ok(false)
            }
            Err(ExecuteError::Transport(e)) => Err(DispatchError::Transport(e)),
        }
    }

    /// Entry point for native components. Any failure counts as unhandled.
    pub async fn dispatch_event(
        &self,
        component: Value,
        component_name: &str,
        event_name: &str,
        args: Vec<Value>,
    ) -> bool {
        let event = DispatchEvent {
            component,
            component_name: component_name.to_string(),
            event_name: event_name.to_string(),
            args,
        };
        match self.dispatch(event).await {
            Ok(handled) => handled,
            Err(DispatchError::NoInterpreter) => false,
            Err(e) => {
                warn!("dispatch of {}.{} failed: {}", component_name, event_name, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests;
