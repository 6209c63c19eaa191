//! The form: every component of the running app, modelled as a property
//! bag that also records method calls.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use crate::transport::Value;

/// Method calls kept per component. Older ones are dropped first.
pub const MAX_RECORDED_CALLS: usize = 64;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Component {
    pub properties: BTreeMap<String, Value>,
    /// Most recent method calls, oldest first.
    pub calls: VecDeque<(String, Vec<Value>)>,
}

#[derive(Debug, Clone, Default)]
pub struct Form {
    components: BTreeMap<String, Component>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Components come into existence the first time they are touched.
    pub fn component(&mut self, name: &str) -> &mut Component {
        self.components.entry(name.to_string()).or_default()
    }

    pub fn get(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    pub fn set_property(&mut self, component: &str, property: &str, value: Value) {
        debug!("{}.{} = {}", component, property, value);
        self.component(component).properties.insert(property.to_string(), value);
    }

    pub fn property(&self, component: &str, property: &str) -> Option<&Value> {
        self.components.get(component)?.properties.get(property)
    }

    pub fn call_method(&mut self, component: &str, method: &str, args: Vec<Value>) {
        debug!("{}.{}({} args)", component, method, args.len());
        let calls = &mut self.component(component).calls;
        if calls.len() == MAX_RECORDED_CALLS {
            calls.pop_front();
        }
        calls.push_back((method.to_string(), args));
    }

    /// Hands over the recorded calls of `component`, oldest first.
    pub fn take_calls(&mut self, component: &str) -> Vec<(String, Vec<Value>)> {
        self.components
            .get_mut(component)
            .map(|c| c.calls.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }
}
