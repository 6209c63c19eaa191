use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a block inside one workspace. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// A connection point owned by a block that can hold one child.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Input(String),
    Next,
}

impl Slot {
    pub fn input(name: impl Into<String>) -> Self {
        Slot::Input(name.into())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Input(name) => write!(f, "input '{}'", name),
            Slot::Next => write!(f, "next"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    /// Holds one expression block (plugged into the block's output).
    Value,
    /// Holds the head of a chain of statement blocks.
    Statement,
}

/// Type check attached to a connection. `None` accepts anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check(Option<Vec<String>>);

impl Check {
    pub fn any() -> Self {
        Check(None)
    }

    pub fn of(types: &[&str]) -> Self {
        Check(Some(types.iter().map(|t| t.to_string()).collect()))
    }

    /// Two checks are compatible when either side is unchecked or
    /// they share at least one type.
    pub fn compatible(&self, other: &Check) -> bool {
        match (&self.0, &other.0) {
            (None, _) | (_, None) => true,
            (Some(a), Some(b)) => a.iter().any(|t| b.contains(t)),
        }
    }

    pub fn first(&self) -> Option<&str> {
        self.0.as_ref().and_then(|types| types.first()).map(String::as_str)
    }

    pub fn types(&self) -> Option<&[String]> {
        self.0.as_deref()
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => write!(f, "any"),
            Some(types) => write!(f, "{}", types.join("|")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub name: String,
    pub kind: InputKind,
    pub check: Check,
    /// An empty required value input makes the owning root warning-bearing.
    pub required: bool,
    pub(crate) target: Option<BlockId>,
}

impl Input {
    pub fn target(&self) -> Option<BlockId> {
        self.target
    }
}

/// One node of the block graph.
///
/// A block's shape (inputs, connection checks, field names) is fixed at
/// creation from its [`BlockShape`](super::BlockShape); only field values
/// and connections change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub(crate) id: BlockId,
    pub(crate) block_type: String,
    pub(crate) fields: BTreeMap<String, String>,
    pub(crate) inputs: Vec<Input>,
    pub(crate) output: Option<Check>,
    pub(crate) previous: Option<Check>,
    pub(crate) has_next: bool,
    pub(crate) next: Option<BlockId>,
    pub(crate) parent: Option<(BlockId, Slot)>,
    pub(crate) items: usize,
}

impl Block {
    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.iter().find(|i| i.name == name)
    }

    pub fn input_target(&self, name: &str) -> Option<BlockId> {
        self.input(name).and_then(|i| i.target)
    }

    /// Output check, present only for value-producing blocks.
    pub fn output(&self) -> Option<&Check> {
        self.output.as_ref()
    }

    /// Previous-connection check, present only for statement blocks.
    pub fn previous(&self) -> Option<&Check> {
        self.previous.as_ref()
    }

    pub fn has_next_slot(&self) -> bool {
        self.has_next
    }

    pub fn next(&self) -> Option<BlockId> {
        self.next
    }

    pub fn parent(&self) -> Option<&(BlockId, Slot)> {
        self.parent.as_ref()
    }

    /// Number of variadic items this block was created with.
    pub fn items(&self) -> usize {
        self.items
    }

    pub fn is_value(&self) -> bool {
        self.output.is_some()
    }

    pub fn is_statement(&self) -> bool {
        self.previous.is_some()
    }

    /// Blocks with neither an output nor a previous connection can only
    /// live at the top level (definitions and event handlers).
    pub fn is_top_level(&self) -> bool {
        self.output.is_none() && self.previous.is_none()
    }

    pub(crate) fn slot_target(&self, slot: &Slot) -> Option<BlockId> {
        match slot {
            Slot::Next => self.next,
            Slot::Input(name) => self.input_target(name),
        }
    }

    pub(crate) fn set_slot_target(&mut self, slot: &Slot, target: Option<BlockId>) {
        match slot {
            Slot::Next => self.next = target,
            Slot::Input(name) => {
                if let Some(input) = self.inputs.iter_mut().find(|i| &i.name == name) {
                    input.target = target;
                }
            }
        }
    }

    /// Connected children in document order: inputs as declared, then `next`.
    pub fn children(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.inputs
            .iter()
            .filter_map(|i| i.target)
            .chain(self.next)
    }
}
