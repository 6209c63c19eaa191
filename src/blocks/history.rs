use super::{Block, BlockId, Slot};

/// Primitive, invertible graph operation. Every workspace mutation is
/// recorded as a sequence of these.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Op {
    /// Insert a detached block (no parent, no children).
    Create(Block),
    /// Remove a detached block.
    Destroy(Block),
    InsertRoot { block: BlockId, index: usize },
    RemoveRoot { block: BlockId, index: usize },
    Link { parent: BlockId, slot: Slot, child: BlockId },
    Unlink { parent: BlockId, slot: Slot, child: BlockId },
    SetField {
        block: BlockId,
        name: String,
        old: String,
        new: String,
    },
}

impl Op {
    pub(crate) fn inverse(&self) -> Op {
        match self {
            Op::Create(block) => Op::Destroy(block.clone()),
            Op::Destroy(block) => Op::Create(block.clone()),
            Op::InsertRoot { block, index } => Op::RemoveRoot {
                block: *block,
                index: *index,
            },
            Op::RemoveRoot { block, index } => Op::InsertRoot {
                block: *block,
                index: *index,
            },
            Op::Link { parent, slot, child } => Op::Unlink {
                parent: *parent,
                slot: slot.clone(),
                child: *child,
            },
            Op::Unlink { parent, slot, child } => Op::Link {
                parent: *parent,
                slot: slot.clone(),
                child: *child,
            },
            Op::SetField {
                block,
                name,
                old,
                new,
            } => Op::SetField {
                block: *block,
                name: name.clone(),
                old: new.clone(),
                new: old.clone(),
            },
        }
    }
}

/// One user-visible mutation: replayed forward on redo, backward on undo.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Delta {
    pub(crate) ops: Vec<Op>,
}

impl Delta {
    pub(crate) fn inverse(&self) -> impl Iterator<Item = Op> + '_ {
        self.ops.iter().rev().map(Op::inverse)
    }
}

/// Undo and redo stacks. Recording a new delta clears the redo stack.
#[derive(Debug, Clone, Default)]
pub(crate) struct History {
    undo: Vec<Delta>,
    redo: Vec<Delta>,
}

impl History {
    pub(crate) fn record(&mut self, delta: Delta) {
        if delta.ops.is_empty() {
            return;
        }
        self.undo.push(delta);
        self.redo.clear();
    }

    pub(crate) fn take_undo(&mut self) -> Option<Delta> {
        self.undo.pop()
    }

    pub(crate) fn take_redo(&mut self) -> Option<Delta> {
        self.redo.pop()
    }

    pub(crate) fn push_undo(&mut self, delta: Delta) {
        self.undo.push(delta);
    }

    pub(crate) fn push_redo(&mut self, delta: Delta) {
        self.redo.push(delta);
    }

    pub(crate) fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub(crate) fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
