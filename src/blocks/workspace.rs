use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::history::{Delta, History, Op};
use super::{Block, BlockCatalog, BlockId, BlockShape, Check, Descendants, FieldKind, InputKind, MAX_ITEMS, Slot};
use crate::error::GraphError;

/// Owns every block of one editing session, the ordered list of root
/// blocks and the undo/redo history.
///
/// Every mutation validates first and only then applies its operations,
/// so a rejected mutation leaves the graph untouched.
#[derive(Debug, Clone)]
pub struct Workspace {
    catalog: Arc<BlockCatalog>,
    blocks: BTreeMap<BlockId, Block>,
    roots: Vec<BlockId>,
    next_id: u64,
    history: History,
    revision: u64,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Arc::new(BlockCatalog::builtin()))
    }
}

impl Workspace {
    pub fn new(catalog: Arc<BlockCatalog>) -> Self {
        Workspace {
            catalog,
            blocks: BTreeMap::new(),
            roots: Vec::new(),
            next_id: 1,
            history: History::default(),
            revision: 0,
        }
    }

    pub fn catalog(&self) -> &Arc<BlockCatalog> {
        &self.catalog
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    pub fn roots(&self) -> &[BlockId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn all_blocks(&self) -> Descendants<'_> {
        Descendants::new(self, &self.roots)
    }

    /// `block` and everything below it, including its `next` chain.
    /// Empty when the block does not exist.
    pub fn descendants(&self, block: BlockId) -> Descendants<'_> {
        Descendants::new(self, &[block])
    }

    /// Last block of the `next` chain starting at `block`.
    pub fn chain_tail(&self, block: BlockId) -> BlockId {
        let mut current = block;
        while let Some(next) = self.blocks.get(&current).and_then(|b| b.next) {
            current = next;
        }
        current
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Bumped by every change to the graph, including undo and redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn create_block(&mut self, block_type: &str) -> Result<BlockId, GraphError> {
        let items = self
            .catalog
            .get(block_type)
            .map(BlockShape::default_items)
            .unwrap_or(0);
        self.create_block_with_items(block_type, items)
    }

    /// Creates a new root block. `items` sets the number of variadic
    /// inputs, at most [`MAX_ITEMS`], and is ignored for fixed-shape types.
    pub fn create_block_with_items(
        &mut self,
        block_type: &str,
        items: usize,
    ) -> Result<BlockId, GraphError> {
        let shape = self
            .catalog
            .get(block_type)
            .ok_or_else(|| GraphError::UnknownBlockType(block_type.to_string()))?;
        if shape.items.is_some() && items > MAX_ITEMS {
            return Err(GraphError::TooManyItems {
                requested: items,
                limit: MAX_ITEMS,
            });
        }
        let id = BlockId(self.next_id);
        let block = shape.instantiate(id, block_type, items);
        self.next_id += 1;

        let mut ops = Vec::new();
        self.push(&mut ops, Op::Create(block));
        let index = self.roots.len();
        self.push(&mut ops, Op::InsertRoot { block: id, index });
        self.commit(ops);
        debug!("created {} ({})", id, block_type);
        Ok(id)
    }

    /// Fields that become symbols in generated code only take names.
    pub fn set_field(&mut self, block: BlockId, name: &str, value: &str) -> Result<(), GraphError> {
        let current = self.get(block)?;
        let old = current
            .fields
            .get(name)
            .cloned()
            .ok_or_else(|| GraphError::UnknownField {
                block,
                field: name.to_string(),
            })?;
        let kind = self
            .catalog
            .get(current.block_type())
            .map(|shape| shape.field_kind(name))
            .unwrap_or(FieldKind::Text);
        if !kind.accepts(value) {
            return Err(GraphError::InvalidName {
                field: name.to_string(),
                value: value.to_string(),
            });
        }
        if old == value {
            return Ok(());
        }
        let mut ops = Vec::new();
        self.push(
            &mut ops,
            Op::SetField {
                block,
                name: name.to_string(),
                old,
                new: value.to_string(),
            },
        );
        self.commit(ops);
        Ok(())
    }

    /// Plugs `target` into `slot` of `owner`.
    ///
    /// A target that already has a parent is moved. An occupied slot
    /// bumps its occupant to the roots, except for statement slots where
    /// the occupant is re-attached below the incoming chain when it fits.
    pub fn connect(&mut self, owner: BlockId, slot: Slot, target: BlockId) -> Result<(), GraphError> {
        self.check_connection(owner, &slot, target)?;
        let owner_block = self.get(owner)?;
        let occupant = owner_block.slot_target(&slot);
        if occupant == Some(target) {
            return Ok(());
        }
        let splice = match &slot {
            Slot::Next => true,
            Slot::Input(name) => owner_block
                .input(name)
                .is_some_and(|i| i.kind == InputKind::Statement),
        };

        let mut ops = Vec::new();
        self.detach(&mut ops, target);
        if let Some(old) = occupant {
            self.detach(&mut ops, old);
        }
        self.attach(&mut ops, owner, slot, target);
        if let (Some(old), true) = (occupant, splice) {
            let tail = self.chain_tail(target);
            if self.check_connection(tail, &Slot::Next, old).is_ok() {
                self.attach(&mut ops, tail, Slot::Next, old);
            }
        }
        self.commit(ops);
        Ok(())
    }

    /// Detaches whatever occupies `slot` of `owner` and makes it the last
    /// root. Returns `None` when there was nothing to detach.
    pub fn disconnect(&mut self, owner: BlockId, slot: &Slot) -> Option<BlockId> {
        let child = self.blocks.get(&owner)?.slot_target(slot)?;
        let mut ops = Vec::new();
        self.detach(&mut ops, child);
        self.commit(ops);
        Some(child)
    }

    /// Removes `block` and every block in its inputs. Returns the removed
    /// ids in document order.
    ///
    /// The `next` follower survives: with `heal_stack` it takes the deleted
    /// block's place when that slot accepts it, otherwise it becomes a root.
    pub fn delete(&mut self, block: BlockId, heal_stack: bool) -> Result<Vec<BlockId>, GraphError> {
        let target = self.get(block)?;
        let parent = target.parent.clone();
        let follower = target.next;

        let mut ops = Vec::new();
        if let Some(follower) = follower {
            self.detach(&mut ops, follower);
        }
        let doomed: Vec<BlockId> = self.descendants(block).collect();
        for id in doomed.iter().rev() {
            self.destroy(&mut ops, *id);
        }
        if let (true, Some(follower), Some((owner, slot))) = (heal_stack, follower, parent) {
            if self.check_connection(owner, &slot, follower).is_ok() {
                self.attach(&mut ops, owner, slot, follower);
            }
        }
        self.commit(ops);
        debug!("deleted {} block(s) starting at {}", doomed.len(), block);
        Ok(doomed)
    }

    /// Deletes every block as a single undoable step.
    pub fn clear(&mut self) -> Vec<BlockId> {
        let doomed: Vec<BlockId> = self.all_blocks().collect();
        let mut ops = Vec::new();
        for id in doomed.iter().rev() {
            self.destroy(&mut ops, *id);
        }
        self.commit(ops);
        doomed
    }

    pub fn undo(&mut self) -> bool {
        let Some(delta) = self.history.take_undo() else {
            return false;
        };
        for op in delta.inverse() {
            self.apply(&op);
        }
        self.history.push_redo(delta);
        self.revision += 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(delta) = self.history.take_redo() else {
            return false;
        };
        for op in &delta.ops {
            self.apply(op);
        }
        self.history.push_undo(delta);
        self.revision += 1;
        true
    }

    /// Reverts the latest mutation without making it redoable.
    pub(crate) fn rollback(&mut self) -> bool {
        let Some(delta) = self.history.take_undo() else {
            return false;
        };
        for op in delta.inverse() {
            self.apply(&op);
        }
        self.revision += 1;
        true
    }

    /// Checks that `target` may be plugged into `slot` of `owner` without
    /// touching the graph.
    pub fn check_connection(&self, owner: BlockId, slot: &Slot, target: BlockId) -> Result<(), GraphError> {
        let owner_block = self.get(owner)?;
        let target_block = self.get(target)?;
        let reject = |reason: String| GraphError::ConnectionType {
            owner,
            slot: slot.clone(),
            target,
            reason,
        };

        let (slot_check, wants_output) = match slot {
            Slot::Next => {
                if !owner_block.has_next {
                    return Err(reject(format!("{} has no next connection", owner_block.block_type)));
                }
                (Check::any(), false)
            }
            Slot::Input(name) => {
                let input = owner_block.input(name).ok_or_else(|| GraphError::UnknownInput {
                    block: owner,
                    input: name.clone(),
                })?;
                (input.check.clone(), input.kind == InputKind::Value)
            }
        };
        let target_check = if wants_output {
            target_block
                .output()
                .ok_or_else(|| reject(format!("{} has no output", target_block.block_type)))?
        } else {
            target_block
                .previous()
                .ok_or_else(|| reject(format!("{} is not a statement", target_block.block_type)))?
        };
        if !slot_check.compatible(target_check) {
            return Err(reject(format!("expected {}, got {}", slot_check, target_check)));
        }
        if target == owner || self.is_ancestor(target, owner) {
            return Err(GraphError::Cycle { owner, target });
        }
        Ok(())
    }

    fn is_ancestor(&self, candidate: BlockId, of: BlockId) -> bool {
        let mut current = self.blocks.get(&of).and_then(|b| b.parent.as_ref()).map(|(p, _)| *p);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.blocks.get(&id).and_then(|b| b.parent.as_ref()).map(|(p, _)| *p);
        }
        false
    }

    pub(crate) fn get(&self, id: BlockId) -> Result<&Block, GraphError> {
        self.blocks.get(&id).ok_or(GraphError::UnknownBlock(id))
    }

    fn push(&mut self, ops: &mut Vec<Op>, op: Op) {
        self.apply(&op);
        ops.push(op);
    }

    fn commit(&mut self, ops: Vec<Op>) {
        if !ops.is_empty() {
            self.revision += 1;
        }
        self.history.record(Delta { ops });
    }

    fn root_index(&self, id: BlockId) -> Option<usize> {
        self.roots.iter().position(|r| *r == id)
    }

    /// Unlinks `id` from its parent and appends it to the roots.
    fn detach(&mut self, ops: &mut Vec<Op>, id: BlockId) {
        let Some((parent, slot)) = self.blocks.get(&id).and_then(|b| b.parent.clone()) else {
            return;
        };
        self.push(ops, Op::Unlink { parent, slot, child: id });
        let index = self.roots.len();
        self.push(ops, Op::InsertRoot { block: id, index });
    }

    /// Links the root `child` under `parent`.
    fn attach(&mut self, ops: &mut Vec<Op>, parent: BlockId, slot: Slot, child: BlockId) {
        if let Some(index) = self.root_index(child) {
            self.push(ops, Op::RemoveRoot { block: child, index });
        }
        self.push(ops, Op::Link { parent, slot, child });
    }

    /// Children must already be gone.
    fn destroy(&mut self, ops: &mut Vec<Op>, id: BlockId) {
        let parent = self.blocks.get(&id).and_then(|b| b.parent.clone());
        match parent {
            Some((parent, slot)) => self.push(ops, Op::Unlink { parent, slot, child: id }),
            None => {
                if let Some(index) = self.root_index(id) {
                    self.push(ops, Op::RemoveRoot { block: id, index });
                }
            }
        }
        if let Some(snapshot) = self.blocks.get(&id).cloned() {
            self.push(ops, Op::Destroy(snapshot));
        }
    }

    fn apply(&mut self, op: &Op) {
        match op {
            Op::Create(block) => {
                self.blocks.insert(block.id, block.clone());
            }
            Op::Destroy(block) => {
                self.blocks.remove(&block.id);
            }
            Op::InsertRoot { block, index } => {
                let index = (*index).min(self.roots.len());
                self.roots.insert(index, *block);
            }
            Op::RemoveRoot { block, .. } => {
                self.roots.retain(|r| r != block);
            }
            Op::Link { parent, slot, child } => {
                if let Some(p) = self.blocks.get_mut(parent) {
                    p.set_slot_target(slot, Some(*child));
                }
                if let Some(c) = self.blocks.get_mut(child) {
                    c.parent = Some((*parent, slot.clone()));
                }
            }
            Op::Unlink { parent, slot, child } => {
                if let Some(p) = self.blocks.get_mut(parent) {
                    p.set_slot_target(slot, None);
                }
                if let Some(c) = self.blocks.get_mut(child) {
                    c.parent = None;
                }
            }
            Op::SetField { block, name, new, .. } => {
                if let Some(b) = self.blocks.get_mut(block) {
                    b.fields.insert(name.clone(), new.clone());
                }
            }
        }
    }
}
