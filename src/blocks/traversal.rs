use super::{BlockId, Workspace};

/// Depth-first, document-order walk over a workspace: each block, then its
/// inputs in declared order, then its `next` chain.
///
/// Lazy and finite. Creating a new iterator restarts the walk.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    workspace: &'a Workspace,
    stack: Vec<BlockId>,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(workspace: &'a Workspace, starts: &[BlockId]) -> Self {
        let stack = starts
            .iter()
            .rev()
            .copied()
            .filter(|id| workspace.block(*id).is_some())
            .collect();
        Self { workspace, stack }
    }
}

impl Iterator for Descendants<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<BlockId> {
        let id = self.stack.pop()?;
        if let Some(block) = self.workspace.block(id) {
            let children: Vec<BlockId> = block.children().collect();
            self.stack.extend(children.into_iter().rev());
        }
        Some(id)
    }
}
