//! The editing session: sole owner of the active workspace.
//!
//! Mutations go through the session so they are serialized, checked by the
//! registered post-hooks and rolled back when a hook objects.

use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use tracing::{debug, info, warn};

use crate::blocks::{BlockId, Slot, Workspace, WorkspaceDocument};
use crate::compiler::{CodeBundle, YailGenerator, assemble};
use crate::config::EditorConfig;
use crate::error::{AssemblyError, GraphError};

pub mod deletion;
pub use deletion::{AudioFeedback, BlockingPrompt, ConfirmationRequest, DeletionPrompt, Silent, deletion_count};

/// What a successful mutation did, as seen by post-hooks.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Created(BlockId),
    Connected { owner: BlockId, slot: Slot, target: BlockId },
    Disconnected { owner: BlockId, slot: Slot, child: BlockId },
    FieldSet { block: BlockId, name: String },
    Deleted(Vec<BlockId>),
    Undone,
    Redone,
    Loaded,
}

/// Runs after a mutation, with the lock still held. An `Err` rejects the
/// mutation: it is reverted and the reason reported as
/// [`GraphError::Rejected`].
pub type PostHook = Box<dyn Fn(&Workspace, &Change) -> Result<(), String> + Send + Sync>;

/// How to take a mutation back when a hook rejects it.
#[derive(Clone, Copy)]
enum Revert {
    Rollback,
    Redo,
    Undo,
}

pub struct EditorSession {
    workspace: Mutex<Workspace>,
    selection: Mutex<Option<BlockId>>,
    hooks: Vec<PostHook>,
    generator: YailGenerator,
    settings: EditorConfig,
}

impl EditorSession {
    pub fn new(workspace: Workspace, settings: EditorConfig) -> Self {
        EditorSession {
            workspace: Mutex::new(workspace),
            selection: Mutex::new(None),
            hooks: Vec::new(),
            generator: YailGenerator::default(),
            settings,
        }
    }

    pub fn with_generator(mut self, generator: YailGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Hooks run in registration order.
    pub fn add_hook(&mut self, hook: PostHook) {
        self.hooks.push(hook);
    }

    pub fn settings(&self) -> &EditorConfig {
        &self.settings
    }

    pub fn generator(&self) -> &YailGenerator {
        &self.generator
    }

    fn selection(&self) -> MutexGuard<'_, Option<BlockId>> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_workspace(&self) -> Result<MutexGuard<'_, Workspace>, GraphError> {
        match self.workspace.try_lock() {
            Ok(guard) => Ok(guard),
            Err(TryLockError::WouldBlock) => Err(GraphError::Busy),
            Err(TryLockError::Poisoned(e)) => Ok(e.into_inner()),
        }
    }

    fn mutate<R>(
        &self,
        revert: Revert,
        mutation: impl FnOnce(&mut Workspace) -> Result<R, GraphError>,
        change: impl FnOnce(&R) -> Change,
    ) -> Result<R, GraphError> {
        let mut workspace = self.try_workspace()?;
        let before = workspace.revision();
        let result = mutation(&mut *workspace)?;
        if workspace.revision() == before {
            return Ok(result);
        }
        let change = change(&result);
        for hook in &self.hooks {
            if let Err(reason) = hook(&*workspace, &change) {
                warn!("{:?} rejected: {}", change, reason);
                match revert {
                    Revert::Rollback => workspace.rollback(),
                    Revert::Redo => workspace.redo(),
                    Revert::Undo => workspace.undo(),
                };
                return Err(GraphError::Rejected(reason));
            }
        }
        Ok(result)
    }

    pub fn create_block(&self, block_type: &str) -> Result<BlockId, GraphError> {
        self.mutate(Revert::Rollback, |ws| ws.create_block(block_type), |id| Change::Created(*id))
    }

    pub fn create_block_with_items(&self, block_type: &str, items: usize) -> Result<BlockId, GraphError> {
        self.mutate(
            Revert::Rollback,
            |ws| ws.create_block_with_items(block_type, items),
            |id| Change::Created(*id),
        )
    }

    pub fn connect(&self, owner: BlockId, slot: Slot, target: BlockId) -> Result<(), GraphError> {
        let recorded = slot.clone();
        self.mutate(
            Revert::Rollback,
            |ws| ws.connect(owner, slot, target),
            |_| Change::Connected {
                owner,
                slot: recorded,
                target,
            },
        )
    }

    pub fn disconnect(&self, owner: BlockId, slot: Slot) -> Result<Option<BlockId>, GraphError> {
        let recorded = slot.clone();
        self.mutate(
            Revert::Rollback,
            |ws| Ok(ws.disconnect(owner, &slot)),
            |child| Change::Disconnected {
                owner,
                slot: recorded,
                child: child.unwrap_or(owner),
            },
        )
    }

    pub fn set_field(&self, block: BlockId, name: &str, value: &str) -> Result<(), GraphError> {
        self.mutate(
            Revert::Rollback,
            |ws| ws.set_field(block, name, value),
            |_| Change::FieldSet {
                block,
                name: name.to_string(),
            },
        )
    }

    /// Deletes `block` with stack healing.
    pub fn delete(&self, block: BlockId) -> Result<Vec<BlockId>, GraphError> {
        let deleted = self.mutate(
            Revert::Rollback,
            |ws| ws.delete(block, true),
            |ids| Change::Deleted(ids.clone()),
        )?;
        let mut selection = self.selection();
        if selection.is_some_and(|s| deleted.contains(&s)) {
            *selection = None;
        }
        Ok(deleted)
    }

    pub fn clear(&self) -> Result<Vec<BlockId>, GraphError> {
        let deleted = self.mutate(Revert::Rollback, |ws| Ok(ws.clear()), |ids| Change::Deleted(ids.clone()))?;
        *self.selection() = None;
        Ok(deleted)
    }

    pub fn undo(&self) -> Result<bool, GraphError> {
        self.mutate(Revert::Redo, |ws| Ok(ws.undo()), |_| Change::Undone)
    }

    pub fn redo(&self) -> Result<bool, GraphError> {
        self.mutate(Revert::Undo, |ws| Ok(ws.redo()), |_| Change::Redone)
    }

    /// Replaces the whole workspace with `document`. Not undoable.
    pub fn load(&self, document: &WorkspaceDocument) -> Result<(), GraphError> {
        let mut workspace = self.try_workspace()?;
        let loaded = Workspace::from_document(workspace.catalog().clone(), document)?;
        for hook in &self.hooks {
            hook(&loaded, &Change::Loaded).map_err(GraphError::Rejected)?;
        }
        *workspace = loaded;
        *self.selection() = None;
        info!("loaded workspace with {} block(s)", workspace.len());
        Ok(())
    }

    pub fn select(&self, block: Option<BlockId>) -> Result<(), GraphError> {
        if let Some(id) = block {
            if !self.try_workspace()?.contains(id) {
                return Err(GraphError::UnknownBlock(id));
            }
        }
        *self.selection() = block;
        Ok(())
    }

    pub fn selected(&self) -> Option<BlockId> {
        *self.selection()
    }

    /// A copy of the workspace, taken under the lock.
    pub fn snapshot(&self) -> Workspace {
        self.workspace
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn document(&self) -> WorkspaceDocument {
        self.snapshot().to_document()
    }

    /// Compiles a snapshot, so editing may continue meanwhile.
    pub fn compile(&self) -> Result<CodeBundle, AssemblyError> {
        let snapshot = self.snapshot();
        assemble(&snapshot, &self.generator, self.settings.strict_assembly)
    }

    /// Number of blocks [`delete_selected`](Self::delete_selected) would
    /// remove right now.
    pub fn pending_deletion_count(&self) -> Result<usize, GraphError> {
        let workspace = self.try_workspace()?;
        Ok(deletion_count(&workspace, self.selected()))
    }

    /// Deletes the selection, or everything when nothing is selected,
    /// after the user confirms. Returns the removed blocks, empty when the
    /// user declined.
    ///
    /// What gets deleted is fixed when the question is asked. Changing the
    /// selection while the prompt is open has no effect, and an edit to the
    /// workspace in the meantime aborts with [`GraphError::Stale`].
    pub async fn delete_selected(
        &self,
        prompt: &dyn DeletionPrompt,
        audio: &dyn AudioFeedback,
    ) -> Result<Vec<BlockId>, GraphError> {
        let target = self.selected();
        let (count, revision) = {
            let workspace = self.try_workspace()?;
            (deletion_count(&workspace, target), workspace.revision())
        };
        let threshold = self.settings.deletion_threshold;
        if !deletion::confirm_deletion(count, threshold, prompt, audio).await {
            debug!("deletion of {} block(s) declined", count);
            return Ok(Vec::new());
        }
        if count == 0 {
            return Ok(Vec::new());
        }
        {
            let workspace = self.try_workspace()?;
            if workspace.revision() != revision {
                warn!("workspace changed during confirmation, {} block(s) kept", count);
                return Err(GraphError::Stale);
            }
            if let Some(block) = target {
                if !workspace.contains(block) {
                    return Err(GraphError::UnknownBlock(block));
                }
            }
        }
        match target {
            Some(block) => self.delete(block),
            None => self.clear(),
        }
    }
}
