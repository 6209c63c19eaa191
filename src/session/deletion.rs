//! Asking the user before a large deletion.

use std::collections::HashSet;

use tokio::sync::oneshot;
use tracing::debug;

use crate::blocks::{BlockId, Workspace};

pub const DEFAULT_THRESHOLD: usize = 3;

const DELETE_MESSAGE: &str = "Are you sure you want to delete all %1 of these blocks?";

/// Sound played once a deletion goes ahead.
pub const DELETE_SOUND: &str = "delete";

/// A pending question to the user. Resolving consumes it, so it resolves at
/// most once. Dropping it unresolved counts as "no".
#[derive(Debug)]
pub struct ConfirmationRequest {
    count: usize,
    message: String,
    reply: oneshot::Sender<bool>,
}

impl ConfirmationRequest {
    pub(crate) fn new(count: usize) -> (Self, oneshot::Receiver<bool>) {
        let (reply, answer) = oneshot::channel();
        let request = ConfirmationRequest {
            count,
            message: DELETE_MESSAGE.replace("%1", &count.to_string()),
            reply,
        };
        (request, answer)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn resolve(self, confirmed: bool) {
        // nobody is waiting once the deletion was abandoned
        let _ = self.reply.send(confirmed);
    }

    pub fn confirm(self) {
        self.resolve(true)
    }

    pub fn cancel(self) {
        self.resolve(false)
    }
}

/// Whatever shows the confirmation to the user. `ask` must not block:
/// keep the request and resolve it when the user answers.
pub trait DeletionPrompt: Send + Sync {
    fn ask(&self, request: ConfirmationRequest);
}

/// Adapts a synchronous yes/no dialog.
pub struct BlockingPrompt<F>(pub F);

impl<F> DeletionPrompt for BlockingPrompt<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn ask(&self, request: ConfirmationRequest) {
        let confirmed = (self.0)(request.message());
        request.resolve(confirmed);
    }
}

pub trait AudioFeedback: Send + Sync {
    fn play_audio(&self, sound: &str);
}

/// No sound at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl AudioFeedback for Silent {
    fn play_audio(&self, _sound: &str) {}
}

/// Number of blocks a deletion would remove.
///
/// With a selection this is the selected block and its inputs, leaving
/// out the rest of the stack, which heals into its place. Without one it
/// is every block in the workspace.
pub fn deletion_count(workspace: &Workspace, selected: Option<BlockId>) -> usize {
    let Some(selected) = selected else {
        return workspace.all_blocks().count();
    };
    let follower = workspace.block(selected).and_then(|b| b.next());
    match follower {
        Some(follower) => {
            let survivors: HashSet<BlockId> = workspace.descendants(follower).collect();
            workspace
                .descendants(selected)
                .filter(|id| !survivors.contains(id))
                .count()
        }
        None => workspace.descendants(selected).count(),
    }
}

/// Runs the confirmation step for a deletion of `count` blocks.
///
/// Small deletions are approved without asking. The delete sound plays
/// only when the deletion is approved.
pub async fn confirm_deletion(
    count: usize,
    threshold: usize,
    prompt: &dyn DeletionPrompt,
    audio: &dyn AudioFeedback,
) -> bool {
    let approved = if count >= threshold {
        let (request, answer) = ConfirmationRequest::new(count);
        prompt.ask(request);
        answer.await.unwrap_or(false)
    } else {
        true
    };
    debug!("deletion of {} block(s) approved: {}", count, approved);
    if approved {
        audio.play_audio(DELETE_SOUND);
    }
    approved
}
