//! Blockly-style JSON serialization of a workspace.
//!
//! ```json
//! {"blocks": {"languageVersion": 0, "blocks": [
//!   {"type": "global_declaration", "id": "b1", "fields": {"NAME": "x"},
//!    "inputs": {"VALUE": {"block": {"type": "math_number", "fields": {"NUM": 5}}}}}
//! ]}}
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{BlockCatalog, BlockId, Slot, Workspace};
use crate::error::{DocumentError, GraphError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceDocument {
    #[serde(default)]
    pub blocks: BlockList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockList {
    #[serde(rename = "languageVersion", default)]
    pub language_version: u32,
    #[serde(default)]
    pub blocks: Vec<BlockState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockState {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, Connected>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Connected>,
    #[serde(rename = "extraState", default, skip_serializing_if = "Option::is_none")]
    pub extra_state: Option<ExtraState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connected {
    pub block: Box<BlockState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtraState {
    #[serde(alias = "itemCount")]
    pub items: usize,
}

fn field_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(true) => "TRUE".to_string(),
        serde_json::Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

impl Workspace {
    /// Builds a workspace from a document. Loading starts a fresh history.
    pub fn from_document(catalog: Arc<BlockCatalog>, document: &WorkspaceDocument) -> Result<Self, GraphError> {
        let mut workspace = Workspace::new(catalog);
        for state in &document.blocks.blocks {
            workspace.load_state(state)?;
        }
        workspace.clear_history();
        Ok(workspace)
    }

    pub fn from_json(catalog: Arc<BlockCatalog>, json: &str) -> Result<Self, DocumentError> {
        let document: WorkspaceDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(catalog, &document)?)
    }

    pub fn to_document(&self) -> WorkspaceDocument {
        WorkspaceDocument {
            blocks: BlockList {
                language_version: 0,
                blocks: self.roots().iter().filter_map(|id| self.save_state(*id)).collect(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    fn load_state(&mut self, state: &BlockState) -> Result<BlockId, GraphError> {
        let id = match state.extra_state {
            Some(extra) => self.create_block_with_items(&state.block_type, extra.items)?,
            None => self.create_block(&state.block_type)?,
        };
        for (name, value) in &state.fields {
            self.set_field(id, name, &field_text(value))?;
        }
        for (name, child) in &state.inputs {
            let child_id = self.load_state(&child.block)?;
            self.connect(id, Slot::input(name.as_str()), child_id)?;
        }
        if let Some(next) = &state.next {
            let next_id = self.load_state(&next.block)?;
            self.connect(id, Slot::Next, next_id)?;
        }
        Ok(id)
    }

    fn save_state(&self, id: BlockId) -> Option<BlockState> {
        let block = self.block(id)?;
        let shape_items = self
            .catalog()
            .get(block.block_type())
            .and_then(|shape| shape.items.as_ref())
            .is_some();
        Some(BlockState {
            block_type: block.block_type().to_string(),
            id: Some(id.to_string()),
            fields: block
                .fields()
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
            inputs: block
                .inputs()
                .iter()
                .filter_map(|input| {
                    let child = self.save_state(input.target()?)?;
                    Some((input.name.clone(), Connected { block: Box::new(child) }))
                })
                .collect(),
            next: block
                .next()
                .and_then(|next| self.save_state(next))
                .map(|child| Connected { block: Box::new(child) }),
            extra_state: shape_items.then_some(ExtraState { items: block.items() }),
        })
    }
}
