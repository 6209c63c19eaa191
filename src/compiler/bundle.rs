//! Turns a workspace into a [`CodeBundle`]: definitions first, then event
//! handlers, each group in root order.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::YailGenerator;
use crate::blocks::{BlockId, InputKind, Workspace};
use crate::error::AssemblyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    Definition,
    Handler,
}

impl UnitKind {
    /// Which group a root block of `block_type` belongs to. `None` means
    /// the block cannot stand on its own at the top level.
    pub fn of(block_type: &str) -> Option<UnitKind> {
        match block_type {
            "global_declaration" | "procedures_defnoreturn" | "procedures_defreturn" => {
                Some(UnitKind::Definition)
            }
            "component_event" => Some(UnitKind::Handler),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeUnit {
    pub block: BlockId,
    pub kind: UnitKind,
    pub code: String,
}

/// Incompleteness found while assembling. Never fatal unless assembly is strict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Warning {
    /// A root block that is neither a definition nor a handler. Not emitted.
    Orphaned { block: BlockId, block_type: String },
    /// A required value input left empty. A default was emitted instead.
    EmptySocket { block: BlockId, input: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Orphaned { block, block_type } => {
                write!(f, "{} ({}) is not inside a definition or event handler", block, block_type)
            }
            Warning::EmptySocket { block, input } => {
                write!(f, "{} has an empty '{}' socket", block, input)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeBundle {
    pub units: Vec<CodeUnit>,
    pub warnings: Vec<Warning>,
}

impl CodeBundle {
    /// Unit codes joined by newlines, in bundle order.
    pub fn text(&self) -> String {
        self.units
            .iter()
            .map(|u| u.code.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn definitions(&self) -> impl Iterator<Item = &CodeUnit> {
        self.units.iter().filter(|u| u.kind == UnitKind::Definition)
    }

    pub fn handlers(&self) -> impl Iterator<Item = &CodeUnit> {
        self.units.iter().filter(|u| u.kind == UnitKind::Handler)
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Assembles every root of `workspace`.
///
/// With `strict`, any warning fails the whole assembly. Otherwise the
/// best-effort bundle carries them.
pub fn assemble(
    workspace: &Workspace,
    generator: &YailGenerator,
    strict: bool,
) -> Result<CodeBundle, AssemblyError> {
    let mut definitions = Vec::new();
    let mut handlers = Vec::new();
    let mut warnings = Vec::new();

    for &root in workspace.roots() {
        let Some(block) = workspace.block(root) else {
            continue;
        };
        let Some(kind) = UnitKind::of(block.block_type()) else {
            warnings.push(Warning::Orphaned {
                block: root,
                block_type: block.block_type().to_string(),
            });
            continue;
        };
        warnings.extend(empty_sockets(workspace, root));
        let unit = CodeUnit {
            block: root,
            kind,
            code: generator.generate(workspace, root).code,
        };
        match kind {
            UnitKind::Definition => definitions.push(unit),
            UnitKind::Handler => handlers.push(unit),
        }
    }

    if strict && !warnings.is_empty() {
        warn!("strict assembly refused: {} warning(s)", warnings.len());
        return Err(AssemblyError { warnings });
    }
    for warning in &warnings {
        debug!("assembly warning: {}", warning);
    }

    definitions.extend(handlers);
    Ok(CodeBundle {
        units: definitions,
        warnings,
    })
}

fn empty_sockets(workspace: &Workspace, root: BlockId) -> Vec<Warning> {
    workspace
        .descendants(root)
        .filter_map(|id| workspace.block(id))
        .flat_map(|block| {
            block
                .inputs()
                .iter()
                .filter(|i| i.kind == InputKind::Value && i.required && i.target().is_none())
                .map(move |i| Warning::EmptySocket {
                    block: block.id(),
                    input: i.name.clone(),
                })
        })
        .collect()
}
