use std::sync::Arc;

use tracing::warn;

use super::{Fragment, GeneratorRegistry, Order};
use crate::blocks::{Block, BlockId, InputKind, Workspace, catalog};

/// The null value emitted for missing or unknown code.
pub const NULL: &str = "*the-null-value*";

/// Generation context handed to every rule: the workspace being lowered
/// and the registry used to lower children.
pub struct Yail<'a> {
    workspace: &'a Workspace,
    registry: &'a GeneratorRegistry,
}

impl<'a> Yail<'a> {
    pub fn new(workspace: &'a Workspace, registry: &'a GeneratorRegistry) -> Self {
        Yail {
            workspace,
            registry,
        }
    }

    pub fn workspace(&self) -> &'a Workspace {
        self.workspace
    }

    /// Dispatches `id` to the rule registered for its type.
    pub fn block_to_code(&self, id: BlockId) -> Fragment {
        let Some(block) = self.workspace.block(id) else {
            warn!("cannot generate missing block {}", id);
            return Fragment::atomic(NULL);
        };
        match self.registry.get(block.block_type()) {
            Some(rule) => (**rule)(self, block),
            None => {
                warn!("no generator rule for block type '{}'", block.block_type());
                Fragment::atomic(NULL)
            }
        }
    }

    /// Code for the child plugged into value input `name`, wrapped in
    /// `(begin …)` when it binds weaker than `required`. A missing child
    /// yields the default for the input's type.
    pub fn value_to_code(&self, block: &Block, name: &str, required: Order) -> String {
        let Some(input) = block.input(name) else {
            return NULL.to_string();
        };
        match input.target() {
            None => default_value(input.check.first()),
            Some(child) => {
                let fragment = self.block_to_code(child);
                if fragment.needs_wrap(required) {
                    format!("(begin {})", fragment.code)
                } else {
                    fragment.code
                }
            }
        }
    }

    /// Atomic code for every variadic item input, in order.
    pub fn items_to_code(&self, block: &Block, prefix: &str) -> Vec<String> {
        (0..block.items())
            .map(|i| self.value_to_code(block, &format!("{}{}", prefix, i), Order::Atomic))
            .collect()
    }

    /// The statement chain hanging from input `name`, one form per line.
    /// An empty chain is the no-op `(begin)`.
    pub fn statement_to_code(&self, block: &Block, name: &str) -> Fragment {
        let first = block
            .input(name)
            .filter(|i| i.kind == InputKind::Statement)
            .and_then(|i| i.target());
        self.chain_to_code(first)
    }

    pub fn chain_to_code(&self, first: Option<BlockId>) -> Fragment {
        let mut forms = Vec::new();
        let mut current = first;
        while let Some(id) = current {
            forms.push(self.block_to_code(id).code);
            current = self.workspace.block(id).and_then(Block::next);
        }
        match forms.len() {
            0 => Fragment::atomic("(begin)"),
            1 => Fragment::statement(forms.remove(0)),
            _ => Fragment::new(forms.join("\n"), Order::Sequence),
        }
    }

    /// A statement body wrapped as a single `(begin …)` form.
    pub fn body(&self, block: &Block, name: &str) -> String {
        let fragment = self.statement_to_code(block, name);
        if fragment.order == Order::Atomic {
            fragment.code
        } else {
            format!("(begin {})", fragment.code)
        }
    }
}

/// Lowers workspace blocks to Yail through a shared rule registry.
#[derive(Debug, Clone)]
pub struct YailGenerator {
    registry: Arc<GeneratorRegistry>,
}

impl Default for YailGenerator {
    fn default() -> Self {
        Self::new(GeneratorRegistry::with_builtins())
    }
}

impl YailGenerator {
    pub fn new(registry: GeneratorRegistry) -> Self {
        YailGenerator {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Never fails: incomplete trees generate defaults, unknown types
    /// generate the null value.
    pub fn generate(&self, workspace: &Workspace, block: BlockId) -> Fragment {
        Yail::new(workspace, &self.registry).block_to_code(block)
    }
}

pub fn default_value(check: Option<&str>) -> String {
    match check {
        Some(catalog::NUMBER) => "0".to_string(),
        Some(catalog::STRING) => "\"\"".to_string(),
        Some(catalog::BOOLEAN) => "#f".to_string(),
        Some(catalog::LIST) => primitive("make-yail-list", &[], &[], "make a list"),
        _ => NULL.to_string(),
    }
}

/// `(call-yail-primitive NAME (*list-for-runtime* args…) '(types…) "label")`
pub fn primitive(name: &str, args: &[String], types: &[&str], label: &str) -> String {
    format!(
        "(call-yail-primitive {} {} '({}) {})",
        name,
        list_for_runtime(args),
        types.join(" "),
        quote(label)
    )
}

pub fn list_for_runtime(args: &[String]) -> String {
    if args.is_empty() {
        "(*list-for-runtime*)".to_string()
    } else {
        format!("(*list-for-runtime* {})", args.join(" "))
    }
}

pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Canonical number literal. Integral values print without a fraction.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

pub fn global_name(name: &str) -> String {
    format!("g${}", name.trim())
}

pub fn lexical_name(name: &str) -> String {
    format!("${}", name.trim())
}

pub fn procedure_name(name: &str) -> String {
    format!("p${}", name.trim())
}

/// `"a, b"` → `["$a", "$b"]`.
pub fn params(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(lexical_name)
        .collect()
}
