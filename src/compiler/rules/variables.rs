use crate::blocks::Block;
use crate::compiler::yail::{global_name, lexical_name};
use crate::compiler::{Fragment, GeneratorRegistry, Order, Yail};

const GLOBAL_PREFIX: &str = "global ";

pub(super) fn install(registry: &mut GeneratorRegistry) {
    registry.replace("global_declaration", declaration);
    registry.replace("lexical_variable_get", get);
    registry.replace("lexical_variable_set", set);
}

/// Variable references carry a `global ` prefix when they name a
/// top-level declaration; anything else is a lexical binding.
enum Scope<'a> {
    Global(&'a str),
    Lexical(&'a str),
}

fn scope(block: &Block) -> Scope<'_> {
    let name = block.field("VAR").unwrap_or_default();
    match name.strip_prefix(GLOBAL_PREFIX) {
        Some(global) => Scope::Global(global),
        None => Scope::Lexical(name),
    }
}

fn declaration(yail: &Yail<'_>, block: &Block) -> Fragment {
    Fragment::statement(format!(
        "(def {} {})",
        global_name(block.field("NAME").unwrap_or("name")),
        yail.value_to_code(block, "VALUE", Order::Atomic)
    ))
}

fn get(_: &Yail<'_>, block: &Block) -> Fragment {
    match scope(block) {
        Scope::Global(name) => Fragment::atomic(format!("(get-var {})", global_name(name))),
        Scope::Lexical(name) => Fragment::atomic(format!("(lexical-value {})", lexical_name(name))),
    }
}

fn set(yail: &Yail<'_>, block: &Block) -> Fragment {
    let value = yail.value_to_code(block, "VALUE", Order::Atomic);
    match scope(block) {
        Scope::Global(name) => Fragment::statement(format!("(set-var! {} {})", global_name(name), value)),
        Scope::Lexical(name) => Fragment::statement(format!("(set-lexical! {} {})", lexical_name(name), value)),
    }
}
