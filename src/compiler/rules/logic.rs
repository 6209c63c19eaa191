use crate::blocks::Block;
use crate::compiler::yail::primitive;
use crate::compiler::{Fragment, GeneratorRegistry, Order, Yail};

pub(super) fn install(registry: &mut GeneratorRegistry) {
    registry.replace("logic_boolean", boolean);
    registry.replace("logic_negate", negate);
    registry.replace("logic_operation", operation);
    registry.replace("logic_compare", compare);
}

fn boolean(_: &Yail<'_>, block: &Block) -> Fragment {
    match block.field("BOOL") {
        Some("TRUE") => Fragment::atomic("#t"),
        _ => Fragment::atomic("#f"),
    }
}

fn negate(yail: &Yail<'_>, block: &Block) -> Fragment {
    let arg = yail.value_to_code(block, "BOOL", Order::Atomic);
    Fragment::atomic(primitive("yail-not", &[arg], &["boolean"], "not"))
}

/// `and`/`or` short-circuit, so they are special forms rather than primitives.
fn operation(yail: &Yail<'_>, block: &Block) -> Fragment {
    let form = match block.field("OP") {
        Some("OR") => "or-delayed",
        _ => "and-delayed",
    };
    Fragment::atomic(format!(
        "({} {} {})",
        form,
        yail.value_to_code(block, "A", Order::Atomic),
        yail.value_to_code(block, "B", Order::Atomic)
    ))
}

fn compare(yail: &Yail<'_>, block: &Block) -> Fragment {
    let (op, label) = match block.field("OP") {
        Some("NEQ") => ("yail-not-equal?", "!="),
        _ => ("yail-equal?", "="),
    };
    let args = [
        yail.value_to_code(block, "A", Order::Atomic),
        yail.value_to_code(block, "B", Order::Atomic),
    ];
    Fragment::atomic(primitive(op, &args, &["any", "any"], label))
}
