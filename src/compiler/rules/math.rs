use crate::blocks::Block;
use crate::compiler::yail::{format_number, primitive};
use crate::compiler::{Fragment, GeneratorRegistry, Order, Yail};

pub(super) fn install(registry: &mut GeneratorRegistry) {
    registry.replace("math_number", number);
    registry.replace("math_add", |y: &Yail<'_>, b: &Block| variadic(y, b, "+", "+"));
    registry.replace("math_multiply", |y: &Yail<'_>, b: &Block| variadic(y, b, "*", "*"));
    registry.replace("math_subtract", |y: &Yail<'_>, b: &Block| binary(y, b, "-", "-"));
    registry.replace("math_division", |y: &Yail<'_>, b: &Block| binary(y, b, "yail-divide", "/"));
    registry.replace("math_compare", compare);
}

/// Invalid literals lower to `0`.
fn number(_: &Yail<'_>, block: &Block) -> Fragment {
    let literal = block
        .field("NUM")
        .and_then(|text| text.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .map(format_number)
        .unwrap_or_else(|| "0".to_string());
    Fragment::atomic(literal)
}

fn variadic(yail: &Yail<'_>, block: &Block, op: &str, label: &str) -> Fragment {
    let args = yail.items_to_code(block, "NUM");
    let types = vec!["number"; args.len()];
    Fragment::atomic(primitive(op, &args, &types, label))
}

fn binary(yail: &Yail<'_>, block: &Block, op: &str, label: &str) -> Fragment {
    let args = [
        yail.value_to_code(block, "A", Order::Atomic),
        yail.value_to_code(block, "B", Order::Atomic),
    ];
    Fragment::atomic(primitive(op, &args, &["number", "number"], label))
}

fn compare(yail: &Yail<'_>, block: &Block) -> Fragment {
    let (op, types, label) = match block.field("OP").unwrap_or("EQ") {
        "NEQ" => ("yail-not-equal?", ["any", "any"], "!="),
        "LT" => ("<", ["number", "number"], "<"),
        "LTE" => ("<=", ["number", "number"], "<="),
        "GT" => (">", ["number", "number"], ">"),
        "GTE" => (">=", ["number", "number"], ">="),
        _ => ("yail-equal?", ["any", "any"], "="),
    };
    let args = [
        yail.value_to_code(block, "A", Order::Atomic),
        yail.value_to_code(block, "B", Order::Atomic),
    ];
    Fragment::atomic(primitive(op, &args, &types, label))
}
