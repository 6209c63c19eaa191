use crate::blocks::Block;
use crate::compiler::yail::{params, procedure_name};
use crate::compiler::{Fragment, GeneratorRegistry, Order, Yail};

pub(super) fn install(registry: &mut GeneratorRegistry) {
    registry.replace("procedures_defnoreturn", |y: &Yail<'_>, b: &Block| {
        let body = y.body(b, "STACK");
        define(b, &body)
    });
    registry.replace("procedures_defreturn", |y: &Yail<'_>, b: &Block| {
        let body = y.value_to_code(b, "RETURN", Order::None);
        define(b, &body)
    });
    registry.replace("procedures_callnoreturn", |y: &Yail<'_>, b: &Block| {
        Fragment::statement(call(y, b))
    });
    registry.replace("procedures_callreturn", |y: &Yail<'_>, b: &Block| {
        Fragment::atomic(call(y, b))
    });
}

fn define(block: &Block, body: &str) -> Fragment {
    let mut head = vec![procedure_name(block.field("NAME").unwrap_or("procedure"))];
    head.extend(params(block.field("PARAMS").unwrap_or_default()));
    Fragment::statement(format!("(def ({}) {})", head.join(" "), body))
}

fn call(yail: &Yail<'_>, block: &Block) -> String {
    let mut form = vec![format!(
        "(get-var {})",
        procedure_name(block.field("PROCNAME").unwrap_or("procedure"))
    )];
    form.extend(yail.items_to_code(block, "ARG"));
    format!("({})", form.join(" "))
}
