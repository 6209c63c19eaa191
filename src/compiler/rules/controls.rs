use crate::blocks::Block;
use crate::compiler::yail::lexical_name;
use crate::compiler::{Fragment, GeneratorRegistry, Order, Yail};

pub(super) fn install(registry: &mut GeneratorRegistry) {
    registry.replace("controls_if", if_then_else);
    registry.replace("controls_while", while_loop);
    registry.replace("controls_forRange", for_range);
    registry.replace("controls_forEach", for_each);
    registry.replace("controls_choose", choose);
    registry.replace("controls_do_then_return", do_then_return);
    registry.replace("controls_eval_but_ignore", eval_but_ignore);
}

/// The else arm is omitted when its body is empty.
fn if_then_else(yail: &Yail<'_>, block: &Block) -> Fragment {
    let test = yail.value_to_code(block, "IF0", Order::Atomic);
    let then = yail.body(block, "DO0");
    let code = match block.input_target("ELSE") {
        Some(_) => format!("(if {} {} {})", test, then, yail.body(block, "ELSE")),
        None => format!("(if {} {})", test, then),
    };
    Fragment::statement(code)
}

fn while_loop(yail: &Yail<'_>, block: &Block) -> Fragment {
    Fragment::statement(format!(
        "(while {} {})",
        yail.value_to_code(block, "TEST", Order::Atomic),
        yail.body(block, "DO")
    ))
}

fn for_range(yail: &Yail<'_>, block: &Block) -> Fragment {
    Fragment::statement(format!(
        "(forrange {} {} {} {} {})",
        lexical_name(block.field("VAR").unwrap_or("number")),
        yail.body(block, "DO"),
        yail.value_to_code(block, "START", Order::Atomic),
        yail.value_to_code(block, "END", Order::Atomic),
        yail.value_to_code(block, "STEP", Order::Atomic)
    ))
}

fn for_each(yail: &Yail<'_>, block: &Block) -> Fragment {
    Fragment::statement(format!(
        "(foreach {} {} {})",
        lexical_name(block.field("VAR").unwrap_or("item")),
        yail.body(block, "DO"),
        yail.value_to_code(block, "LIST", Order::Atomic)
    ))
}

fn choose(yail: &Yail<'_>, block: &Block) -> Fragment {
    Fragment::atomic(format!(
        "(if {} {} {})",
        yail.value_to_code(block, "TEST", Order::Atomic),
        yail.value_to_code(block, "THENRETURN", Order::Atomic),
        yail.value_to_code(block, "ELSERETURN", Order::Atomic)
    ))
}

fn do_then_return(yail: &Yail<'_>, block: &Block) -> Fragment {
    let value = yail.value_to_code(block, "VALUE", Order::None);
    let code = match block.input_target("STM") {
        Some(_) => format!("(begin {} {})", yail.statement_to_code(block, "STM").code, value),
        None => format!("(begin {})", value),
    };
    Fragment::atomic(code)
}

fn eval_but_ignore(yail: &Yail<'_>, block: &Block) -> Fragment {
    Fragment::statement(format!(
        "(begin {} \"ignored\")",
        yail.value_to_code(block, "VALUE", Order::None)
    ))
}
