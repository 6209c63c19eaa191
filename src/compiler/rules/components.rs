use crate::blocks::Block;
use crate::compiler::yail::{list_for_runtime, params};
use crate::compiler::{Fragment, GeneratorRegistry, Order, Yail};

pub(super) fn install(registry: &mut GeneratorRegistry) {
    registry.replace("component_event", event);
    registry.replace("component_set_property", set_property);
    registry.replace("component_get_property", get_property);
    registry.replace("component_method", method);
    registry.replace("component_component_block", |_: &Yail<'_>, b: &Block| {
        Fragment::atomic(format!("(get-component {})", component(b)))
    });
}

fn component(block: &Block) -> &str {
    block.field("COMPONENT").unwrap_or("Screen1")
}

fn event(yail: &Yail<'_>, block: &Block) -> Fragment {
    let body = yail.statement_to_code(block, "DO");
    Fragment::statement(format!(
        "(define-event {} {}({})(set-this-form)\n    {})",
        component(block),
        block.field("EVENT").unwrap_or("Click"),
        params(block.field("PARAMS").unwrap_or_default()).join(" "),
        body.code
    ))
}

fn set_property(yail: &Yail<'_>, block: &Block) -> Fragment {
    Fragment::statement(format!(
        "(set-and-coerce-property! '{} '{} {} '{})",
        component(block),
        block.field("PROP").unwrap_or("Text"),
        yail.value_to_code(block, "VALUE", Order::Atomic),
        block.field("TYPE").unwrap_or("any")
    ))
}

fn get_property(_: &Yail<'_>, block: &Block) -> Fragment {
    Fragment::atomic(format!(
        "(get-property '{} '{})",
        component(block),
        block.field("PROP").unwrap_or("Text")
    ))
}

fn method(yail: &Yail<'_>, block: &Block) -> Fragment {
    let args = yail.items_to_code(block, "ARG");
    let types = vec!["any"; args.len()];
    Fragment::statement(format!(
        "(call-component-method '{} '{} {} '({}))",
        component(block),
        block.field("METHOD").unwrap_or("method"),
        list_for_runtime(&args),
        types.join(" ")
    ))
}
