use crate::blocks::Block;
use crate::compiler::yail::{primitive, quote};
use crate::compiler::{Fragment, GeneratorRegistry, Order, Yail};

pub(super) fn install(registry: &mut GeneratorRegistry) {
    registry.replace("text", literal);
    registry.replace("text_join", join);
    registry.replace("text_length", length);
}

fn literal(_: &Yail<'_>, block: &Block) -> Fragment {
    Fragment::atomic(quote(block.field("TEXT").unwrap_or_default()))
}

fn join(yail: &Yail<'_>, block: &Block) -> Fragment {
    let args = yail.items_to_code(block, "ADD");
    let types = vec!["text"; args.len()];
    Fragment::atomic(primitive("string-append", &args, &types, "join"))
}

fn length(yail: &Yail<'_>, block: &Block) -> Fragment {
    let arg = yail.value_to_code(block, "VALUE", Order::Atomic);
    Fragment::atomic(primitive("string-length", &[arg], &["text"], "length"))
}
