use crate::blocks::Block;
use crate::compiler::yail::primitive;
use crate::compiler::{Fragment, GeneratorRegistry, Order, Yail};

pub(super) fn install(registry: &mut GeneratorRegistry) {
    registry.replace("lists_create_with", create);
    registry.replace("lists_add_items", add_items);
    registry.replace("lists_select_item", select_item);
    registry.replace("lists_length", |y: &Yail<'_>, b: &Block| {
        unary(y, b, "yail-list-length", "length of list")
    });
    registry.replace("lists_is_empty", |y: &Yail<'_>, b: &Block| {
        unary(y, b, "yail-list-empty?", "is list empty?")
    });
}

fn create(yail: &Yail<'_>, block: &Block) -> Fragment {
    let args = yail.items_to_code(block, "ADD");
    let types = vec!["any"; args.len()];
    Fragment::atomic(primitive("make-yail-list", &args, &types, "make a list"))
}

fn add_items(yail: &Yail<'_>, block: &Block) -> Fragment {
    let mut args = vec![yail.value_to_code(block, "LIST", Order::Atomic)];
    args.extend(yail.items_to_code(block, "ITEM"));
    let mut types = vec!["list"];
    types.resize(args.len(), "any");
    Fragment::statement(primitive("yail-list-add-to-list!", &args, &types, "add items to list"))
}

fn select_item(yail: &Yail<'_>, block: &Block) -> Fragment {
    let args = [
        yail.value_to_code(block, "LIST", Order::Atomic),
        yail.value_to_code(block, "NUM", Order::Atomic),
    ];
    Fragment::atomic(primitive("yail-list-get-item", &args, &["list", "number"], "select list item"))
}

fn unary(yail: &Yail<'_>, block: &Block, op: &str, label: &str) -> Fragment {
    let arg = yail.value_to_code(block, "LIST", Order::Atomic);
    Fragment::atomic(primitive(op, &[arg], &["list"], label))
}
