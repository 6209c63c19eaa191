use std::sync::Arc;

use super::*;
use crate::error::{DocumentError, GraphError};

fn ws() -> Workspace {
    Workspace::default()
}

#[test]
fn unknown_block_type_is_rejected() {
    let mut ws = ws();
    assert_eq!(
        ws.create_block("no_such_block"),
        Err(GraphError::UnknownBlockType("no_such_block".to_string()))
    );
    assert!(ws.is_empty());
}

#[test]
fn connect_value_input() {
    let mut ws = ws();
    let sub = ws.create_block("math_subtract").unwrap();
    let n = ws.create_block("math_number").unwrap();
    ws.connect(sub, Slot::input("A"), n).unwrap();

    assert_eq!(ws.block(sub).unwrap().input_target("A"), Some(n));
    assert_eq!(ws.block(n).unwrap().parent(), Some(&(sub, Slot::input("A"))));
    assert_eq!(ws.roots(), &[sub]);
}

#[test]
fn type_mismatch_leaves_graph_unchanged() {
    let mut ws = ws();
    let sub = ws.create_block("math_subtract").unwrap();
    let text = ws.create_block("text").unwrap();
    let before = ws.to_document();

    let err = ws.connect(sub, Slot::input("A"), text).unwrap_err();
    assert!(matches!(err, GraphError::ConnectionType { .. }));
    assert_eq!(ws.to_document(), before);
}

#[test]
fn statement_cannot_fill_value_input() {
    let mut ws = ws();
    let sub = ws.create_block("math_subtract").unwrap();
    let stmt = ws.create_block("lexical_variable_set").unwrap();
    assert!(matches!(
        ws.connect(sub, Slot::input("A"), stmt),
        Err(GraphError::ConnectionType { .. })
    ));
    assert_eq!(ws.roots(), &[sub, stmt]);
}

#[test]
fn value_cannot_follow_statement() {
    let mut ws = ws();
    let stmt = ws.create_block("lexical_variable_set").unwrap();
    let n = ws.create_block("math_number").unwrap();
    assert!(matches!(
        ws.connect(stmt, Slot::Next, n),
        Err(GraphError::ConnectionType { .. })
    ));
}

#[test]
fn unknown_input_is_rejected() {
    let mut ws = ws();
    let sub = ws.create_block("math_subtract").unwrap();
    let n = ws.create_block("math_number").unwrap();
    assert_eq!(
        ws.connect(sub, Slot::input("C"), n),
        Err(GraphError::UnknownInput {
            block: sub,
            input: "C".to_string()
        })
    );
}

#[test]
fn cycles_are_rejected() {
    let mut ws = ws();
    let outer = ws.create_block("controls_while").unwrap();
    let inner = ws.create_block("controls_while").unwrap();
    ws.connect(outer, Slot::input("DO"), inner).unwrap();
    let before = ws.to_document();

    assert_eq!(
        ws.connect(inner, Slot::input("DO"), outer),
        Err(GraphError::Cycle {
            owner: inner,
            target: outer
        })
    );
    assert_eq!(
        ws.connect(inner, Slot::Next, inner),
        Err(GraphError::Cycle {
            owner: inner,
            target: inner
        })
    );
    assert_eq!(ws.to_document(), before);
}

#[test]
fn connecting_a_parented_block_moves_it() {
    let mut ws = ws();
    let first = ws.create_block("math_subtract").unwrap();
    let second = ws.create_block("math_subtract").unwrap();
    let n = ws.create_block("math_number").unwrap();
    ws.connect(first, Slot::input("A"), n).unwrap();
    ws.connect(second, Slot::input("B"), n).unwrap();

    assert_eq!(ws.block(first).unwrap().input_target("A"), None);
    assert_eq!(ws.block(second).unwrap().input_target("B"), Some(n));
    assert_eq!(ws.roots(), &[first, second]);
}

#[test]
fn occupied_value_slot_bumps_occupant_to_roots() {
    let mut ws = ws();
    let sub = ws.create_block("math_subtract").unwrap();
    let a = ws.create_block("math_number").unwrap();
    let b = ws.create_block("math_number").unwrap();
    ws.connect(sub, Slot::input("A"), a).unwrap();
    ws.connect(sub, Slot::input("A"), b).unwrap();

    assert_eq!(ws.block(sub).unwrap().input_target("A"), Some(b));
    assert!(ws.block(a).unwrap().parent().is_none());
    assert_eq!(ws.roots(), &[sub, a]);
}

#[test]
fn occupied_statement_slot_splices_below_incoming_chain() {
    let mut ws = ws();
    let body = ws.create_block("controls_while").unwrap();
    let x = ws.create_block("lexical_variable_set").unwrap();
    let y = ws.create_block("lexical_variable_set").unwrap();
    ws.connect(body, Slot::input("DO"), x).unwrap();
    ws.connect(body, Slot::input("DO"), y).unwrap();

    assert_eq!(ws.block(body).unwrap().input_target("DO"), Some(y));
    assert_eq!(ws.block(y).unwrap().next(), Some(x));
    assert_eq!(ws.roots(), &[body]);
}

#[test]
fn traversal_is_document_order() {
    let mut ws = ws();
    let cond = ws.create_block("controls_if").unwrap();
    let test = ws.create_block("logic_boolean").unwrap();
    let first = ws.create_block("controls_eval_but_ignore").unwrap();
    let n = ws.create_block("math_number").unwrap();
    let after = ws.create_block("lexical_variable_set").unwrap();
    let other_root = ws.create_block("text").unwrap();

    ws.connect(cond, Slot::input("IF0"), test).unwrap();
    ws.connect(cond, Slot::input("DO0"), first).unwrap();
    ws.connect(first, Slot::input("VALUE"), n).unwrap();
    ws.connect(cond, Slot::Next, after).unwrap();

    let all: Vec<BlockId> = ws.all_blocks().collect();
    assert_eq!(all, vec![cond, test, first, n, after, other_root]);

    // restartable
    assert_eq!(ws.all_blocks().count(), 6);
    assert_eq!(ws.descendants(first).collect::<Vec<_>>(), vec![first, n]);
    assert_eq!(ws.descendants(BlockId(999)).count(), 0);
}

fn chain(ws: &mut Workspace) -> (BlockId, BlockId, BlockId, BlockId, BlockId) {
    let owner = ws.create_block("controls_while").unwrap();
    let a = ws.create_block("lexical_variable_set").unwrap();
    let b = ws.create_block("controls_eval_but_ignore").unwrap();
    let n = ws.create_block("math_number").unwrap();
    let c = ws.create_block("lexical_variable_set").unwrap();
    ws.connect(owner, Slot::input("DO"), a).unwrap();
    ws.connect(a, Slot::Next, b).unwrap();
    ws.connect(b, Slot::input("VALUE"), n).unwrap();
    ws.connect(b, Slot::Next, c).unwrap();
    (owner, a, b, n, c)
}

#[test]
fn delete_heals_stack() {
    let mut ws = ws();
    let (owner, a, b, n, c) = chain(&mut ws);

    let removed = ws.delete(b, true).unwrap();
    assert_eq!(removed, vec![b, n]);
    assert_eq!(ws.block(a).unwrap().next(), Some(c));
    assert_eq!(ws.block(c).unwrap().parent(), Some(&(a, Slot::Next)));
    assert_eq!(ws.roots(), &[owner]);
    assert!(ws.block(n).is_none());
}

#[test]
fn delete_without_healing_orphans_follower() {
    let mut ws = ws();
    let (owner, a, b, _, c) = chain(&mut ws);

    ws.delete(b, false).unwrap();
    assert_eq!(ws.block(a).unwrap().next(), None);
    assert_eq!(ws.roots(), &[owner, c]);
}

#[test]
fn deleting_a_root_leaves_its_follower_as_root() {
    let mut ws = ws();
    let a = ws.create_block("lexical_variable_set").unwrap();
    let b = ws.create_block("lexical_variable_set").unwrap();
    ws.connect(a, Slot::Next, b).unwrap();

    assert_eq!(ws.delete(a, true).unwrap(), vec![a]);
    assert_eq!(ws.roots(), &[b]);
}

#[test]
fn undo_and_redo_delete() {
    let mut ws = ws();
    let (_, a, b, n, c) = chain(&mut ws);
    let before = ws.to_document();

    ws.delete(b, true).unwrap();
    let after = ws.to_document();

    assert!(ws.undo());
    assert_eq!(ws.to_document(), before);
    assert_eq!(ws.block(a).unwrap().next(), Some(b));
    assert_eq!(ws.block(b).unwrap().input_target("VALUE"), Some(n));
    assert_eq!(ws.block(b).unwrap().next(), Some(c));

    assert!(ws.redo());
    assert_eq!(ws.to_document(), after);
}

#[test]
fn undo_restores_root_position() {
    let mut ws = ws();
    let sub = ws.create_block("math_subtract").unwrap();
    let n = ws.create_block("math_number").unwrap();
    let m = ws.create_block("math_number").unwrap();
    ws.connect(sub, Slot::input("A"), n).unwrap();
    assert_eq!(ws.roots(), &[sub, m]);

    ws.undo();
    assert_eq!(ws.roots(), &[sub, n, m]);
}

#[test]
fn new_mutation_clears_redo() {
    let mut ws = ws();
    let a = ws.create_block("math_number").unwrap();
    assert!(ws.undo());
    assert!(ws.block(a).is_none());
    assert!(ws.can_redo());

    ws.create_block("math_number").unwrap();
    assert!(!ws.can_redo());
    assert!(!ws.redo());
}

#[test]
fn undo_on_empty_history_does_nothing() {
    let mut ws = ws();
    assert!(!ws.undo());
    assert!(!ws.redo());
}

#[test]
fn clear_is_one_undoable_step() {
    let mut ws = ws();
    chain(&mut ws);
    ws.create_block("text").unwrap();
    let before = ws.to_document();

    let removed = ws.clear();
    assert_eq!(removed.len(), 6);
    assert!(ws.is_empty());
    assert!(ws.roots().is_empty());

    assert!(ws.undo());
    assert_eq!(ws.to_document(), before);
}

#[test]
fn set_field_is_undoable() {
    let mut ws = ws();
    let n = ws.create_block("math_number").unwrap();
    ws.set_field(n, "NUM", "42").unwrap();
    assert_eq!(ws.block(n).unwrap().field("NUM"), Some("42"));

    ws.undo();
    assert_eq!(ws.block(n).unwrap().field("NUM"), Some("0"));
    assert_eq!(
        ws.set_field(n, "TEXT", "x"),
        Err(GraphError::UnknownField {
            block: n,
            field: "TEXT".to_string()
        })
    );
}

#[test]
fn disconnect_returns_detached_root() {
    let mut ws = ws();
    let sub = ws.create_block("math_subtract").unwrap();
    let n = ws.create_block("math_number").unwrap();
    let m = ws.create_block("math_number").unwrap();
    ws.connect(sub, Slot::input("B"), n).unwrap();

    assert_eq!(ws.disconnect(sub, &Slot::input("B")), Some(n));
    assert_eq!(ws.roots(), &[sub, m, n]);
    assert_eq!(ws.disconnect(sub, &Slot::input("B")), None);
    assert_eq!(ws.disconnect(BlockId(404), &Slot::Next), None);
}

#[test]
fn variadic_blocks_take_item_count() {
    let mut ws = ws();
    let list = ws.create_block_with_items("lists_create_with", 3).unwrap();
    let block = ws.block(list).unwrap();
    assert_eq!(block.items(), 3);
    let names: Vec<&str> = block.inputs().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["ADD0", "ADD1", "ADD2"]);

    let join = ws.create_block("text_join").unwrap();
    assert_eq!(ws.block(join).unwrap().items(), 2);
}

#[test]
fn load_blockly_json() {
    let json = r#"{"blocks": {"languageVersion": 0, "blocks": [
        {"type": "global_declaration", "id": "x", "fields": {"NAME": "count"},
         "inputs": {"VALUE": {"block": {"type": "math_number", "fields": {"NUM": 5}}}}},
        {"type": "lists_create_with", "extraState": {"itemCount": 3}}
    ]}}"#;
    let ws = Workspace::from_json(Arc::new(BlockCatalog::builtin()), json).unwrap();

    assert_eq!(ws.roots().len(), 2);
    let global = ws.block(ws.roots()[0]).unwrap();
    assert_eq!(global.field("NAME"), Some("count"));
    let value = ws.block(global.input_target("VALUE").unwrap()).unwrap();
    assert_eq!(value.field("NUM"), Some("5"));
    assert_eq!(ws.block(ws.roots()[1]).unwrap().items(), 3);
    assert!(!ws.can_undo());
}

#[test]
fn saved_json_loads_back_identically() {
    let mut ws = ws();
    chain(&mut ws);
    let json = ws.to_json().unwrap();
    let loaded = Workspace::from_json(Arc::new(BlockCatalog::builtin()), &json).unwrap();
    assert_eq!(loaded.all_blocks().count(), 5);
    assert_eq!(loaded.to_document(), ws.to_document());
}

#[test]
fn json_with_unknown_block_fails() {
    let json = r#"{"blocks": {"blocks": [{"type": "mystery"}]}}"#;
    let err = Workspace::from_json(Arc::new(BlockCatalog::builtin()), json).unwrap_err();
    assert!(matches!(
        err,
        DocumentError::Graph(GraphError::UnknownBlockType(_))
    ));
}

#[test]
fn name_fields_refuse_what_would_not_read_back_as_a_symbol() {
    let mut ws = ws();
    let global = ws.create_block("global_declaration").unwrap();
    for bad in ["my var", "", "x)", "(y", "it's", "#t", "a\"b"] {
        assert_eq!(
            ws.set_field(global, "NAME", bad),
            Err(GraphError::InvalidName {
                field: "NAME".to_string(),
                value: bad.to_string()
            })
        );
    }
    assert_eq!(ws.block(global).unwrap().field("NAME"), Some("name"));
    assert!(!ws.can_undo());

    ws.set_field(global, "NAME", "my_var").unwrap();
    assert_eq!(ws.block(global).unwrap().field("NAME"), Some("my_var"));
}

#[test]
fn field_kinds_follow_the_catalog() {
    let mut ws = ws();
    let get = ws.create_block("lexical_variable_get").unwrap();
    ws.set_field(get, "VAR", "global total").unwrap();
    ws.set_field(get, "VAR", "n").unwrap();
    assert!(matches!(
        ws.set_field(get, "VAR", "global two words"),
        Err(GraphError::InvalidName { .. })
    ));

    let def = ws.create_block("procedures_defreturn").unwrap();
    ws.set_field(def, "PARAMS", "a, b,c").unwrap();
    ws.set_field(def, "PARAMS", "").unwrap();
    assert!(matches!(
        ws.set_field(def, "PARAMS", "a, b c"),
        Err(GraphError::InvalidName { .. })
    ));

    let event = ws.create_block("component_event").unwrap();
    assert!(matches!(
        ws.set_field(event, "EVENT", "Click) (def g$x 1"),
        Err(GraphError::InvalidName { .. })
    ));

    // free text is quoted by its rule
    let text = ws.create_block("text").unwrap();
    ws.set_field(text, "TEXT", "it's (fine)").unwrap();
}

#[test]
fn document_with_bad_name_is_rejected() {
    let json = r#"{"blocks": {"blocks": [
        {"type": "global_declaration", "fields": {"NAME": "my var"}}
    ]}}"#;
    let err = Workspace::from_json(Arc::new(BlockCatalog::builtin()), json).unwrap_err();
    assert!(matches!(err, DocumentError::Graph(GraphError::InvalidName { .. })));
}

#[test]
fn item_count_is_capped() {
    let mut ws = ws();
    assert_eq!(
        ws.create_block_with_items("math_add", MAX_ITEMS + 1),
        Err(GraphError::TooManyItems {
            requested: MAX_ITEMS + 1,
            limit: MAX_ITEMS
        })
    );
    assert!(ws.is_empty());
    let add = ws.create_block_with_items("math_add", MAX_ITEMS).unwrap();
    assert_eq!(ws.block(add).unwrap().items(), MAX_ITEMS);

    let json = r#"{"blocks": {"blocks": [
        {"type": "lists_create_with", "extraState": {"items": 4000000000}}
    ]}}"#;
    let err = Workspace::from_json(Arc::new(BlockCatalog::builtin()), json).unwrap_err();
    assert!(matches!(
        err,
        DocumentError::Graph(GraphError::TooManyItems { requested: 4_000_000_000, .. })
    ));
}
