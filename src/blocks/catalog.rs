//! Block shapes: which inputs, connections, type checks and fields a block
//! type has. The catalog is read-only once a workspace is created.

use std::collections::BTreeMap;

use super::{Block, BlockId, Check, Input, InputKind};

pub const NUMBER: &str = "Number";
pub const STRING: &str = "String";
pub const BOOLEAN: &str = "Boolean";
pub const LIST: &str = "Array";
pub const COMPONENT: &str = "Component";

/// Upper bound on variadic items per block.
pub const MAX_ITEMS: usize = 1024;

/// How a field's text ends up in generated code, and so which values it
/// accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Quoted or parsed by the block's rule. Anything goes.
    Text,
    /// Spliced in as a single symbol.
    Name,
    /// Comma-separated names, possibly none.
    Names,
    /// A name, optionally marked `global `.
    Variable,
}

impl FieldKind {
    pub fn accepts(self, value: &str) -> bool {
        match self {
            FieldKind::Text => true,
            FieldKind::Name => is_name(value),
            FieldKind::Names => value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .all(is_name),
            FieldKind::Variable => is_name(value.strip_prefix("global ").unwrap_or(value)),
        }
    }
}

/// Whether `value`, trimmed, reads back as exactly one symbol.
pub fn is_name(value: &str) -> bool {
    let name = value.trim();
    !name.is_empty()
        && !name.starts_with('#')
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\'' | ';'))
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub name: String,
    pub kind: InputKind,
    pub check: Check,
    pub required: bool,
}

/// Variadic value inputs named `{prefix}0`, `{prefix}1`, ... appended
/// after the fixed inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSpec {
    pub prefix: String,
    pub check: Check,
    pub required: bool,
    pub default_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockShape {
    pub output: Option<Check>,
    pub previous: Option<Check>,
    pub next: bool,
    pub fields: Vec<(String, String)>,
    pub field_kinds: BTreeMap<String, FieldKind>,
    pub inputs: Vec<InputSpec>,
    pub items: Option<ItemSpec>,
}

impl BlockShape {
    /// A block that can only sit at the top level.
    pub fn top_level() -> Self {
        Self::default()
    }

    /// An expression block producing a value of the given check.
    pub fn value(check: Check) -> Self {
        Self {
            output: Some(check),
            ..Self::default()
        }
    }

    /// A statement block with previous and next connections.
    pub fn statement() -> Self {
        Self {
            previous: Some(Check::any()),
            next: true,
            ..Self::default()
        }
    }

    /// A field holding a name.
    pub fn field(self, name: &str, default: &str) -> Self {
        self.field_of(FieldKind::Name, name, default)
    }

    pub fn text_field(self, name: &str, default: &str) -> Self {
        self.field_of(FieldKind::Text, name, default)
    }

    pub fn names_field(self, name: &str, default: &str) -> Self {
        self.field_of(FieldKind::Names, name, default)
    }

    pub fn variable_field(self, name: &str, default: &str) -> Self {
        self.field_of(FieldKind::Variable, name, default)
    }

    fn field_of(mut self, kind: FieldKind, name: &str, default: &str) -> Self {
        self.fields.push((name.to_string(), default.to_string()));
        self.field_kinds.insert(name.to_string(), kind);
        self
    }

    pub fn field_kind(&self, name: &str) -> FieldKind {
        self.field_kinds.get(name).copied().unwrap_or(FieldKind::Text)
    }

    pub fn input(mut self, name: &str, check: Check) -> Self {
        self.inputs.push(InputSpec {
            name: name.to_string(),
            kind: InputKind::Value,
            check,
            required: true,
        });
        self
    }

    pub fn optional_input(mut self, name: &str, check: Check) -> Self {
        self.inputs.push(InputSpec {
            name: name.to_string(),
            kind: InputKind::Value,
            check,
            required: false,
        });
        self
    }

    pub fn body(mut self, name: &str) -> Self {
        self.inputs.push(InputSpec {
            name: name.to_string(),
            kind: InputKind::Statement,
            check: Check::any(),
            required: false,
        });
        self
    }

    pub fn items(mut self, prefix: &str, check: Check, required: bool, default_count: usize) -> Self {
        self.items = Some(ItemSpec {
            prefix: prefix.to_string(),
            check,
            required,
            default_count,
        });
        self
    }

    pub fn default_items(&self) -> usize {
        self.items.as_ref().map(|i| i.default_count).unwrap_or(0)
    }

    pub(crate) fn instantiate(&self, id: BlockId, block_type: &str, items: usize) -> Block {
        let mut inputs: Vec<Input> = self
            .inputs
            .iter()
            .map(|spec| Input {
                name: spec.name.clone(),
                kind: spec.kind,
                check: spec.check.clone(),
                required: spec.required,
                target: None,
            })
            .collect();
        let count = if self.items.is_some() { items } else { 0 };
        if let Some(spec) = &self.items {
            inputs.extend((0..count).map(|i| Input {
                name: format!("{}{}", spec.prefix, i),
                kind: InputKind::Value,
                check: spec.check.clone(),
                required: spec.required,
                target: None,
            }));
        }
        Block {
            id,
            block_type: block_type.to_string(),
            fields: self.fields.iter().cloned().collect(),
            inputs,
            output: self.output.clone(),
            previous: self.previous.clone(),
            has_next: self.next,
            next: None,
            parent: None,
            items: count,
        }
    }
}

/// Maps block type tags to shapes.
#[derive(Debug, Clone, Default)]
pub struct BlockCatalog {
    shapes: BTreeMap<String, BlockShape>,
}

impl BlockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, block_type: &str, shape: BlockShape) {
        self.shapes.insert(block_type.to_string(), shape);
    }

    pub fn get(&self, block_type: &str) -> Option<&BlockShape> {
        self.shapes.get(block_type)
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.shapes.contains_key(block_type)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    /// Every block type the built-in generator rules know how to lower.
    pub fn builtin() -> Self {
        let number = || Check::of(&[NUMBER]);
        let string = || Check::of(&[STRING]);
        let boolean = || Check::of(&[BOOLEAN]);
        let list = || Check::of(&[LIST]);

        let mut catalog = Self::new();

        // math
        catalog.register("math_number", BlockShape::value(number()).text_field("NUM", "0"));
        catalog.register(
            "math_add",
            BlockShape::value(number()).items("NUM", number(), true, 2),
        );
        catalog.register(
            "math_multiply",
            BlockShape::value(number()).items("NUM", number(), true, 2),
        );
        catalog.register(
            "math_subtract",
            BlockShape::value(number()).input("A", number()).input("B", number()),
        );
        catalog.register(
            "math_division",
            BlockShape::value(number()).input("A", number()).input("B", number()),
        );
        catalog.register(
            "math_compare",
            BlockShape::value(boolean())
                .field("OP", "EQ")
                .input("A", Check::any())
                .input("B", Check::any()),
        );

        // logic
        catalog.register("logic_boolean", BlockShape::value(boolean()).field("BOOL", "TRUE"));
        catalog.register("logic_negate", BlockShape::value(boolean()).input("BOOL", boolean()));
        catalog.register(
            "logic_operation",
            BlockShape::value(boolean())
                .field("OP", "AND")
                .input("A", boolean())
                .input("B", boolean()),
        );
        catalog.register(
            "logic_compare",
            BlockShape::value(boolean())
                .field("OP", "EQ")
                .input("A", Check::any())
                .input("B", Check::any()),
        );

        // text
        catalog.register("text", BlockShape::value(string()).text_field("TEXT", ""));
        catalog.register(
            "text_join",
            BlockShape::value(string()).items("ADD", string(), true, 2),
        );
        catalog.register("text_length", BlockShape::value(number()).input("VALUE", string()));

        // lists
        catalog.register(
            "lists_create_with",
            BlockShape::value(list()).items("ADD", Check::any(), false, 2),
        );
        catalog.register(
            "lists_add_items",
            BlockShape::statement()
                .input("LIST", list())
                .items("ITEM", Check::any(), true, 1),
        );
        catalog.register(
            "lists_select_item",
            BlockShape::value(Check::any())
                .input("LIST", list())
                .input("NUM", number()),
        );
        catalog.register("lists_length", BlockShape::value(number()).input("LIST", list()));
        catalog.register("lists_is_empty", BlockShape::value(boolean()).input("LIST", list()));

        // controls
        catalog.register(
            "controls_if",
            BlockShape::statement().input("IF0", boolean()).body("DO0").body("ELSE"),
        );
        catalog.register(
            "controls_while",
            BlockShape::statement().input("TEST", boolean()).body("DO"),
        );
        catalog.register(
            "controls_forRange",
            BlockShape::statement()
                .field("VAR", "number")
                .input("START", number())
                .input("END", number())
                .input("STEP", number())
                .body("DO"),
        );
        catalog.register(
            "controls_forEach",
            BlockShape::statement()
                .field("VAR", "item")
                .input("LIST", list())
                .body("DO"),
        );
        catalog.register(
            "controls_choose",
            BlockShape::value(Check::any())
                .input("TEST", boolean())
                .input("THENRETURN", Check::any())
                .input("ELSERETURN", Check::any()),
        );
        catalog.register(
            "controls_do_then_return",
            BlockShape::value(Check::any())
                .body("STM")
                .input("VALUE", Check::any()),
        );
        catalog.register(
            "controls_eval_but_ignore",
            BlockShape::statement().input("VALUE", Check::any()),
        );

        // variables
        catalog.register(
            "global_declaration",
            BlockShape::top_level().field("NAME", "name").input("VALUE", Check::any()),
        );
        catalog.register(
            "lexical_variable_get",
            BlockShape::value(Check::any()).variable_field("VAR", "global name"),
        );
        catalog.register(
            "lexical_variable_set",
            BlockShape::statement()
                .variable_field("VAR", "global name")
                .input("VALUE", Check::any()),
        );

        // procedures
        catalog.register(
            "procedures_defnoreturn",
            BlockShape::top_level()
                .field("NAME", "procedure")
                .names_field("PARAMS", "")
                .body("STACK"),
        );
        catalog.register(
            "procedures_defreturn",
            BlockShape::top_level()
                .field("NAME", "procedure")
                .names_field("PARAMS", "")
                .input("RETURN", Check::any()),
        );
        catalog.register(
            "procedures_callnoreturn",
            BlockShape::statement()
                .field("PROCNAME", "procedure")
                .items("ARG", Check::any(), true, 0),
        );
        catalog.register(
            "procedures_callreturn",
            BlockShape::value(Check::any())
                .field("PROCNAME", "procedure")
                .items("ARG", Check::any(), true, 0),
        );

        // components
        catalog.register(
            "component_event",
            BlockShape::top_level()
                .field("COMPONENT", "Button1")
                .field("EVENT", "Click")
                .names_field("PARAMS", "")
                .body("DO"),
        );
        catalog.register(
            "component_set_property",
            BlockShape::statement()
                .field("COMPONENT", "Button1")
                .field("PROP", "Text")
                .field("TYPE", "text")
                .input("VALUE", Check::any()),
        );
        catalog.register(
            "component_get_property",
            BlockShape::value(Check::any())
                .field("COMPONENT", "Button1")
                .field("PROP", "Text"),
        );
        catalog.register(
            "component_method",
            BlockShape::statement()
                .field("COMPONENT", "Button1")
                .field("METHOD", "method")
                .items("ARG", Check::any(), true, 0),
        );
        catalog.register(
            "component_component_block",
            BlockShape::value(Check::of(&[COMPONENT])).field("COMPONENT", "Button1"),
        );

        catalog
    }
}
