//! Visual encoding registry: a static table assigning every node kind a
//! display category (and through it a fill color), plus the fixed legend.
//!
//! Lookups are total: kinds missing from the table fall back to the
//! `Unknown` category, which renders white. The registry itself is pure
//! data; recording which unknown kinds were actually encountered is the
//! caller's business (see `Diagnostics` in the layout engine).

use phf::phf_map;

/// Display category of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    ModuleLevel,
    Statement,
    Expression,
    NameConstant,
    Operator,
    Container,
    Unknown,
}

impl Category {
    /// Fill color used for boxes and cluster regions of this category.
    pub fn color(self) -> &'static str {
        match self {
            Category::ModuleLevel => "lightblue",
            Category::Statement => "#90ee90",
            Category::Expression => "lightyellow",
            Category::NameConstant => "lightpink",
            Category::Operator => "orange",
            Category::Container => "lightgrey",
            Category::Unknown => "white",
        }
    }
}

static KIND_CATEGORIES: phf::Map<&'static str, Category> = phf_map! {
    // Module level
    "module" => Category::ModuleLevel,
    // Statements
    "function_definition" => Category::Statement,
    "async_function_definition" => Category::Statement,
    "class_definition" => Category::Statement,
    "decorated_definition" => Category::Statement,
    "return_statement" => Category::Statement,
    "delete_statement" => Category::Statement,
    "assignment" => Category::Statement,
    "augmented_assignment" => Category::Statement,
    "for_statement" => Category::Statement,
    "while_statement" => Category::Statement,
    "if_statement" => Category::Statement,
    "elif_clause" => Category::Statement,
    "else_clause" => Category::Statement,
    "with_statement" => Category::Statement,
    "try_statement" => Category::Statement,
    "except_clause" => Category::Statement,
    "finally_clause" => Category::Statement,
    "raise_statement" => Category::Statement,
    "assert_statement" => Category::Statement,
    "import_statement" => Category::Statement,
    "import_from_statement" => Category::Statement,
    "future_import_statement" => Category::Statement,
    "global_statement" => Category::Statement,
    "nonlocal_statement" => Category::Statement,
    "expression_statement" => Category::Statement,
    "pass_statement" => Category::Statement,
    "break_statement" => Category::Statement,
    "continue_statement" => Category::Statement,
    "match_statement" => Category::Statement,
    // Expressions
    "boolean_operator" => Category::Expression,
    "named_expression" => Category::Expression,
    "binary_operator" => Category::Expression,
    "unary_operator" => Category::Expression,
    "not_operator" => Category::Expression,
    "lambda" => Category::Expression,
    "conditional_expression" => Category::Expression,
    "list_comprehension" => Category::Expression,
    "set_comprehension" => Category::Expression,
    "dictionary_comprehension" => Category::Expression,
    "generator_expression" => Category::Expression,
    "for_in_clause" => Category::Expression,
    "if_clause" => Category::Expression,
    "await" => Category::Expression,
    "yield" => Category::Expression,
    "comparison_operator" => Category::Expression,
    "call" => Category::Expression,
    "keyword_argument" => Category::Expression,
    "decorator" => Category::Expression,
    "attribute" => Category::Expression,
    "subscript" => Category::Expression,
    "slice" => Category::Expression,
    "list_splat" => Category::Expression,
    "dictionary_splat" => Category::Expression,
    "as_pattern" => Category::Expression,
    "interpolation" => Category::Expression,
    // Names and constants
    "identifier" => Category::NameConstant,
    "integer" => Category::NameConstant,
    "float" => Category::NameConstant,
    "string" => Category::NameConstant,
    "string_content" => Category::NameConstant,
    "true" => Category::NameConstant,
    "false" => Category::NameConstant,
    "none" => Category::NameConstant,
    "ellipsis" => Category::NameConstant,
    "dotted_name" => Category::NameConstant,
    "aliased_import" => Category::NameConstant,
    "relative_import" => Category::NameConstant,
    // Containers
    "list" => Category::Container,
    "tuple" => Category::Container,
    "dictionary" => Category::Container,
    "set" => Category::Container,
    "pair" => Category::Container,
    "expression_list" => Category::Container,
    "pattern_list" => Category::Container,
    "tuple_pattern" => Category::Container,
    "list_pattern" => Category::Container,
    // Operator symbols (scalar attributes; listed so the legend resolves)
    "add" => Category::Operator,
    "sub" => Category::Operator,
    "mult" => Category::Operator,
    "div" => Category::Operator,
    "floordiv" => Category::Operator,
    "mod" => Category::Operator,
    "pow" => Category::Operator,
    "lshift" => Category::Operator,
    "rshift" => Category::Operator,
    "bitor" => Category::Operator,
    "bitxor" => Category::Operator,
    "bitand" => Category::Operator,
    "matmult" => Category::Operator,
    "eq" => Category::Operator,
    "noteq" => Category::Operator,
    "lt" => Category::Operator,
    "lte" => Category::Operator,
    "gt" => Category::Operator,
    "gte" => Category::Operator,
    "is" => Category::Operator,
    "isnot" => Category::Operator,
    "in" => Category::Operator,
    "notin" => Category::Operator,
    "and" => Category::Operator,
    "or" => Category::Operator,
    "not" => Category::Operator,
    "invert" => Category::Operator,
    "uadd" => Category::Operator,
    "usub" => Category::Operator,
};

/// Category of a kind, `Unknown` if the kind is not in the table.
pub fn category_of(kind: &str) -> Category {
    KIND_CATEGORIES
        .get(kind)
        .copied()
        .unwrap_or(Category::Unknown)
}

/// Fill color of a kind, `"white"` if the kind is not in the table.
pub fn color_of(kind: &str) -> &'static str {
    category_of(kind).color()
}

/// True if the kind has a registered encoding.
pub fn is_known(kind: &str) -> bool {
    KIND_CATEGORIES.contains_key(kind)
}

/// Legend rows: display label plus a representative kind whose color the
/// swatch shows. The order drives the legend layout and never changes.
pub static LEGEND: [(&str, &str); 6] = [
    ("module level", "module"),
    ("statement", "function_definition"),
    ("expression", "binary_operator"),
    ("name / constant", "identifier"),
    ("operator", "add"),
    ("container", "list"),
];
