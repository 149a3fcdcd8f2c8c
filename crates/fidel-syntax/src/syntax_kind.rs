use crate::SyntaxSet;
use crate::layout::{Layout, SlotSpec};

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    L_PAREN,
    R_PAREN,
    L_BRACE,
    R_BRACE,
    COMMA,
    COLON,
    ARROW,
    EQ,
    PLUS,
    MINUS,
    STAR,
    SLASH,

    FUNC_KW,
    LET_KW,
    RETURN_KW,
    IDENT,
    INT_NUMBER,

    UNKNOWN,
    EOF,

    SOURCE_FILE,
    ITEM_LIST,
    FUNC_DECL,
    PARAM_CLAUSE,
    PARAM_LIST,
    PARAM,
    RETURN_CLAUSE,
    TYPE_NAME,
    CODE_BLOCK,
    STMT_LIST,
    LET_DECL,
    TYPE_ANNOTATION,
    INITIALIZER_CLAUSE,
    RETURN_STMT,
    EXPR_STMT,
    BINARY_EXPR,
    PREFIX_EXPR,
    PAREN_EXPR,
    CALL_EXPR,
    ARG_CLAUSE,
    ARG_LIST,
    ARG,
    LITERAL_EXPR,
    NAME_EXPR,
    MISSING_EXPR,
    UNEXPECTED,
    TOMBSTONE,
}

use SyntaxKind::*;

/// Kinds that may fill an expression slot.
pub const EXPR: SyntaxSet = SyntaxSet::new([
    BINARY_EXPR,
    PREFIX_EXPR,
    PAREN_EXPR,
    CALL_EXPR,
    LITERAL_EXPR,
    NAME_EXPR,
    MISSING_EXPR,
]);

/// Binary operator tokens.
pub const BINARY_OPERATORS: SyntaxSet = SyntaxSet::new([PLUS, MINUS, STAR, SLASH]);

const SOURCE_FILE_LAYOUT: &[SlotSpec] =
    &[SlotSpec::required("items", ITEM_LIST), SlotSpec::required("eof", EOF)];

const FUNC_DECL_LAYOUT: &[SlotSpec] = &[
    SlotSpec::required("func_kw", FUNC_KW),
    SlotSpec::required("name", IDENT),
    SlotSpec::unexpected("unexpected_before_params"),
    SlotSpec::required("params", PARAM_CLAUSE),
    SlotSpec::optional("return_clause", RETURN_CLAUSE),
    SlotSpec::required("body", CODE_BLOCK),
];

const PARAM_CLAUSE_LAYOUT: &[SlotSpec] = &[
    SlotSpec::required("l_paren", L_PAREN),
    SlotSpec::required("params", PARAM_LIST),
    SlotSpec::unexpected("unexpected_before_r_paren"),
    SlotSpec::required("r_paren", R_PAREN),
];

const PARAM_LAYOUT: &[SlotSpec] = &[
    SlotSpec::required("name", IDENT),
    SlotSpec::required("colon", COLON),
    SlotSpec::required("ty", TYPE_NAME),
    SlotSpec::optional("trailing_comma", COMMA),
];

const RETURN_CLAUSE_LAYOUT: &[SlotSpec] =
    &[SlotSpec::required("arrow", ARROW), SlotSpec::required("ty", TYPE_NAME)];

const TYPE_NAME_LAYOUT: &[SlotSpec] = &[SlotSpec::required("name", IDENT)];

const CODE_BLOCK_LAYOUT: &[SlotSpec] = &[
    SlotSpec::required("l_brace", L_BRACE),
    SlotSpec::required("stmts", STMT_LIST),
    SlotSpec::required("r_brace", R_BRACE),
];

const LET_DECL_LAYOUT: &[SlotSpec] = &[
    SlotSpec::required("let_kw", LET_KW),
    SlotSpec::required("name", IDENT),
    SlotSpec::optional("type_annotation", TYPE_ANNOTATION),
    SlotSpec::optional("initializer", INITIALIZER_CLAUSE),
];

const TYPE_ANNOTATION_LAYOUT: &[SlotSpec] =
    &[SlotSpec::required("colon", COLON), SlotSpec::required("ty", TYPE_NAME)];

const INITIALIZER_CLAUSE_LAYOUT: &[SlotSpec] =
    &[SlotSpec::required("eq", EQ), SlotSpec::expr("value")];

const RETURN_STMT_LAYOUT: &[SlotSpec] =
    &[SlotSpec::required("return_kw", RETURN_KW), SlotSpec::optional_expr("value")];

const EXPR_STMT_LAYOUT: &[SlotSpec] = &[SlotSpec::expr("expr")];

const BINARY_EXPR_LAYOUT: &[SlotSpec] = &[
    SlotSpec::expr("lhs"),
    SlotSpec::one_of("op", BINARY_OPERATORS, PLUS),
    SlotSpec::expr("rhs"),
];

const PREFIX_EXPR_LAYOUT: &[SlotSpec] =
    &[SlotSpec::required("op", MINUS), SlotSpec::expr("operand")];

const PAREN_EXPR_LAYOUT: &[SlotSpec] = &[
    SlotSpec::required("l_paren", L_PAREN),
    SlotSpec::expr("expr"),
    SlotSpec::required("r_paren", R_PAREN),
];

const CALL_EXPR_LAYOUT: &[SlotSpec] =
    &[SlotSpec::expr("callee"), SlotSpec::required("args", ARG_CLAUSE)];

const ARG_CLAUSE_LAYOUT: &[SlotSpec] = &[
    SlotSpec::required("l_paren", L_PAREN),
    SlotSpec::required("args", ARG_LIST),
    SlotSpec::required("r_paren", R_PAREN),
];

const ARG_LAYOUT: &[SlotSpec] =
    &[SlotSpec::expr("value"), SlotSpec::optional("trailing_comma", COMMA)];

const LITERAL_EXPR_LAYOUT: &[SlotSpec] = &[SlotSpec::required("value", INT_NUMBER)];

const NAME_EXPR_LAYOUT: &[SlotSpec] = &[SlotSpec::required("name", IDENT)];

impl SyntaxKind {
    /// Returns `true` for leaf kinds.
    #[inline]
    pub const fn is_token(self) -> bool {
        (self as u16) <= (EOF as u16)
    }

    /// Returns `true` for node kinds, including collections.
    #[inline]
    pub const fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns `true` for homogeneous repetition nodes.
    #[inline]
    pub const fn is_collection(self) -> bool {
        matches!(self, ITEM_LIST | PARAM_LIST | STMT_LIST | ARG_LIST | UNEXPECTED)
    }

    /// Returns `true` for the kinds that may fill an expression slot.
    #[inline]
    pub const fn is_expr(self) -> bool {
        EXPR.contains(self)
    }

    /// The slot layout every node of this kind follows.
    pub const fn layout(self) -> Layout {
        let slots = match self {
            SOURCE_FILE => SOURCE_FILE_LAYOUT,
            FUNC_DECL => FUNC_DECL_LAYOUT,
            PARAM_CLAUSE => PARAM_CLAUSE_LAYOUT,
            PARAM => PARAM_LAYOUT,
            RETURN_CLAUSE => RETURN_CLAUSE_LAYOUT,
            TYPE_NAME => TYPE_NAME_LAYOUT,
            CODE_BLOCK => CODE_BLOCK_LAYOUT,
            LET_DECL => LET_DECL_LAYOUT,
            TYPE_ANNOTATION => TYPE_ANNOTATION_LAYOUT,
            INITIALIZER_CLAUSE => INITIALIZER_CLAUSE_LAYOUT,
            RETURN_STMT => RETURN_STMT_LAYOUT,
            EXPR_STMT => EXPR_STMT_LAYOUT,
            BINARY_EXPR => BINARY_EXPR_LAYOUT,
            PREFIX_EXPR => PREFIX_EXPR_LAYOUT,
            PAREN_EXPR => PAREN_EXPR_LAYOUT,
            CALL_EXPR => CALL_EXPR_LAYOUT,
            ARG_CLAUSE => ARG_CLAUSE_LAYOUT,
            ARG => ARG_LAYOUT,
            LITERAL_EXPR => LITERAL_EXPR_LAYOUT,
            NAME_EXPR => NAME_EXPR_LAYOUT,
            MISSING_EXPR | TOMBSTONE => &[],
            ITEM_LIST => {
                return Layout::Collection(SyntaxSet::new([FUNC_DECL, LET_DECL, UNEXPECTED]));
            }
            PARAM_LIST => return Layout::Collection(SyntaxSet::new([PARAM])),
            STMT_LIST => {
                return Layout::Collection(SyntaxSet::new([
                    LET_DECL,
                    RETURN_STMT,
                    EXPR_STMT,
                    UNEXPECTED,
                ]));
            }
            ARG_LIST => return Layout::Collection(SyntaxSet::new([ARG])),
            UNEXPECTED => return Layout::Collection(SyntaxSet::ALL),
            _ => return Layout::Token,
        };
        Layout::Fixed(slots)
    }

    /// The source text of tokens that can only ever be spelled one way.
    pub const fn fixed_text(self) -> Option<&'static str> {
        Some(match self {
            L_PAREN => "(",
            R_PAREN => ")",
            L_BRACE => "{",
            R_BRACE => "}",
            COMMA => ",",
            COLON => ":",
            ARROW => "->",
            EQ => "=",
            PLUS => "+",
            MINUS => "-",
            STAR => "*",
            SLASH => "/",
            FUNC_KW => "func",
            LET_KW => "let",
            RETURN_KW => "return",
            _ => return None,
        })
    }

    /// A human readable name, used in diagnostics.
    pub fn describe(self) -> &'static str {
        if let Some(text) = self.fixed_text() {
            return text;
        }
        match self {
            IDENT => "identifier",
            INT_NUMBER => "integer literal",
            UNKNOWN => "unknown character",
            EOF => "end of file",
            SOURCE_FILE => "source file",
            FUNC_DECL => "function declaration",
            PARAM_CLAUSE => "parameter clause",
            PARAM => "parameter",
            RETURN_CLAUSE => "return clause",
            TYPE_NAME => "type",
            CODE_BLOCK => "code block",
            LET_DECL => "variable declaration",
            TYPE_ANNOTATION => "type annotation",
            INITIALIZER_CLAUSE => "initializer",
            RETURN_STMT => "return statement",
            EXPR_STMT => "expression statement",
            ARG_CLAUSE => "argument clause",
            ARG => "argument",
            ITEM_LIST | PARAM_LIST | STMT_LIST | ARG_LIST => "list",
            UNEXPECTED => "unexpected text",
            TOMBSTONE => "tombstone",
            _ => "expression",
        }
    }
}
