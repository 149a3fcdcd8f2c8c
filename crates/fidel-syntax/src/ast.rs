//! Typed views over positioned nodes.
//!
//! Each view is a thin wrapper that checks the node kind once in `cast` and
//! then reads slots by position. A kind mismatch yields `None`, never a
//! half-usable view.

use std::marker::PhantomData;

use crate::SyntaxKind::{self, *};
use crate::{Arena, GreenNode, GreenToken, SyntaxCollection, SyntaxNode, SyntaxToken};

pub trait Node {
    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized;

    fn cast(syntax: SyntaxNode) -> Option<Self>
    where
        Self: Sized;

    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($($name:ident => $kind:ident,)*) => {$(
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl Node for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == $kind
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                Self::can_cast(syntax.kind()).then_some(Self(syntax))
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    )*};
}

ast_node! {
    SourceFile => SOURCE_FILE,
    FuncDecl => FUNC_DECL,
    ParamClause => PARAM_CLAUSE,
    Param => PARAM,
    ReturnClause => RETURN_CLAUSE,
    TypeName => TYPE_NAME,
    CodeBlock => CODE_BLOCK,
    LetDecl => LET_DECL,
    TypeAnnotation => TYPE_ANNOTATION,
    InitializerClause => INITIALIZER_CLAUSE,
    ReturnStmt => RETURN_STMT,
    ExprStmt => EXPR_STMT,
    BinaryExpr => BINARY_EXPR,
    PrefixExpr => PREFIX_EXPR,
    ParenExpr => PAREN_EXPR,
    CallExpr => CALL_EXPR,
    ArgClause => ARG_CLAUSE,
    Arg => ARG,
    LiteralExpr => LITERAL_EXPR,
    NameExpr => NAME_EXPR,
    MissingExpr => MISSING_EXPR,
    Unexpected => UNEXPECTED,
}

fn child<N: Node>(parent: &SyntaxNode, index: usize) -> Option<N> {
    if index >= parent.slot_count() {
        return None;
    }
    parent.child_node(index).and_then(N::cast)
}

fn token(parent: &SyntaxNode, index: usize) -> Option<SyntaxToken> {
    if index >= parent.slot_count() {
        return None;
    }
    parent.child_token(index)
}

fn list<N: Node>(parent: &SyntaxNode, index: usize) -> Option<AstList<N>> {
    if index >= parent.slot_count() {
        return None;
    }
    parent.child_node(index).and_then(AstList::cast)
}

impl SourceFile {
    pub fn items(&self) -> Option<AstList<Item>> {
        list(&self.0, 0)
    }

    pub fn eof(&self) -> Option<SyntaxToken> {
        token(&self.0, 1)
    }
}

impl FuncDecl {
    pub fn func_kw(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, 1)
    }

    pub fn unexpected_before_params(&self) -> Option<Unexpected> {
        child(&self.0, 2)
    }

    pub fn params(&self) -> Option<ParamClause> {
        child(&self.0, 3)
    }

    pub fn return_clause(&self) -> Option<ReturnClause> {
        child(&self.0, 4)
    }

    pub fn body(&self) -> Option<CodeBlock> {
        child(&self.0, 5)
    }

    pub fn with_name(&self, arena: &Arena, name: GreenToken) -> Self {
        Self(self.0.replace_child(arena, 1, Some(name.into())))
    }

    pub fn with_return_clause(&self, arena: &Arena, clause: Option<GreenNode>) -> Self {
        Self(self.0.replace_child(arena, 4, clause.map(Into::into)))
    }

    pub fn with_body(&self, arena: &Arena, body: Option<GreenNode>) -> Self {
        Self(self.0.replace_child(arena, 5, body.map(Into::into)))
    }
}

impl ParamClause {
    pub fn l_paren(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn params(&self) -> Option<AstList<Param>> {
        list(&self.0, 1)
    }

    pub fn unexpected_before_r_paren(&self) -> Option<Unexpected> {
        child(&self.0, 2)
    }

    pub fn r_paren(&self) -> Option<SyntaxToken> {
        token(&self.0, 3)
    }
}

impl Param {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn colon(&self) -> Option<SyntaxToken> {
        token(&self.0, 1)
    }

    pub fn ty(&self) -> Option<TypeName> {
        child(&self.0, 2)
    }

    pub fn trailing_comma(&self) -> Option<SyntaxToken> {
        token(&self.0, 3)
    }
}

impl ReturnClause {
    pub fn arrow(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn ty(&self) -> Option<TypeName> {
        child(&self.0, 1)
    }
}

impl TypeName {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }
}

impl CodeBlock {
    pub fn l_brace(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn stmts(&self) -> Option<AstList<Stmt>> {
        list(&self.0, 1)
    }

    pub fn r_brace(&self) -> Option<SyntaxToken> {
        token(&self.0, 2)
    }
}

impl LetDecl {
    pub fn let_kw(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, 1)
    }

    pub fn type_annotation(&self) -> Option<TypeAnnotation> {
        child(&self.0, 2)
    }

    pub fn initializer(&self) -> Option<InitializerClause> {
        child(&self.0, 3)
    }

    pub fn with_type_annotation(&self, arena: &Arena, annotation: Option<GreenNode>) -> Self {
        Self(self.0.replace_child(arena, 2, annotation.map(Into::into)))
    }

    pub fn with_initializer(&self, arena: &Arena, initializer: Option<GreenNode>) -> Self {
        Self(self.0.replace_child(arena, 3, initializer.map(Into::into)))
    }
}

impl TypeAnnotation {
    pub fn colon(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn ty(&self) -> Option<TypeName> {
        child(&self.0, 1)
    }
}

impl InitializerClause {
    pub fn eq_token(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn value(&self) -> Option<Expr> {
        child(&self.0, 1)
    }
}

impl ReturnStmt {
    pub fn return_kw(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn value(&self) -> Option<Expr> {
        child(&self.0, 1)
    }
}

impl ExprStmt {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.0, 0)
    }
}

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expr> {
        child(&self.0, 0)
    }

    pub fn op(&self) -> Option<SyntaxToken> {
        token(&self.0, 1)
    }

    pub fn rhs(&self) -> Option<Expr> {
        child(&self.0, 2)
    }

    pub fn with_lhs(&self, arena: &Arena, lhs: Option<GreenNode>) -> Self {
        Self(self.0.replace_child(arena, 0, lhs.map(Into::into)))
    }

    pub fn with_rhs(&self, arena: &Arena, rhs: Option<GreenNode>) -> Self {
        Self(self.0.replace_child(arena, 2, rhs.map(Into::into)))
    }
}

impl PrefixExpr {
    pub fn op(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn operand(&self) -> Option<Expr> {
        child(&self.0, 1)
    }
}

impl ParenExpr {
    pub fn l_paren(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn expr(&self) -> Option<Expr> {
        child(&self.0, 1)
    }

    pub fn r_paren(&self) -> Option<SyntaxToken> {
        token(&self.0, 2)
    }
}

impl CallExpr {
    pub fn callee(&self) -> Option<Expr> {
        child(&self.0, 0)
    }

    pub fn args(&self) -> Option<ArgClause> {
        child(&self.0, 1)
    }
}

impl ArgClause {
    pub fn l_paren(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn args(&self) -> Option<AstList<Arg>> {
        list(&self.0, 1)
    }

    pub fn r_paren(&self) -> Option<SyntaxToken> {
        token(&self.0, 2)
    }
}

impl Arg {
    pub fn value(&self) -> Option<Expr> {
        child(&self.0, 0)
    }

    pub fn trailing_comma(&self) -> Option<SyntaxToken> {
        token(&self.0, 1)
    }
}

impl LiteralExpr {
    pub fn value(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }
}

impl NameExpr {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }
}

impl Unexpected {
    pub fn elements(&self) -> SyntaxCollection {
        SyntaxCollection(self.0.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Func(FuncDecl),
    Let(LetDecl),
    Unexpected(Unexpected),
}

impl Node for Item {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(kind, FUNC_DECL | LET_DECL | UNEXPECTED)
    }

    fn cast(syntax: SyntaxNode) -> Option<Self> {
        match syntax.kind() {
            FUNC_DECL => Some(Item::Func(FuncDecl(syntax))),
            LET_DECL => Some(Item::Let(LetDecl(syntax))),
            UNEXPECTED => Some(Item::Unexpected(Unexpected(syntax))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Item::Func(it) => it.syntax(),
            Item::Let(it) => it.syntax(),
            Item::Unexpected(it) => it.syntax(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stmt {
    Let(LetDecl),
    Return(ReturnStmt),
    Expr(ExprStmt),
    Unexpected(Unexpected),
}

impl Node for Stmt {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(kind, LET_DECL | RETURN_STMT | EXPR_STMT | UNEXPECTED)
    }

    fn cast(syntax: SyntaxNode) -> Option<Self> {
        match syntax.kind() {
            LET_DECL => Some(Stmt::Let(LetDecl(syntax))),
            RETURN_STMT => Some(Stmt::Return(ReturnStmt(syntax))),
            EXPR_STMT => Some(Stmt::Expr(ExprStmt(syntax))),
            UNEXPECTED => Some(Stmt::Unexpected(Unexpected(syntax))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Stmt::Let(it) => it.syntax(),
            Stmt::Return(it) => it.syntax(),
            Stmt::Expr(it) => it.syntax(),
            Stmt::Unexpected(it) => it.syntax(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Binary(BinaryExpr),
    Prefix(PrefixExpr),
    Paren(ParenExpr),
    Call(CallExpr),
    Literal(LiteralExpr),
    Name(NameExpr),
    Missing(MissingExpr),
}

impl Node for Expr {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_expr()
    }

    fn cast(syntax: SyntaxNode) -> Option<Self> {
        match syntax.kind() {
            BINARY_EXPR => Some(Expr::Binary(BinaryExpr(syntax))),
            PREFIX_EXPR => Some(Expr::Prefix(PrefixExpr(syntax))),
            PAREN_EXPR => Some(Expr::Paren(ParenExpr(syntax))),
            CALL_EXPR => Some(Expr::Call(CallExpr(syntax))),
            LITERAL_EXPR => Some(Expr::Literal(LiteralExpr(syntax))),
            NAME_EXPR => Some(Expr::Name(NameExpr(syntax))),
            MISSING_EXPR => Some(Expr::Missing(MissingExpr(syntax))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Binary(it) => it.syntax(),
            Expr::Prefix(it) => it.syntax(),
            Expr::Paren(it) => it.syntax(),
            Expr::Call(it) => it.syntax(),
            Expr::Literal(it) => it.syntax(),
            Expr::Name(it) => it.syntax(),
            Expr::Missing(it) => it.syntax(),
        }
    }
}

/// Typed view of a collection node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AstList<N> {
    collection: SyntaxCollection,
    _marker: PhantomData<fn() -> N>,
}

impl<N: Node> AstList<N> {
    pub fn cast(syntax: SyntaxNode) -> Option<Self> {
        let collection = SyntaxCollection::cast(syntax)?;
        Some(Self { collection, _marker: PhantomData })
    }

    pub fn syntax(&self) -> &SyntaxNode {
        self.collection.syntax()
    }

    pub fn collection(&self) -> &SyntaxCollection {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<N> {
        self.collection.get(index)?.into_node().and_then(N::cast)
    }

    /// Members that are nodes of kind `N`.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = N> + use<N> {
        self.collection.iter().filter_map(|element| element.into_node().and_then(N::cast))
    }

    pub fn appending(&self, arena: &Arena, node: &N) -> Self {
        self.wrap(self.collection.appending(arena, node.syntax().green().clone().into()))
    }

    pub fn prepending(&self, arena: &Arena, node: &N) -> Self {
        self.wrap(self.collection.prepending(arena, node.syntax().green().clone().into()))
    }

    #[track_caller]
    pub fn inserting(&self, arena: &Arena, index: usize, node: &N) -> Self {
        self.wrap(self.collection.inserting(arena, index, node.syntax().green().clone().into()))
    }

    #[track_caller]
    pub fn removing(&self, arena: &Arena, index: usize) -> Self {
        self.wrap(self.collection.removing(arena, index))
    }

    #[track_caller]
    pub fn replacing(&self, arena: &Arena, index: usize, node: &N) -> Self {
        self.wrap(self.collection.replacing(arena, index, node.syntax().green().clone().into()))
    }

    fn wrap(&self, collection: SyntaxCollection) -> Self {
        Self { collection, _marker: PhantomData }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_tree;

    fn source_file() -> SourceFile {
        SourceFile::cast(sample_tree()).unwrap()
    }

    fn first_let() -> LetDecl {
        let items = source_file().items().unwrap();
        let Some(Item::Let(decl)) = items.get(0) else { panic!("expected a let declaration") };
        decl
    }

    #[test]
    fn mismatched_kinds_do_not_cast() {
        let root = sample_tree();
        assert!(FuncDecl::cast(root.clone()).is_none());
        assert!(Expr::cast(root.clone()).is_none());
        assert!(AstList::<Item>::cast(root.clone()).is_none());
        for node in root.descendants() {
            assert_eq!(LetDecl::cast(node.clone()).is_some(), node.kind() == LET_DECL);
            assert_eq!(Expr::cast(node.clone()).is_some(), node.kind().is_expr());
        }
    }

    #[test]
    fn typed_accessors() {
        let decl = first_let();

        assert_eq!(decl.name().unwrap().text_trimmed(), "x");
        assert!(decl.type_annotation().is_none());
        let Some(Expr::Binary(binary)) = decl.initializer().and_then(|it| it.value()) else {
            panic!("expected a binary expression");
        };
        assert_eq!(binary.op().unwrap().text_trimmed(), "+");
        let Some(Expr::Literal(rhs)) = binary.rhs() else { panic!("expected a literal") };
        assert_eq!(rhs.value().unwrap().text(), "2");
    }

    #[test]
    fn typed_lists() {
        let items = source_file().items().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| matches!(item, Item::Let(_))));

        let Some(Item::Let(second)) = items.get(1) else { panic!("expected a let declaration") };
        let Some(Expr::Call(call)) = second.initializer().and_then(|it| it.value()) else {
            panic!("expected a call");
        };
        let args = call.args().and_then(|it| it.args()).unwrap();
        let names: Vec<_> = args
            .iter()
            .rev()
            .filter_map(|arg| match arg.value()? {
                Expr::Name(name) => Some(name.name()?.text_trimmed().to_owned()),
                _ => None,
            })
            .collect();
        assert_eq!(names, ["c", "b", "a"]);

        let arena = args.syntax().arena();
        let first = args.get(0).unwrap();
        let edited = args.removing(&arena, 0).appending(&arena, &first);
        assert_eq!(edited.syntax().root().text(), "let x = 1 + 2\nlet y = f(b, ca, )\n");
    }

    #[test]
    fn setters_follow_the_slot_policy() {
        let decl = first_let();
        let arena = decl.syntax().arena();

        let Some(Expr::Binary(binary)) = decl.initializer().and_then(|it| it.value()) else {
            panic!("expected a binary expression");
        };
        let edited = binary.with_rhs(&arena, None);
        assert!(matches!(edited.rhs(), Some(Expr::Missing(_))));
        assert_eq!(edited.syntax().text(), "1 + ");

        let without_initializer = decl.with_initializer(&arena, None);
        assert!(without_initializer.initializer().is_none());
        assert_eq!(without_initializer.syntax().text(), "let x ");
    }
}
