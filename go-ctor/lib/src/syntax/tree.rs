use std::fmt;

use crate::syntax::source::Span;

/// One Go file as an ordered sequence of top-level entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxTree {
    pub decls: Vec<Decl>,
}

impl SyntaxTree {
    /// Inserts `decl` at `index`, shifting every later entry down by one.
    ///
    /// Indices past the end append.
    pub fn insert_decl(&mut self, index: usize, decl: Decl) -> usize {
        let index = index.min(self.decls.len());
        self.decls.insert(index, decl);
        index
    }

    /// Index of the first entry after the package clause and imports.
    pub fn body_start(&self) -> usize {
        self.decls
            .iter()
            .rposition(|decl| matches!(decl.kind, DeclKind::Package { .. } | DeclKind::Import))
            .map_or(0, |index| index + 1)
    }

    /// Package-level functions, methods excluded.
    pub fn functions(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match &decl.kind {
            DeclKind::Func(func) if !func.is_method() => Some(func),
            _ => None,
        })
    }

    pub fn type_specs(&self) -> impl Iterator<Item = &TypeSpec> {
        self.decls.iter().flat_map(|decl| match &decl.kind {
            DeclKind::Type(group) => group.specs.as_slice(),
            _ => &[][..],
        })
    }
}

/// A top-level entry.
///
/// Entries read from disk keep the byte span they came from (doc and
/// trailing comments included). Entries built in memory have no span and are
/// printed from their structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    pub span: Option<Span>,
    pub kind: DeclKind,
}

impl Decl {
    pub fn parsed(span: Span, kind: DeclKind) -> Self {
        Self {
            span: Some(span),
            kind,
        }
    }

    pub fn synthesized(kind: DeclKind) -> Self {
        Self { span: None, kind }
    }

    pub fn is_synthesized(&self) -> bool {
        self.span.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    Package { name: String },
    Import,
    Type(TypeGroup),
    Func(FuncDecl),
    /// A comment that is not attached to any declaration.
    Comment,
    /// `var`, `const` and anything else passed through untouched.
    Other { kind: String },
}

/// A `type` declaration, either a single spec or a parenthesized group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeGroup {
    pub specs: Vec<TypeSpec>,
}

impl TypeGroup {
    pub fn defines(&self, name: &str) -> bool {
        self.specs.iter().any(|spec| spec.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub definition: TypeDef,
}

impl TypeSpec {
    /// The field list, when the type is a struct.
    pub fn fields(&self) -> Option<&[Field]> {
        match &self.definition {
            TypeDef::Struct(fields) => Some(fields),
            TypeDef::Alias(_) | TypeDef::Other(_) => None,
        }
    }

    pub fn is_record(&self) -> bool {
        self.fields().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    Struct(Vec<Field>),
    /// `type A = B`
    Alias(TypeExpr),
    Other(TypeExpr),
}

/// A struct member. `a, b int` is lowered into two fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeExpr,
    pub embedded: bool,
}

impl Field {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, ty: T) -> Self {
        Self {
            name: name.into(),
            ty: TypeExpr::Verbatim(ty.into()),
            embedded: false,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

/// `T, U any` inside a type parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub names: Vec<String>,
    pub constraint: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    pub receiver: Option<Param>,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub body: Option<Block>,
    /// Type declarations found inside the body.
    pub local_types: Vec<TypeSpec>,
}

impl FuncDecl {
    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

impl Param {
    pub fn named<N: Into<String>>(name: N, ty: TypeExpr) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }

    pub fn unnamed(ty: TypeExpr) -> Self {
        Self { name: None, ty }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A body kept as written.
    Source(Span),
    Stmts(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Return(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident(String),
    Unary { op: UnaryOp, operand: Box<Expr> },
    Composite { ty: TypeExpr, elements: Vec<KeyValue> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `&x`
    Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named { name: String, args: Vec<TypeExpr> },
    Pointer(Box<TypeExpr>),
    /// Type text copied from the source.
    Verbatim(String),
}

impl TypeExpr {
    pub fn named<N: Into<String>>(name: N) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn pointer_to(self) -> Self {
        Self::Pointer(Box::new(self))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { name, args } => {
                formatter.write_str(name)?;
                if !args.is_empty() {
                    formatter.write_str("[")?;
                    write_joined(formatter, args)?;
                    formatter.write_str("]")?;
                }
                Ok(())
            }
            Self::Pointer(inner) => write!(formatter, "*{inner}"),
            Self::Verbatim(text) => formatter.write_str(text),
        }
    }
}

impl fmt::Display for TypeParam {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {}", self.names.join(", "), self.constraint)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(formatter, "{name} {}", self.ty),
            None => write!(formatter, "{}", self.ty),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => formatter.write_str(name),
            Self::Unary {
                op: UnaryOp::Address,
                operand,
            } => write!(formatter, "&{operand}"),
            Self::Composite { ty, elements } => {
                write!(formatter, "{ty}{{")?;
                write_joined(formatter, elements)?;
                formatter.write_str("}")
            }
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.key, self.value)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Return(results) if results.is_empty() => formatter.write_str("return"),
            Self::Return(results) => {
                formatter.write_str("return ")?;
                write_joined(formatter, results)
            }
        }
    }
}

pub(crate) fn write_joined<T: fmt::Display>(
    formatter: &mut impl fmt::Write,
    items: &[T],
) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            formatter.write_str(", ")?;
        }
        write!(formatter, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_generic_pointer_types() {
        let ty = TypeExpr::Named {
            name: "Pair".to_string(),
            args: vec![TypeExpr::named("K"), TypeExpr::named("V")],
        }
        .pointer_to();

        assert_eq!(ty.to_string(), "*Pair[K, V]");
    }

    #[test]
    fn displays_address_of_composite_literal() {
        let expr = Expr::Unary {
            op: UnaryOp::Address,
            operand: Box::new(Expr::Composite {
                ty: TypeExpr::named("Point"),
                elements: vec![
                    KeyValue {
                        key: "x".to_string(),
                        value: Expr::Ident("x".to_string()),
                    },
                    KeyValue {
                        key: "y".to_string(),
                        value: Expr::Ident("y".to_string()),
                    },
                ],
            }),
        };

        assert_eq!(expr.to_string(), "&Point{x: x, y: y}");
        assert_eq!(Stmt::Return(vec![expr]).to_string(), "return &Point{x: x, y: y}");
    }

    #[test]
    fn insert_decl_shifts_tail() {
        let mut tree = SyntaxTree {
            decls: vec![
                Decl::parsed(Span::new(0, 9), DeclKind::Package { name: "a".into() }),
                Decl::parsed(
                    Span::new(11, 21),
                    DeclKind::Other {
                        kind: "var_declaration".into(),
                    },
                ),
            ],
        };

        let index = tree.insert_decl(1, Decl::synthesized(DeclKind::Comment));
        assert_eq!(index, 1);
        assert!(tree.decls[1].is_synthesized());
        assert_eq!(tree.decls[2].span, Some(Span::new(11, 21)));

        let appended = tree.insert_decl(99, Decl::synthesized(DeclKind::Comment));
        assert_eq!(appended, 3);
    }

    #[test]
    fn body_start_skips_package_and_imports() {
        let tree = SyntaxTree {
            decls: vec![
                Decl::parsed(Span::new(0, 9), DeclKind::Package { name: "a".into() }),
                Decl::parsed(Span::new(10, 20), DeclKind::Import),
                Decl::parsed(Span::new(21, 30), DeclKind::Import),
                Decl::parsed(Span::new(31, 40), DeclKind::Comment),
            ],
        };

        assert_eq!(tree.body_start(), 3);
        assert_eq!(SyntaxTree::default().body_start(), 0);
    }
}
