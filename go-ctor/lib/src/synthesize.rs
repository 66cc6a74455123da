use tracing::debug;

use crate::config::constructor_name;
use crate::syntax::{
    Block, Decl, DeclKind, Expr, Field, FuncDecl, KeyValue, Param, Stmt, SyntaxTree, TypeExpr,
    TypeParam, UnaryOp,
};

/// Builds `func New<T>(f1 T1, …) *T { return &T{f1: f1, …} }`.
///
/// Generic types get their type parameter list copied onto the function and
/// instantiated in the result and the literal. Blank fields become
/// parameters but stay out of the literal since Go cannot key them.
pub fn synthesize_constructor(
    type_name: &str,
    type_params: &[TypeParam],
    fields: &[Field],
) -> FuncDecl {
    let instantiated = TypeExpr::Named {
        name: type_name.to_string(),
        args: type_params
            .iter()
            .flat_map(|param| param.names.iter())
            .map(TypeExpr::named)
            .collect(),
    };

    let params = fields
        .iter()
        .map(|field| Param::named(&field.name, field.ty.clone()))
        .collect();

    let elements = fields
        .iter()
        .filter(|field| !field.is_blank())
        .map(|field| KeyValue {
            key: field.name.clone(),
            value: Expr::Ident(field.name.clone()),
        })
        .collect();

    let literal = Expr::Unary {
        op: UnaryOp::Address,
        operand: Box::new(Expr::Composite {
            ty: instantiated.clone(),
            elements,
        }),
    };

    FuncDecl {
        name: constructor_name(type_name),
        receiver: None,
        type_params: type_params.to_vec(),
        params,
        results: vec![Param::unnamed(instantiated.pointer_to())],
        body: Some(Block::Stmts(vec![Stmt::Return(vec![literal])])),
        local_types: Vec::new(),
    }
}

/// Index of the last top-level type group that declares `type_name`.
pub fn defining_group(tree: &SyntaxTree, type_name: &str) -> Option<usize> {
    let mut last_match = None;

    for (index, decl) in tree.decls.iter().enumerate() {
        if let DeclKind::Type(group) = &decl.kind
            && group.defines(type_name)
        {
            last_match = Some(index);
        }
    }

    last_match
}

/// Inserts `constructor` right after the group that defines `type_name`.
///
/// Without a defining group the constructor goes to the start of the
/// declaration body, after the package clause and imports. Returns the index
/// the constructor now occupies.
pub fn splice(tree: &mut SyntaxTree, type_name: &str, constructor: FuncDecl) -> usize {
    let index = match defining_group(tree, type_name) {
        Some(group) => group + 1,
        None => tree.body_start(),
    };

    debug!(
        type_name,
        constructor = %constructor.name,
        index,
        "Splicing constructor"
    );

    tree.insert_decl(index, Decl::synthesized(DeclKind::Func(constructor)))
}
