//! Depth-first traversal over a [`SyntaxTree`].
//!
//! Visitors steer the walk through the value they return for each node
//! instead of flipping shared flags that get inspected afterwards.

use std::ops::ControlFlow;

use crate::syntax::tree::{Decl, DeclKind, Field, SyntaxTree, TypeSpec};

/// What the walker should do after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitControl {
    /// Descend into the node's children.
    Continue,
    /// Move on to the next sibling without visiting children.
    SkipChildren,
    /// End the whole traversal.
    Stop,
}

/// A node reached during the walk.
#[derive(Debug, Clone, Copy)]
pub enum AstNode<'ast> {
    Decl(&'ast Decl),
    TypeSpec(&'ast TypeSpec),
    Field(&'ast Field),
}

impl<'ast> AstNode<'ast> {
    fn children(self) -> Vec<AstNode<'ast>> {
        match self {
            Self::Decl(Decl {
                kind: DeclKind::Type(group),
                ..
            }) => group.specs.iter().map(AstNode::TypeSpec).collect(),
            Self::Decl(Decl {
                kind: DeclKind::Func(func),
                ..
            }) => func.local_types.iter().map(AstNode::TypeSpec).collect(),
            Self::TypeSpec(spec) => spec
                .fields()
                .unwrap_or_default()
                .iter()
                .map(AstNode::Field)
                .collect(),
            Self::Decl(_) | Self::Field(_) => Vec::new(),
        }
    }
}

pub trait Visitor<'ast> {
    fn visit(&mut self, node: AstNode<'ast>) -> VisitControl;
}

/// Visits every top-level entry and its nested type specs and fields,
/// including type specs declared inside function bodies.
///
/// Returns `ControlFlow::Break` when a visitor stopped the walk early.
pub fn walk<'ast, V>(tree: &'ast SyntaxTree, visitor: &mut V) -> ControlFlow<()>
where
    V: Visitor<'ast> + ?Sized,
{
    for decl in &tree.decls {
        walk_node(AstNode::Decl(decl), visitor)?;
    }
    ControlFlow::Continue(())
}

fn walk_node<'ast, V>(node: AstNode<'ast>, visitor: &mut V) -> ControlFlow<()>
where
    V: Visitor<'ast> + ?Sized,
{
    match visitor.visit(node) {
        VisitControl::Stop => return ControlFlow::Break(()),
        VisitControl::SkipChildren => return ControlFlow::Continue(()),
        VisitControl::Continue => {}
    }

    for child in node.children() {
        walk_node(child, visitor)?;
    }
    ControlFlow::Continue(())
}
