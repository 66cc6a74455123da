use tracing::{debug, warn};

use crate::config::constructor_name;
use crate::syntax::{
    AstNode, Decl, DeclKind, Field, SyntaxTree, TypeParam, VisitControl, Visitor, walk,
};

/// The struct definition a constructor will be built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetType {
    pub type_params: Vec<TypeParam>,
    pub fields: Vec<Field>,
}

/// What a walk over the tree found out about the requested type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Located {
    /// Fields of the last struct definition with the requested name.
    pub target: Option<TargetType>,
    /// Whether any type spec, struct or not, carries the requested name.
    pub found: bool,
    /// Whether a function or method named `New<Type>` is already declared.
    pub already_exists: bool,
}

impl Located {
    pub fn fields(&self) -> &[Field] {
        self.target
            .as_ref()
            .map(|target| target.fields.as_slice())
            .unwrap_or_default()
    }

    pub fn type_params(&self) -> &[TypeParam] {
        self.target
            .as_ref()
            .map(|target| target.type_params.as_slice())
            .unwrap_or_default()
    }
}

struct Locator<'a> {
    type_name: &'a str,
    constructor: String,
    located: Located,
}

impl<'ast> Visitor<'ast> for Locator<'_> {
    fn visit(&mut self, node: AstNode<'ast>) -> VisitControl {
        match node {
            AstNode::Decl(Decl {
                kind: DeclKind::Func(func),
                ..
            }) if func.name == self.constructor => {
                self.located.already_exists = true;
                VisitControl::Stop
            }
            AstNode::TypeSpec(spec) if spec.name == self.type_name => {
                self.located.found = true;
                match spec.fields() {
                    // A later definition replaces whatever an earlier one captured.
                    Some(fields) => {
                        self.located.target = Some(TargetType {
                            type_params: spec.type_params.clone(),
                            fields: fields.to_vec(),
                        });
                    }
                    None => warn!(
                        type_name = self.type_name,
                        "Type is not a struct; it contributes no fields"
                    ),
                }
                VisitControl::SkipChildren
            }
            AstNode::TypeSpec(_) => VisitControl::SkipChildren,
            AstNode::Decl(_) | AstNode::Field(_) => VisitControl::Continue,
        }
    }
}

/// Finds the fields of `type_name` and whether its constructor already exists.
///
/// Every entry is visited. When the type is declared more than once the last
/// struct definition wins. The walk stops as soon as an existing
/// `New<type_name>` function turns up.
pub fn locate(tree: &SyntaxTree, type_name: &str) -> Located {
    let mut locator = Locator {
        type_name,
        constructor: constructor_name(type_name),
        located: Located::default(),
    };

    let _ = walk(tree, &mut locator);
    let located = locator.located;

    debug!(
        type_name,
        found = located.found,
        fields = located.fields().len(),
        already_exists = located.already_exists,
        "Located type"
    );

    located
}
