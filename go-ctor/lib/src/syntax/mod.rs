pub mod parse;
pub mod source;
pub mod tree;
pub mod visit;

pub use parse::{GoFile, SyntaxProblem, embedded_field_name};
pub use source::{SourceText, Span};
pub use tree::*;
pub use visit::{AstNode, VisitControl, Visitor, walk};
