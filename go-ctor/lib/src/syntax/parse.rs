use std::path::{Path, PathBuf};

use tracing::debug;
use tree_sitter::{Node, Parser, Tree};

use crate::error::GoCtorError;
use crate::syntax::source::{SourceText, Span};
use crate::syntax::tree::{
    Block, Decl, DeclKind, Field, FuncDecl, Param, SyntaxTree, TypeDef, TypeExpr, TypeGroup,
    TypeParam, TypeSpec,
};

/// A Go file read from disk and lowered into a [`SyntaxTree`].
#[derive(Debug, Clone)]
pub struct GoFile {
    /// Path the file was read from.
    pub path: PathBuf,
    pub source: SourceText,
    pub tree: SyntaxTree,
}

impl GoFile {
    /// Reads and parses the file on disk.
    ///
    /// ## Errors
    /// Returns an error if the file cannot be read or is not valid Go.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GoCtorError> {
        let path = path.as_ref().to_path_buf();
        let text = std::fs::read_to_string(&path).map_err(|source| GoCtorError::Io {
            path: path.clone(),
            source,
        })?;

        Self::parse(path, text)
    }

    /// Parses Go source that is already in memory.
    ///
    /// `path` is only used for error messages.
    ///
    /// ## Errors
    /// Returns an error when the text is not syntactically valid Go.
    pub fn parse<P: Into<PathBuf>>(path: P, text: String) -> Result<Self, GoCtorError> {
        let path = path.into();
        let source = SourceText::new(text);
        let tree = parse_go(&path, source.as_str())?;
        let root = tree.root_node();

        if let Some(problem) = first_syntax_problem(root, &source) {
            return Err(GoCtorError::Parse {
                path,
                line: problem.line,
                column: problem.column,
                message: problem.message,
            });
        }

        let tree = lower_source_file(root, &source);
        debug!(
            file = %path.display(),
            decls = tree.decls.len(),
            "Parsed Go source"
        );

        Ok(Self { path, source, tree })
    }
}

/// Runs tree-sitter-go over `text`.
pub(crate) fn parse_go(path: &Path, text: &str) -> Result<Tree, GoCtorError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_go::LANGUAGE.into())?;

    parser.parse(text, None).ok_or_else(|| GoCtorError::Parse {
        path: path.to_path_buf(),
        line: 1,
        column: 1,
        message: "parser produced no syntax tree".to_string(),
    })
}

/// The first error or missing node, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxProblem {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

pub(crate) fn first_syntax_problem(root: Node<'_>, source: &SourceText) -> Option<SyntaxProblem> {
    if !root.has_error() {
        return None;
    }

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let (line, column) = source.line_col(node.start_byte());
            let message = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                unexpected_message(node, source)
            };
            return Some(SyntaxProblem {
                line,
                column,
                message,
            });
        }

        // Reversed so the stack pops children in source order.
        let mut cursor = node.walk();
        let children: Vec<_> = node
            .children(&mut cursor)
            .filter(|child| child.has_error())
            .collect();
        stack.extend(children.into_iter().rev());
    }

    Some(SyntaxProblem {
        line: 1,
        column: 1,
        message: "syntax error".to_string(),
    })
}

fn unexpected_message(node: Node<'_>, source: &SourceText) -> String {
    let snippet = source
        .slice(Span::from(node.range()))
        .lines()
        .next()
        .unwrap_or_default()
        .trim();

    if snippet.is_empty() {
        return "syntax error".to_string();
    }

    let snippet: String = snippet.chars().take(24).collect();
    format!("unexpected `{snippet}`")
}

fn lower_source_file(root: Node<'_>, source: &SourceText) -> SyntaxTree {
    let text = source.as_str();
    let mut decls: Vec<Decl> = Vec::new();
    // Comments seen since the last declaration, not yet attached to anything.
    let mut pending: Vec<Span> = Vec::new();
    let mut cursor = root.walk();

    for node in root.named_children(&mut cursor) {
        let span = Span::from(node.range());

        if node.kind() == "comment" {
            if pending.is_empty()
                && let Some(previous) = decls.last_mut()
                && let Some(previous_span) = previous.span
                && !text[previous_span.end..span.start].contains('\n')
            {
                previous.span = Some(previous_span.cover(span));
                continue;
            }

            if let Some(last) = pending.last()
                && has_blank_line(&text[last.end..span.start])
            {
                flush_comments(&mut decls, &mut pending);
            }
            pending.push(span);
            continue;
        }

        let mut span = span;
        match (pending.first(), pending.last()) {
            (Some(first), Some(last)) if !has_blank_line(&text[last.end..span.start]) => {
                span = first.cover(span);
                pending.clear();
            }
            _ => flush_comments(&mut decls, &mut pending),
        }

        decls.push(Decl::parsed(span, lower_decl(node, text)));
    }

    flush_comments(&mut decls, &mut pending);
    SyntaxTree { decls }
}

fn flush_comments(decls: &mut Vec<Decl>, pending: &mut Vec<Span>) {
    decls.extend(
        pending
            .drain(..)
            .map(|span| Decl::parsed(span, DeclKind::Comment)),
    );
}

fn has_blank_line(gap: &str) -> bool {
    gap.matches('\n').count() >= 2
}

fn lower_decl(node: Node<'_>, text: &str) -> DeclKind {
    match node.kind() {
        "package_clause" => DeclKind::Package {
            name: node
                .named_child(0)
                .map(|name| node_text(name, text).to_string())
                .unwrap_or_default(),
        },
        "import_declaration" => DeclKind::Import,
        "type_declaration" => DeclKind::Type(lower_type_group(node, text)),
        "function_declaration" | "method_declaration" => DeclKind::Func(lower_func(node, text)),
        kind => DeclKind::Other {
            kind: kind.to_string(),
        },
    }
}

fn lower_type_group(node: Node<'_>, text: &str) -> TypeGroup {
    let mut cursor = node.walk();
    let specs = node
        .named_children(&mut cursor)
        .filter(|child| matches!(child.kind(), "type_spec" | "type_alias"))
        .map(|spec| lower_type_spec(spec, text))
        .collect();

    TypeGroup { specs }
}

fn lower_type_spec(node: Node<'_>, text: &str) -> TypeSpec {
    let name = field_text(node, "name", text).to_string();
    let type_params = node
        .child_by_field_name("type_parameters")
        .map(|list| lower_type_params(list, text))
        .unwrap_or_default();
    let type_node = node.child_by_field_name("type");
    let verbatim = || {
        let ty = type_node.map(|ty| node_text(ty, text)).unwrap_or_default();
        TypeExpr::Verbatim(ty.to_string())
    };

    let definition = if node.kind() == "type_alias" {
        TypeDef::Alias(verbatim())
    } else {
        match type_node {
            Some(ty) if ty.kind() == "struct_type" => TypeDef::Struct(lower_fields(ty, text)),
            _ => TypeDef::Other(verbatim()),
        }
    };

    TypeSpec {
        name,
        type_params,
        definition,
    }
}

fn lower_type_params(list: Node<'_>, text: &str) -> Vec<TypeParam> {
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|child| child.kind() == "type_parameter_declaration")
        .map(|declaration| {
            let mut names_cursor = declaration.walk();
            let names = declaration
                .children_by_field_name("name", &mut names_cursor)
                .map(|name| node_text(name, text).to_string())
                .collect();

            TypeParam {
                names,
                constraint: TypeExpr::Verbatim(field_text(declaration, "type", text).to_string()),
            }
        })
        .collect()
}

fn lower_fields(struct_type: Node<'_>, text: &str) -> Vec<Field> {
    let mut cursor = struct_type.walk();
    let Some(list) = struct_type
        .named_children(&mut cursor)
        .find(|child| child.kind() == "field_declaration_list")
    else {
        return Vec::new();
    };

    let mut fields = Vec::new();
    let mut list_cursor = list.walk();
    for declaration in list.named_children(&mut list_cursor) {
        if declaration.kind() != "field_declaration" {
            continue;
        }

        let Some(type_node) = declaration.child_by_field_name("type") else {
            continue;
        };

        let mut names_cursor = declaration.walk();
        let names: Vec<&str> = declaration
            .children_by_field_name("name", &mut names_cursor)
            .map(|name| node_text(name, text))
            .collect();

        if names.is_empty() {
            // Embedded field: the type text includes a leading `*` if present.
            let ty = &text[declaration.start_byte()..type_node.end_byte()];
            fields.push(Field {
                name: embedded_field_name(ty).to_string(),
                ty: TypeExpr::Verbatim(ty.to_string()),
                embedded: true,
            });
            continue;
        }

        let ty = node_text(type_node, text);
        fields.extend(names.into_iter().map(|name| Field::new(name, ty)));
    }

    fields
}

/// The implicit field name of an embedded field: `*pkg.List[T]` → `List`.
pub fn embedded_field_name(ty: &str) -> &str {
    let ty = ty.trim_start_matches('*').trim_start();
    let ty = ty.split('[').next().unwrap_or(ty);
    ty.rsplit('.').next().unwrap_or(ty).trim()
}

fn lower_func(node: Node<'_>, text: &str) -> FuncDecl {
    let receiver = node
        .child_by_field_name("receiver")
        .and_then(|list| lower_params(list, text).into_iter().next());

    let results = match node.child_by_field_name("result") {
        Some(result) if result.kind() == "parameter_list" => lower_params(result, text),
        Some(result) => vec![Param::unnamed(TypeExpr::Verbatim(
            node_text(result, text).to_string(),
        ))],
        None => Vec::new(),
    };

    let body = node.child_by_field_name("body");

    FuncDecl {
        name: field_text(node, "name", text).to_string(),
        receiver,
        type_params: node
            .child_by_field_name("type_parameters")
            .map(|list| lower_type_params(list, text))
            .unwrap_or_default(),
        params: node
            .child_by_field_name("parameters")
            .map(|list| lower_params(list, text))
            .unwrap_or_default(),
        results,
        body: body.map(|body| Block::Source(Span::from(body.range()))),
        local_types: body
            .map(|body| lower_local_types(body, text))
            .unwrap_or_default(),
    }
}

/// Type specs declared anywhere inside a function body, in source order.
fn lower_local_types(body: Node<'_>, text: &str) -> Vec<TypeSpec> {
    let mut specs = Vec::new();
    let mut stack = vec![body];

    while let Some(node) = stack.pop() {
        if node.kind() == "type_declaration" {
            specs.extend(lower_type_group(node, text).specs);
            continue;
        }

        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    specs
}

fn lower_params(list: Node<'_>, text: &str) -> Vec<Param> {
    let mut params = Vec::new();
    let mut cursor = list.walk();

    for declaration in list.named_children(&mut cursor) {
        let ty = field_text(declaration, "type", text);
        let ty = match declaration.kind() {
            "parameter_declaration" => ty.to_string(),
            "variadic_parameter_declaration" => format!("...{ty}"),
            _ => continue,
        };

        let mut names_cursor = declaration.walk();
        let names: Vec<&str> = declaration
            .children_by_field_name("name", &mut names_cursor)
            .map(|name| node_text(name, text))
            .collect();

        if names.is_empty() {
            params.push(Param::unnamed(TypeExpr::Verbatim(ty)));
        } else {
            params.extend(
                names
                    .into_iter()
                    .map(|name| Param::named(name, TypeExpr::Verbatim(ty.clone()))),
            );
        }
    }

    params
}

fn node_text<'s>(node: Node<'_>, text: &'s str) -> &'s str {
    node.utf8_text(text.as_bytes()).unwrap_or_default()
}

fn field_text<'s>(node: Node<'_>, field: &str, text: &'s str) -> &'s str {
    node.child_by_field_name(field)
        .map(|child| node_text(child, text))
        .unwrap_or_default()
}
