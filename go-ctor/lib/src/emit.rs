//! Turns a mutated tree back into Go source and persists it.
//!
//! Entries that came from the file are copied byte for byte together with
//! the whitespace that preceded them. Synthesized entries are printed in the
//! layout `gofmt` gives them: tab indentation, a blank line on either side.

use std::fmt;
use std::fs;
use std::io::Write as _;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::GoCtorError;
use crate::syntax::parse::{first_syntax_problem, parse_go};
use crate::syntax::tree::write_joined;
use crate::syntax::{Block, Decl, DeclKind, FuncDecl, SourceText, SyntaxTree};

/// Rendered source plus where each top-level entry starts in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Byte offset of each entry of the tree, in tree order.
    pub decl_offsets: Vec<usize>,
}

impl Rendered {
    /// 1-based line on which the entry at `index` starts.
    pub fn line_of(&self, index: usize) -> Option<usize> {
        let offset = *self.decl_offsets.get(index)?;
        Some(self.text[..offset].matches('\n').count() + 1)
    }
}

/// Renders `tree` against the source it was parsed from.
///
/// The same tree and source always give the same bytes. Synthesized entries
/// use the line ending of the source.
pub fn render(tree: &SyntaxTree, source: &SourceText) -> Result<Rendered, fmt::Error> {
    let original = source.as_str();
    let newline = source.line_ending();
    let separator = newline.repeat(2);
    let mut text = String::with_capacity(original.len() + 256);
    let mut decl_offsets = Vec::with_capacity(tree.decls.len());
    // End of the last original entry written so far.
    let mut cursor = 0;
    let mut after_synthesized = false;

    for decl in &tree.decls {
        match decl.span {
            Some(span) => {
                let gap = &original[cursor..span.start];
                if after_synthesized && !gap.starts_with(separator.as_str()) {
                    text.push_str(&separator);
                    text.push_str(gap.trim_start_matches(['\n', '\r', ' ', '\t']));
                } else {
                    text.push_str(gap);
                }
                decl_offsets.push(text.len());
                text.push_str(source.slice(span));
                cursor = span.end;
                after_synthesized = false;
            }
            None => {
                // An explicit `;` after the previous entry stays with it.
                let terminator = leading_terminator(&original[cursor..]);
                text.push_str(terminator);
                cursor += terminator.len();

                if !text.is_empty() {
                    text.push_str(&separator);
                }
                decl_offsets.push(text.len());
                write_decl(&mut text, decl, source)?;
                after_synthesized = true;
            }
        }
    }

    text.push_str(&original[cursor..]);
    if !text.ends_with('\n') {
        text.push_str(newline);
    }

    Ok(Rendered { text, decl_offsets })
}

/// The `;` that ends the entry before `rest`, with the blanks in front of it.
fn leading_terminator(rest: &str) -> &str {
    let blanks = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    if rest[blanks..].starts_with(';') {
        &rest[..=blanks]
    } else {
        ""
    }
}

/// Renders the tree and checks that the result is still well-formed Go.
///
/// ## Errors
/// Returns [`GoCtorError::Format`] when printing fails or the printed text
/// does not parse.
pub fn render_checked(
    path: &Path,
    tree: &SyntaxTree,
    source: &SourceText,
) -> Result<Rendered, GoCtorError> {
    let rendered = render(tree, source).map_err(|_| GoCtorError::Format {
        path: path.to_path_buf(),
        message: "a declaration could not be printed".to_string(),
    })?;

    let reparsed = parse_go(path, &rendered.text)?;
    let output = SourceText::new(rendered.text.clone());
    if let Some(problem) = first_syntax_problem(reparsed.root_node(), &output) {
        return Err(GoCtorError::Format {
            path: path.to_path_buf(),
            message: format!(
                "generated source does not parse at {}:{}: {}",
                problem.line, problem.column, problem.message
            ),
        });
    }

    debug!(bytes = rendered.text.len(), "Post-validation passed");
    Ok(rendered)
}

fn write_decl(out: &mut String, decl: &Decl, source: &SourceText) -> fmt::Result {
    match &decl.kind {
        DeclKind::Func(func) => write_func(out, func, source),
        // Only functions are ever built in memory.
        _ => Err(fmt::Error),
    }
}

/// Prints a function declaration in gofmt layout, ending lines the way
/// `source` does.
pub fn write_func(out: &mut impl fmt::Write, func: &FuncDecl, source: &SourceText) -> fmt::Result {
    out.write_str("func ")?;
    if let Some(receiver) = &func.receiver {
        write!(out, "({receiver}) ")?;
    }
    out.write_str(&func.name)?;

    if !func.type_params.is_empty() {
        out.write_char('[')?;
        write_joined(out, &func.type_params)?;
        out.write_char(']')?;
    }

    out.write_char('(')?;
    write_joined(out, &func.params)?;
    out.write_char(')')?;

    match func.results.as_slice() {
        [] => {}
        [single] if single.name.is_none() => write!(out, " {single}")?,
        results => {
            out.write_str(" (")?;
            write_joined(out, results)?;
            out.write_char(')')?;
        }
    }

    match &func.body {
        None => Ok(()),
        Some(Block::Source(span)) => write!(out, " {}", source.slice(*span)),
        Some(Block::Stmts(stmts)) => {
            let newline = source.line_ending();
            write!(out, " {{{newline}")?;
            for stmt in stmts {
                write!(out, "\t{stmt}{newline}")?;
            }
            out.write_char('}')
        }
    }
}

/// Replaces the file at `path` with `contents`.
///
/// The full text goes to a temporary file next to the destination first,
/// which is then renamed over it, so a failed write never leaves a
/// truncated file behind.
///
/// ## Errors
/// Returns [`GoCtorError::Write`] if the temporary file cannot be written or
/// moved into place.
pub fn write_atomically(path: &Path, contents: &str) -> Result<(), GoCtorError> {
    let write_error = |source: std::io::Error| GoCtorError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    debug!("Writing to temporary file");
    let mut temp_file = NamedTempFile::new_in(parent_dir).map_err(write_error)?;
    temp_file
        .write_all(contents.as_bytes())
        .and_then(|()| temp_file.as_file().sync_all())
        .map_err(write_error)?;

    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(temp_file.path(), metadata.permissions()).map_err(write_error)?;
    }

    debug!("Persisting file atomically");
    temp_file
        .persist(path)
        .map_err(|persist| write_error(persist.error))?;

    info!(file = %path.display(), "Rewrote file");
    Ok(())
}
