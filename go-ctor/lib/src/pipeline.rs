use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::{GenerateConfig, MissingTypePolicy, constructor_name};
use crate::emit::{render_checked, write_atomically};
use crate::error::GoCtorError;
use crate::locate::locate;
use crate::syntax::GoFile;
use crate::synthesize::{splice, synthesize_constructor};

/// What a successful run inserted and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateReport {
    pub path: PathBuf,
    pub type_name: String,
    pub constructor: String,
    /// Parameters as printed, e.g. `writer io.Writer`.
    pub parameters: Vec<String>,
    /// Position of the constructor among the file's top-level entries.
    pub insert_index: usize,
    /// 1-based line the constructor starts on in the rewritten file.
    pub line: usize,
    /// False when the type was absent and an empty constructor was prepended.
    pub type_found: bool,
}

/// The rewritten source of a file, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub report: GenerateReport,
}

/// Reads the configured file, inserts the constructor and writes it back.
///
/// ## Errors
/// Fails without touching the file when it cannot be read or parsed, when
/// the constructor already exists, or when the type is missing under
/// [`MissingTypePolicy::Fail`]. Fails with a write error when the result
/// cannot be persisted.
#[instrument(skip_all, fields(file = %config.path.display(), type_name = %config.type_name))]
pub fn generate(config: &GenerateConfig) -> Result<GenerateReport, GoCtorError> {
    let file = GoFile::load(&config.path)?;
    let rewrite = rewrite_file(file, &config.type_name, config.missing_type)?;

    write_atomically(&config.path, &rewrite.text)?;

    info!(
        constructor = %rewrite.report.constructor,
        line = rewrite.report.line,
        "Constructor generated"
    );
    Ok(rewrite.report)
}

/// Runs the pipeline over source held in memory.
///
/// `path` only labels errors and the report.
///
/// ## Errors
/// Same as [`generate`], minus the write.
pub fn rewrite_source<P: AsRef<Path>>(
    path: P,
    text: String,
    type_name: &str,
    missing_type: MissingTypePolicy,
) -> Result<Rewrite, GoCtorError> {
    let file = GoFile::parse(path.as_ref(), text)?;
    rewrite_file(file, type_name, missing_type)
}

fn rewrite_file(
    file: GoFile,
    type_name: &str,
    missing_type: MissingTypePolicy,
) -> Result<Rewrite, GoCtorError> {
    let GoFile {
        path,
        source,
        mut tree,
    } = file;

    let located = locate(&tree, type_name);
    let name = constructor_name(type_name);

    if located.already_exists {
        return Err(GoCtorError::DuplicateConstructor {
            path,
            name,
        });
    }

    if !located.found {
        if missing_type == MissingTypePolicy::Fail {
            return Err(GoCtorError::TypeNotFound {
                path,
                type_name: type_name.to_string(),
            });
        }
        warn!(type_name, "Type not declared; generating a constructor without fields");
    }

    let constructor = synthesize_constructor(type_name, located.type_params(), located.fields());
    let parameters = constructor.params.iter().map(ToString::to_string).collect();
    let insert_index = splice(&mut tree, type_name, constructor);

    let rendered = render_checked(&path, &tree, &source)?;
    let line = rendered.line_of(insert_index).unwrap_or(1);

    Ok(Rewrite {
        text: rendered.text,
        report: GenerateReport {
            path,
            type_name: type_name.to_string(),
            constructor: name,
            parameters,
            insert_index,
            line,
            type_found: located.found,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOMETHING: &str = "package test

import \"io\"

type Something struct {
	some   string
	writer io.Writer
}
";

    #[test]
    fn generates_the_documented_constructor() {
        let rewrite = rewrite_source(
            "something.go",
            SOMETHING.to_string(),
            "Something",
            MissingTypePolicy::Prepend,
        )
        .expect("rewrites");

        let expected = format!(
            "{SOMETHING}\nfunc NewSomething(some string, writer io.Writer) *Something {{\n\treturn &Something{{some: some, writer: writer}}\n}}\n"
        );
        assert_eq!(rewrite.text, expected);
        assert_eq!(rewrite.report.parameters, ["some string", "writer io.Writer"]);
        assert_eq!(rewrite.report.insert_index, 3);
        assert_eq!(rewrite.report.line, 10);
        assert!(rewrite.report.type_found);
    }

    #[test]
    fn second_pass_reports_duplicate() {
        let first = rewrite_source(
            "a.go",
            SOMETHING.to_string(),
            "Something",
            MissingTypePolicy::Prepend,
        )
        .expect("first pass");
        let second = rewrite_source("a.go", first.text, "Something", MissingTypePolicy::Prepend);

        assert!(matches!(
            second,
            Err(GoCtorError::DuplicateConstructor { ref name, .. }) if name == "NewSomething"
        ));
    }

    #[test]
    fn declarations_separated_by_semicolons_are_rewritten() {
        let rewrite = rewrite_source(
            "a.go",
            "package a\n\ntype T struct{ a int }; var x = 1\n".to_string(),
            "T",
            MissingTypePolicy::Prepend,
        )
        .expect("rewrites");

        assert!(rewrite.text.contains("type T struct{ a int };\n\nfunc NewT(a int) *T {"));
        assert!(rewrite.text.ends_with("}\n\nvar x = 1\n"));
        assert_eq!(rewrite.report.line, 5);
    }

    #[test]
    fn method_named_like_the_constructor_is_a_duplicate() {
        let result = rewrite_source(
            "a.go",
            "package a\n\ntype T struct{ a int }\n\nfunc (f F) NewT() *T { return nil }\n"
                .to_string(),
            "T",
            MissingTypePolicy::Prepend,
        );

        assert!(matches!(
            result,
            Err(GoCtorError::DuplicateConstructor { ref name, .. }) if name == "NewT"
        ));
    }

    #[test]
    fn local_type_supplies_fields_but_constructor_goes_to_body_start() {
        let rewrite = rewrite_source(
            "a.go",
            "package a\n\nfunc g() {\n\ttype T struct{ a int }\n}\n".to_string(),
            "T",
            MissingTypePolicy::Fail,
        )
        .expect("rewrites");

        assert!(rewrite.report.type_found);
        assert_eq!(rewrite.report.parameters, ["a int"]);
        assert_eq!(rewrite.report.insert_index, 1);
        assert!(rewrite.text.starts_with(
            "package a\n\nfunc NewT(a int) *T {\n\treturn &T{a: a}\n}\n\nfunc g() {"
        ));
    }

    #[test]
    fn strict_policy_rejects_missing_type() {
        let result = rewrite_source(
            "a.go",
            SOMETHING.to_string(),
            "Missing",
            MissingTypePolicy::Fail,
        );
        assert!(matches!(result, Err(GoCtorError::TypeNotFound { .. })));
    }

    #[test]
    fn tolerant_policy_prepends_empty_constructor() {
        let rewrite = rewrite_source(
            "a.go",
            SOMETHING.to_string(),
            "Missing",
            MissingTypePolicy::Prepend,
        )
        .expect("rewrites");

        assert!(!rewrite.report.type_found);
        assert_eq!(rewrite.report.insert_index, 2);
        assert!(rewrite.text.contains(
            "import \"io\"\n\nfunc NewMissing() *Missing {\n\treturn &Missing{}\n}\n\ntype Something struct {"
        ));
    }

    #[test]
    #[tracing_test::traced_test]
    fn missing_type_is_logged_as_a_warning() {
        let _ = rewrite_source(
            "a.go",
            SOMETHING.to_string(),
            "Missing",
            MissingTypePolicy::Prepend,
        );

        assert!(logs_contain("Type not declared"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn generate_logs_each_stage() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("something.go");
        std::fs::write(&path, SOMETHING).expect("seed");

        let config = GenerateConfig::new(&path, "Something").expect("config");
        generate(&config).expect("generates");

        assert!(logs_contain("Parsed Go source"));
        assert!(logs_contain("Splicing constructor"));
        assert!(logs_contain("Constructor generated"));
    }
}
