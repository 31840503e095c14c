//! Ordered statement stream for one compilation pass.
//!
//! [`GraphWriter`] accumulates comments, rule declarations, build nodes and
//! aliases in insertion order. It owns the set of accepted output paths and
//! rejects any statement that would declare a path a second time, so every
//! artefact in the finished stream is produced by exactly one statement.
//! Paths are compared in canonical form, as Ninja compares them. Values that
//! end up on a single Ninja line must not contain line breaks.
//!
//! # Examples
//!
//! ```
//! use buildmatrix::graph::GraphWriter;
//! use buildmatrix::ir::{TargetCompiler, TargetSpec};
//!
//! let mut writer = GraphWriter::new();
//! writer.emit_comment("generated");
//! for node in TargetCompiler::default().compile(&TargetSpec::new("a", "cc")).expect("compile") {
//!     writer.insert(node).expect("unique outputs");
//! }
//! assert_eq!(writer.finalize().len(), 2);
//! ```

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::canon::canon_path;
use crate::ir::{Alias, BuildNode, GraphError, RuleDecl};

/// One entry of the emitted stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Statement {
    /// Free-form annotation.
    Comment(String),
    /// Rule declaration.
    Rule(RuleDecl),
    /// Concrete build statement.
    Build(BuildNode),
    /// Symbolic-link style redirection.
    Alias(Alias),
}

/// Accumulates statements and enforces output-path uniqueness.
#[derive(Debug, Default)]
pub struct GraphWriter {
    statements: Vec<Statement>,
    outputs: HashSet<Utf8PathBuf>,
    rules: HashSet<String>,
}

impl GraphWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a free-form annotation.
    pub fn emit_comment(&mut self, text: impl Into<String>) {
        self.statements.push(Statement::Comment(text.into()));
    }

    /// Append a rule declaration.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmbeddedNewline`] when the name, command or
    /// description spans lines, and [`GraphError::DuplicateRule`] when a rule
    /// with the same name was already declared.
    pub fn declare_rule(&mut self, rule: RuleDecl) -> Result<(), GraphError> {
        single_line(&rule.name, "rule name", &rule.name)?;
        single_line(&rule.name, "command", &rule.command)?;
        if let Some(description) = &rule.description {
            single_line(&rule.name, "description", description)?;
        }
        if !self.rules.insert(rule.name.clone()) {
            return Err(GraphError::DuplicateRule { name: rule.name });
        }
        self.statements.push(Statement::Rule(rule));
        Ok(())
    }

    /// Append a build node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmbeddedNewline`] when a path or variable value
    /// spans lines, and [`GraphError::DuplicateOutput`] when any of the node's
    /// outputs was already accepted or the node lists one path twice. The
    /// writer is left unchanged in either case.
    pub fn insert(&mut self, node: BuildNode) -> Result<(), GraphError> {
        check_node(&node)?;
        self.claim(node.outputs.iter().map(Utf8PathBuf::as_path))?;
        self.statements.push(Statement::Build(node));
        Ok(())
    }

    /// Append an alias, treating its name as an output path.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmbeddedNewline`] when a path spans lines, and
    /// [`GraphError::DuplicateOutput`] when the alias name collides with an
    /// accepted output.
    pub fn insert_alias(&mut self, alias: Alias) -> Result<(), GraphError> {
        let name = alias.name.as_str();
        single_line(name, "alias name", name)?;
        single_line(name, "alias target", alias.target.as_str())?;
        single_line(name, "link target", alias.link_target.as_str())?;
        self.claim(std::iter::once(alias.name.as_path()))?;
        self.statements.push(Statement::Alias(alias));
        Ok(())
    }

    /// Whether `path`, or another spelling of it, is already declared by an
    /// accepted statement.
    #[must_use]
    pub fn declares(&self, path: &Utf8Path) -> bool {
        self.outputs.contains(&canon_path(path))
    }

    /// Number of accepted output paths.
    #[must_use]
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// The accumulated statements in insertion order.
    ///
    /// Validation happened on insertion; this only copies the stream out, so
    /// repeated calls return identical results.
    #[must_use]
    pub fn finalize(&self) -> Vec<Statement> {
        self.statements.clone()
    }

    fn claim<'a>(&mut self, paths: impl Iterator<Item = &'a Utf8Path>) -> Result<(), GraphError> {
        let mut claimed: HashSet<Utf8PathBuf> = HashSet::new();
        let mut dups: Vec<String> = Vec::new();
        for path in paths {
            let key = canon_path(path);
            if self.outputs.contains(&key) || claimed.contains(&key) {
                dups.push(path.as_str().to_owned());
            } else {
                claimed.insert(key);
            }
        }
        if !dups.is_empty() {
            dups.sort();
            dups.dedup();
            return Err(GraphError::DuplicateOutput { outputs: dups });
        }
        self.outputs.extend(claimed);
        Ok(())
    }
}

fn check_node(node: &BuildNode) -> Result<(), GraphError> {
    let statement = node
        .primary_output()
        .map_or_else(|| node.target.clone(), |p| p.as_str().to_owned());
    for path in &node.outputs {
        single_line(&statement, "output", path.as_str())?;
    }
    for input in node.inputs.iter().chain(&node.implicit_inputs) {
        single_line(&statement, "input", input)?;
    }
    for (key, value) in &node.variables {
        single_line(&statement, "variable name", key)?;
        single_line(&statement, &format!("variable '{key}'"), value)?;
    }
    Ok(())
}

fn single_line(statement: &str, field: &str, value: &str) -> Result<(), GraphError> {
    if value.contains(['\n', '\r']) {
        return Err(GraphError::EmbeddedNewline {
            statement: statement.to_owned(),
            field: field.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{TargetCompiler, TargetSpec};
    use rstest::rstest;

    fn node(name: &str, extensions: &[&str]) -> BuildNode {
        let spec = TargetSpec::new(name, "cc").with_extensions(extensions.iter().copied());
        let mut nodes = TargetCompiler::default().compile(&spec).expect("compile");
        nodes.pop().expect("one node")
    }

    #[rstest]
    fn overlapping_output_is_rejected_without_side_effects() {
        let mut writer = GraphWriter::new();
        writer.insert(node("a", &["o", "d"])).expect("first insert");
        let before = writer.finalize();

        let err = writer
            .insert(node("a", &["h", "o"]))
            .expect_err("duplicate output");
        match err {
            GraphError::DuplicateOutput { outputs } => assert_eq!(outputs, ["a.o"]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(writer.output_count(), 2);
        assert!(!writer.declares(Utf8Path::new("a.h")));
        assert_eq!(writer.finalize(), before);
    }

    #[rstest]
    fn node_repeating_a_path_is_rejected() {
        let mut writer = GraphWriter::new();
        let err = writer.insert(node("a", &["o", ".o"])).expect_err("repeat");
        assert!(matches!(err, GraphError::DuplicateOutput { ref outputs } if outputs == &["a.o"]));
        assert_eq!(writer.output_count(), 0);
    }

    #[rstest]
    fn alias_cannot_shadow_an_output() {
        let mut writer = GraphWriter::new();
        writer.insert(node("prog", &[])).expect("insert");
        let alias = Alias {
            name: "prog".into(),
            target: "prog".into(),
            link_target: "prog".into(),
        };
        assert!(matches!(
            writer.insert_alias(alias),
            Err(GraphError::DuplicateOutput { .. })
        ));
    }

    #[rstest]
    fn rules_are_declared_once() {
        let mut writer = GraphWriter::new();
        let rule = RuleDecl {
            name: "cc".into(),
            command: "cc $in -o $out".into(),
            description: None,
        };
        writer.declare_rule(rule.clone()).expect("declare");
        assert!(matches!(
            writer.declare_rule(rule),
            Err(GraphError::DuplicateRule { ref name }) if name == "cc"
        ));
    }

    #[rstest]
    fn finalize_preserves_insertion_order_and_is_idempotent() {
        let mut writer = GraphWriter::new();
        writer.emit_comment("header");
        writer.insert(node("b", &["o"])).expect("insert b");
        writer.insert(node("a", &["o"])).expect("insert a");
        let first = writer.finalize();
        assert_eq!(first, writer.finalize());
        let kinds: Vec<String> = first
            .iter()
            .map(|s| match s {
                Statement::Comment(text) => format!("# {text}"),
                Statement::Build(n) => n.target.clone(),
                other => format!("{other:?}"),
            })
            .collect();
        assert_eq!(kinds, ["# header", "b", "a"]);
    }

    #[rstest]
    fn differently_spelled_paths_collide() {
        let mut writer = GraphWriter::new();
        writer.insert(node("a", &["o"])).expect("insert");
        let alias = Alias {
            name: "./x/../a.o".into(),
            target: "a.o".into(),
            link_target: "a.o".into(),
        };
        let err = writer.insert_alias(alias).expect_err("same file");
        assert!(
            matches!(err, GraphError::DuplicateOutput { ref outputs } if outputs == &["./x/../a.o"]),
            "{err}"
        );
        assert!(writer.declares(Utf8Path::new("./a.o")));
        assert_eq!(writer.output_count(), 1);
    }

    #[rstest]
    fn multiline_variable_is_rejected_without_side_effects() {
        let spec = TargetSpec::new("a", "cc")
            .with_extensions(["o"])
            .with_var("flags", "-O2\nbuild evil: phony");
        let bad = TargetCompiler::default()
            .compile(&spec)
            .expect("compile")
            .pop()
            .expect("one node");
        let mut writer = GraphWriter::new();
        let err = writer.insert(bad).expect_err("newline");
        assert!(
            matches!(
                err,
                GraphError::EmbeddedNewline { ref statement, ref field }
                    if statement == "a.o" && field == "variable 'flags'"
            ),
            "{err}"
        );
        assert_eq!(writer.output_count(), 0);
        assert!(writer.finalize().is_empty());
    }

    #[rstest]
    #[case("cc $in\nrule evil", None)]
    #[case("cc $in", Some("CC\r$out"))]
    fn multiline_rule_is_rejected(#[case] command: &str, #[case] description: Option<&str>) {
        let mut writer = GraphWriter::new();
        let rule = RuleDecl {
            name: "cc".into(),
            command: command.into(),
            description: description.map(str::to_owned),
        };
        assert!(matches!(
            writer.declare_rule(rule),
            Err(GraphError::EmbeddedNewline { .. })
        ));
        assert!(writer.finalize().is_empty());
    }
}
