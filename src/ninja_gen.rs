//! Ninja file generator.
//!
//! This module renders a finalised [`Statement`] stream as the textual syntax
//! expected by the Ninja build system. Statements are written in stream order
//! and build variables in key order, so identical streams always render to
//! identical bytes.

use crate::graph::Statement;
use crate::ir::{Alias, BuildNode, RuleDecl, SYMLINK_RULE};
use itertools::Itertools;
use std::fmt::{self, Display, Formatter};

/// Variable carrying an alias's relative link target.
pub const LINK_TARGET_VAR: &str = "target";

macro_rules! write_kv {
    ($f:expr, $key:expr, $opt:expr) => {
        if let Some(val) = $opt {
            writeln!($f, "  {} = {}", $key, val)?;
        }
    };
}

/// Rule declaration backing alias statements.
#[must_use]
pub fn symlink_rule() -> RuleDecl {
    RuleDecl {
        name: SYMLINK_RULE.to_owned(),
        command: format!("ln -sf ${LINK_TARGET_VAR} $out"),
        description: Some("LINK $out".to_owned()),
    }
}

/// Generate a Ninja build file as a string.
#[must_use]
pub fn generate(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(|statement| DisplayStatement(statement).to_string())
        .collect()
}

/// Escape a path for use in a `build` line.
fn escape_path(path: &str) -> String {
    path.replace('$', "$$")
        .replace(' ', "$ ")
        .replace(':', "$:")
}

/// Escape a literal value bound to a variable; only `$` is special there.
fn escape_value(value: &str) -> String {
    value.replace('$', "$$")
}

fn join<I, S>(paths: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    paths
        .into_iter()
        .map(|p| escape_path(p.as_ref()))
        .join(" ")
}

struct DisplayStatement<'a>(&'a Statement);

impl Display for DisplayStatement<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Statement::Comment(text) => {
                for line in text.lines() {
                    if line.is_empty() {
                        writeln!(f, "#")?;
                    } else {
                        writeln!(f, "# {line}")?;
                    }
                }
                writeln!(f)
            }
            Statement::Rule(rule) => write!(f, "{}", DisplayRule(rule)),
            Statement::Build(node) => write!(f, "{}", DisplayNode(node)),
            Statement::Alias(alias) => write!(f, "{}", DisplayAlias(alias)),
        }
    }
}

struct DisplayRule<'a>(&'a RuleDecl);

impl Display for DisplayRule<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "rule {}", self.0.name)?;
        writeln!(f, "  command = {}", self.0.command)?;
        write_kv!(f, "description", &self.0.description);
        writeln!(f)
    }
}

struct DisplayNode<'a>(&'a BuildNode);

impl Display for DisplayNode<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let node = self.0;
        write!(f, "build {}: {}", join(&node.outputs), node.rule)?;
        if !node.inputs.is_empty() {
            write!(f, " {}", join(&node.inputs))?;
        }
        if !node.implicit_inputs.is_empty() {
            write!(f, " | {}", join(&node.implicit_inputs))?;
        }
        writeln!(f)?;
        for (key, value) in &node.variables {
            if value.is_empty() {
                writeln!(f, "  {key} =")?;
            } else {
                writeln!(f, "  {key} = {value}")?;
            }
        }
        writeln!(f)
    }
}

struct DisplayAlias<'a>(&'a Alias);

impl Display for DisplayAlias<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let alias = self.0;
        writeln!(
            f,
            "build {}: {SYMLINK_RULE} {}",
            escape_path(alias.name.as_str()),
            escape_path(alias.target.as_str())
        )?;
        writeln!(
            f,
            "  {LINK_TARGET_VAR} = {}",
            escape_value(alias.link_target.as_str())
        )?;
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphWriter;
    use crate::ir::{TargetCompiler, TargetSpec};
    use rstest::rstest;

    #[rstest]
    fn generate_simple_ninja() {
        let mut writer = GraphWriter::new();
        writer.emit_comment("Generated by test");
        writer
            .declare_rule(RuleDecl {
                name: "cc".into(),
                command: "cc -c $in -o $out".into(),
                description: None,
            })
            .expect("rule");
        let spec = TargetSpec::new("T", "cc")
            .with_extensions(["o"])
            .with_explicit_deps(["//a", "//b"])
            .with_implicit_deps(["//c"]);
        for node in TargetCompiler::default().compile(&spec).expect("compile") {
            writer.insert(node).expect("insert");
        }

        let ninja = generate(&writer.finalize());
        let expected = concat!(
            "# Generated by test\n\n",
            "rule cc\n",
            "  command = cc -c $in -o $out\n\n",
            "build T.o: cc //a //b | //c\n",
            "  name = T\n",
            "  out_prefix = T\n",
            "  variant_tag =\n\n",
        );
        assert_eq!(ninja, expected);
    }

    #[rstest]
    fn alias_renders_as_symlink_edge() {
        let alias = Alias {
            name: "_bin/osh".into(),
            target: "_bin/cxx-dbg/oils_cpp".into(),
            link_target: "cxx-dbg/oils_cpp".into(),
        };
        let ninja = generate(&[
            Statement::Rule(symlink_rule()),
            Statement::Alias(alias),
        ]);
        let expected = concat!(
            "rule symlink\n",
            "  command = ln -sf $target $out\n",
            "  description = LINK $out\n\n",
            "build _bin/osh: symlink _bin/cxx-dbg/oils_cpp\n",
            "  target = cxx-dbg/oils_cpp\n\n",
        );
        assert_eq!(ninja, expected);
    }

    #[rstest]
    fn alias_link_target_escapes_dollar() {
        let alias = Alias {
            name: "osh".into(),
            target: "_bin/$cc/osh bin".into(),
            link_target: "_bin/$cc/osh bin".into(),
        };
        let ninja = generate(&[Statement::Alias(alias)]);
        assert_eq!(
            ninja,
            "build osh: symlink _bin/$$cc/osh$ bin\n  target = _bin/$$cc/osh bin\n\n"
        );
    }

    #[rstest]
    #[case("plain/path.o", "plain/path.o")]
    #[case("with space", "with$ space")]
    #[case("c:/x", "c$:/x")]
    #[case("$dollar", "$$dollar")]
    fn paths_are_escaped(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_path(raw), expected);
    }

    #[rstest]
    fn generate_empty_stream() {
        assert!(generate(&[]).is_empty());
    }
}
