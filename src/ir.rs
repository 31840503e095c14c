//! Intermediate representation of an expanded build graph.
//!
//! A [`TargetSpec`] is the immutable declaration of one target. The
//! [`TargetCompiler`] turns it into one [`BuildNode`] per variant, and the
//! [`AliasGenerator`] adds stable [`Alias`] names for top-level targets. The
//! types here carry no Ninja syntax; [`crate::ninja_gen`] renders them.
//!
//! # Examples
//!
//! ```
//! use buildmatrix::ir::{TargetCompiler, TargetSpec};
//! use buildmatrix::variant::{VariantAxis, VariantMatrix};
//!
//! let spec = TargetSpec::new("T", "cc")
//!     .with_extensions(["o"])
//!     .with_matrix(VariantMatrix::new(vec![
//!         VariantAxis::new("compiler", ["clang", "gcc"]),
//!         VariantAxis::new("mode", ["dbg"]),
//!     ]));
//! let nodes = TargetCompiler::default().compile(&spec).expect("compile");
//! assert_eq!(nodes.len(), 2);
//! assert_eq!(nodes[0].outputs[0].as_str(), "T.clang.dbg.o");
//! ```

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::manifest::DependencyLabel;
use crate::variant::{VariantMatrix, VariantTuple};

mod alias;
mod compile;
mod error;
mod from_project;
mod substitute;

pub use alias::{AliasGenerator, SYMLINK_RULE};
pub use compile::TargetCompiler;
pub use error::GraphError;
pub use from_project::compile_project;
pub use substitute::Scope;

/// Immutable declaration of a target, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    /// Target name, bound to `name` in templates.
    pub name: String,
    /// Rule identifier each node invokes.
    pub rule: String,
    /// Primary source path, bound to `source` in templates.
    pub source: Option<String>,
    /// Explicit inputs in declared order.
    pub explicit_deps: Vec<DependencyLabel>,
    /// Implicit inputs, kept apart from the explicit ones.
    pub implicit_deps: Vec<DependencyLabel>,
    /// Variant axes to expand.
    pub matrix: VariantMatrix,
    /// Whether aliases are generated for this target.
    pub top_level: bool,
    /// Stable names pointing at the default variant's primary output.
    pub alias_names: Vec<String>,
    /// Template for the output path stem.
    pub output_prefix: String,
    /// Output suffixes for the rule kind, one output per entry.
    pub extensions: Vec<String>,
    /// Passthrough variables attached to every node after substitution.
    pub vars: BTreeMap<String, String>,
    /// Tag of the variant aliases resolve to, instead of the first one.
    pub default_variant: Option<String>,
}

impl TargetSpec {
    /// Start a declaration for `name` built by `rule`.
    ///
    /// The output prefix defaults to the target name, the matrix to the
    /// trivial one, and every list to empty.
    pub fn new(name: impl Into<String>, rule: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            output_prefix: name.clone(),
            name,
            rule: rule.into(),
            source: None,
            explicit_deps: Vec::new(),
            implicit_deps: Vec::new(),
            matrix: VariantMatrix::trivial(),
            top_level: false,
            alias_names: Vec::new(),
            extensions: Vec::new(),
            vars: BTreeMap::new(),
            default_variant: None,
        }
    }

    /// Set the primary source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the explicit dependency labels.
    #[must_use]
    pub fn with_explicit_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<DependencyLabel>,
    {
        self.explicit_deps = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Set the implicit dependency labels.
    #[must_use]
    pub fn with_implicit_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<DependencyLabel>,
    {
        self.implicit_deps = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Set the variant matrix.
    #[must_use]
    pub fn with_matrix(mut self, matrix: VariantMatrix) -> Self {
        self.matrix = matrix;
        self
    }

    /// Mark the target top-level and set its alias names.
    #[must_use]
    pub fn with_aliases<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.top_level = true;
        self.alias_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the output prefix template.
    #[must_use]
    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = prefix.into();
        self
    }

    /// Set the output extensions.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Add a passthrough variable template.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Override the variant aliases resolve to.
    #[must_use]
    pub fn with_default_variant(mut self, tag: impl Into<String>) -> Self {
        self.default_variant = Some(tag.into());
        self
    }
}

/// One fully substituted build statement for a `(target, variant)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildNode {
    /// Name of the target this node was compiled from.
    pub target: String,
    /// Variant the node builds.
    pub variant: VariantTuple,
    /// Rule identifier.
    pub rule: String,
    /// Declared outputs; the first is the primary output.
    pub outputs: Vec<Utf8PathBuf>,
    /// Explicit inputs.
    pub inputs: Vec<DependencyLabel>,
    /// Implicit inputs.
    pub implicit_inputs: Vec<DependencyLabel>,
    /// Variables bound on the statement, sorted by key.
    pub variables: BTreeMap<String, String>,
}

impl BuildNode {
    /// The artefact aliases point at.
    #[must_use]
    pub fn primary_output(&self) -> Option<&Utf8Path> {
        self.outputs.first().map(Utf8PathBuf::as_path)
    }
}

/// A stable name redirecting to one node's primary output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alias {
    /// Path of the link itself.
    pub name: Utf8PathBuf,
    /// Primary output the link resolves to.
    pub target: Utf8PathBuf,
    /// `target` expressed relative to the directory holding `name`.
    pub link_target: Utf8PathBuf,
}

/// Rule declaration emitted ahead of the statements that use it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDecl {
    /// Rule identifier.
    pub name: String,
    /// Command line, in the executor's own variable syntax.
    pub command: String,
    /// Optional progress description.
    pub description: Option<String>,
}
