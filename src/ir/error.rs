//! Errors raised while compiling targets into a build graph.

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Fatal failures of a compilation pass.
///
/// None of these are retried; the caller fixes the declaration and runs the
/// pass again.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    /// A dependency manifest could not be read.
    #[error("dependency manifest {path} could not be read")]
    #[diagnostic(code(buildmatrix::graph::resource_not_found))]
    ResourceNotFound {
        /// Path that was attempted.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Two statements claim the same artefact path.
    #[error("duplicate output(s) declared: {}", .outputs.join(", "))]
    #[diagnostic(
        code(buildmatrix::graph::duplicate_output),
        help("every output path must be produced by exactly one build statement")
    )]
    DuplicateOutput {
        /// Conflicting paths, sorted.
        outputs: Vec<String>,
    },

    /// Aliases were requested for a target whose matrix produced no variants.
    #[error("target '{target}' requests aliases but its matrix expands to no variants")]
    #[diagnostic(code(buildmatrix::graph::no_default_variant))]
    NoDefaultVariant {
        /// Target declaring the aliases.
        target: String,
    },

    /// The requested default variant is not produced by the target's matrix.
    #[error("target '{target}' names default variant '{variant}', which its matrix does not produce")]
    #[diagnostic(code(buildmatrix::graph::unknown_variant))]
    UnknownVariant {
        /// Target declaring the override.
        target: String,
        /// Tag that matched no variant.
        variant: String,
    },

    /// A template references a variable with no value in scope.
    #[error("unresolved variable '{name}' in '{template}'")]
    #[diagnostic(code(buildmatrix::graph::unresolved_variable))]
    UnresolvedVariable {
        /// Referenced variable name.
        name: String,
        /// Template containing the reference.
        template: String,
    },

    /// An axis or passthrough variable reuses a name bound by the compiler or
    /// by another axis.
    #[error("target '{target}' binds variable '{name}' more than once")]
    #[diagnostic(
        code(buildmatrix::graph::conflicting_variable),
        help("`name`, `source`, `out_prefix` and `variant_tag` are reserved; axis names and vars must not repeat them or each other")
    )]
    ConflictingVariable {
        /// Target declaring the binding.
        target: String,
        /// Name bound twice.
        name: String,
    },

    /// An alias name that cannot be placed inside the build directory.
    #[error("target '{target}' declares invalid alias '{alias}'")]
    #[diagnostic(
        code(buildmatrix::graph::invalid_alias),
        help("alias names must be non-empty relative paths that stay below the build directory")
    )]
    InvalidAlias {
        /// Target declaring the alias.
        target: String,
        /// Offending alias name.
        alias: String,
    },

    /// A value destined for a single Ninja line contains a line break.
    #[error("{field} of '{statement}' contains a line break")]
    #[diagnostic(code(buildmatrix::graph::embedded_newline))]
    EmbeddedNewline {
        /// Statement carrying the value: primary output, alias or rule name.
        statement: String,
        /// Which part of the statement holds the value.
        field: String,
    },

    /// A target references a rule that was never declared.
    #[error("target '{target}' references unknown rule '{rule}'")]
    #[diagnostic(code(buildmatrix::graph::unknown_rule))]
    UnknownRule {
        /// Referencing target.
        target: String,
        /// Missing rule name.
        rule: String,
    },

    /// A target references a matrix that was never declared.
    #[error("target '{target}' references unknown matrix '{matrix}'")]
    #[diagnostic(code(buildmatrix::graph::unknown_matrix))]
    UnknownMatrix {
        /// Referencing target.
        target: String,
        /// Missing matrix name.
        matrix: String,
    },

    /// Two rules share one identifier.
    #[error("rule '{name}' is declared more than once")]
    #[diagnostic(code(buildmatrix::graph::duplicate_rule))]
    DuplicateRule {
        /// Conflicting rule name.
        name: String,
    },
}
