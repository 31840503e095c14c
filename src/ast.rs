//! Matrixfile abstract syntax tree.
//!
//! These structures mirror the YAML schema of a `Matrixfile`. They are
//! deserialised through [`crate::project`], which checks the declared
//! version before any target is compiled.
//!
//! ```yaml
//! version: "1.0.0"
//! matrices:
//!   cxx:
//!     - { axis: compiler, values: [clang, gcc] }
//! rules:
//!   - name: cc
//!     command: "cc -c $in -o $out"
//!     extensions: [o]
//! targets:
//!   - name: hello
//!     rule: cc
//!     matrix: cxx
//! ```
//!
//! ```rust
//! use buildmatrix::project;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let yaml = "version: \"1.0.0\"\nrules:\n  - name: cc\n    command: cc\ntargets:\n  - name: hello\n    rule: cc";
//! let project = project::from_str(yaml)?;
//! assert_eq!(project.targets.len(), 1);
//! # Ok(()) }
//! ```

use indexmap::IndexMap;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::variant::VariantAxis;

/// String variables, kept in declaration order.
pub type Vars = IndexMap<String, String>;

/// Top-level structure of a `Matrixfile`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    /// Semantic version of the file format.
    pub version: Version,

    /// Header emitted as the first comment of the generated file.
    #[serde(default)]
    pub comment: Option<String>,

    /// Project-wide variables visible to every template.
    #[serde(default)]
    pub vars: Vars,

    /// Named variant matrices; axis order is significant.
    #[serde(default)]
    pub matrices: IndexMap<String, Vec<VariantAxis>>,

    /// Rule kinds targets may reference.
    #[serde(default)]
    pub rules: Vec<Rule>,

    /// Target declarations, compiled in order.
    #[serde(default)]
    pub targets: Vec<Target>,
}

/// A rule kind: its command and the outputs each invocation declares.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    /// Identifier referenced by targets.
    pub name: String,
    /// Command line in Ninja syntax.
    pub command: String,
    /// Optional progress description.
    #[serde(default)]
    pub description: Option<String>,
    /// Output suffixes; one output per entry.
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// A single declared target.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    /// Target name.
    pub name: String,
    /// Rule building each variant.
    pub rule: String,
    /// Primary source; becomes the first explicit input.
    #[serde(default)]
    pub source: Option<String>,
    /// Explicit dependency labels.
    #[serde(default)]
    pub deps: Vec<String>,
    /// File listing further explicit labels, one per line.
    #[serde(default)]
    pub deps_manifest: Option<String>,
    /// Implicit dependency labels.
    #[serde(default)]
    pub implicit: Vec<String>,
    /// Output path stem template. Defaults to the target name.
    #[serde(default)]
    pub output_prefix: Option<String>,
    /// Name of the matrix to expand. Omitted means a single variant.
    #[serde(default)]
    pub matrix: Option<String>,
    /// Whether aliases are generated.
    #[serde(default)]
    pub top_level: bool,
    /// Stable names for the default variant's primary output.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Tag of the variant aliases resolve to.
    #[serde(default)]
    pub default_variant: Option<String>,
    /// Passthrough variables bound on every build statement.
    #[serde(default)]
    pub vars: Vars,
}
