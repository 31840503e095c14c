//! Matrixfile loading helpers.
//!
//! The YAML is parsed with `serde-saphyr` into an intermediate JSON value and
//! then deserialised into [`Project`], so unknown keys and type mismatches are
//! reported against the schema rather than the YAML grammar. The declared
//! version must be compatible with [`SUPPORTED_VERSION`].

use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use semver::VersionReq;
use std::{fs, io, sync::LazyLock};
use thiserror::Error;

use crate::ast::Project;

/// Default project file name.
pub const DEFAULT_FILE_NAME: &str = "Matrixfile";

/// Version requirement every project file must satisfy.
pub const SUPPORTED_VERSION: &str = "^1";

static SUPPORTED: LazyLock<VersionReq> =
    LazyLock::new(|| VersionReq::parse(SUPPORTED_VERSION).unwrap_or(VersionReq::STAR));

/// Failures while loading a project file.
#[derive(Debug, Error, Diagnostic)]
pub enum ProjectError {
    /// The file could not be read.
    #[error("failed to read {path}")]
    #[diagnostic(code(buildmatrix::project::read))]
    Read {
        /// Path that was attempted.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The file is not valid YAML.
    #[error("{name} is not valid YAML")]
    #[diagnostic(code(buildmatrix::project::yaml))]
    Yaml {
        /// Display name of the source.
        name: String,
        /// Parser failure.
        #[source]
        source: serde_saphyr::Error,
    },

    /// The YAML does not match the project schema.
    #[error("{name} does not match the project schema")]
    #[diagnostic(code(buildmatrix::project::schema))]
    Schema {
        /// Display name of the source.
        name: String,
        /// Deserialisation failure.
        #[source]
        source: serde_json::Error,
    },

    /// The declared version is not supported.
    #[error("{name} declares version {found}, which does not satisfy {SUPPORTED_VERSION}")]
    #[diagnostic(
        code(buildmatrix::project::version),
        help("set `version` to a 1.x release")
    )]
    UnsupportedVersion {
        /// Display name of the source.
        name: String,
        /// Version found in the file.
        found: semver::Version,
    },
}

fn from_str_named(yaml: &str, name: &str) -> Result<Project, ProjectError> {
    let doc: serde_json::Value =
        serde_saphyr::from_str(yaml).map_err(|source| ProjectError::Yaml {
            name: name.to_owned(),
            source,
        })?;
    let project: Project = serde_json::from_value(doc).map_err(|source| ProjectError::Schema {
        name: name.to_owned(),
        source,
    })?;
    if !SUPPORTED.matches(&project.version) {
        return Err(ProjectError::UnsupportedVersion {
            name: name.to_owned(),
            found: project.version,
        });
    }
    Ok(project)
}

/// Parse a project from a YAML string.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, does not match the schema, or
/// declares an unsupported version.
pub fn from_str(yaml: &str) -> Result<Project, ProjectError> {
    from_str_named(yaml, DEFAULT_FILE_NAME)
}

/// Load a [`Project`] from the given file path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails to parse.
pub fn from_path(path: &Utf8Path) -> Result<Project, ProjectError> {
    let data = fs::read_to_string(path).map_err(|source| ProjectError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    from_str_named(&data, path.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_full_target() {
        let yaml = r#"
version: "1.2.0"
vars:
  bin: _bin
matrices:
  cxx:
    - axis: compiler
      values: [cxx, clang]
    - axis: mode
      values: [dbg, opt]
rules:
  - name: link
    command: "c++ -o $out $in"
    extensions: [""]
targets:
  - name: oils_cpp
    rule: link
    source: oils_cpp.cc
    deps: ["//cpp/core"]
    implicit: [stamp]
    matrix: cxx
    top_level: true
    aliases: [osh, ysh]
    vars:
      flags: "-O2"
"#;
        let project = from_str(yaml).expect("parse");
        let axes = project.matrices.get("cxx").expect("matrix");
        let names: Vec<&str> = axes.iter().map(|a| a.axis.as_str()).collect();
        assert_eq!(names, ["compiler", "mode"]);
        let target = project.targets.first().expect("target");
        assert!(target.top_level);
        assert_eq!(target.aliases, ["osh", "ysh"]);
        assert_eq!(target.matrix.as_deref(), Some("cxx"));
        assert_eq!(project.vars.get("bin").map(String::as_str), Some("_bin"));
    }

    #[rstest]
    fn matrices_keep_declaration_order() {
        let yaml = "version: \"1.0.0\"\nmatrices:\n  zeta: []\n  alpha: []\n  mid: []\n";
        let project = from_str(yaml).expect("parse");
        let keys: Vec<&str> = project.matrices.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[rstest]
    #[case("version: \"1.0.0\"\ntargets:\n  - name: a\n    rule: r\n    colour: blue\n")]
    #[case("version: \"1.0.0\"\ntargets:\n  - name: a\n")]
    #[case("targets: []\n")]
    fn schema_violations_are_rejected(#[case] yaml: &str) {
        assert!(matches!(from_str(yaml), Err(ProjectError::Schema { .. })));
    }

    #[rstest]
    fn invalid_yaml_is_rejected() {
        assert!(matches!(
            from_str("version: [unclosed"),
            Err(ProjectError::Yaml { .. })
        ));
    }

    #[rstest]
    fn unsupported_version_is_rejected() {
        let err = from_str("version: \"2.0.0\"\n").expect_err("version");
        assert!(matches!(err, ProjectError::UnsupportedVersion { ref found, .. } if found.major == 2));
    }

    #[rstest]
    fn missing_file_reports_path() {
        let err = from_path(Utf8Path::new("no/such/Matrixfile")).expect_err("missing");
        assert!(matches!(err, ProjectError::Read { ref path, .. } if path == "no/such/Matrixfile"));
    }
}
