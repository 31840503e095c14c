//! Lexical path canonicalisation.
//!
//! Ninja compares paths after folding `.` and `..` components, so two
//! spellings of one artefact must be treated as the same output here too.
//! Nothing touches the disk.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Fold `.` components and resolve `..` against preceding normal components.
///
/// Leading `..` components that have nothing to cancel are kept, and `..`
/// directly under the root is dropped. `"."` canonicalises to the empty path.
#[must_use]
pub fn canon_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut parts: Vec<Utf8Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match parts.last() {
                Some(Utf8Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().map(Utf8Component::as_str).collect()
}

/// Whether `path` climbs above its starting directory once canonicalised.
#[must_use]
pub fn escapes_root(path: &Utf8Path) -> bool {
    matches!(
        canon_path(path).components().next(),
        Some(Utf8Component::ParentDir)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("foo", "foo")]
    #[case("foo/bar", "foo/bar")]
    #[case("./foo", "foo")]
    #[case("foo/./bar", "foo/bar")]
    #[case("foo//bar", "foo/bar")]
    #[case("/foo", "/foo")]
    #[case("foo/../bar", "bar")]
    #[case("/foo/../bar", "/bar")]
    #[case("/../bar", "/bar")]
    #[case("../foo", "../foo")]
    #[case("../foo/../bar", "../bar")]
    #[case("../../bar", "../../bar")]
    #[case(".", "")]
    fn canonicalises(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(canon_path(Utf8Path::new(raw)), Utf8PathBuf::from(expected));
    }

    #[rstest]
    #[case("osh", false)]
    #[case("bin/../osh", false)]
    #[case("../osh", true)]
    #[case("bin/../../osh", true)]
    fn detects_escaping_paths(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(escapes_root(Utf8Path::new(raw)), expected);
    }
}
