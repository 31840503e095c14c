//! Stable names for the default variant of top-level targets.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use tracing::debug;

use super::{Alias, BuildNode, GraphError, TargetSpec};
use crate::canon::{canon_path, escapes_root};

/// Rule used to materialise aliases as symbolic links at build time.
pub const SYMLINK_RULE: &str = "symlink";

/// Produces [`Alias`] entries for top-level targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct AliasGenerator;

impl AliasGenerator {
    /// Map each alias name of `spec` to the default node's primary output.
    ///
    /// The default node is the first one in matrix order unless `spec`
    /// names a `default_variant`. Targets that are not top-level, or that
    /// declare no alias names, yield no aliases.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NoDefaultVariant`] when aliases are requested but
    /// `nodes` is empty, [`GraphError::UnknownVariant`] when the requested
    /// default tag matches no node, and [`GraphError::InvalidAlias`] for an
    /// alias name that is empty, absolute or climbs out with `..`.
    pub fn generate(spec: &TargetSpec, nodes: &[BuildNode]) -> Result<Vec<Alias>, GraphError> {
        if !spec.top_level || spec.alias_names.is_empty() {
            return Ok(Vec::new());
        }
        let default = Self::default_node(spec, nodes)?;
        let Some(target) = default.primary_output() else {
            return Err(GraphError::NoDefaultVariant {
                target: spec.name.clone(),
            });
        };
        debug!(target_name = %spec.name, variant = %default.variant, "resolved alias default");
        spec.alias_names
            .iter()
            .map(|alias_name| {
                let link = canon_path(Utf8Path::new(alias_name));
                if link.as_str().is_empty() || link.is_absolute() || escapes_root(&link) {
                    return Err(GraphError::InvalidAlias {
                        target: spec.name.clone(),
                        alias: alias_name.clone(),
                    });
                }
                Ok(Alias {
                    link_target: relative_link(&link, target),
                    target: target.to_path_buf(),
                    name: link,
                })
            })
            .collect()
    }

    fn default_node<'a>(
        spec: &TargetSpec,
        nodes: &'a [BuildNode],
    ) -> Result<&'a BuildNode, GraphError> {
        let first = nodes.first().ok_or_else(|| GraphError::NoDefaultVariant {
            target: spec.name.clone(),
        })?;
        match &spec.default_variant {
            None => Ok(first),
            Some(tag) => nodes
                .iter()
                .find(|node| node.variant.tag() == *tag)
                .ok_or_else(|| GraphError::UnknownVariant {
                    target: spec.name.clone(),
                    variant: tag.clone(),
                }),
        }
    }
}

/// Express `target` relative to the directory that will hold `link`.
///
/// Both paths are compared in canonical form, so `.` and `..` components
/// never produce spurious `..` steps.
fn relative_link(link: &Utf8Path, target: &Utf8Path) -> Utf8PathBuf {
    if target.is_absolute() {
        return target.to_path_buf();
    }
    let from = canon_path(link);
    let to = canon_path(target);
    let base: Vec<Utf8Component<'_>> = from
        .parent()
        .map(|p| p.components().collect())
        .unwrap_or_default();
    let parts: Vec<Utf8Component<'_>> = to.components().collect();
    let common = base
        .iter()
        .zip(&parts)
        .take_while(|(a, b)| a == b)
        .count();
    let mut rel = Utf8PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    for part in parts.iter().skip(common) {
        rel.push(part.as_str());
    }
    rel
}
