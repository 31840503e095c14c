//! Per-variant expansion of a single target.

use std::collections::HashSet;

use camino::Utf8PathBuf;
use itertools::Itertools;
use tracing::debug;

use super::substitute::{Scope, substitute, substitute_all};
use super::{BuildNode, GraphError, TargetSpec};
use crate::variant::{TAG_SEPARATOR, VariantTuple};

/// Variable bound to the variant's canonical tag.
pub const VARIANT_TAG_VAR: &str = "variant_tag";
/// Variable bound to the substituted output prefix.
pub const OUT_PREFIX_VAR: &str = "out_prefix";
/// Variable bound to the target name.
pub const NAME_VAR: &str = "name";
/// Variable bound to the primary source, when the target has one.
pub const SOURCE_VAR: &str = "source";

/// Names the compiler binds itself; axes and passthrough vars may not reuse them.
const RESERVED_VARS: [&str; 4] = [NAME_VAR, SOURCE_VAR, OUT_PREFIX_VAR, VARIANT_TAG_VAR];

/// Expands [`TargetSpec`] declarations into [`BuildNode`] values.
///
/// The compiler holds project-wide variables that every template may
/// reference. They are visible during substitution but are not copied onto
/// the emitted nodes.
#[derive(Debug, Clone, Default)]
pub struct TargetCompiler {
    globals: Scope,
}

impl TargetCompiler {
    /// Create a compiler whose templates can see `globals`.
    #[must_use]
    pub const fn new(globals: Scope) -> Self {
        Self { globals }
    }

    /// Produce one node per variant of `spec`, in matrix order.
    ///
    /// A matrix that expands to nothing yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ConflictingVariable`] when an axis or passthrough
    /// variable reuses a reserved name or another axis name, and
    /// [`GraphError::UnresolvedVariable`] when a template references a
    /// variable with no binding.
    pub fn compile(&self, spec: &TargetSpec) -> Result<Vec<BuildNode>, GraphError> {
        check_bindings(spec)?;
        let nodes = spec
            .matrix
            .expand()
            .into_iter()
            .map(|variant| self.compile_variant(spec, variant))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(target_name = %spec.name, variants = nodes.len(), "compiled target");
        Ok(nodes)
    }

    fn compile_variant(
        &self,
        spec: &TargetSpec,
        variant: VariantTuple,
    ) -> Result<BuildNode, GraphError> {
        let tag = variant.tag();
        let mut locals = Scope::new();
        locals.insert(NAME_VAR.to_owned(), spec.name.clone());
        for (axis, value) in variant.choices() {
            locals.insert(axis.to_owned(), value.to_owned());
        }
        locals.insert(VARIANT_TAG_VAR.to_owned(), tag.clone());

        let mut scope = self.globals.clone();
        scope.extend(locals.clone());
        if let Some(template) = &spec.source {
            let source = substitute(template, &scope)?;
            scope.insert(SOURCE_VAR.to_owned(), source.clone());
            locals.insert(SOURCE_VAR.to_owned(), source);
        }
        let prefix = substitute(&spec.output_prefix, &scope)?;
        scope.insert(OUT_PREFIX_VAR.to_owned(), prefix.clone());
        locals.insert(OUT_PREFIX_VAR.to_owned(), prefix.clone());

        let mut variables = locals;
        for (key, template) in &spec.vars {
            variables.insert(key.clone(), substitute(template, &scope)?);
        }

        Ok(BuildNode {
            target: spec.name.clone(),
            rule: spec.rule.clone(),
            outputs: output_paths(&prefix, &tag, &spec.extensions),
            inputs: substitute_all(&spec.explicit_deps, &scope)?,
            implicit_inputs: substitute_all(&spec.implicit_deps, &scope)?,
            variables,
            variant,
        })
    }
}

/// Every name bound on a node must come from exactly one place.
fn check_bindings(spec: &TargetSpec) -> Result<(), GraphError> {
    let mut bound: HashSet<&str> = RESERVED_VARS.into_iter().collect();
    let names = spec
        .matrix
        .axes()
        .iter()
        .map(|axis| axis.axis.as_str())
        .chain(spec.vars.keys().map(String::as_str));
    for name in names {
        if !bound.insert(name) {
            return Err(GraphError::ConflictingVariable {
                target: spec.name.clone(),
                name: name.to_owned(),
            });
        }
    }
    Ok(())
}

/// Join `prefix`, `tag` and each extension, skipping empty parts.
///
/// With no extensions a single output named after the prefix and tag is
/// declared.
fn output_paths(prefix: &str, tag: &str, extensions: &[String]) -> Vec<Utf8PathBuf> {
    let build = |ext: &str| {
        let ext = ext.trim_start_matches('.');
        Utf8PathBuf::from(
            [prefix, tag, ext]
                .into_iter()
                .filter(|part| !part.is_empty())
                .join(TAG_SEPARATOR),
        )
    };
    if extensions.is_empty() {
        vec![build("")]
    } else {
        extensions.iter().map(|ext| build(ext)).collect()
    }
}
