//! Project-to-statement-stream compilation pass.

use std::collections::HashMap;

use camino::Utf8Path;
use tracing::{debug, warn};

use crate::ast::{Project, Rule, Target};
use crate::graph::{GraphWriter, Statement};
use crate::manifest::ManifestReader;
use crate::ninja_gen::symlink_rule;
use crate::variant::VariantMatrix;

use super::{AliasGenerator, GraphError, RuleDecl, Scope, TargetCompiler, TargetSpec};

/// Compile every target of `project` into one ordered statement stream.
///
/// Relative `deps_manifest` paths resolve against `root`, normally the
/// directory holding the project file. The stream starts with the project
/// comment, then every rule declaration, then each target's build nodes
/// followed by its aliases, in declaration order.
///
/// # Errors
///
/// Returns the first [`GraphError`] raised by any stage. No partial stream is
/// returned.
pub fn compile_project(project: &Project, root: &Utf8Path) -> Result<Vec<Statement>, GraphError> {
    let mut writer = GraphWriter::new();
    if let Some(comment) = &project.comment {
        writer.emit_comment(comment.clone());
    }

    let mut rules: HashMap<&str, &Rule> = HashMap::new();
    for rule in &project.rules {
        writer.declare_rule(RuleDecl {
            name: rule.name.clone(),
            command: rule.command.clone(),
            description: rule.description.clone(),
        })?;
        rules.insert(rule.name.as_str(), rule);
    }
    if project
        .targets
        .iter()
        .any(|t| t.top_level && !t.aliases.is_empty())
    {
        writer.declare_rule(symlink_rule())?;
    }

    let matrices: HashMap<&str, VariantMatrix> = project
        .matrices
        .iter()
        .map(|(name, axes)| (name.as_str(), VariantMatrix::new(axes.clone())))
        .collect();
    let globals: Scope = project
        .vars
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let compiler = TargetCompiler::new(globals);

    for target in &project.targets {
        let spec = target_spec(target, &rules, &matrices, root)?;
        let nodes = compiler.compile(&spec)?;
        if nodes.is_empty() {
            debug!(target_name = %spec.name, "matrix expanded to no variants");
        }
        let aliases = AliasGenerator::generate(&spec, &nodes)?;
        for node in nodes {
            writer.insert(node)?;
        }
        for alias in aliases {
            writer.insert_alias(alias)?;
        }
    }

    debug!(outputs = writer.output_count(), "compiled project");
    Ok(writer.finalize())
}

fn target_spec(
    target: &Target,
    rules: &HashMap<&str, &Rule>,
    matrices: &HashMap<&str, VariantMatrix>,
    root: &Utf8Path,
) -> Result<TargetSpec, GraphError> {
    let rule = rules
        .get(target.rule.as_str())
        .ok_or_else(|| GraphError::UnknownRule {
            target: target.name.clone(),
            rule: target.rule.clone(),
        })?;
    let matrix = match &target.matrix {
        None => VariantMatrix::trivial(),
        Some(name) => matrices
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| GraphError::UnknownMatrix {
                target: target.name.clone(),
                matrix: name.clone(),
            })?,
    };

    let mut explicit_deps: Vec<String> = target.source.iter().cloned().collect();
    if let Some(manifest) = &target.deps_manifest {
        explicit_deps.extend(ManifestReader::read(&root.join(manifest))?);
    }
    explicit_deps.extend(target.deps.iter().cloned());

    if !target.top_level && !target.aliases.is_empty() {
        warn!(target_name = %target.name, "aliases ignored on a target that is not top_level");
    }
    let alias_names = if target.top_level {
        target.aliases.clone()
    } else {
        Vec::new()
    };

    Ok(TargetSpec {
        name: target.name.clone(),
        rule: rule.name.clone(),
        source: target.source.clone(),
        explicit_deps,
        implicit_deps: target.implicit.clone(),
        matrix,
        top_level: target.top_level,
        alias_names,
        output_prefix: target
            .output_prefix
            .clone()
            .unwrap_or_else(|| target.name.clone()),
        extensions: rule.extensions.clone(),
        vars: target
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        default_variant: target.default_variant.clone(),
    })
}
