//! Statement stream fingerprinting.
//!
//! This module provides the [`StreamHasher`] type used to compute a stable
//! SHA-256 digest of a finalised [`Statement`] stream. Two passes over the
//! same declarations must yield the same digest; comparing fingerprints is a
//! cheap way to confirm that generation is reproducible.
//!
//! # Examples
//!
//! ```
//! use buildmatrix::graph::Statement;
//! use buildmatrix::hasher::StreamHasher;
//!
//! let stream = vec![Statement::Comment("hello".into())];
//! let digest = StreamHasher::digest(&stream);
//! assert_eq!(digest.len(), 64);
//! ```

use sha2::{Digest, Sha256};

use crate::graph::Statement;
use crate::ir::{Alias, BuildNode, RuleDecl};

/// Computes stable digests for statement streams.
pub struct StreamHasher;

impl StreamHasher {
    /// Hex-encoded SHA-256 of `statements`.
    #[must_use]
    pub fn digest(statements: &[Statement]) -> String {
        let mut hasher = Sha256::new();
        for statement in statements {
            Self::hash_statement(&mut hasher, statement);
        }
        format!("{:x}", hasher.finalize())
    }

    fn hash_statement(hasher: &mut Sha256, statement: &Statement) {
        match statement {
            Statement::Comment(text) => {
                hasher.update(b"com");
                Self::update_with_len(hasher, text.as_bytes());
            }
            Statement::Rule(rule) => {
                hasher.update(b"rule");
                Self::hash_rule(hasher, rule);
            }
            Statement::Build(node) => {
                hasher.update(b"build");
                Self::hash_node(hasher, node);
            }
            Statement::Alias(alias) => {
                hasher.update(b"alias");
                Self::hash_alias(hasher, alias);
            }
        }
    }

    fn hash_rule(hasher: &mut Sha256, rule: &RuleDecl) {
        Self::update_with_len(hasher, rule.name.as_bytes());
        Self::update_with_len(hasher, rule.command.as_bytes());
        match &rule.description {
            Some(text) => {
                hasher.update(b"1");
                Self::update_with_len(hasher, text.as_bytes());
            }
            None => hasher.update(b"0"),
        }
    }

    fn hash_node(hasher: &mut Sha256, node: &BuildNode) {
        Self::update_with_len(hasher, node.rule.as_bytes());
        Self::hash_list(hasher, node.outputs.iter().map(|p| p.as_str()));
        Self::hash_list(hasher, node.inputs.iter().map(String::as_str));
        Self::hash_list(hasher, node.implicit_inputs.iter().map(String::as_str));
        Self::update_count(hasher, node.variables.len());
        for (key, value) in &node.variables {
            Self::update_with_len(hasher, key.as_bytes());
            Self::update_with_len(hasher, value.as_bytes());
        }
    }

    fn hash_alias(hasher: &mut Sha256, alias: &Alias) {
        Self::update_with_len(hasher, alias.name.as_str().as_bytes());
        Self::update_with_len(hasher, alias.target.as_str().as_bytes());
        Self::update_with_len(hasher, alias.link_target.as_str().as_bytes());
    }

    fn hash_list<'a>(hasher: &mut Sha256, items: impl ExactSizeIterator<Item = &'a str>) {
        Self::update_count(hasher, items.len());
        for item in items {
            Self::update_with_len(hasher, item.as_bytes());
        }
    }

    fn update_count(hasher: &mut Sha256, count: usize) {
        hasher.update(format!("#{count}:").as_bytes());
    }

    fn update_with_len(hasher: &mut Sha256, bytes: &[u8]) {
        let len = bytes.len();
        hasher.update(format!("{len}:").as_bytes());
        hasher.update(bytes);
    }
}
