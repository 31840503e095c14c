//! Variant matrices and their ordered cross-product.
//!
//! A [`VariantMatrix`] owns an ordered list of [`VariantAxis`] values. Its
//! expansion walks the axes as nested loops with the first declared axis
//! outermost, so the first [`VariantTuple`] is always built from the first
//! value of every axis. Aliasing relies on that ordering to pick a default
//! variant.
//!
//! # Examples
//!
//! ```
//! use buildmatrix::variant::{VariantAxis, VariantMatrix};
//!
//! let matrix = VariantMatrix::new(vec![
//!     VariantAxis::new("compiler", ["clang", "gcc"]),
//!     VariantAxis::new("mode", ["dbg"]),
//! ]);
//! let tags: Vec<String> = matrix.expand().iter().map(|t| t.tag()).collect();
//! assert_eq!(tags, ["clang.dbg", "gcc.dbg"]);
//! ```

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Separator placed between axis values in a variant tag.
pub const TAG_SEPARATOR: &str = ".";

/// A named enumeration of discrete configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantAxis {
    /// Axis name, exposed to templates as a variable.
    pub axis: String,
    /// Values in declaration order.
    #[serde(default)]
    pub values: Vec<String>,
}

impl VariantAxis {
    /// Build an axis from a name and its ordered values.
    pub fn new<I, S>(axis: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            axis: axis.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered set of orthogonal axes.
///
/// A matrix with no axes expands to a single trivial tuple whose tag is
/// empty. A matrix containing an axis without values expands to nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantMatrix {
    axes: Vec<VariantAxis>,
}

impl VariantMatrix {
    /// Create a matrix from axes in caller-significant order.
    #[must_use]
    pub const fn new(axes: Vec<VariantAxis>) -> Self {
        Self { axes }
    }

    /// The matrix with no axes; expands to one untagged variant.
    #[must_use]
    pub const fn trivial() -> Self {
        Self { axes: Vec::new() }
    }

    /// Axes in declaration order.
    #[must_use]
    pub fn axes(&self) -> &[VariantAxis] {
        &self.axes
    }

    /// Number of tuples [`Self::expand`] yields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.axes.iter().map(|axis| axis.values.len()).product()
    }

    /// Whether the matrix expands to no variants at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produce the ordered cross-product of all axes.
    ///
    /// The result is a pure function of the axis list; calling it repeatedly
    /// yields identical sequences.
    #[must_use]
    pub fn expand(&self) -> Vec<VariantTuple> {
        let mut tuples = vec![VariantTuple::default()];
        for axis in &self.axes {
            tuples = tuples
                .iter()
                .flat_map(|prefix| {
                    axis.values
                        .iter()
                        .map(move |value| prefix.extended(&axis.axis, value))
                })
                .collect();
        }
        tuples
    }
}

/// One concrete combination of axis values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct VariantTuple {
    choices: Vec<(String, String)>,
}

impl VariantTuple {
    fn extended(&self, axis: &str, value: &str) -> Self {
        let mut choices = self.choices.clone();
        choices.push((axis.to_owned(), value.to_owned()));
        Self { choices }
    }

    /// `(axis, value)` pairs in axis order.
    pub fn choices(&self) -> impl Iterator<Item = (&str, &str)> {
        self.choices
            .iter()
            .map(|(axis, value)| (axis.as_str(), value.as_str()))
    }

    /// Value chosen for `axis`, if the tuple has one.
    #[must_use]
    pub fn get(&self, axis: &str) -> Option<&str> {
        self.choices()
            .find_map(|(name, value)| (name == axis).then_some(value))
    }

    /// Canonical tag: chosen values joined in axis order.
    #[must_use]
    pub fn tag(&self) -> String {
        self.choices
            .iter()
            .map(|(_, value)| value)
            .join(TAG_SEPARATOR)
    }

    /// Whether this is the untagged variant of an axis-free matrix.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.choices.is_empty()
    }
}

impl Display for VariantTuple {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}
