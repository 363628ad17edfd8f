//! Merge-or-keep decisions for sub-part references.

use brickmesh_library::PartKind;

/// What the builder knows about one sub-part reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceInfo<'a> {
    /// Canonical name of the referenced part.
    pub name: &'a str,
    /// Where the referenced file was found.
    pub kind: PartKind,
    /// Canonical name of the referencing part.
    pub parent: &'a str,
    /// Kind of the referencing part.
    pub parent_kind: PartKind,
}

/// Decides whether a referenced part stays a separate child node or is
/// folded into its parent's buffers.
///
/// A part's template is built once and reused wherever the part appears, so
/// the decision can only depend on the referencing part and the reference
/// itself, never on where that part sits in the tree.
pub trait MergePolicy {
    /// `true` keeps the reference as a child node.
    fn keep_as_child(&self, reference: &ReferenceInfo<'_>) -> bool;
}

impl<F> MergePolicy for F
where
    F: Fn(&ReferenceInfo<'_>) -> bool,
{
    fn keep_as_child(&self, reference: &ReferenceInfo<'_>) -> bool {
        self(reference)
    }
}

/// Fold everything into the root.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenAll;

impl MergePolicy for FlattenAll {
    fn keep_as_child(&self, _: &ReferenceInfo<'_>) -> bool {
        false
    }
}

/// Keep whole parts and sub-models as children; fold subparts and
/// primitives into the part that uses them.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepParts;

impl MergePolicy for KeepParts {
    fn keep_as_child(&self, reference: &ReferenceInfo<'_>) -> bool {
        reference.kind.is_part_or_model() && reference.parent_kind != PartKind::Part
    }
}

/// Keep every reference as a child node.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

impl MergePolicy for KeepAll {
    fn keep_as_child(&self, _: &ReferenceInfo<'_>) -> bool {
        true
    }
}
