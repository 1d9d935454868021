//! Lineage metadata carried by faces and vertices.
//!
//! A [`Role`] is a coarse colouring that operators assign to every face and
//! vertex they emit. A [`Tag`] is a free-form label that users attach with
//! `tag_faces` and that operators propagate to derived faces.

use std::collections::BTreeSet;

/// Coarse lineage class of a face or vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Role {
    /// Not touched by the last operator.
    Ignored = 0,
    /// Derived from an element of the input.
    #[default]
    Existing = 1,
    /// Created by the last operator.
    New = 2,
    /// Created by the last operator, alternate colour.
    NewAlt = 3,
    /// Derived from the input, alternate colour.
    ExistingAlt = 4,
}

impl Role {
    /// All roles in discriminant order.
    pub const ALL: [Role; 5] = [
        Role::Ignored,
        Role::Existing,
        Role::New,
        Role::NewAlt,
        Role::ExistingAlt,
    ];

    /// Map an integer onto a role, wrapping modulo 5.
    pub fn from_index(n: usize) -> Role {
        Self::ALL[n % 5]
    }

    /// `New` on even positions, `NewAlt` on odd ones, unless the
    /// originating face has an odd side count, which keeps a single colour.
    #[inline]
    pub fn alternate(i: usize, sides: usize) -> Role {
        if i % 2 == 0 || sides % 2 != 0 {
            Role::New
        } else {
            Role::NewAlt
        }
    }

    /// Same as [`Role::alternate`] for the `Existing`/`ExistingAlt` pair.
    #[inline]
    pub fn alternate_existing(i: usize, sides: usize) -> Role {
        if i % 2 == 0 || sides % 2 != 0 {
            Role::Existing
        } else {
            Role::ExistingAlt
        }
    }

    /// True for `New` and `NewAlt`.
    pub fn is_new(self) -> bool {
        matches!(self, Role::New | Role::NewAlt)
    }
}

/// Direction of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagKind {
    /// Stays with the face that carries it.
    Introvert,
    /// Spreads to faces derived from the face that carries it.
    Extrovert,
}

/// A labelled lineage tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    /// Free-form label.
    pub label: String,
    /// Propagation direction.
    pub kind: TagKind,
}

impl Tag {
    /// Create an extrovert tag.
    pub fn extrovert(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: TagKind::Extrovert,
        }
    }

    /// Create an introvert tag.
    pub fn introvert(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: TagKind::Introvert,
        }
    }
}

/// The set of tags on one face.
pub type TagSet = BTreeSet<Tag>;

/// Parse a comma separated tag string into extrovert tags.
///
/// Labels are trimmed and empty entries dropped, so `" a, ,b"` yields two tags.
pub fn parse_tags(s: &str) -> TagSet {
    s.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(Tag::extrovert)
        .collect()
}

/// The extrovert subset of a tag set.
pub fn extrovert(tags: &TagSet) -> TagSet {
    tags.iter()
        .filter(|t| t.kind == TagKind::Extrovert)
        .cloned()
        .collect()
}

/// True when `filter` is empty or shares a label with `tags`.
///
/// Filters match on label only; the direction of either side is ignored.
pub fn tags_match(tags: &TagSet, filter: &TagSet) -> bool {
    filter.is_empty()
        || filter
            .iter()
            .any(|f| tags.iter().any(|t| t.label == f.label))
}
