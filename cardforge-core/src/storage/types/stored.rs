//! Generic stored wrapper types
//!
//! - `Stored<Id, T>` - entity with id, content and created_at
//! - `Editable<T>` - adds updated_at to entities that change after creation
//!
//! Cards use `Stored<CardId, Editable<Card>>`; assets are immutable and use
//! `Stored<AssetId, Asset>`.

use std::ops::{Deref, DerefMut};

/// A stored entity: id, content and creation timestamp (unix ms)
///
/// Derefs to the content so fields read through transparently.
#[derive(Clone, Debug, PartialEq)]
pub struct Stored<Id, T> {
    pub id: Id,
    pub content: T,
    pub created_at: i64,
}

impl<Id, T> Stored<Id, T> {
    pub fn new(id: Id, content: T, created_at: i64) -> Self {
        Self {
            id,
            content,
            created_at,
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }
}

impl<Id, T> Deref for Stored<Id, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.content
    }
}

/// Wrapper for entities that can be modified after creation
#[derive(Clone, Debug, PartialEq)]
pub struct Editable<T> {
    pub content: T,
    /// Unix timestamp (milliseconds) when last updated
    pub updated_at: i64,
}

impl<T> Editable<T> {
    pub fn new(content: T, updated_at: i64) -> Self {
        Self { content, updated_at }
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

impl<T> Deref for Editable<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.content
    }
}

impl<T> DerefMut for Editable<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_derefs_to_content() {
        let stored = Stored::new("a1", Editable::new(vec![1, 2], 5000), 4000);
        assert_eq!(stored.len(), 2);
        assert_eq!(*stored.id(), "a1");
        assert_eq!(stored.created_at(), 4000);
        assert_eq!(stored.content.updated_at(), 5000);
    }

    #[test]
    fn test_editable_deref_mut() {
        let mut editable = Editable::new(String::from("draft"), 1);
        editable.push_str("-2");
        assert_eq!(editable.as_str(), "draft-2");
        assert_eq!(editable.content, "draft-2");
    }
}
