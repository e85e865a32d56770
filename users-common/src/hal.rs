//! HAL representation types (`_links`, `_embedded`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Relation name of the link pointing at a representation itself.
pub const SELF_REL: &str = "self";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// Relation name to link.
pub type Links = BTreeMap<String, Link>;

/// A single resource: its own fields plus `_links`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityModel<T> {
    #[serde(flatten)]
    pub content: T,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl<T> EntityModel<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            links: Links::new(),
        }
    }

    pub fn with_link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.links.insert(rel.into(), Link::new(href));
        self
    }

    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.links.get(rel)
    }

    pub fn self_link(&self) -> Option<&Link> {
        self.link(SELF_REL)
    }
}

/// A list of resources under `_embedded.<relation>` plus `_links`.
///
/// `_embedded` is left out entirely for an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionModel<T> {
    #[serde(
        rename = "_embedded",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub embedded: BTreeMap<String, Vec<EntityModel<T>>>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl<T> CollectionModel<T> {
    pub fn new(relation: impl Into<String>, items: Vec<EntityModel<T>>) -> Self {
        let mut embedded = BTreeMap::new();
        if !items.is_empty() {
            embedded.insert(relation.into(), items);
        }
        Self {
            embedded,
            links: Links::new(),
        }
    }

    pub fn with_link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.links.insert(rel.into(), Link::new(href));
        self
    }

    pub fn items(&self, relation: &str) -> &[EntityModel<T>] {
        self.embedded.get(relation).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn self_link(&self) -> Option<&Link> {
        self.links.get(SELF_REL)
    }
}
