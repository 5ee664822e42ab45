//! Two-level grouping of controls by their metadata.
//!
//! Groups keep first-encounter order at both levels, so grouping the same input twice
//! always yields the same output.

use super::model::{ControlMeta, HierarchyShape};

/// Leaf group: items that share both a parent and a leaf id.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<T> {
    pub id: String,
    pub name: String,
    pub items: Vec<T>,
}

/// Parent group with its leaf buckets.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentBucket<T> {
    pub id: String,
    pub name: String,
    pub children: Vec<Bucket<T>>,
}

impl<T> ParentBucket<T> {
    /// Iterates every item beneath this parent, leaf by leaf.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.children.iter().flat_map(|c| c.items.iter())
    }
}

/// Groups `items` by the placement their metadata resolves to under `shape`.
///
/// The first name seen for an id wins.
pub fn group_by_hierarchy<T, I, F>(items: I, shape: HierarchyShape, meta: F) -> Vec<ParentBucket<T>>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> &ControlMeta,
{
    let mut parents: Vec<ParentBucket<T>> = Vec::new();

    for item in items {
        let placement = meta(&item).placement(shape);

        let parent_idx = match parents.iter().position(|p| p.id == placement.parent_id) {
            Some(idx) => idx,
            None => {
                parents.push(ParentBucket {
                    id: placement.parent_id,
                    name: placement.parent_name,
                    children: Vec::new(),
                });
                parents.len() - 1
            }
        };
        let parent = &mut parents[parent_idx];

        match parent
            .children
            .iter_mut()
            .find(|c| c.id == placement.leaf_id)
        {
            Some(leaf) => leaf.items.push(item),
            None => parent.children.push(Bucket {
                id: placement.leaf_id,
                name: placement.leaf_name,
                items: vec![item],
            }),
        }
    }

    parents
}
