//! Control repository: per-framework control sets with hierarchical metadata.
//!
//! The repository is the leaf of the pipeline. It enumerates the controls a document is
//! assessed against and answers lookups by id; it never ranks document content.

pub mod error;
pub mod hierarchy;
pub mod model;
pub mod repository;

#[cfg(test)]
mod tests;

pub use error::{RepositoryError, RepositoryResult};
pub use hierarchy::{Bucket, ParentBucket, group_by_hierarchy};
pub use model::{
    Control, ControlMeta, FrameworkInfo, FrameworkOutline, HierarchyShape, OutlineControl,
    OutlineGroup, OutlineLeaf, Placement, SearchHit, UNKNOWN_GROUP_NAME, UNKNOWN_LEAF_ID,
    UNKNOWN_PARENT_ID,
};
pub use repository::{
    ControlRepository, FRAMEWORK_FILE_EXTENSION, StaticControlRepository, lexical_similarity,
};
