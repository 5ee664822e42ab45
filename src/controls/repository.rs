use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::error::{RepositoryError, RepositoryResult};
use super::hierarchy::group_by_hierarchy;
use super::model::{
    Control, ControlMeta, FrameworkInfo, FrameworkOutline, HierarchyShape, OutlineControl,
    OutlineGroup, OutlineLeaf, SearchHit,
};
use crate::ranking::token_set;

/// File extension of framework control files.
pub const FRAMEWORK_FILE_EXTENSION: &str = "jsonl";

#[async_trait]
/// Read access to the controls of every indexed framework.
pub trait ControlRepository: Send + Sync {
    /// Lists indexed frameworks, sorted by id.
    fn frameworks(&self) -> Vec<FrameworkInfo>;

    /// Returns `true` if `framework` has a loaded index.
    fn has_framework(&self, framework: &str) -> bool;

    /// Returns the framework's controls in file order.
    async fn list_controls(&self, framework: &str) -> RepositoryResult<Vec<Control>>;

    /// Looks up a single control.
    async fn get_control_by_id(
        &self,
        framework: &str,
        control_id: &str,
    ) -> RepositoryResult<Option<Control>>;

    /// Ranks the framework's controls by similarity to `query`.
    async fn search(
        &self,
        query: &str,
        framework: &str,
        top_k: usize,
    ) -> RepositoryResult<Vec<SearchHit>>;

    /// Returns the framework's static hierarchy.
    async fn framework_structure(&self, framework: &str) -> RepositoryResult<FrameworkOutline>;
}

#[derive(Debug, Default)]
struct FrameworkIndex {
    controls: Vec<Control>,
    by_id: HashMap<String, usize>,
}

impl FrameworkIndex {
    fn new(controls: Vec<Control>) -> Self {
        let mut by_id = HashMap::with_capacity(controls.len());
        for (idx, control) in controls.iter().enumerate() {
            // First occurrence wins for duplicated ids.
            by_id.entry(control.id.clone()).or_insert(idx);
        }
        Self { controls, by_id }
    }
}

#[derive(Deserialize)]
struct ChunkRecord {
    #[serde(default)]
    text: String,
    #[serde(default)]
    meta: ControlMeta,
}

/// In-memory repository loaded from JSON-lines framework files.
///
/// Each `<framework_id>.jsonl` file holds one record per line
/// (`{"text": ..., "meta": {...}}`); only records with `meta.type == "control"` are kept.
#[derive(Debug, Default)]
pub struct StaticControlRepository {
    frameworks: RwLock<HashMap<String, FrameworkIndex>>,
}

impl StaticControlRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.jsonl` file in `dir`.
    pub async fn load_dir(dir: &Path) -> RepositoryResult<Self> {
        if !dir.is_dir() {
            return Err(RepositoryError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let repo = Self::new();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|source| RepositoryError::Io {
                path: dir.to_path_buf(),
                source,
            })?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| RepositoryError::Io {
                path: dir.to_path_buf(),
                source,
            })?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FRAMEWORK_FILE_EXTENSION) {
                continue;
            }
            let Some(framework) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let contents =
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| RepositoryError::Io {
                        path: path.clone(),
                        source,
                    })?;
            let controls = Self::parse_jsonl(framework, &contents);
            info!(framework, controls = controls.len(), "Loaded framework index");
            repo.insert_framework(framework, controls);
        }

        Ok(repo)
    }

    /// Builds a repository from already-constructed controls.
    pub fn from_controls<I>(frameworks: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<Control>)>,
    {
        let repo = Self::new();
        for (framework, controls) in frameworks {
            repo.insert_framework(&framework, controls);
        }
        repo
    }

    /// Adds or replaces a framework index.
    pub fn insert_framework(&self, framework: &str, controls: Vec<Control>) {
        self.frameworks
            .write()
            .insert(framework.to_string(), FrameworkIndex::new(controls));
    }

    /// Parses framework JSON lines, skipping blank, malformed and non-control records.
    pub fn parse_jsonl(framework: &str, contents: &str) -> Vec<Control> {
        let mut controls = Vec::new();
        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<ChunkRecord>(line) {
                Ok(record) if record.meta.is_control() => {
                    controls.push(Control::new(framework, record.text, record.meta));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(framework, line = line_no + 1, error = %e, "Skipping malformed framework record");
                }
            }
        }
        controls
    }

    fn with_index<R>(
        &self,
        framework: &str,
        f: impl FnOnce(&FrameworkIndex) -> R,
    ) -> RepositoryResult<R> {
        let guard = self.frameworks.read();
        guard
            .get(framework)
            .map(f)
            .ok_or_else(|| RepositoryError::FrameworkNotIndexed {
                framework: framework.to_string(),
            })
    }
}

/// Jaccard similarity of the lower-cased token sets of `a` and `b`.
pub fn lexical_similarity(a: &str, b: &str) -> f64 {
    let left = token_set(a);
    let right = token_set(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.len() + right.len() - shared;
    shared as f64 / union as f64
}

#[async_trait]
impl ControlRepository for StaticControlRepository {
    fn frameworks(&self) -> Vec<FrameworkInfo> {
        let guard = self.frameworks.read();
        let mut infos: Vec<FrameworkInfo> = guard
            .iter()
            .map(|(id, index)| FrameworkInfo::describe(id, index.controls.len()))
            .collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }

    fn has_framework(&self, framework: &str) -> bool {
        self.frameworks.read().contains_key(framework)
    }

    async fn list_controls(&self, framework: &str) -> RepositoryResult<Vec<Control>> {
        self.with_index(framework, |index| index.controls.clone())
    }

    async fn get_control_by_id(
        &self,
        framework: &str,
        control_id: &str,
    ) -> RepositoryResult<Option<Control>> {
        self.with_index(framework, |index| {
            index
                .by_id
                .get(control_id)
                .map(|&idx| index.controls[idx].clone())
        })
    }

    async fn search(
        &self,
        query: &str,
        framework: &str,
        top_k: usize,
    ) -> RepositoryResult<Vec<SearchHit>> {
        let mut scored = self.with_index(framework, |index| {
            index
                .controls
                .iter()
                .map(|c| (lexical_similarity(query, &c.text), c.clone()))
                .collect::<Vec<_>>()
        })?;

        // Stable: equal scores keep file order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let hits: Vec<SearchHit> = scored
            .into_iter()
            .take(top_k)
            .enumerate()
            .map(|(i, (similarity_score, control))| SearchHit {
                control,
                similarity_score,
                rank: i + 1,
            })
            .collect();

        debug!(framework, hits = hits.len(), "Control search complete");
        Ok(hits)
    }

    async fn framework_structure(&self, framework: &str) -> RepositoryResult<FrameworkOutline> {
        let controls = self.list_controls(framework).await?;
        let shape = HierarchyShape::for_framework(framework);

        let groups = group_by_hierarchy(controls, shape, |c| &c.meta)
            .into_iter()
            .map(|parent| OutlineGroup {
                id: parent.id,
                name: parent.name,
                children: parent
                    .children
                    .into_iter()
                    .map(|leaf| OutlineLeaf {
                        id: leaf.id,
                        name: leaf.name,
                        controls: leaf
                            .items
                            .into_iter()
                            .map(|c| OutlineControl {
                                id: c.id,
                                text: c.text,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Ok(FrameworkOutline {
            framework: framework.to_string(),
            shape,
            groups,
        })
    }
}
