use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder id used for controls without a parent group.
pub const UNKNOWN_PARENT_ID: &str = "0";
/// Placeholder id used for controls without a leaf group.
pub const UNKNOWN_LEAF_ID: &str = "0-0";
/// Placeholder name for either level of a missing hierarchy.
pub const UNKNOWN_GROUP_NAME: &str = "Unknown";

/// Metadata attached to a control in its framework file.
///
/// Frameworks use one of two hierarchy shapes: domain/subdomain or function/category.
/// Only the fields of the framework's shape are expected to be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMeta {
    #[serde(default, deserialize_with = "string_or_number")]
    pub control_id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub subdomain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain_name: Option<String>,

    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub function_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

/// Where a control sits in its framework's two-level hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub parent_id: String,
    pub parent_name: String,
    pub leaf_id: String,
    pub leaf_name: String,
}

impl ControlMeta {
    /// Returns `true` if this record describes a control (as opposed to prose).
    pub fn is_control(&self) -> bool {
        self.kind.as_deref() == Some("control")
    }

    /// Resolves the control's placement for `shape`, defaulting missing levels to
    /// the "Unknown" bucket.
    pub fn placement(&self, shape: HierarchyShape) -> Placement {
        let (parent_id, parent_name, leaf_id, leaf_name) = match shape {
            HierarchyShape::DomainSubdomain => (
                &self.domain_id,
                &self.domain_name,
                &self.subdomain_id,
                &self.subdomain_name,
            ),
            HierarchyShape::FunctionCategory => (
                &self.function_id,
                &self.function_name,
                &self.category_id,
                &self.category_name,
            ),
        };

        Placement {
            parent_id: non_empty_or(parent_id, UNKNOWN_PARENT_ID),
            parent_name: non_empty_or(parent_name, UNKNOWN_GROUP_NAME),
            leaf_id: non_empty_or(leaf_id, UNKNOWN_LEAF_ID),
            leaf_name: non_empty_or(leaf_name, UNKNOWN_GROUP_NAME),
        }
    }
}

fn non_empty_or(value: &Option<String>, fallback: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// The two hierarchy shapes frameworks are organised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyShape {
    /// Domain → subdomain (NCA style).
    DomainSubdomain,
    /// Function → category (NIST CSF style).
    FunctionCategory,
}

impl HierarchyShape {
    /// Picks the shape from the framework id (`nist*` frameworks use functions).
    pub fn for_framework(framework_id: &str) -> Self {
        if framework_id.to_ascii_lowercase().starts_with("nist") {
            HierarchyShape::FunctionCategory
        } else {
            HierarchyShape::DomainSubdomain
        }
    }

    /// Name of the parent level.
    pub fn parent_label(&self) -> &'static str {
        match self {
            HierarchyShape::DomainSubdomain => "domain",
            HierarchyShape::FunctionCategory => "function",
        }
    }

    /// Name of the leaf level.
    pub fn leaf_label(&self) -> &'static str {
        match self {
            HierarchyShape::DomainSubdomain => "subdomain",
            HierarchyShape::FunctionCategory => "category",
        }
    }
}

/// A single requirement clause of a framework. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub id: String,
    pub text: String,
    pub framework: String,
    pub meta: ControlMeta,
}

impl Control {
    /// Builds a control, resolving its id from `meta.control_id` (or `"unknown"`).
    pub fn new(framework: impl Into<String>, text: impl Into<String>, meta: ControlMeta) -> Self {
        let id = meta
            .control_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        Self {
            id,
            text: text.into(),
            framework: framework.into(),
            meta,
        }
    }

    /// Hierarchy shape of the owning framework.
    pub fn shape(&self) -> HierarchyShape {
        HierarchyShape::for_framework(&self.framework)
    }
}

/// Descriptive information about an indexed framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkInfo {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub control_count: usize,
}

impl FrameworkInfo {
    /// Looks up the catalog entry for `id`, falling back to a generic description.
    pub fn describe(id: &str, control_count: usize) -> Self {
        let known = |name: &str, full: &str, lang: &str, country: &str, version: &str| Self {
            id: id.to_string(),
            name: name.to_string(),
            full_name: Some(full.to_string()),
            language: lang.to_string(),
            country: Some(country.to_string()),
            version: Some(version.to_string()),
            control_count,
        };

        match id {
            "nca_en" => known(
                "NCA Essential Cybersecurity Controls",
                "National Cybersecurity Authority Essential Cybersecurity Controls",
                "English",
                "Saudi Arabia",
                "1.0",
            ),
            "nca_ar" => known(
                "الضوابط الأساسية للأمن السيبراني",
                "الضوابط الأساسية للأمن السيبراني - الهيئة الوطنية للأمن السيبراني",
                "Arabic",
                "Saudi Arabia",
                "1.0",
            ),
            "nist_en" => known(
                "NIST Cybersecurity Framework",
                "NIST Cybersecurity Framework (CSF)",
                "English",
                "USA",
                "2.0",
            ),
            other => Self {
                id: other.to_string(),
                name: other.to_uppercase(),
                full_name: None,
                language: "Unknown".to_string(),
                country: None,
                version: None,
                control_count,
            },
        }
    }
}

/// One result of a repository similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub control: Control,
    /// Similarity in `[0, 1]`.
    pub similarity_score: f64,
    /// 1-based rank within the result list.
    pub rank: usize,
}

/// A control reference inside a [`FrameworkOutline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineControl {
    pub id: String,
    pub text: String,
}

/// A parent group of a framework outline with its leaf groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineGroup {
    pub id: String,
    pub name: String,
    pub children: Vec<OutlineLeaf>,
}

/// A leaf group of a framework outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineLeaf {
    pub id: String,
    pub name: String,
    pub controls: Vec<OutlineControl>,
}

/// The static hierarchy of a framework (no scores).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkOutline {
    pub framework: String,
    pub shape: HierarchyShape,
    pub groups: Vec<OutlineGroup>,
}
