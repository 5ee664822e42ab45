use super::*;
use tempfile::TempDir;

const NCA_JSONL: &str = r#"
{"text": "Essential Cybersecurity Controls introduction", "meta": {"type": "preamble"}}
{"text": "Cybersecurity strategy must be defined, documented and approved.", "meta": {"type": "control", "control_id": "1-1-1", "domain_id": "1", "domain_name": "Cybersecurity Governance", "subdomain_id": "1-1", "subdomain_name": "Cybersecurity Strategy"}}
{"text": "A cybersecurity steering committee must be established.", "meta": {"type": "control", "control_id": "1-2-1", "domain_id": 1, "domain_name": "Cybersecurity Governance", "subdomain_id": "1-2", "subdomain_name": "Cybersecurity Management"}}
not json at all
{"text": "Asset inventory must be maintained and reviewed.", "meta": {"type": "control", "control_id": "2-1-1", "domain_id": "2", "domain_name": "Cybersecurity Defense", "subdomain_id": "2-1", "subdomain_name": "Asset Management"}}
"#;

fn meta(control_id: &str, domain: Option<(&str, &str)>, sub: Option<(&str, &str)>) -> ControlMeta {
    ControlMeta {
        control_id: Some(control_id.to_string()),
        kind: Some("control".to_string()),
        domain_id: domain.map(|d| d.0.to_string()),
        domain_name: domain.map(|d| d.1.to_string()),
        subdomain_id: sub.map(|s| s.0.to_string()),
        subdomain_name: sub.map(|s| s.1.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_parse_jsonl_keeps_only_controls() {
    let controls = StaticControlRepository::parse_jsonl("nca_en", NCA_JSONL);

    assert_eq!(controls.len(), 3);
    assert_eq!(controls[0].id, "1-1-1");
    assert_eq!(controls[1].meta.domain_id.as_deref(), Some("1"));
    assert_eq!(controls[2].framework, "nca_en");
}

#[test]
fn test_control_without_id_is_unknown() {
    let control = Control::new("nca_en", "text", ControlMeta::default());
    assert_eq!(control.id, "unknown");
}

#[test]
fn test_placement_defaults_to_unknown_bucket() {
    let placement = ControlMeta::default().placement(HierarchyShape::DomainSubdomain);
    assert_eq!(placement.parent_id, UNKNOWN_PARENT_ID);
    assert_eq!(placement.leaf_id, UNKNOWN_LEAF_ID);
    assert_eq!(placement.parent_name, UNKNOWN_GROUP_NAME);
    assert_eq!(placement.leaf_name, UNKNOWN_GROUP_NAME);
}

#[test]
fn test_shape_for_framework() {
    assert_eq!(
        HierarchyShape::for_framework("nist_en"),
        HierarchyShape::FunctionCategory
    );
    assert_eq!(
        HierarchyShape::for_framework("nca_ar"),
        HierarchyShape::DomainSubdomain
    );
    assert_eq!(HierarchyShape::FunctionCategory.leaf_label(), "category");
}

#[test]
fn test_group_by_hierarchy_keeps_encounter_order() {
    let metas = vec![
        meta("2-1-1", Some(("2", "Defense")), Some(("2-1", "Assets"))),
        meta("1-1-1", Some(("1", "Governance")), Some(("1-1", "Strategy"))),
        meta("2-1-2", Some(("2", "Defense")), Some(("2-1", "Assets"))),
        meta("x", None, None),
    ];

    let groups = group_by_hierarchy(metas, HierarchyShape::DomainSubdomain, |m| m);

    let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1", UNKNOWN_PARENT_ID]);
    assert_eq!(groups[0].children.len(), 1);
    assert_eq!(groups[0].children[0].items.len(), 2);
    assert_eq!(groups[0].items().count(), 2);
}

#[test]
fn test_lexical_similarity() {
    assert_eq!(lexical_similarity("asset inventory", "Asset Inventory"), 1.0);
    assert_eq!(lexical_similarity("asset", "backup"), 0.0);
    assert_eq!(lexical_similarity("", "backup"), 0.0);
    let partial = lexical_similarity("asset inventory", "asset register");
    assert!(partial > 0.0 && partial < 1.0);
}

#[test]
fn test_framework_info_catalog() {
    let info = FrameworkInfo::describe("nist_en", 106);
    assert_eq!(info.name, "NIST Cybersecurity Framework");
    assert_eq!(info.control_count, 106);

    let custom = FrameworkInfo::describe("iso_27001", 3);
    assert_eq!(custom.name, "ISO_27001");
    assert_eq!(custom.language, "Unknown");
}

#[tokio::test]
async fn test_load_dir_and_lookup() {
    let temp = TempDir::new().unwrap();
    tokio::fs::write(temp.path().join("nca_en.jsonl"), NCA_JSONL)
        .await
        .unwrap();
    tokio::fs::write(temp.path().join("README.txt"), "ignored")
        .await
        .unwrap();

    let repo = StaticControlRepository::load_dir(temp.path()).await.unwrap();

    assert!(repo.has_framework("nca_en"));
    assert!(!repo.has_framework("README"));
    let frameworks = repo.frameworks();
    assert_eq!(frameworks.len(), 1);
    assert_eq!(frameworks[0].control_count, 3);

    let control = repo.get_control_by_id("nca_en", "1-2-1").await.unwrap();
    assert_eq!(
        control.map(|c| c.text),
        Some("A cybersecurity steering committee must be established.".to_string())
    );
    assert!(repo.get_control_by_id("nca_en", "9-9-9").await.unwrap().is_none());
}

#[tokio::test]
async fn test_load_dir_missing() {
    let err = StaticControlRepository::load_dir(std::path::Path::new("/nonexistent/frameworks"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::DirectoryNotFound { .. }));
}

#[tokio::test]
async fn test_unknown_framework_is_not_indexed() {
    let repo = StaticControlRepository::new();
    let err = repo.list_controls("nca_en").await.unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::FrameworkNotIndexed { framework } if framework == "nca_en"
    ));
}

#[tokio::test]
async fn test_search_ranks_by_similarity() {
    let controls = StaticControlRepository::parse_jsonl("nca_en", NCA_JSONL);
    let repo = StaticControlRepository::from_controls([("nca_en".to_string(), controls)]);

    let hits = repo
        .search("asset inventory reviewed", "nca_en", 2)
        .await
        .unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].control.id, "2-1-1");
    assert_eq!(hits[0].rank, 1);
    assert_eq!(hits[1].rank, 2);
    assert!(hits[0].similarity_score >= hits[1].similarity_score);
}

#[tokio::test]
async fn test_framework_structure() {
    let controls = StaticControlRepository::parse_jsonl("nca_en", NCA_JSONL);
    let repo = StaticControlRepository::from_controls([("nca_en".to_string(), controls)]);

    let outline = repo.framework_structure("nca_en").await.unwrap();

    assert_eq!(outline.shape, HierarchyShape::DomainSubdomain);
    assert_eq!(outline.groups.len(), 2);
    assert_eq!(outline.groups[0].name, "Cybersecurity Governance");
    assert_eq!(outline.groups[0].children.len(), 2);
    assert_eq!(outline.groups[1].children[0].controls[0].id, "2-1-1");
}
