//! Shared fixtures for the integration tests.

#![allow(dead_code)]

pub mod harness;
pub mod http_client;

/// Two NCA controls across two domains, plus a preamble row that must be skipped.
pub const NCA_JSONL: &str = r#"{"text": "Essential Cybersecurity Controls", "meta": {"type": "preamble"}}
{"text": "Passwords must be rotated periodically and meet complexity rules.", "meta": {"type": "control", "control_id": "2-2-1", "domain_id": "2", "domain_name": "Cybersecurity Defense", "subdomain_id": "2-2", "subdomain_name": "Identity and Access Management"}}
{"text": "An asset inventory must be maintained and reviewed.", "meta": {"type": "control", "control_id": "2-1-1", "domain_id": "2", "domain_name": "Cybersecurity Defense", "subdomain_id": "2-1", "subdomain_name": "Asset Management"}}
{"text": "A cybersecurity strategy must be approved by leadership.", "meta": {"type": "control", "control_id": "1-1-1", "domain_id": "1", "domain_name": "Cybersecurity Governance", "subdomain_id": "1-1", "subdomain_name": "Cybersecurity Strategy"}}
"#;

/// One NIST control in the function/category shape.
pub const NIST_JSONL: &str = r#"{"text": "Backups of data are conducted, maintained and tested.", "meta": {"type": "control", "control_id": "PR.IP-4", "function_id": "PR", "function_name": "Protect", "category_id": "PR.IP", "category_name": "Information Protection"}}
"#;

pub const POLICY: &str = "Information Security Policy\n\n\
    Passwords are rotated every 90 days and must meet complexity rules.\n\n\
    An asset inventory is maintained by IT and reviewed quarterly.\n\n\
    Backups are taken nightly and restore tests run every month.";

/// Total controls across both fixture frameworks.
pub const FIXTURE_CONTROLS: usize = 4;
