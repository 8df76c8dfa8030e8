//! Orphan resource report: schema, file naming, atomic write, read-back
//!
//! The report is the only data shared between the `discover` and `cleanup`
//! invocations. It is write-once: cleanup reads it but never rewrites or
//! deletes it, so the file doubles as an audit trail of what was found.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of the generated report file name
pub const REPORT_FILE_PREFIX: &str = "orphan_resources_report_";

/// The resource types the report buckets resources into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Stack,
    Function,
    Bucket,
    Api,
    Table,
}

impl ResourceKind {
    /// Short name used in log lines and console output
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Stack => "stack",
            ResourceKind::Function => "function",
            ResourceKind::Bucket => "bucket",
            ResourceKind::Api => "api",
            ResourceKind::Table => "table",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CloudFormation stack flagged during discovery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StackRecord {
    pub name: String,
    pub stack_id: Option<String>,
    pub status: String,
    pub creation_time: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub tags: Vec<StackTag>,
    pub detection_reason: String,
}

/// A key/value tag on a discovered stack
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StackTag {
    pub key: String,
    pub value: String,
}

/// A Lambda function recorded during discovery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionRecord {
    pub name: String,
    pub arn: Option<String>,
    pub runtime: Option<String>,
    /// Last-modified timestamp as reported by Lambda (kept verbatim)
    pub last_modified: Option<String>,
    pub memory_mb: Option<i32>,
    pub timeout_secs: Option<i32>,
    pub description: Option<String>,
    pub detection_reason: String,
}

/// An S3 bucket flagged during discovery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketRecord {
    pub name: String,
    pub creation_time: Option<DateTime<Utc>>,
    pub detection_reason: String,
}

/// An API Gateway REST API flagged during discovery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiRecord {
    pub id: String,
    pub name: String,
    pub creation_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub detection_reason: String,
}

/// A DynamoDB table flagged during discovery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableRecord {
    pub name: String,
    pub status: Option<String>,
    pub size_bytes: Option<i64>,
    pub item_count: Option<i64>,
    pub detection_reason: String,
}

/// The five per-type buckets of discovered resources
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceBuckets {
    pub stacks: Vec<StackRecord>,
    pub functions: Vec<FunctionRecord>,
    pub buckets: Vec<BucketRecord>,
    pub apis: Vec<ApiRecord>,
    pub tables: Vec<TableRecord>,
}

impl ResourceBuckets {
    /// Total number of records across all buckets
    pub fn total(&self) -> usize {
        self.stacks.len()
            + self.functions.len()
            + self.buckets.len()
            + self.apis.len()
            + self.tables.len()
    }
}

/// Root document produced by a discovery run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrphanReport {
    /// Scan start time, RFC 3339 in the JSON file
    pub generated_at: DateTime<Utc>,
    pub resources: ResourceBuckets,
}

impl OrphanReport {
    pub fn new(generated_at: DateTime<Utc>, resources: ResourceBuckets) -> Self {
        Self {
            generated_at,
            resources,
        }
    }

    /// Deterministic file name derived from the scan timestamp,
    /// e.g. `orphan_resources_report_20260830_141502.json`.
    pub fn file_name(&self) -> String {
        format!(
            "{REPORT_FILE_PREFIX}{}.json",
            self.generated_at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Write the report into `dir` and return the final path.
    ///
    /// Writes to a temporary file in the same directory and renames it into
    /// place, so a concurrent reader never observes a partial report.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .context("Failed to create temporary report file")?;
        tmp.write_all(json.as_bytes())
            .context("Failed to write report")?;
        tmp.persist(&path)
            .with_context(|| format!("Failed to persist report to {}", path.display()))?;

        info!(path = %path.display(), "Wrote orphan resource report");
        Ok(path)
    }

    /// Load a previously written report. Any failure here (missing file,
    /// invalid JSON, schema mismatch) is fatal to the cleanup invocation.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report file {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("{} is not a valid orphan resource report", path.display()))
    }

    /// Find every bucket containing a record whose identifier equals `id`.
    ///
    /// Exact match only, never substring. An id can coincidentally collide
    /// across types, so all matching kinds are returned and the caller
    /// processes each independently.
    pub fn matching_kinds(&self, id: &str) -> Vec<ResourceKind> {
        let mut kinds = Vec::new();
        if self.resources.stacks.iter().any(|r| r.name == id) {
            kinds.push(ResourceKind::Stack);
        }
        if self.resources.functions.iter().any(|r| r.name == id) {
            kinds.push(ResourceKind::Function);
        }
        if self.resources.buckets.iter().any(|r| r.name == id) {
            kinds.push(ResourceKind::Bucket);
        }
        if self.resources.apis.iter().any(|r| r.id == id) {
            kinds.push(ResourceKind::Api);
        }
        if self.resources.tables.iter().any(|r| r.name == id) {
            kinds.push(ResourceKind::Table);
        }
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_report() -> OrphanReport {
        let generated_at = Utc.with_ymd_and_hms(2026, 8, 30, 14, 15, 2).unwrap();
        let resources = ResourceBuckets {
            stacks: vec![StackRecord {
                name: "serverless-app-dev".to_string(),
                stack_id: Some("arn:aws:cloudformation:eu-west-1:123:stack/x".to_string()),
                status: "CREATE_COMPLETE".to_string(),
                creation_time: Some(generated_at),
                last_updated: None,
                description: None,
                tags: vec![StackTag {
                    key: "STAGE".to_string(),
                    value: "dev".to_string(),
                }],
                detection_reason: "name contains \"serverless\"".to_string(),
            }],
            functions: vec![FunctionRecord {
                name: "unrelated-function-123".to_string(),
                arn: Some("arn:aws:lambda:eu-west-1:123:function:u".to_string()),
                runtime: Some("python3.12".to_string()),
                last_modified: Some("2026-08-01T00:00:00.000+0000".to_string()),
                memory_mb: Some(128),
                timeout_secs: Some(30),
                description: None,
                detection_reason: "listed unconditionally (no name filter)".to_string(),
            }],
            buckets: vec![BucketRecord {
                name: "serverless-app-dev-bucket".to_string(),
                creation_time: Some(generated_at),
                detection_reason: "name contains \"serverless\"".to_string(),
            }],
            apis: vec![ApiRecord {
                id: "a1b2c3".to_string(),
                name: "serverless-app-api".to_string(),
                creation_time: None,
                description: None,
                detection_reason: "name contains \"serverless\"".to_string(),
            }],
            tables: vec![TableRecord {
                name: "serverless-app-dev-table".to_string(),
                status: Some("ACTIVE".to_string()),
                size_bytes: Some(1024),
                item_count: Some(3),
                detection_reason: "name contains \"serverless\"".to_string(),
            }],
        };
        OrphanReport::new(generated_at, resources)
    }

    #[test]
    fn file_name_is_deterministic() {
        let report = sample_report();
        assert_eq!(
            report.file_name(),
            "orphan_resources_report_20260830_141502.json"
        );
    }

    #[test]
    fn save_then_load_round_trips_every_bucket() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();

        let path = report.save(dir.path()).unwrap();
        assert!(path.ends_with(report.file_name()));

        let loaded = OrphanReport::load(&path).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn generated_at_serializes_as_rfc3339() {
        let report = sample_report();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"generated_at\":\"2026-08-30T14:15:02Z\""));
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(OrphanReport::load(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn load_invalid_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(OrphanReport::load(&path).is_err());
    }

    #[test]
    fn matching_is_exact_not_substring() {
        let report = sample_report();
        assert_eq!(
            report.matching_kinds("serverless-app-dev"),
            vec![ResourceKind::Stack]
        );
        assert!(report.matching_kinds("serverless-app").is_empty());
        assert!(report.matching_kinds("serverless-app-dev-extra").is_empty());
    }

    #[test]
    fn matching_finds_every_bucket_for_colliding_ids() {
        let mut report = sample_report();
        report.resources.tables.push(TableRecord {
            name: "serverless-app-dev-bucket".to_string(),
            status: None,
            size_bytes: None,
            item_count: None,
            detection_reason: "name contains \"serverless\"".to_string(),
        });

        assert_eq!(
            report.matching_kinds("serverless-app-dev-bucket"),
            vec![ResourceKind::Bucket, ResourceKind::Table]
        );
    }

    #[test]
    fn apis_match_on_id_not_name() {
        let report = sample_report();
        assert_eq!(report.matching_kinds("a1b2c3"), vec![ResourceKind::Api]);
        assert!(report.matching_kinds("serverless-app-api").is_empty());
    }
}
