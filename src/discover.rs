//! Orphan resource discovery
//!
//! Read-only scan of the account: one listing pass per resource type, a
//! naming heuristic to flag candidates, and a JSON report as the result.
//! Discovery is best-effort by design: a service that cannot be listed
//! (permissions, regional availability) logs a warning and contributes an
//! empty bucket instead of aborting the scan.

use crate::aws::{
    ApiGatewayClient, AwsContext, CloudFormationClient, DynamoDbClient, LambdaClient, S3Client,
};
use crate::report::{
    ApiRecord, BucketRecord, FunctionRecord, OrphanReport, ResourceBuckets, StackRecord, StackTag,
    TableRecord,
};
use anyhow::Result;
use aws_sdk_cloudformation::primitives::DateTime as SmithyDateTime;
use aws_sdk_cloudformation::types::{StackSummary, Tag};
use aws_sdk_lambda::types::FunctionConfiguration;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Substring that marks a resource as a likely Serverless-framework leftover
const SERVERLESS_MARKER: &str = "serverless";

/// Detection reason recorded for name-matched resources
const REASON_NAME_MATCH: &str = "name contains \"serverless\"";

/// Detection reason recorded for Lambda functions, which are not filtered
const REASON_UNFILTERED: &str = "listed unconditionally (no name filter)";

/// The sole orphan heuristic: case-sensitive substring containment.
///
/// Deliberately isolated behind one predicate so a stronger signal
/// (tag-based, age-based) can replace it without touching the scans.
pub fn looks_serverless(name: &str) -> bool {
    name.contains(SERVERLESS_MARKER)
}

/// Scanner that assembles an [`OrphanReport`] from the account
pub struct Discoverer {
    cloudformation: CloudFormationClient,
    lambda: LambdaClient,
    s3: S3Client,
    apigateway: ApiGatewayClient,
    dynamodb: DynamoDbClient,
}

impl Discoverer {
    /// Create a discoverer from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            cloudformation: CloudFormationClient::from_context(ctx),
            lambda: LambdaClient::from_context(ctx),
            s3: S3Client::from_context(ctx),
            apigateway: ApiGatewayClient::from_context(ctx),
            dynamodb: DynamoDbClient::from_context(ctx),
        }
    }

    /// Run all scans sequentially, write the report into `output_dir`, print
    /// a per-type summary, and return the report path.
    ///
    /// Per-service failures are absorbed into empty buckets; only failing to
    /// write the report itself is fatal.
    pub async fn run(&self, output_dir: &Path) -> Result<PathBuf> {
        let generated_at = Utc::now();

        let resources = ResourceBuckets {
            stacks: scan_or_empty("cloudformation", self.discover_stacks()).await,
            functions: scan_or_empty("lambda", self.discover_functions()).await,
            buckets: scan_or_empty("s3", self.discover_buckets()).await,
            apis: scan_or_empty("apigateway", self.discover_apis()).await,
            tables: scan_or_empty("dynamodb", self.discover_tables()).await,
        };

        let report = OrphanReport::new(generated_at, resources);
        let path = report.save(output_dir)?;

        print_summary(&report);
        Ok(path)
    }

    /// CloudFormation stacks whose name matches the heuristic and that are
    /// not already deleted, with description and tags from a per-stack
    /// DescribeStacks call.
    pub async fn discover_stacks(&self) -> Result<Vec<StackRecord>> {
        let mut records = Vec::new();

        for summary in self.cloudformation.list_active_stacks().await? {
            let Some(mut record) = stack_record(&summary) else {
                continue;
            };

            if let Some(stack) = self.cloudformation.describe_stack(&record.name).await? {
                record.description = stack.description().map(str::to_string);
                record.tags = tag_records(stack.tags());
            }

            records.push(record);
        }

        Ok(records)
    }

    /// Every Lambda function in the region.
    ///
    /// No name filter is applied: this is the broadest and least safe bucket
    /// in the report. Review it with particular care before passing function
    /// names to cleanup — a function appearing here is not evidence of
    /// anything beyond its existence.
    pub async fn discover_functions(&self) -> Result<Vec<FunctionRecord>> {
        let records = self
            .lambda
            .list_functions()
            .await?
            .iter()
            .filter_map(function_record)
            .collect();
        Ok(records)
    }

    /// S3 buckets whose name matches the heuristic.
    pub async fn discover_buckets(&self) -> Result<Vec<BucketRecord>> {
        let records = self
            .s3
            .list_buckets()
            .await?
            .into_iter()
            .filter_map(|b| {
                let name = b.name()?.to_string();
                if !looks_serverless(&name) {
                    return None;
                }
                Some(BucketRecord {
                    name,
                    creation_time: b.creation_date().and_then(smithy_to_utc),
                    detection_reason: REASON_NAME_MATCH.to_string(),
                })
            })
            .collect();
        Ok(records)
    }

    /// API Gateway REST APIs whose name matches the heuristic.
    pub async fn discover_apis(&self) -> Result<Vec<ApiRecord>> {
        let records = self
            .apigateway
            .list_rest_apis()
            .await?
            .into_iter()
            .filter_map(|api| {
                let id = api.id()?.to_string();
                let name = api.name().unwrap_or_default().to_string();
                if !looks_serverless(&name) {
                    return None;
                }
                Some(ApiRecord {
                    id,
                    name,
                    creation_time: api.created_date().and_then(smithy_to_utc),
                    description: api.description().map(str::to_string),
                    detection_reason: REASON_NAME_MATCH.to_string(),
                })
            })
            .collect();
        Ok(records)
    }

    /// DynamoDB tables whose name matches the heuristic, with per-table
    /// metadata from DescribeTable.
    pub async fn discover_tables(&self) -> Result<Vec<TableRecord>> {
        let mut records = Vec::new();

        for name in self.dynamodb.list_tables().await? {
            if !looks_serverless(&name) {
                continue;
            }

            let description = self.dynamodb.describe_table(&name).await?;
            records.push(TableRecord {
                name,
                status: description
                    .as_ref()
                    .and_then(|t| t.table_status())
                    .map(|s| s.as_str().to_string()),
                size_bytes: description.as_ref().and_then(|t| t.table_size_bytes()),
                item_count: description.as_ref().and_then(|t| t.item_count()),
                detection_reason: REASON_NAME_MATCH.to_string(),
            });
        }

        Ok(records)
    }
}

/// Map a stack summary to a report record, or `None` when the name is
/// absent or does not match the heuristic. Description and tags are filled
/// in afterwards from DescribeStacks.
fn stack_record(summary: &StackSummary) -> Option<StackRecord> {
    let name = summary.stack_name()?.to_string();
    if !looks_serverless(&name) {
        return None;
    }
    Some(StackRecord {
        name,
        stack_id: summary.stack_id().map(str::to_string),
        status: summary
            .stack_status()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        creation_time: summary.creation_time().and_then(smithy_to_utc),
        last_updated: summary.last_updated_time().and_then(smithy_to_utc),
        description: summary.template_description().map(str::to_string),
        tags: Vec::new(),
        detection_reason: REASON_NAME_MATCH.to_string(),
    })
}

/// Map a function configuration to a report record. No name filter is
/// applied; only configurations missing a name entirely are dropped.
fn function_record(config: &FunctionConfiguration) -> Option<FunctionRecord> {
    let name = config.function_name()?.to_string();
    Some(FunctionRecord {
        name,
        arn: config.function_arn().map(str::to_string),
        runtime: config.runtime().map(|r| r.as_str().to_string()),
        last_modified: config.last_modified().map(str::to_string),
        memory_mb: config.memory_size(),
        timeout_secs: config.timeout(),
        description: config.description().map(str::to_string),
        detection_reason: REASON_UNFILTERED.to_string(),
    })
}

/// Keep only tags carrying both a key and a value.
fn tag_records(tags: &[Tag]) -> Vec<StackTag> {
    tags.iter()
        .filter_map(|t| {
            Some(StackTag {
                key: t.key()?.to_string(),
                value: t.value()?.to_string(),
            })
        })
        .collect()
}

/// Absorb a per-service listing failure into an empty bucket.
async fn scan_or_empty<T>(
    service: &str,
    scan: impl std::future::Future<Output = Result<Vec<T>>>,
) -> Vec<T> {
    match scan.await {
        Ok(records) => records,
        Err(e) => {
            warn!(service = %service, error = ?e, "Discovery failed, reporting empty bucket");
            Vec::new()
        }
    }
}

fn smithy_to_utc(dt: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

/// Human-readable per-type counts, printed after every scan.
fn print_summary(report: &OrphanReport) {
    let r = &report.resources;
    println!("\nResource discovery summary");
    println!("{}", "-".repeat(40));
    println!("CloudFormation stacks: {}", r.stacks.len());
    println!("Lambda functions:      {}", r.functions.len());
    println!("S3 buckets:            {}", r.buckets.len());
    println!("API Gateway REST APIs: {}", r.apis.len());
    println!("DynamoDB tables:       {}", r.tables.len());
}
