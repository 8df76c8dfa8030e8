//! sls-sweep: find and remove orphaned Serverless-framework AWS resources
//!
//! Two independent commands share a data contract (the report file) but no
//! runtime state:
//!
//! - `discover` queries CloudFormation, Lambda, S3, API Gateway, and
//!   DynamoDB, flags candidates by a naming heuristic, and writes a
//!   timestamped JSON report for offline review.
//! - `cleanup` loads a report plus a literal list of resource identifiers
//!   and deletes exactly those, sequentially, recording a per-resource
//!   outcome.
//!
//! Nothing is ever deleted without an explicit `cleanup` invocation naming
//! the resource. Note that the `functions` bucket of the report lists every
//! Lambda function in the region, with no name filter — treat it as an
//! inventory to review, not as a list of confirmed orphans.

pub mod aws;
pub mod cleanup;
pub mod discover;
pub mod report;
pub mod serverless;
