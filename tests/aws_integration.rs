//! Integration tests that call real AWS APIs
//!
//! These tests are marked `#[ignore]` and only run with:
//! ```
//! AWS_PROFILE=your_profile cargo test --test aws_integration -- --ignored
//! ```

use sls_sweep::aws::{AwsContext, AwsError, LambdaClient, S3Client};
use sls_sweep::discover::Discoverer;
use sls_sweep::report::OrphanReport;

fn test_suffix() -> String {
    format!(
        "{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    )
}

/// Full discovery pass writes a report that loads back cleanly
#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn discovery_writes_readable_report() {
    let ctx = AwsContext::new(None, None).await;
    let discoverer = Discoverer::from_context(&ctx);

    let dir = tempfile::tempdir().expect("Should create temp dir");
    let path = discoverer
        .run(dir.path())
        .await
        .expect("Discovery should complete");

    let report = OrphanReport::load(&path).expect("Report should load back");
    // Lambda bucket is unfiltered; every function in the region appears.
    // Filtered buckets only contain names with the marker.
    for bucket in &report.resources.buckets {
        assert!(bucket.name.contains("serverless"));
    }
}

/// Bucket cleanup empties the bucket before deleting it
#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn bucket_empty_and_delete_lifecycle() {
    let ctx = AwsContext::new(None, None).await;
    let bucket_name = format!("sls-sweep-test-serverless-{}", test_suffix());

    // Fixtures via the raw SDK client; the tool itself never creates
    // resources.
    let raw = ctx.s3_client();
    raw.create_bucket()
        .bucket(&bucket_name)
        .send()
        .await
        .expect("Should create bucket");
    for key in ["one.txt", "two.txt"] {
        raw.put_object()
            .bucket(&bucket_name)
            .key(key)
            .body(aws_sdk_s3::primitives::ByteStream::from_static(b"x"))
            .send()
            .await
            .expect("Should put object");
    }

    let client = S3Client::from_context(&ctx);
    client
        .empty_and_delete_bucket(&bucket_name)
        .await
        .expect("Should empty and delete non-empty bucket");

    // A second delete reports not-found, which cleanup treats as success.
    let err = client
        .empty_and_delete_bucket(&bucket_name)
        .await
        .expect_err("Bucket should be gone");
    assert!(err.is_not_found(), "unexpected error: {err}");
}

/// Deleting a function that does not exist classifies as not-found
#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn delete_missing_function_reports_not_found() {
    let ctx = AwsContext::new(None, None).await;
    let client = LambdaClient::from_context(&ctx);

    let err = client
        .delete_function(&format!("sls-sweep-missing-{}", test_suffix()))
        .await
        .expect_err("Function should not exist");

    assert!(
        err.is_not_found(),
        "expected not-found, got: {err}"
    );
    assert!(matches!(err, AwsError::NotFound { .. }));
}
