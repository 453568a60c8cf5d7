//! Sequential provisioning of a locked down Amazon S3 bucket.
//!
//! Provisioning is a fixed sequence against the S3 APIs: create the
//! bucket in the requested region, block until the provider confirms it
//! exists, then attach the IP restriction policy and the expiration
//! lifecycle rule. The first failure aborts the remaining steps; there
//! is no retry and no cleanup of anything already created remotely.
use clap::ArgMatches;
use rusoto_s3::*;
use tokio::time::delay_for;
use uuid::Uuid;

use std::time::Duration;

use crate::cli;
use crate::policy::BucketPolicy;
use crate::types::{ProvisionError, ProvisionResult};

/// CIDR range which retains access to provisioned buckets.
const ALLOWED_SOURCE_IP: &str = "103.149.143.82/32";

/// Retention window applied to all objects in a provisioned bucket.
const RETENTION_DAYS: i64 = 14;

/// Object prefix covered by the expiration rule.
const EXPIRATION_PREFIX: &str = "/";

/// Interval between existence polls after bucket creation.
const WAIT_DELAY: Duration = Duration::from_secs(5);

/// Total number of existence polls before giving up.
const WAIT_ATTEMPTS: u32 = 20;

/// Executes the provisioning sequence and returns a `ProvisionResult`.
pub async fn exec(s3: S3Client, args: &ArgMatches<'_>) -> ProvisionResult<()> {
    // parse all provided arguments
    let bucket = cli::get_bucket_name(args);
    let region = cli::get_region(args);

    // create the bucket and block until it exists remotely
    create_bucket(&s3, bucket, region).await?;

    info!("Bucket created. Attaching policies...");

    // deny all access from outside the allowed range
    apply_access_policy(&s3, bucket, ALLOWED_SOURCE_IP).await?;

    info!("Policy attached...");

    // expire objects automatically after the retention window
    apply_lifecycle_rule(&s3, bucket).await
}

/// Creates a new bucket in the provided region.
///
/// The current bucket listing is logged before and after creation for
/// operator visibility. Creation is pinned to the provided region via a
/// location constraint, and this function only returns once the bucket
/// is confirmed to exist (or the existence polling gives up).
pub async fn create_bucket(s3: &S3Client, bucket: &str, region: &str) -> ProvisionResult<()> {
    // show the current bucket set before creation
    list_buckets(s3).await?;

    info!("Creating new bucket: {}", bucket);

    // create the request to pin the bucket placement
    let create = CreateBucketRequest {
        bucket: bucket.to_string(),
        create_bucket_configuration: Some(CreateBucketConfiguration {
            location_constraint: Some(region.to_string()),
        }),
        ..CreateBucketRequest::default()
    };

    // execute the creation of the bucket
    if let Err(err) = s3.create_bucket(create).await {
        let err = ProvisionError::from(err);
        error!("Unable to create bucket {}: {}", bucket, err);
        return Err(err);
    }

    // block until the bucket is visible remotely
    wait_until_exists(s3, bucket).await?;

    // show the new bucket set as confirmation
    list_buckets(s3).await
}

/// Attaches the IP restriction policy to an existing bucket.
///
/// The submitted document replaces any policy already attached to the
/// bucket; there is no merging of statements.
pub async fn apply_access_policy(s3: &S3Client, bucket: &str, cidr: &str) -> ProvisionResult<()> {
    info!("Attaching bucket policy to bucket: {}", bucket);

    // build the replacement policy document
    let put = PutBucketPolicyRequest {
        bucket: bucket.to_string(),
        policy: BucketPolicy::ip_restriction(bucket, cidr).to_json()?,
        ..PutBucketPolicyRequest::default()
    };

    // execute the attachment of the policy
    if let Err(err) = s3.put_bucket_policy(put).await {
        let err = ProvisionError::from(err);
        error!("Unable to attach policy to bucket {}: {}", bucket, err);
        return Err(err);
    }

    Ok(())
}

/// Attaches the expiration lifecycle rule to an existing bucket.
///
/// A single rule is submitted per call, replacing any lifecycle
/// configuration the bucket already carries.
pub async fn apply_lifecycle_rule(s3: &S3Client, bucket: &str) -> ProvisionResult<()> {
    info!("Putting lifecycle rules for bucket: {}", bucket);

    // a single rule covering the whole bucket
    let put = PutBucketLifecycleConfigurationRequest {
        bucket: bucket.to_string(),
        lifecycle_configuration: Some(BucketLifecycleConfiguration {
            rules: vec![lifecycle_rule()],
        }),
        ..PutBucketLifecycleConfigurationRequest::default()
    };

    // execute the attachment of the lifecycle rules
    if let Err(err) = s3.put_bucket_lifecycle_configuration(put).await {
        let err = ProvisionError::from(err);
        error!("Unable to put lifecycle rules for bucket {}: {}", bucket, err);
        return Err(err);
    }

    Ok(())
}

/// Logs out the names of all buckets visible to the caller.
async fn list_buckets(s3: &S3Client) -> ProvisionResult<()> {
    // fetch all buckets attached to the account
    let output = s3.list_buckets().await?;
    let buckets = output.buckets.unwrap_or_default();

    info!("Buckets:");

    // log each bucket name on an indented line
    for bucket in buckets {
        if let Some(name) = bucket.name {
            info!("\t{}", name);
        }
    }

    Ok(())
}

/// Blocks until a bucket is confirmed to exist.
///
/// S3 only offers a point-in-time existence check, so this polls the
/// bucket at the same interval and bound the official SDK waiters use.
/// Errors during intermediate polls are swallowed as "not yet visible";
/// only the final attempt carries the provider error out to the caller.
async fn wait_until_exists(s3: &S3Client, bucket: &str) -> ProvisionResult<()> {
    for _ in 1..WAIT_ATTEMPTS {
        // poll for the bucket with a point-in-time check
        let head = HeadBucketRequest {
            bucket: bucket.to_string(),
        };

        // done as soon as the provider confirms
        if s3.head_bucket(head).await.is_ok() {
            return Ok(());
        }

        // back off until the next poll
        delay_for(WAIT_DELAY).await;
    }

    // the final attempt surfaces the provider response
    let head = HeadBucketRequest {
        bucket: bucket.to_string(),
    };

    if let Err(err) = s3.head_bucket(head).await {
        let err = ProvisionError::from(err);
        error!("Unable to confirm bucket {} exists: {}", bucket, err);
        return Err(err);
    }

    Ok(())
}

/// Constructs the expiration rule applied to provisioned buckets.
///
/// Rules receive a unique identifier on every construction, so repeated
/// submissions are distinguishable in the provider audit history even
/// though their behaviour is identical.
fn lifecycle_rule() -> LifecycleRule {
    LifecycleRule {
        id: Some(Uuid::new_v4().to_string()),
        filter: Some(LifecycleRuleFilter {
            prefix: Some(EXPIRATION_PREFIX.to_string()),
            ..LifecycleRuleFilter::default()
        }),
        status: "Enabled".to_string(),
        expiration: Some(LifecycleExpiration {
            days: Some(RETENTION_DAYS),
            ..LifecycleExpiration::default()
        }),
        ..LifecycleRule::default()
    }
}
