//! Bucket policy documents for IP based access restriction.
//!
//! S3 evaluates bucket policies as JSON documents, so the structures in
//! this module serialize directly into the policy language grammar. The
//! field names and literal values are part of the provider contract and
//! must round-trip exactly as written here.
use serde::Serialize;

use crate::types::ProvisionResult;

/// A bucket policy document in the provider's policy language.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketPolicy {
    version: &'static str,
    statement: Vec<Statement>,
}

/// A single statement inside a `BucketPolicy`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Statement {
    sid: &'static str,
    effect: &'static str,
    principal: &'static str,
    action: &'static str,
    resource: Vec<String>,
    condition: Condition,
}

/// Condition block matching requests outside an allowed IP range.
#[derive(Debug, Serialize)]
struct Condition {
    #[serde(rename = "NotIpAddress")]
    not_ip_address: SourceIp,
}

/// Source address test keyed by the provider's condition grammar.
#[derive(Debug, Serialize)]
struct SourceIp {
    #[serde(rename = "aws:SourceIp")]
    source_ip: String,
}

impl BucketPolicy {
    /// Constructs a policy denying all access from outside a CIDR range.
    ///
    /// The statement applies to the bucket and every object inside it,
    /// so requests from outside the range are rejected wholesale. Note
    /// that this covers `s3:*`, meaning even policy administration is
    /// denied to other addresses once attached.
    pub fn ip_restriction(bucket: &str, cidr: &str) -> BucketPolicy {
        BucketPolicy {
            version: "2012-10-17",
            statement: vec![Statement {
                sid: "IPAllow",
                effect: "Deny",
                principal: "*",
                action: "s3:*",
                resource: vec![
                    format!("arn:aws:s3:::{}", bucket),
                    format!("arn:aws:s3:::{}/*", bucket),
                ],
                condition: Condition {
                    not_ip_address: SourceIp {
                        source_ip: cidr.to_string(),
                    },
                },
            }],
        }
    }

    /// Serializes this policy into its JSON wire representation.
    pub fn to_json(&self) -> ProvisionResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
