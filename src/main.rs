//! Provisioning of restricted Amazon S3 buckets from a CLI.
//!
//! This tool creates a new bucket in a chosen region, waits until the
//! bucket exists, and then locks it down; an IP allow-list policy is
//! attached, along with a lifecycle rule to expire objects over time.
//!
//! Credentials must be provided via guidelines in the [AWS Documentation]
//! (https://docs.aws.amazon.com/cli/latest/userguide/cli-environment.html).
#[macro_use]
extern crate log as logger;

use rusoto_core::{credential::ChainProvider, region::Region, HttpClient};
use rusoto_s3::*;

use std::str::FromStr;
use std::time::Duration;

mod cli;
mod log;
mod policy;
mod provision;
mod types;

#[tokio::main]
async fn main() -> types::ProvisionResult<()> {
    // build the CLI and grab all arguments
    let args = cli::build().get_matches();

    // initialize logging
    log::init(&args)?;

    // create client options
    let client = HttpClient::new()?;
    let region = Region::from_str(cli::get_region(&args))?;

    // create provider with timeout
    let mut chain = ChainProvider::new();
    chain.set_timeout(Duration::from_millis(500));

    // create the new S3 client against the chosen region
    let s3 = S3Client::new_with(client, chain, region);

    // run the provisioning sequence; every step has already logged the
    // provider's message on failure, so all that remains is a clean exit
    if provision::exec(s3, &args).await.is_err() {
        info!("Exiting bucket provisioning process.");
    }

    Ok(())
}
