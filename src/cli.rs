//! CLI bindings for the bucket provisioning command.
//!
//! This module focuses on the common CLI bindings required to provide an
//! easy API and consistency for the provisioning flow. This is where the
//! parent CLI can be found, as well as utilities for fetching the argument
//! values handed through to the provisioner.
use clap::{App, AppSettings, Arg, ArgMatches};

/// Constructs a new CLI application using Clap.
///
/// This will register all required arguments and embed all metadata. All
/// metadata is fetched dynamically from Cargo and shouldn't require to
/// be updated (ever).
pub fn build<'a, 'b>() -> App<'a, 'b> {
    App::new("")
        .name(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .args(&[
            Arg::with_name("bucket_name")
                .help("The name of the bucket to create")
                .index(1)
                .required(true),
            Arg::with_name("region")
                .help("The region in which to create the bucket")
                .index(2)
                .required(true),
            Arg::with_name("quiet")
                .help("Only prints errors during execution")
                .short("q")
                .long("quiet"),
        ])
        .settings(&[AppSettings::ArgRequiredElseHelp])
}

/// Fetches the bucket name from the parsed argument set.
pub fn get_bucket_name<'a>(args: &'a ArgMatches<'a>) -> &'a str {
    // required argument, so unwrap is safe
    args.value_of("bucket_name").unwrap()
}

/// Fetches the region identifier from the parsed argument set.
pub fn get_region<'a>(args: &'a ArgMatches<'a>) -> &'a str {
    // required argument, so unwrap is safe
    args.value_of("region").unwrap()
}
