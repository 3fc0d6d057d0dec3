/* Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

#![allow(clippy::result_large_err)]

use std::process::ExitCode;

use anyhow::Context;
use aws_sdk_s3::meta::PKG_VERSION;
use awsops::{
    cli::{self, ListObjectsOpt},
    config::EnvResolver,
    s3::{self, S3Service},
};
use clap::Parser;

/// Lists the keys of every object in a bucket, following continuation
/// tokens until the listing is exhausted.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let opt = ListObjectsOpt::parse();
    cli::finish(run(opt).await)
}

async fn run(opt: ListObjectsOpt) -> anyhow::Result<()> {
    let (shared_config, settings) = opt.client.load(&EnvResolver).await;

    println!();

    if opt.verbose {
        println!("S3 client version: {}", PKG_VERSION);
        println!(
            "Region:            {}",
            shared_config.region().map(|r| r.as_ref()).unwrap_or_default()
        );
        println!("Bucket:            {}", &opt.bucket);
        println!();
    }

    let service = S3Service::new(&shared_config, &settings);
    let keys = s3::list_objects(&service, &opt.bucket)
        .await
        .with_context(|| format!("Could not list objects in bucket {}", opt.bucket))?;
    for key in keys {
        println!("{}", key);
    }

    Ok(())
}
