/* Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

#![allow(clippy::result_large_err)]

use std::process::ExitCode;

use anyhow::anyhow;
use awsops::{
    cli::{self, DeleteBucketOpt},
    config::EnvResolver,
    s3::{self, S3Service},
};
use clap::Parser;

/// Deletes a bucket and waits until it no longer exists. With `--empty`,
/// deletes every object in it first.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let opt = DeleteBucketOpt::parse();
    cli::finish(run(opt).await)
}

async fn run(opt: DeleteBucketOpt) -> anyhow::Result<()> {
    let (shared_config, settings) = opt.client.load(&EnvResolver).await;
    let service = S3Service::new(&shared_config, &settings);

    let result = if opt.empty {
        s3::empty_and_remove_bucket(&service, &opt.bucket).await.map(|n| {
            println!("Deleted {} objects", n);
        })
    } else {
        s3::remove_bucket(&service, &opt.bucket).await
    };
    result.map_err(|e| anyhow!("Could not delete bucket {}: {}", opt.bucket, e))?;

    println!("Deleted bucket {}", opt.bucket);
    Ok(())
}
