/* Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

#![allow(clippy::result_large_err)]

use std::process::ExitCode;

use anyhow::anyhow;
use awsops::{
    cli::{self, ListBucketsOpt},
    config::EnvResolver,
    s3::{self, S3Service},
};
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let opt = ListBucketsOpt::parse();
    cli::finish(run(opt).await)
}

async fn run(opt: ListBucketsOpt) -> anyhow::Result<()> {
    let (shared_config, settings) = opt.client.load(&EnvResolver).await;
    let service = S3Service::new(&shared_config, &settings);

    let buckets = s3::list_buckets(&service)
        .await
        .map_err(|e| anyhow!("Got an error retrieving buckets: {}", e))?;

    println!("Buckets:");
    for bucket in &buckets {
        println!("{}", s3::format_bucket_line(bucket));
    }

    Ok(())
}
