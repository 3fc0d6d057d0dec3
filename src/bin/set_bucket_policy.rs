/* Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

#![allow(clippy::result_large_err)]

use std::process::ExitCode;

use anyhow::anyhow;
use awsops::{
    cli::{self, SetBucketPolicyOpt},
    config::{EnvResolver, DEFAULT_REGION},
    s3::{self, S3Service},
};
use clap::Parser;

/// Gives anonymous users read access to every object in a bucket, or with
/// `--directory-admin` gives an account full access to a directory bucket.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let opt = SetBucketPolicyOpt::parse();
    cli::finish(run(opt).await)
}

async fn run(opt: SetBucketPolicyOpt) -> anyhow::Result<()> {
    let (shared_config, settings) = opt.client.load(&EnvResolver).await;
    let service = S3Service::new(&shared_config, &settings);

    let region = shared_config
        .region()
        .map(|r| r.as_ref())
        .unwrap_or(DEFAULT_REGION);
    let policy = opt.policy(region);
    s3::set_bucket_policy(&service, &opt.bucket, &policy)
        .await
        .map_err(|e| anyhow!(s3::policy_failure_message(&opt.bucket, &e)))?;

    println!("Successfully set bucket {:?}'s policy", opt.bucket);
    Ok(())
}
