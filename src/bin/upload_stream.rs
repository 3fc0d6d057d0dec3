/* Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

#![allow(clippy::result_large_err)]

use std::process::ExitCode;

use anyhow::Context;
use awsops::{
    cli::{self, UploadStreamOpt},
    config::EnvResolver,
    s3::{self, S3Service},
};
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let opt = UploadStreamOpt::parse();
    cli::finish(run(opt).await)
}

async fn run(opt: UploadStreamOpt) -> anyhow::Result<()> {
    let (shared_config, settings) = opt.client.load(&EnvResolver).await;
    let service = S3Service::new(&shared_config, &settings);

    s3::upload_stream(&service, &opt.bucket, &opt.key, &opt.file)
        .await
        .with_context(|| format!("Unable to upload {:?} to {}/{}", opt.file, opt.bucket, opt.key))?;

    println!("Uploaded {:?} to bucket {} with key {}", opt.file, opt.bucket, opt.key);
    Ok(())
}
