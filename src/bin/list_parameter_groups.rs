/* Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

#![allow(clippy::result_large_err)]

use std::process::ExitCode;

use anyhow::Context;
use awsops::{
    cli::{self, RdsOpt},
    config::EnvResolver,
    rds::{self, RdsService},
};
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let opt = RdsOpt::parse();
    cli::finish(run(opt).await)
}

async fn run(opt: RdsOpt) -> anyhow::Result<()> {
    let (shared_config, _) = opt.client.load(&EnvResolver).await;
    let service = RdsService::new(&shared_config);

    let groups = rds::list_parameter_groups(&service)
        .await
        .context("Could not retrieve parameter groups")?;

    if opt.verbose {
        println!("Found {} parameter groups", groups.len());
        println!();
    }
    for group in &groups {
        println!("{}", rds::format_parameter_group(group));
    }

    Ok(())
}
