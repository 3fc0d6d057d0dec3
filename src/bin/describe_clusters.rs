/* Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

#![allow(clippy::result_large_err)]

use std::process::ExitCode;

use anyhow::Context;
use aws_sdk_rds::meta::PKG_VERSION;
use awsops::{
    cli::{self, RdsOpt},
    config::EnvResolver,
    rds::{self, RdsService},
};
use clap::Parser;

/// Displays the name, identifier and availability zones of each Aurora/RDS
/// cluster in the Region.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let opt = RdsOpt::parse();
    cli::finish(run(opt).await)
}

async fn run(opt: RdsOpt) -> anyhow::Result<()> {
    let (shared_config, _) = opt.client.load(&EnvResolver).await;

    println!();

    if opt.verbose {
        println!("RDS client version: {}", PKG_VERSION);
        println!(
            "Region:             {}",
            shared_config.region().map(|r| r.as_ref()).unwrap_or_default()
        );
        println!();
    }

    let service = RdsService::new(&shared_config);
    for cluster in rds::describe_clusters(&service)
        .await
        .context("Could not describe clusters")?
    {
        println!("{}", rds::format_cluster(&cluster));
    }

    Ok(())
}
