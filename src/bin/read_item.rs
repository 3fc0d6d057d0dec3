/* Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

#![allow(clippy::result_large_err)]

use std::process::ExitCode;

use anyhow::Context;
use awsops::{
    cli::{self, ReadItemOpt},
    config::EnvResolver,
    dynamo::{self, DynamoService},
};
use clap::Parser;

/// Fetches one movie from the Movies table by year and title.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let opt = ReadItemOpt::parse();
    cli::finish(run(opt).await)
}

async fn run(opt: ReadItemOpt) -> anyhow::Result<()> {
    let (shared_config, _) = opt.client.load(&EnvResolver).await;
    let service = DynamoService::new(&shared_config);

    let movie = dynamo::get_movie(&service, &opt.table, opt.year, &opt.title)
        .await
        .context("Got error calling GetItem")?;
    println!("{}", dynamo::describe_lookup(opt.year, &opt.title, movie.as_ref()));

    Ok(())
}
