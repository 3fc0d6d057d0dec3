//! Command-line plumbing shared by the binaries in `src/bin`.

use std::{path::PathBuf, process::ExitCode, time::Duration};

use aws_config::SdkConfig;
use clap::{Args, Parser};
use tracing::error;

use crate::{
    config::{ClientSettings, ConfigResolver, DEFAULT_MAX_WAIT},
    dynamo::MOVIES_TABLE,
    policy::Policy,
};

/// `2006-01-02 15:04:05 Monday`
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %A";

#[derive(Debug, Clone, Args)]
pub struct ClientArgs {
    /// The AWS Region. Falls back to the environment, then us-west-2.
    #[arg(short, long)]
    pub region: Option<String>,

    /// The shared config profile to use.
    #[arg(long)]
    pub profile: Option<String>,

    /// Send requests to this endpoint instead of the AWS one.
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// How long waiters may poll, in seconds.
    #[arg(long, default_value_t = DEFAULT_MAX_WAIT.as_secs())]
    pub max_wait_secs: u64,
}

impl ClientArgs {
    pub fn settings(&self) -> ClientSettings {
        ClientSettings {
            region: self.region.clone(),
            profile: self.profile.clone(),
            endpoint_url: self.endpoint_url.clone(),
            max_wait: Duration::from_secs(self.max_wait_secs),
        }
    }

    pub async fn load<R: ConfigResolver + ?Sized>(
        &self,
        resolver: &R,
    ) -> (SdkConfig, ClientSettings) {
        let settings = self.settings();
        let config = resolver.resolve(&settings).await;
        (config, settings)
    }
}

#[derive(Debug, Parser)]
pub struct ListBucketsOpt {
    #[command(flatten)]
    pub client: ClientArgs,
}

#[derive(Debug, Parser)]
pub struct ListObjectsOpt {
    #[command(flatten)]
    pub client: ClientArgs,

    /// The name of the bucket.
    #[arg(short, long)]
    pub bucket: String,

    /// Whether to display additional information.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Parser)]
pub struct DeleteBucketOpt {
    #[command(flatten)]
    pub client: ClientArgs,

    /// The name of the bucket.
    #[arg(short, long)]
    pub bucket: String,

    /// Delete every object in the bucket first.
    #[arg(long)]
    pub empty: bool,
}

#[derive(Debug, Parser)]
pub struct SetBucketPolicyOpt {
    #[command(flatten)]
    pub client: ClientArgs,

    /// The bucket that gets the policy.
    pub bucket: String,

    /// Grant full directory-bucket access to an account instead of
    /// anonymous read access.
    #[arg(long, requires = "account_id")]
    pub directory_admin: bool,

    /// The account that owns the directory bucket.
    #[arg(long, requires = "directory_admin")]
    pub account_id: Option<String>,
}

impl SetBucketPolicyOpt {
    /// The document to attach. `region` is only used by the directory-bucket
    /// admin policy.
    pub fn policy(&self, region: &str) -> Policy {
        match (&self.account_id, self.directory_admin) {
            (Some(account_id), true) => {
                Policy::directory_bucket_admin(region, account_id, &self.bucket)
            }
            _ => Policy::read_only_anonymous(&self.bucket),
        }
    }
}

#[derive(Debug, Parser)]
pub struct UploadStreamOpt {
    #[command(flatten)]
    pub client: ClientArgs,

    /// The name of the bucket.
    #[arg(short, long)]
    pub bucket: String,

    /// The key to upload to.
    #[arg(short, long)]
    pub key: String,

    /// The local file to stream.
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Debug, Parser)]
pub struct ReadItemOpt {
    #[command(flatten)]
    pub client: ClientArgs,

    #[arg(long, default_value = MOVIES_TABLE)]
    pub table: String,

    #[arg(long, default_value_t = 2015)]
    pub year: i32,

    #[arg(long, default_value = "The Big New Movie")]
    pub title: String,
}

#[derive(Debug, Parser)]
pub struct RdsOpt {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Whether to display additional information.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Ends a program: a failure goes to stderr and the log, and turns into a
/// non-zero exit status.
pub fn finish(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
