use std::{path::Path, time::Duration};

use async_trait::async_trait;
use aws_config::{meta::region::RegionProviderChain, BehaviorVersion, Region, SdkConfig};
use rand::{rngs::SmallRng, RngCore, SeedableRng};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_REGION: &str = "us-west-2";

/// 20 polls, 5 seconds apart.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(100);

/// Everything needed to build a service client, gathered up front so that
/// nothing reads the environment behind the caller's back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub max_wait: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            endpoint_url: None,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

#[async_trait]
pub trait ConfigResolver {
    async fn resolve(&self, settings: &ClientSettings) -> SdkConfig;
}

/// Resolves region and credentials through the SDK's default chains:
/// flag, then environment and shared profile, then [`DEFAULT_REGION`].
pub struct EnvResolver;

#[async_trait]
impl ConfigResolver for EnvResolver {
    async fn resolve(&self, settings: &ClientSettings) -> SdkConfig {
        let region_provider =
            RegionProviderChain::first_try(settings.region.clone().map(Region::new))
            .or_default_provider()
            .or_else(Region::new(DEFAULT_REGION));

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint) = &settings.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;
        debug!(region = ?config.region(), "resolved client configuration");
        config
    }
}

/// Settings for tests that talk to a real account, read from a JSON file
/// such as `{"Bucket": "...", "Filename": "...", "Key": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestSettings {
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

/// [`TestSettings`] with every blank filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTestSettings {
    pub bucket: String,
    /// True when the bucket name was generated, so the test owns the bucket
    /// and must clean it up.
    pub generated_bucket: bool,
    pub filename: String,
    pub key: String,
}

impl TestSettings {
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn resolve(self, seed: u64) -> ResolvedTestSettings {
        let (bucket, generated_bucket) = match self.bucket.filter(|b| !b.is_empty()) {
            Some(bucket) => (bucket, false),
            None => (generated_bucket_name(seed), true),
        };
        let or_default = |v: Option<String>| {
            v.filter(|s| !s.is_empty())
                .unwrap_or_else(|| "test.txt".to_owned())
        };
        ResolvedTestSettings {
            bucket,
            generated_bucket,
            filename: or_default(self.filename),
            key: or_default(self.key),
        }
    }
}

fn generated_bucket_name(seed: u64) -> String {
    let mut prng = SmallRng::seed_from_u64(seed);
    let mut suffix = [0u8; 8];
    prng.fill_bytes(&mut suffix);
    format!("test-bucket-{}", hex::encode(suffix))
}
