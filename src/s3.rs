use std::path::Path;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{
    client::Waiters,
    error::DisplayErrorContext,
    operation::list_objects_v2::ListObjectsV2Output,
    primitives::ByteStream,
    types::{Delete, ObjectIdentifier},
};
use aws_smithy_runtime_api::client::waiters::error::WaiterError;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    config::ClientSettings,
    error::{DeleteFailure, Error, ErrorKind, Result},
    policy::Policy,
};

/// DeleteObjects accepts at most this many keys per request.
pub const MAX_DELETE_BATCH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSummary {
    pub name: String,
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    /// Present when there are more pages to fetch.
    pub next_token: Option<String>,
}

#[async_trait]
pub trait BucketStore {
    async fn list_buckets(&self) -> Result<Vec<BucketSummary>>;
    async fn create_bucket(&self, bucket: &str) -> Result<()>;
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;
    async fn wait_until_bucket_exists(&self, bucket: &str) -> Result<()>;
    async fn wait_until_bucket_not_exists(&self, bucket: &str) -> Result<()>;
    async fn list_objects_page(&self, bucket: &str, token: Option<String>) -> Result<ObjectPage>;
    /// Deletes `keys` in one request and returns the keys that could not be
    /// deleted. An `Err` means the request as a whole failed.
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<Vec<DeleteFailure>>;
    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()>;
    async fn put_object(&self, bucket: &str, key: &str, body: ByteStream) -> Result<()>;
}

/// Walks the keys of a bucket one page per request. Once exhausted it stays
/// exhausted; build a new lister to start over.
pub struct ObjectLister<'a, S: ?Sized> {
    store: &'a S,
    bucket: String,
    token: Option<String>,
    done: bool,
}

impl<'a, S: BucketStore + Sync + ?Sized> ObjectLister<'a, S> {
    pub fn new(store: &'a S, bucket: &str) -> Self {
        Self {
            store,
            bucket: bucket.to_owned(),
            token: None,
            done: false,
        }
    }

    pub async fn next_page(&mut self) -> Result<Option<Vec<String>>> {
        if self.done {
            return Ok(None);
        }
        let page = self.store.list_objects_page(&self.bucket, self.token.take()).await?;
        self.token = page.next_token;
        self.done = self.token.is_none();
        Ok(Some(page.keys))
    }
}

pub async fn list_buckets<S: BucketStore + ?Sized>(store: &S) -> Result<Vec<BucketSummary>> {
    store.list_buckets().await
}

pub async fn list_objects<S: BucketStore + Sync + ?Sized>(
    store: &S,
    bucket: &str,
) -> Result<Vec<String>> {
    let mut lister = ObjectLister::new(store, bucket);
    let mut keys = Vec::new();
    while let Some(page) = lister.next_page().await? {
        keys.extend(page);
    }
    Ok(keys)
}

/// Creates `bucket` and blocks until it is visible.
pub async fn make_bucket<S: BucketStore + ?Sized>(store: &S, bucket: &str) -> Result<()> {
    store.create_bucket(bucket).await?;
    debug!("waiting for bucket {} to exist", bucket);
    store.wait_until_bucket_exists(bucket).await
}

/// Deletes `bucket` and blocks until it is gone. The bucket must be empty.
pub async fn remove_bucket<S: BucketStore + ?Sized>(store: &S, bucket: &str) -> Result<()> {
    store.delete_bucket(bucket).await?;
    debug!("waiting for bucket {} to disappear", bucket);
    store.wait_until_bucket_not_exists(bucket).await?;
    info!("deleted bucket {}", bucket);
    Ok(())
}

/// Deletes every object in `bucket`, returning how many were deleted.
///
/// Item-level failures do not stop the walk; they are collected and
/// reported together as [`Error::PartialDelete`] once the listing is
/// exhausted. Objects deleted before a failure stay deleted.
pub async fn empty_bucket<S: BucketStore + Sync + ?Sized>(
    store: &S,
    bucket: &str,
) -> Result<usize> {
    let mut lister = ObjectLister::new(store, bucket);
    let mut deleted = 0;
    let mut failed = Vec::new();
    while let Some(keys) = lister.next_page().await? {
        for batch in keys.chunks(MAX_DELETE_BATCH) {
            debug!("deleting {} objects from {}", batch.len(), bucket);
            let failures = store.delete_objects(bucket, batch).await?;
            deleted += batch.len() - failures.len();
            failed.extend(failures);
        }
    }
    if !failed.is_empty() {
        return Err(Error::PartialDelete {
            bucket: bucket.to_owned(),
            failed,
        });
    }
    Ok(deleted)
}

/// Empties `bucket`, then deletes it and waits for it to be gone. The bucket
/// delete is never sent unless every object was deleted.
pub async fn empty_and_remove_bucket<S: BucketStore + Sync + ?Sized>(
    store: &S,
    bucket: &str,
) -> Result<usize> {
    let deleted = empty_bucket(store, bucket).await?;
    info!("deleted {} objects from {}", deleted, bucket);
    remove_bucket(store, bucket).await?;
    Ok(deleted)
}

pub async fn set_bucket_policy<S: BucketStore + ?Sized>(
    store: &S,
    bucket: &str,
    policy: &Policy,
) -> Result<()> {
    let text = policy.to_json()?;
    debug!("putting policy on {}: {}", bucket, text);
    store.put_bucket_policy(bucket, &text).await
}

/// Streams the file at `path` into `bucket` under `key`.
pub async fn upload_stream<S: BucketStore + ?Sized>(
    store: &S,
    bucket: &str,
    key: &str,
    path: &Path,
) -> Result<()> {
    let body = ByteStream::from_path(path)
        .await
        .map_err(|e| Error::Io(std::io::Error::other(DisplayErrorContext(e).to_string())))?;
    store.put_object(bucket, key, body).await?;
    info!("uploaded {:?} to {}/{}", path, bucket, key);
    Ok(())
}

pub fn policy_failure_message(bucket: &str, err: &Error) -> String {
    if err.is_not_found() {
        format!("Bucket {:?} does not exist", bucket)
    } else {
        format!("Unable to set bucket {:?} policy, {}", bucket, err)
    }
}

pub fn format_bucket_line(bucket: &BucketSummary) -> String {
    match bucket.created {
        Some(created) => format!("{}: {}", bucket.name, created.format(crate::cli::DATE_FORMAT)),
        None => bucket.name.clone(),
    }
}

#[derive(Clone)]
pub struct S3Service {
    pub client: aws_sdk_s3::Client,
    pub max_wait: std::time::Duration,
}

impl S3Service {
    pub fn new(config: &SdkConfig, settings: &ClientSettings) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(config);
        if settings.endpoint_url.is_some() {
            builder = builder.force_path_style(true);
        }
        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            max_wait: settings.max_wait,
        }
    }
}

/// A waiter that runs out of time is transient; one that reaches a failure
/// state is fatal.
fn waiter_failure<O, E>(err: WaiterError<O, E>) -> Error
where
    WaiterError<O, E>: std::error::Error + 'static,
{
    let kind = match &err {
        WaiterError::ExceededMaxWait(_) => ErrorKind::Transient,
        WaiterError::FailureState(_) => ErrorKind::Fatal,
        _ => ErrorKind::Unknown,
    };
    Error::service(kind, None, DisplayErrorContext(&err).to_string())
}

fn object_page(resp: &ListObjectsV2Output) -> ObjectPage {
    let keys = resp
        .contents()
        .iter()
        .filter_map(|o| o.key().map(str::to_owned))
        .collect();
    let next_token = if resp.is_truncated().unwrap_or(false) {
        resp.next_continuation_token().map(str::to_owned)
    } else {
        None
    };
    ObjectPage { keys, next_token }
}

fn build_failure(err: aws_sdk_s3::error::BuildError) -> Error {
    Error::service(ErrorKind::Fatal, None, err.to_string())
}

#[async_trait]
impl BucketStore for S3Service {
    async fn list_buckets(&self) -> Result<Vec<BucketSummary>> {
        let resp = self.client.list_buckets().send().await?;
        let buckets = resp
            .buckets()
            .iter()
            .map(|b| BucketSummary {
                name: b.name().unwrap_or_default().to_owned(),
                created: b
                    .creation_date()
                    .and_then(|d| DateTime::from_timestamp(d.secs(), d.subsec_nanos())),
            })
            .collect();
        Ok(buckets)
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.client.create_bucket().bucket(bucket).send().await?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.client.delete_bucket().bucket(bucket).send().await?;
        Ok(())
    }

    async fn wait_until_bucket_exists(&self, bucket: &str) -> Result<()> {
        self.client
            .wait_until_bucket_exists()
            .bucket(bucket)
            .wait(self.max_wait)
            .await
            .map_err(waiter_failure)?;
        Ok(())
    }

    async fn wait_until_bucket_not_exists(&self, bucket: &str) -> Result<()> {
        self.client
            .wait_until_bucket_not_exists()
            .bucket(bucket)
            .wait(self.max_wait)
            .await
            .map_err(waiter_failure)?;
        Ok(())
    }

    async fn list_objects_page(&self, bucket: &str, token: Option<String>) -> Result<ObjectPage> {
        let resp = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(token)
            .send()
            .await?;
        Ok(object_page(&resp))
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<Vec<DeleteFailure>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let objects = keys
            .iter()
            .map(|k| ObjectIdentifier::builder().key(k).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(build_failure)?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(build_failure)?;
        let resp = self.client.delete_objects().bucket(bucket).delete(delete).send().await?;
        let failures = resp
            .errors()
            .iter()
            .map(|e| DeleteFailure {
                key: e.key().unwrap_or_default().to_owned(),
                code: e.code().map(str::to_owned),
                message: e.message().map(str::to_owned),
            })
            .collect();
        Ok(failures)
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await?;
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: ByteStream) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await?;
        Ok(())
    }
}
