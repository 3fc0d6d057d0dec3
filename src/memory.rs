//! In-process stand-ins for the AWS services. They record every call so
//! tests can check which requests were made and in what order.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};

use crate::{
    dynamo::ItemStore,
    error::{DeleteFailure, Error, ErrorKind, Result},
    rds::{ClusterSummary, DatabaseCatalog, ParameterGroupSummary},
    s3::{BucketStore, BucketSummary, ObjectPage},
};

#[derive(Clone)]
struct Failure {
    kind: ErrorKind,
    code: Option<String>,
    message: String,
}

impl Failure {
    fn to_error(&self) -> Error {
        Error::service(self.kind, self.code.as_deref(), self.message.clone())
    }
}

#[derive(Default)]
struct Calls {
    log: Vec<&'static str>,
    failures: HashMap<&'static str, Failure>,
}

impl Calls {
    fn record(&mut self, op: &'static str) -> Result<()> {
        self.log.push(op);
        match self.failures.get(op) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
struct Bucket {
    created: Option<DateTime<Utc>>,
    objects: BTreeMap<String, Vec<u8>>,
    policy: Option<String>,
}

#[derive(Default)]
struct S3State {
    calls: Calls,
    buckets: BTreeMap<String, Bucket>,
    denied: HashSet<String>,
    fail_listing_from: Option<usize>,
    pages_served: usize,
}

#[derive(Default)]
pub struct MemoryS3 {
    page_size: Option<usize>,
    state: Mutex<S3State>,
}

fn no_such_bucket(bucket: &str) -> Error {
    Error::service(
        ErrorKind::NotFound,
        Some("NoSuchBucket"),
        format!("The specified bucket does not exist: {}", bucket),
    )
}

impl MemoryS3 {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            ..Default::default()
        }
    }

    pub fn add_bucket(&self, name: &str, created: Option<DateTime<Utc>>) {
        let bucket = Bucket {
            created,
            ..Default::default()
        };
        self.state.lock().unwrap().buckets.insert(name.to_owned(), bucket);
    }

    pub fn add_object(&self, bucket: &str, key: &str, body: &[u8]) {
        let mut state = self.state.lock().unwrap();
        let bucket = state.buckets.get_mut(bucket).expect("bucket must exist");
        bucket.objects.insert(key.to_owned(), body.to_vec());
    }

    pub fn fail_on(&self, op: &'static str, kind: ErrorKind, code: Option<&str>, message: &str) {
        let failure = Failure {
            kind,
            code: code.map(str::to_owned),
            message: message.to_owned(),
        };
        self.state.lock().unwrap().calls.failures.insert(op, failure);
    }

    /// Listing requests from the zero-based page `page` on fail.
    pub fn fail_listing_from_page(&self, page: usize) {
        self.state.lock().unwrap().fail_listing_from = Some(page);
    }

    pub fn deny_delete(&self, key: &str) {
        self.state.lock().unwrap().denied.insert(key.to_owned());
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.log.clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| **c == op).count()
    }

    pub fn has_bucket(&self, name: &str) -> bool {
        self.state.lock().unwrap().buckets.contains_key(name)
    }

    pub fn object_count(&self, bucket: &str) -> usize {
        self.object_keys(bucket).len()
    }

    pub fn object_keys(&self, bucket: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .buckets
            .get(bucket)
            .map(|b| b.objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.buckets.get(bucket)?.objects.get(key).cloned()
    }

    pub fn policy(&self, bucket: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.buckets.get(bucket)?.policy.clone()
    }
}

#[async_trait]
impl BucketStore for MemoryS3 {
    async fn list_buckets(&self) -> Result<Vec<BucketSummary>> {
        let mut state = self.state.lock().unwrap();
        state.calls.record("list_buckets")?;
        Ok(state
            .buckets
            .iter()
            .map(|(name, b)| BucketSummary {
                name: name.clone(),
                created: b.created,
            })
            .collect())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.record("create_bucket")?;
        if state.buckets.contains_key(bucket) {
            return Err(Error::service(
                ErrorKind::Unknown,
                Some("BucketAlreadyOwnedByYou"),
                "Your previous request to create the named bucket succeeded and you already \
                 own it.",
            ));
        }
        state.buckets.insert(bucket.to_owned(), Bucket::default());
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.record("delete_bucket")?;
        match state.buckets.get(bucket) {
            None => Err(no_such_bucket(bucket)),
            Some(b) if !b.objects.is_empty() => Err(Error::service(
                ErrorKind::Unknown,
                Some("BucketNotEmpty"),
                "The bucket you tried to delete is not empty",
            )),
            Some(_) => {
                state.buckets.remove(bucket);
                Ok(())
            }
        }
    }

    async fn wait_until_bucket_exists(&self, bucket: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.record("wait_until_bucket_exists")?;
        if state.buckets.contains_key(bucket) {
            Ok(())
        } else {
            Err(Error::service(ErrorKind::Transient, None, "exceeded max wait time"))
        }
    }

    async fn wait_until_bucket_not_exists(&self, bucket: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.record("wait_until_bucket_not_exists")?;
        if state.buckets.contains_key(bucket) {
            Err(Error::service(ErrorKind::Transient, None, "exceeded max wait time"))
        } else {
            Ok(())
        }
    }

    async fn list_objects_page(&self, bucket: &str, token: Option<String>) -> Result<ObjectPage> {
        let mut state = self.state.lock().unwrap();
        state.calls.record("list_objects_page")?;
        let page_index = state.pages_served;
        state.pages_served += 1;
        if state.fail_listing_from.is_some_and(|from| page_index >= from) {
            return Err(Error::service(ErrorKind::Transient, None, "connection reset"));
        }
        let page_size = self.page_size.unwrap_or(usize::MAX);
        let b = state.buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        let mut remaining = b
            .objects
            .keys()
            .filter(|k| token.as_ref().map_or(true, |t| *k > t))
            .cloned();
        let keys: Vec<String> = remaining.by_ref().take(page_size).collect();
        let next_token = match remaining.next() {
            Some(_) => keys.last().cloned(),
            None => None,
        };
        Ok(ObjectPage { keys, next_token })
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<Vec<DeleteFailure>> {
        let mut state = self.state.lock().unwrap();
        state.calls.record("delete_objects")?;
        let S3State { buckets, denied, .. } = &mut *state;
        let b = buckets.get_mut(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        let mut failures = Vec::new();
        for key in keys {
            if denied.contains(key) {
                failures.push(DeleteFailure {
                    key: key.clone(),
                    code: Some("AccessDenied".to_owned()),
                    message: Some("Access Denied".to_owned()),
                });
            } else {
                b.objects.remove(key);
            }
        }
        Ok(failures)
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.record("put_bucket_policy")?;
        let b = state.buckets.get_mut(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        b.policy = Some(policy.to_owned());
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: ByteStream) -> Result<()> {
        let data = body
            .collect()
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?
            .into_bytes();
        let mut state = self.state.lock().unwrap();
        state.calls.record("put_object")?;
        let b = state.buckets.get_mut(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        b.objects.insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}

type Item = HashMap<String, AttributeValue>;

#[derive(Default)]
struct TableState {
    calls: Calls,
    tables: HashMap<String, Vec<Item>>,
}

#[derive(Default)]
pub struct MemoryDynamo {
    state: Mutex<TableState>,
}

impl MemoryDynamo {
    pub fn add_table(&self, table: &str) {
        self.state.lock().unwrap().tables.entry(table.to_owned()).or_default();
    }

    pub fn put(&self, table: &str, item: Item) {
        let mut state = self.state.lock().unwrap();
        state.tables.entry(table.to_owned()).or_default().push(item);
    }

    pub fn fail_on(&self, op: &'static str, kind: ErrorKind, code: Option<&str>, message: &str) {
        let failure = Failure {
            kind,
            code: code.map(str::to_owned),
            message: message.to_owned(),
        };
        self.state.lock().unwrap().calls.failures.insert(op, failure);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.log.clone()
    }
}

#[async_trait]
impl ItemStore for MemoryDynamo {
    async fn get_item(&self, table: &str, key: Item) -> Result<Option<Item>> {
        let mut state = self.state.lock().unwrap();
        state.calls.record("get_item")?;
        let items = state.tables.get(table).ok_or_else(|| {
            Error::service(
                ErrorKind::NotFound,
                Some("ResourceNotFoundException"),
                "Requested resource not found",
            )
        })?;
        let found = items
            .iter()
            .find(|item| key.iter().all(|(name, value)| item.get(name) == Some(value)))
            .cloned();
        Ok(found)
    }
}

#[derive(Default)]
struct CatalogState {
    calls: Calls,
    parameter_groups: Vec<ParameterGroupSummary>,
    clusters: Vec<ClusterSummary>,
}

#[derive(Default)]
pub struct MemoryRds {
    state: Mutex<CatalogState>,
}

impl MemoryRds {
    pub fn add_parameter_group(&self, group: ParameterGroupSummary) {
        self.state.lock().unwrap().parameter_groups.push(group);
    }

    pub fn add_cluster(&self, cluster: ClusterSummary) {
        self.state.lock().unwrap().clusters.push(cluster);
    }

    pub fn fail_on(&self, op: &'static str, kind: ErrorKind, code: Option<&str>, message: &str) {
        let failure = Failure {
            kind,
            code: code.map(str::to_owned),
            message: message.to_owned(),
        };
        self.state.lock().unwrap().calls.failures.insert(op, failure);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.log.clone()
    }
}

#[async_trait]
impl DatabaseCatalog for MemoryRds {
    async fn describe_parameter_groups(&self) -> Result<Vec<ParameterGroupSummary>> {
        let mut state = self.state.lock().unwrap();
        state.calls.record("describe_parameter_groups")?;
        Ok(state.parameter_groups.clone())
    }

    async fn describe_clusters(&self) -> Result<Vec<ClusterSummary>> {
        let mut state = self.state.lock().unwrap();
        state.calls.record("describe_clusters")?;
        Ok(state.clusters.clone())
    }
}
