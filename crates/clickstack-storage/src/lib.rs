// clickstack-storage - object-storage helpers
//
// Every helper runs over the ObjectStore trait so handlers can substitute
// an in-memory store in tests. The S3 implementation is a thin passthrough;
// the behavior that matters here - missing-key tolerance and the
// continuation-token delete loop - lives in the helpers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

mod s3;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use s3::S3Store;

/// One page of keys under a prefix plus the continuation token, if any
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub keys: Vec<String>,
    pub next_token: Option<String>,
}

/// Storage abstraction for blob reads, writes and prefix listing
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write a blob at the key
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;

    /// Read a blob; None when the key does not exist
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Server-side copy between buckets
    async fn copy(&self, src_bucket: &str, src_key: &str, dst_bucket: &str, dst_key: &str)
        -> Result<()>;

    /// One page of keys under `prefix`, resuming from `token`
    async fn list_page(&self, bucket: &str, prefix: &str, token: Option<String>)
        -> Result<ListPage>;

    /// Delete a batch of keys
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()>;
}

/// Write a string blob.
pub async fn put_string(
    store: &dyn ObjectStore,
    content: &str,
    bucket: &str,
    key: &str,
) -> Result<()> {
    store.put(bucket, key, content.as_bytes().to_vec()).await?;
    info!("saved content to s3://{bucket}/{key}");
    Ok(())
}

/// Read a JSON blob; None when the key does not exist.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<Option<T>> {
    info!("read_json: s3://{bucket}/{key}");
    match store.get(bucket, key).await? {
        Some(bytes) => {
            let value = serde_json::from_slice(&bytes)
                .with_context(|| format!("malformed JSON at s3://{bucket}/{key}"))?;
            Ok(Some(value))
        }
        None => {
            warn!("object does not exist: s3://{bucket}/{key}");
            Ok(None)
        }
    }
}

/// Copy one object addressed by `s3://bucket/key` URIs.
pub async fn copy_object(store: &dyn ObjectStore, src_uri: &str, dst_uri: &str) -> Result<()> {
    let (src_bucket, src_key) = parse_s3_uri(src_uri)?;
    let (dst_bucket, dst_key) = parse_s3_uri(dst_uri)?;
    store.copy(src_bucket, src_key, dst_bucket, dst_key).await?;
    info!("copied {src_uri} to {dst_uri}");
    Ok(())
}

/// Delete every object under `prefix`, page by page, until the store stops
/// returning a continuation token. Returns the total number deleted.
pub async fn delete_by_prefix(store: &dyn ObjectStore, bucket: &str, prefix: &str) -> Result<usize> {
    let mut deleted = 0usize;
    let mut token: Option<String> = None;
    loop {
        let page = store.list_page(bucket, prefix, token.take()).await?;
        if !page.keys.is_empty() {
            store.delete_objects(bucket, &page.keys).await?;
            deleted += page.keys.len();
            info!(
                "deleted {} objects with prefix \"{prefix}\", truncated: {}",
                page.keys.len(),
                page.next_token.is_some()
            );
        }
        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    info!("{deleted} objects were deleted in bucket={bucket}, prefix={prefix}");
    Ok(deleted)
}

fn parse_s3_uri(uri: &str) -> Result<(&str, &str)> {
    let rest = uri
        .strip_prefix("s3://")
        .with_context(|| format!("invalid s3 uri {uri}"))?;
    let (bucket, key) = rest
        .split_once('/')
        .with_context(|| format!("invalid s3 uri {uri}"))?;
    if bucket.is_empty() || key.is_empty() {
        anyhow::bail!("invalid s3 uri {uri}");
    }
    Ok((bucket, key))
}
