// In-memory ObjectStore with deterministic paging, for tests

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::{ListPage, ObjectStore};

/// Keys sort lexicographically and pages resume after the last key returned,
/// mirroring the provider's continuation behavior across interleaved deletes.
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    page_size: usize,
    list_requests: AtomicUsize,
}

impl MemoryStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_size: page_size.max(1),
            list_requests: AtomicUsize::new(0),
        }
    }

    /// Number of list pages served so far
    pub fn list_requests(&self) -> usize {
        self.list_requests.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), body);
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned())
    }

    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<()> {
        let mut objects = self.objects.lock().unwrap();
        let body = objects
            .get(&(src_bucket.to_string(), src_key.to_string()))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such key {src_bucket}/{src_key}"))?;
        objects.insert((dst_bucket.to_string(), dst_key.to_string()), body);
        Ok(())
    }

    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<String>,
    ) -> Result<ListPage> {
        self.list_requests.fetch_add(1, Ordering::SeqCst);
        let objects = self.objects.lock().unwrap();
        let matching: Vec<String> = objects
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .filter(|(_, k)| token.as_deref().map_or(true, |t| k.as_str() > t))
            .map(|(_, k)| k.clone())
            .collect();

        let keys: Vec<String> = matching.iter().take(self.page_size).cloned().collect();
        let next_token = if matching.len() > self.page_size {
            keys.last().cloned()
        } else {
            None
        };
        Ok(ListPage { keys, next_token })
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()> {
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(&(bucket.to_string(), key.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pages_resume_after_last_key() {
        let store = MemoryStore::new(2);
        for key in ["a/1", "a/2", "a/3", "b/1"] {
            store.put("bucket", key, vec![0]).await.unwrap();
        }

        let first = store.list_page("bucket", "a/", None).await.unwrap();
        assert_eq!(first.keys, vec!["a/1", "a/2"]);
        let token = first.next_token.clone();
        assert!(token.is_some());

        let second = store.list_page("bucket", "a/", token).await.unwrap();
        assert_eq!(second.keys, vec!["a/3"]);
        assert!(second.next_token.is_none());
    }
}
