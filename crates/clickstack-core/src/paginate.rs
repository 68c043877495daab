// Cursor-following pagination used by every list-style read
//
// Managed-service list APIs hand back a continuation cursor alongside each
// page; this loop follows the cursor until the service stops returning one,
// accumulating all items in order.

use std::future::Future;

/// One page of results plus the cursor for the next fetch, if any.
#[derive(Debug, Clone)]
pub struct Page<T, C> {
    pub items: Vec<T>,
    pub next_cursor: Option<C>,
}

impl<T, C> Page<T, C> {
    pub fn new(items: Vec<T>, next_cursor: Option<C>) -> Self {
        Self { items, next_cursor }
    }

    /// Final page with no continuation
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }
}

/// Invoke `fetch` with the running cursor until no continuation remains.
pub async fn fetch_all_pages<T, C, E, F, Fut>(mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(Option<C>) -> Fut,
    Fut: Future<Output = Result<Page<T, C>, E>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<C> = None;
    loop {
        let page = fetch(cursor.take()).await?;
        items.extend(page.items);
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return Ok(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn follows_cursor_until_exhausted() {
        let pages = vec![
            Page::new(vec![1, 2], Some("b")),
            Page::new(vec![3], Some("c")),
            Page::last(vec![4, 5]),
        ];
        let calls = AtomicUsize::new(0);

        let items = fetch_all_pages(|cursor: Option<&str>| {
            let idx = calls.fetch_add(1, Ordering::SeqCst);
            let expected = [None, Some("b"), Some("c")][idx];
            assert_eq!(cursor, expected);
            let page = pages[idx].clone();
            async move { Ok::<_, String>(page) }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn single_page_stops_immediately() {
        let items = fetch_all_pages(|_: Option<String>| async {
            Ok::<_, String>(Page::last(vec!["only"]))
        })
        .await
        .unwrap();
        assert_eq!(items, vec!["only"]);
    }

    #[tokio::test]
    async fn errors_propagate() {
        let result: Result<Vec<i32>, _> = fetch_all_pages(|_: Option<String>| async {
            Err::<Page<i32, String>, _>("list failed".to_string())
        })
        .await;
        assert_eq!(result.unwrap_err(), "list failed");
    }
}
