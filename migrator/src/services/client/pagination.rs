//! Draining `nextLink`-paginated collections
//!
//! [`pages`] turns a first page plus a "fetch next" function into a lazy stream
//! of page batches. The stream is single-use: it is consumed once, in order, and
//! stops at the first page without a continuation link. [`collect_pages`] drains
//! it into one ordered `Vec`, failing on the first page error.

use futures::stream::{self, Stream, TryStreamExt};
use std::future::Future;
use tracing::debug;

use super::errors::{ClientError, ClientResult};
use super::types::Page;

enum Cursor<T> {
    Loaded(Page<T>),
    Link(String),
    Exhausted,
}

/// Lazy stream of page contents starting from an already fetched page
pub fn pages<T, Next, NextFut>(first: Page<T>, next: Next) -> impl Stream<Item = ClientResult<Vec<T>>>
where
    Next: FnMut(String) -> NextFut,
    NextFut: Future<Output = ClientResult<Page<T>>>,
{
    stream::try_unfold(
        (Cursor::Loaded(first), next),
        |(cursor, mut next)| async move {
            let page = match cursor {
                Cursor::Loaded(page) => page,
                Cursor::Link(link) => next(link).await?,
                Cursor::Exhausted => return Ok(None),
            };

            let following = match page.continuation() {
                Some(link) => Cursor::Link(link.to_string()),
                None => Cursor::Exhausted,
            };

            Ok::<_, ClientError>(Some((page.value, (following, next))))
        },
    )
}

/// Drain a page stream into a single ordered sequence
pub async fn collect_pages<T, S>(pages: S, collection: &str) -> ClientResult<Vec<T>>
where
    S: Stream<Item = ClientResult<Vec<T>>>,
{
    let mut pages = std::pin::pin!(pages);
    let mut items = Vec::new();
    let mut page_count = 0usize;

    while let Some(mut batch) = pages.try_next().await? {
        page_count += 1;
        debug!(
            "[Paginator] {} page {}: {} items",
            collection,
            page_count,
            batch.len()
        );
        items.append(&mut batch);
    }

    debug!(
        "[Paginator] {} complete: {} items across {} pages",
        collection,
        items.len(),
        page_count
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn page(range: std::ops::Range<u32>, next: Option<&str>) -> Page<u32> {
        Page::new(range.collect(), next.map(str::to_string))
    }

    /// Serves pages `page-1..page-n`, each with `per_page` items
    fn numbered_source(
        total_pages: u32,
        per_page: u32,
        calls: &Cell<u32>,
    ) -> impl FnMut(String) -> std::future::Ready<ClientResult<Page<u32>>> + '_ {
        move |link: String| {
            calls.set(calls.get() + 1);
            let index: u32 = link.trim_start_matches("page-").parse().unwrap();
            let next = (index + 1 < total_pages).then(|| format!("page-{}", index + 1));
            std::future::ready(Ok(page(
                index * per_page..(index + 1) * per_page,
                next.as_deref(),
            )))
        }
    }

    #[tokio::test]
    async fn test_single_page_without_link() {
        let calls = Cell::new(0);
        let items = collect_pages(pages(page(0..3, None), numbered_source(1, 3, &calls)), "test")
            .await
            .unwrap();
        assert_eq!(items, vec![0, 1, 2]);
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let calls = Cell::new(0);
        let items = collect_pages(pages(page(0..0, None), numbered_source(1, 0, &calls)), "test")
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_many_pages_preserve_order() {
        let calls = Cell::new(0);
        let items = collect_pages(
            pages(page(0..4, Some("page-1")), numbered_source(25, 4, &calls)),
            "test",
        )
        .await
        .unwrap();

        assert_eq!(items.len(), 25 * 4);
        assert_eq!(items, (0..100).collect::<Vec<_>>());
        assert_eq!(calls.get(), 24);
    }

    #[tokio::test]
    async fn test_empty_next_link_stops() {
        let calls = Cell::new(0);
        let items = collect_pages(
            pages(page(0..2, Some("")), numbered_source(5, 2, &calls)),
            "test",
        )
        .await
        .unwrap();
        assert_eq!(items, vec![0, 1]);
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn test_empty_intermediate_page_continues() {
        let mut served = vec![page(0..0, Some("c")), page(5..7, None)].into_iter();
        let next = move |_link: String| std::future::ready(Ok(served.next().unwrap()));

        let items = collect_pages(pages(page(0..1, Some("b")), next), "test")
            .await
            .unwrap();
        assert_eq!(items, vec![0, 5, 6]);
    }

    #[tokio::test]
    async fn test_page_error_propagates() {
        let next = |link: String| {
            std::future::ready(if link == "page-2" {
                Err(ClientError::Network {
                    message: "connection reset".to_string(),
                })
            } else {
                Ok(page(10..12, Some("page-2")))
            })
        };

        let result = collect_pages(pages(page(0..2, Some("page-1")), next), "test").await;
        assert!(matches!(result, Err(ClientError::Network { .. })));
    }
}
