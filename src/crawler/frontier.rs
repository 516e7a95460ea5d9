//! Breadth-first crawl frontier
//!
//! A FIFO queue plus two sets: `seen` holds every URL ever accepted into the
//! queue, `visited` holds every URL that was handed to the fetcher. A URL is
//! enqueued at most once per run, so it is also dequeued at most once.

use crate::url::CanonicalUrl;
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<CanonicalUrl>,
    seen: HashSet<CanonicalUrl>,
    visited: HashSet<CanonicalUrl>,
}

impl Frontier {
    /// Creates a frontier holding only `seed`
    pub fn new(seed: CanonicalUrl) -> Self {
        let mut frontier = Self::default();
        frontier.offer(seed);
        frontier
    }

    /// Queues `url` unless it was already queued or visited
    ///
    /// Returns `true` when the URL was added.
    pub fn offer(&mut self, url: CanonicalUrl) -> bool {
        if self.visited.contains(&url) || !self.seen.insert(url.clone()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    pub fn dequeue(&mut self) -> Option<CanonicalUrl> {
        self.queue.pop_front()
    }

    /// Records that `url` is being fetched; returns `false` if it already was
    pub fn mark_visited(&mut self, url: &CanonicalUrl) -> bool {
        self.seen.insert(url.clone());
        self.visited.insert(url.clone())
    }

    pub fn is_visited(&self, url: &CanonicalUrl) -> bool {
        self.visited.contains(url)
    }

    /// URLs still waiting in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Visited URLs in sorted order
    pub fn visited_sorted(&self) -> Vec<CanonicalUrl> {
        let mut urls: Vec<CanonicalUrl> = self.visited.iter().cloned().collect();
        urls.sort();
        urls
    }
}

/// Upper bound on the number of pages a run may fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBudget {
    limit: Option<u64>,
}

impl PageBudget {
    /// Negative limits mean unbounded
    pub fn from_limit(limit: i64) -> Self {
        Self {
            limit: u64::try_from(limit).ok(),
        }
    }

    pub fn unbounded() -> Self {
        Self { limit: None }
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn is_exhausted(&self, pages: u64) -> bool {
        self.limit.map_or(false, |limit| pages >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::canonicalize;
    use proptest::prelude::*;

    fn url(raw: &str) -> CanonicalUrl {
        canonicalize(raw, None).unwrap()
    }

    #[test]
    fn test_seeded_frontier() {
        let mut frontier = Frontier::new(url("https://example.edu"));
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier.dequeue(), Some(url("https://example.edu")));
        assert!(frontier.is_empty());
        assert_eq!(frontier.dequeue(), None);
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new(url("https://example.edu"));
        frontier.offer(url("https://example.edu/a"));
        frontier.offer(url("https://example.edu/b"));

        assert_eq!(frontier.dequeue(), Some(url("https://example.edu")));
        assert_eq!(frontier.dequeue(), Some(url("https://example.edu/a")));
        assert_eq!(frontier.dequeue(), Some(url("https://example.edu/b")));
    }

    #[test]
    fn test_offer_ignores_queued_and_visited() {
        let mut frontier = Frontier::new(url("https://example.edu"));
        assert!(!frontier.offer(url("https://example.edu/")));

        let seed = frontier.dequeue().unwrap();
        assert!(frontier.mark_visited(&seed));
        assert!(!frontier.mark_visited(&seed));
        assert!(!frontier.offer(seed.clone()));
        assert!(frontier.is_visited(&seed));

        assert!(frontier.offer(url("https://example.edu/a")));
        assert!(!frontier.offer(url("https://example.edu/a#top")));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_visited_sorted() {
        let mut frontier = Frontier::new(url("https://example.edu"));
        frontier.mark_visited(&url("https://example.edu/z"));
        frontier.mark_visited(&url("https://example.edu/a"));
        assert_eq!(
            frontier.visited_sorted(),
            vec![url("https://example.edu/a"), url("https://example.edu/z")]
        );
        assert_eq!(frontier.visited_count(), 2);
    }

    #[test]
    fn test_page_budget() {
        let unbounded = PageBudget::from_limit(-1);
        assert_eq!(unbounded, PageBudget::unbounded());
        assert!(!unbounded.is_exhausted(u64::MAX));

        let zero = PageBudget::from_limit(0);
        assert!(zero.is_exhausted(0));

        let two = PageBudget::from_limit(2);
        assert_eq!(two.limit(), Some(2));
        assert!(!two.is_exhausted(1));
        assert!(two.is_exhausted(2));
    }

    proptest! {
        #[test]
        fn prop_no_url_is_dequeued_twice(
            ops in prop::collection::vec((any::<bool>(), 0u8..12), 1..200)
        ) {
            let mut frontier = Frontier::new(url("https://example.edu"));
            let mut dequeued = std::collections::HashSet::new();

            for (is_offer, n) in ops {
                if is_offer {
                    frontier.offer(url(&format!("https://example.edu/p{}", n)));
                } else if let Some(next) = frontier.dequeue() {
                    prop_assert!(dequeued.insert(next.clone()), "{} dequeued twice", next);
                    frontier.mark_visited(&next);
                }
            }

            while let Some(next) = frontier.dequeue() {
                prop_assert!(dequeued.insert(next.clone()), "{} dequeued twice", next);
            }
        }
    }
}
