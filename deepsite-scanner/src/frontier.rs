use std::collections::{HashSet, VecDeque};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: usize,
}

/// Bounded FIFO of URLs waiting to be fetched.
///
/// A push against a full queue is refused and flags the frontier as
/// overflowed; the crawler stops dispatching once that happens, so the
/// queue length never goes above its capacity.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    pending: HashSet<String>,
    capacity: usize,
    peak_len: usize,
    overflowed: bool,
}

impl Frontier {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            pending: HashSet::new(),
            capacity,
            peak_len: 0,
            overflowed: false,
        }
    }

    pub fn push(&mut self, url: String, depth: usize) -> bool {
        if self.queue.len() >= self.capacity {
            debug!("Frontier full ({}), dropping {}", self.capacity, url);
            self.overflowed = true;
            return false;
        }
        self.pending.insert(url.clone());
        self.queue.push_back(FrontierEntry { url, depth });
        self.peak_len = self.peak_len.max(self.queue.len());
        true
    }

    pub fn pop(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        self.pending.remove(&entry.url);
        Some(entry)
    }

    /// Whether `url` is currently waiting in the queue.
    pub fn contains(&self, url: &str) -> bool {
        self.pending.contains(url)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn peak_len(&self) -> usize {
        self.peak_len
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrontierEntry> {
        self.queue.iter()
    }
}
