//! Fixed-size bucket structures keyed by one color channel byte.
//!
//! Each structure has exactly 256 slots and remembers which slots are in
//! use through an [`ActiveChain`], so a level can be drained without
//! scanning all 256 slots. Slots are cleared one by one as they drain.

/// Number of distinct values of one color channel.
pub const CHANNEL_VALUES: usize = 256;

const END: u16 = CHANNEL_VALUES as u16;

/// Intrusive LIFO list of the active slots of one level.
///
/// Linking a key makes it the new head. The `next` links are only read
/// for keys linked since the last [`take_head`](Self::take_head), so they
/// never need resetting.
#[derive(Debug, Clone)]
pub struct ActiveChain {
    next: [u16; CHANNEL_VALUES],
    head: u16,
}

impl Default for ActiveChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveChain {
    pub fn new() -> Self {
        Self {
            next: [END; CHANNEL_VALUES],
            head: END,
        }
    }

    /// Push `key` onto the front of the chain.
    ///
    /// The caller links each key at most once per drain.
    #[inline]
    pub fn link(&mut self, key: u8) {
        self.next[usize::from(key)] = self.head;
        self.head = u16::from(key);
    }

    /// Detach the whole chain, returning its first key.
    ///
    /// Walk the detached chain with [`after`](Self::after). The chain is
    /// empty afterwards and ready for the next scope.
    #[inline]
    pub fn take_head(&mut self) -> Option<u8> {
        let head = std::mem::replace(&mut self.head, END);
        key_of(head)
    }

    /// The key linked before `key`.
    #[inline]
    pub fn after(&self, key: u8) -> Option<u8> {
        key_of(self.next[usize::from(key)])
    }

    pub fn is_empty(&self) -> bool {
        self.head == END
    }
}

#[inline]
fn key_of(link: u16) -> Option<u8> {
    u8::try_from(link).ok()
}

/// 256 reusable value lists plus the chain of non-empty ones.
///
/// Lists keep their capacity after being cleared, so a warmed-up set of
/// buckets stops allocating.
#[derive(Debug, Clone)]
pub struct Buckets<T> {
    lists: Vec<Vec<T>>,
    chain: ActiveChain,
}

impl<T> Default for Buckets<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Buckets<T> {
    pub fn new() -> Self {
        Self {
            lists: (0..CHANNEL_VALUES).map(|_| Vec::new()).collect(),
            chain: ActiveChain::new(),
        }
    }

    /// Append `value` to the list of `key`.
    #[inline]
    pub fn push(&mut self, key: u8, value: T) {
        let list = &mut self.lists[usize::from(key)];
        if list.is_empty() {
            self.chain.link(key);
        }
        list.push(value);
    }

    #[inline]
    pub fn bucket(&self, key: u8) -> &[T] {
        &self.lists[usize::from(key)]
    }

    /// Empty the list of `key`, keeping its allocation.
    #[inline]
    pub fn clear(&mut self, key: u8) {
        self.lists[usize::from(key)].clear();
    }

    #[inline]
    pub fn take_head(&mut self) -> Option<u8> {
        self.chain.take_head()
    }

    #[inline]
    pub fn after(&self, key: u8) -> Option<u8> {
        self.chain.after(key)
    }

    /// True when no list holds values.
    pub fn is_drained(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }
}

/// Per-value occurrence counters for the last channel.
#[derive(Debug, Clone)]
pub struct Tally {
    counts: [u32; CHANNEL_VALUES],
    chain: ActiveChain,
}

impl Default for Tally {
    fn default() -> Self {
        Self::new()
    }
}

impl Tally {
    pub fn new() -> Self {
        Self {
            counts: [0; CHANNEL_VALUES],
            chain: ActiveChain::new(),
        }
    }

    #[inline]
    pub fn increment(&mut self, key: u8) {
        let count = &mut self.counts[usize::from(key)];
        if *count == 0 {
            self.chain.link(key);
        }
        *count += 1;
    }

    /// Read the count of `key` and reset it to zero.
    #[inline]
    pub fn take_count(&mut self, key: u8) -> u32 {
        std::mem::take(&mut self.counts[usize::from(key)])
    }

    #[inline]
    pub fn take_head(&mut self) -> Option<u8> {
        self.chain.take_head()
    }

    #[inline]
    pub fn after(&self, key: u8) -> Option<u8> {
        self.chain.after(key)
    }

    pub fn is_zeroed(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(chain: &mut ActiveChain) -> Vec<u8> {
        let mut keys = Vec::new();
        let mut cursor = chain.take_head();
        while let Some(key) = cursor {
            keys.push(key);
            cursor = chain.after(key);
        }
        keys
    }

    #[test]
    fn test_chain_is_lifo() {
        let mut chain = ActiveChain::new();
        for key in [7, 0, 255, 42] {
            chain.link(key);
        }
        assert_eq!(drain(&mut chain), vec![42, 255, 0, 7]);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_chain_reusable_after_take() {
        let mut chain = ActiveChain::new();
        chain.link(1);
        chain.link(2);
        assert_eq!(drain(&mut chain), vec![2, 1]);

        chain.link(9);
        assert_eq!(drain(&mut chain), vec![9]);
        assert_eq!(drain(&mut chain), Vec::<u8>::new());
    }

    #[test]
    fn test_buckets_link_on_first_value_only() {
        let mut buckets = Buckets::<u16>::new();
        buckets.push(3, 30);
        buckets.push(5, 50);
        buckets.push(3, 31);

        assert_eq!(buckets.bucket(3), &[30, 31]);
        let head = buckets.take_head();
        assert_eq!(head, Some(5));
        assert_eq!(buckets.after(5), Some(3));
        assert_eq!(buckets.after(3), None);

        buckets.clear(3);
        buckets.clear(5);
        assert!(buckets.is_drained());
    }

    #[test]
    fn test_tally_counts_and_resets() {
        let mut tally = Tally::new();
        for key in [4, 4, 9, 4] {
            tally.increment(key);
        }
        assert_eq!(tally.take_head(), Some(9));
        assert_eq!(tally.after(9), Some(4));
        assert_eq!(tally.take_count(4), 3);
        assert_eq!(tally.take_count(9), 1);
        assert!(tally.is_zeroed());
    }
}
