//! Intrusive, O(1) FIFO queue over table indices.
//!
//! Every PCB carries one `Link` per queue it can simultaneously belong to.
//! `IndexQueue` itself stores only a head/tail/size triple; `put`, `get` and
//! `remove` are all O(1) and never allocate, satisfying the "no dynamic
//! memory allocator" non-goal while avoiding raw address arithmetic on PCBs
//! (the hazard called out directly against storing PCBs in a flat table and
//! using table indices as the queue element type).

/// Forward/back links for one membership of an item in one intrusive queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct Link {
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

/// Gives an `IndexQueue` mutable access to the link fields embedded in
/// whatever backing store holds the queued items (a `PcbTable` slot, for
/// instance). Implementors must guarantee `link_mut(idx)` is valid for
/// every `idx` the queue is asked to operate on.
pub trait LinkedPool {
    fn link_mut(&mut self, idx: usize) -> &mut Link;
}

/// An intrusive FIFO queue of table indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexQueue {
    head: Option<usize>,
    tail: Option<usize>,
    size: usize,
}

impl IndexQueue {
    pub const fn new() -> Self {
        IndexQueue {
            head: None,
            tail: None,
            size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn front(&self) -> Option<usize> {
        self.head
    }

    /// Appends `idx` to the tail of the queue. Caller must ensure `idx` is
    /// not already a member of this queue.
    pub fn put<P: LinkedPool>(&mut self, pool: &mut P, idx: usize) {
        {
            let link = pool.link_mut(idx);
            link.prev = self.tail;
            link.next = None;
        }
        if let Some(tail) = self.tail {
            pool.link_mut(tail).next = Some(idx);
        } else {
            self.head = Some(idx);
        }
        self.tail = Some(idx);
        self.size += 1;
    }

    /// Removes and returns the item at the head of the queue.
    pub fn get<P: LinkedPool>(&mut self, pool: &mut P) -> Option<usize> {
        let idx = self.head?;
        self.remove(pool, idx);
        Some(idx)
    }

    /// Removes `idx` from wherever it sits in the queue. No-op-safe to call
    /// on an index that is not actually linked into this particular queue
    /// only if the caller has otherwise guaranteed it is — this method
    /// trusts its `prev`/`next` fields.
    pub fn remove<P: LinkedPool>(&mut self, pool: &mut P, idx: usize) {
        let (prev, next) = {
            let link = pool.link_mut(idx);
            (link.prev, link.next)
        };

        match prev {
            Some(p) => pool.link_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => pool.link_mut(n).prev = prev,
            None => self.tail = prev,
        }

        let link = pool.link_mut(idx);
        link.prev = None;
        link.next = None;
        self.size -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Pool {
        links: [Link; 8],
    }

    impl LinkedPool for Pool {
        fn link_mut(&mut self, idx: usize) -> &mut Link {
            &mut self.links[idx]
        }
    }

    #[test]
    fn fifo_order_preserved() {
        let mut pool = Pool::default();
        let mut q = IndexQueue::new();
        q.put(&mut pool, 3);
        q.put(&mut pool, 1);
        q.put(&mut pool, 4);
        assert_eq!(q.len(), 3);
        assert_eq!(q.get(&mut pool), Some(3));
        assert_eq!(q.get(&mut pool), Some(1));
        assert_eq!(q.get(&mut pool), Some(4));
        assert_eq!(q.get(&mut pool), None);
        assert!(q.is_empty());
    }

    #[test]
    fn remove_from_middle() {
        let mut pool = Pool::default();
        let mut q = IndexQueue::new();
        q.put(&mut pool, 0);
        q.put(&mut pool, 1);
        q.put(&mut pool, 2);
        q.remove(&mut pool, 1);
        assert_eq!(q.len(), 2);
        assert_eq!(q.get(&mut pool), Some(0));
        assert_eq!(q.get(&mut pool), Some(2));
    }

    #[test]
    fn remove_head_and_tail() {
        let mut pool = Pool::default();
        let mut q = IndexQueue::new();
        q.put(&mut pool, 0);
        q.put(&mut pool, 1);
        q.remove(&mut pool, 0);
        assert_eq!(q.front(), Some(1));
        q.remove(&mut pool, 1);
        assert!(q.is_empty());
        assert_eq!(q.front(), None);
    }

    #[test]
    fn single_element_roundtrip() {
        let mut pool = Pool::default();
        let mut q = IndexQueue::new();
        q.put(&mut pool, 5);
        q.remove(&mut pool, 5);
        assert!(q.is_empty());
        assert_eq!(q.tail, None);
        assert_eq!(q.head, None);
    }
}
