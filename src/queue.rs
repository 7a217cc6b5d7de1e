use crate::error::{PipelineError, Result};
use crate::latch::Latch;
use parking_lot::Mutex;

/// Ring state guarded by the queue mutex. `count` is the authoritative
/// population; exactly `count` slots starting at `head` (mod capacity)
/// hold strings.
struct Ring {
    slots: Box<[Option<String>]>,
    head: usize,
    tail: usize,
    count: usize,
}

impl Ring {
    fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// A bounded FIFO handoff queue of owned strings.
///
/// One producer thread blocks in [`put`](HandoffQueue::put) while the queue
/// is full; one consumer thread blocks in [`get`](HandoffQueue::get) while
/// it is empty. Coordination runs through three latches: `not_full`
/// (signaled while there is room), `not_empty` (signaled while there are
/// items), and `finished` (latched once no more input will ever arrive).
/// After `finished` is signaled, `get` drains the remaining items and then
/// returns `None` as the end-of-stream marker.
///
/// Each enqueued string is owned by the queue until dequeued; the caller of
/// `get` receives exclusive ownership. Undelivered strings are freed when
/// the queue drops.
pub struct HandoffQueue {
    ring: Mutex<Ring>,
    not_full: Latch,
    not_empty: Latch,
    finished: Latch,
}

impl HandoffQueue {
    /// Create an empty queue holding at most `capacity` items.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PipelineError::InvalidCapacity);
        }
        let slots = (0..capacity).map(|_| None).collect::<Vec<_>>();
        Ok(Self {
            ring: Mutex::new(Ring {
                slots: slots.into_boxed_slice(),
                head: 0,
                tail: 0,
                count: 0,
            }),
            not_full: Latch::signaled(),
            not_empty: Latch::new(),
            finished: Latch::new(),
        })
    }

    /// Enqueue an item, blocking while the queue is full.
    ///
    /// The room check is repeated under the ring mutex after every wakeup:
    /// another producer may have taken the last slot between the latch wait
    /// returning and the mutex being acquired, in which case the wait
    /// restarts.
    pub fn put(&self, item: String) {
        let mut item = Some(item);
        loop {
            self.not_full.wait();

            let mut ring = self.ring.lock();
            if ring.count == ring.capacity() {
                // Lost the race for the last slot; park again.
                self.not_full.reset();
                continue;
            }

            let tail = ring.tail;
            ring.slots[tail] = item.take();
            ring.tail = (tail + 1) % ring.capacity();
            ring.count += 1;

            if ring.count < ring.capacity() {
                self.not_full.signal();
            } else {
                self.not_full.reset();
            }
            self.not_empty.signal();
            return;
        }
    }

    /// Dequeue the oldest item, blocking while the queue is empty.
    ///
    /// Returns `None` once the queue is both empty and finished. Spurious
    /// wakeups and the broadcast from [`signal_finished`] are handled by
    /// re-evaluating the empty-and-finished predicate after every wake.
    ///
    /// [`signal_finished`]: HandoffQueue::signal_finished
    pub fn get(&self) -> Option<String> {
        loop {
            if self.finished.is_signaled() && self.ring.lock().count == 0 {
                return None;
            }

            self.not_empty.wait();

            let mut ring = self.ring.lock();
            if ring.count > 0 {
                let head = ring.head;
                let item = ring.slots[head].take();
                ring.head = (head + 1) % ring.capacity();
                ring.count -= 1;

                if ring.count > 0 {
                    self.not_empty.signal();
                } else {
                    self.not_empty.reset();
                }
                self.not_full.signal();
                return item;
            }
            drop(ring);

            if self.finished.is_signaled() {
                return None;
            }
        }
    }

    /// Latch the finished condition and wake every blocked consumer so each
    /// re-evaluates the empty-and-finished predicate. Idempotent.
    pub fn signal_finished(&self) {
        self.finished.signal();
        self.not_empty.signal_all();
    }

    /// Block until the finished condition has been latched.
    pub fn wait_finished(&self) {
        self.finished.wait();
    }

    /// Whether the finished condition has been latched.
    pub fn is_finished(&self) -> bool {
        self.finished.is_signaled()
    }

    /// Current number of items in the queue.
    pub fn len(&self) -> usize {
        self.ring.lock().count
    }

    /// Whether the queue currently holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of items the queue can hold.
    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }
}
