use crate::format::{StreamTag, Timestamp};
use lockfree_object_pool::{LinearObjectPool, LinearOwnedReusable};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

/// Buffer is a mutable byte line + a reference to owning buffer pool.
pub type Buffer = LinearOwnedReusable<Vec<u8>>;

/// Thread-safe pool of line buffers.
pub struct BufferPool {
    obj_pool: Arc<LinearObjectPool<Vec<u8>>>,
}

impl BufferPool {
    pub fn new() -> Self {
        BufferPool {
            obj_pool: Arc::new(LinearObjectPool::new(
                || Vec::new(),
                |v| {
                    v.clear();
                },
            )),
        }
    }

    /// Allocate empty buffer.
    /// Returned buffer has zero length (but typically non-zero capacity).
    /// When dropped, the buffer is automatically returned to the pool.
    pub fn alloc(&self) -> Buffer {
        self.obj_pool.pull_owned()
    }
}

/// One observed line: origin stream, arrival timestamp, raw bytes
/// (trailing newline included when the child produced one).
pub struct Record {
    pub stream: StreamTag,
    pub stamp: Timestamp,
    pub line: Buffer,
}

/// Thread-safe lossless FIFO queue of records.
///
/// Unlike a bounded mirror queue, nothing here may ever be dropped:
/// every record pushed by a reader is handed to exactly one pop().
/// The queue tracks how many producers are still alive; pop() returns
/// None only when the queue is empty and all producers are done.
pub struct RecordQueue {
    state: Mutex<QueueState>, // protected state
    cond: Condvar,
}

struct QueueState {
    records: VecDeque<Record>,
    producers: usize,
}

impl RecordQueue {
    /// Construct queue with the given number of producers.
    pub fn new(producers: usize) -> Self {
        RecordQueue {
            state: Mutex::new(QueueState {
                records: VecDeque::new(),
                producers,
            }),
            cond: Condvar::new(),
        }
    }

    /// Pop record from queue.
    /// Blocks until a record is available, or the queue is empty and
    /// every producer has reported done (returns None).
    pub fn pop(&self) -> Option<Record> {
        let mut locked_state = self.state.lock().unwrap();

        loop {
            match locked_state.records.pop_front() {
                Some(rec) => return Some(rec),
                None => {
                    if locked_state.producers == 0 {
                        // Queue empty and no producer left.
                        return None;
                    }
                    // Queue empty, but a producer may still push.
                    locked_state = self.cond.wait(locked_state).unwrap();
                }
            };
        }
    }

    /// Push record to queue.
    /// Wakes up blocked pops.
    pub fn push(&self, rec: Record) {
        let mut locked_state = self.state.lock().unwrap();

        locked_state.records.push_back(rec);
        self.cond.notify_all();
    }

    /// Report that one producer has finished (its stream hit EOF).
    pub fn producer_done(&self) {
        let mut locked_state = self.state.lock().unwrap();

        assert!(locked_state.producers > 0);
        locked_state.producers -= 1;

        self.cond.notify_all();
    }
}
