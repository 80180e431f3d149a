use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;

/// Returned by [`BlockingWorkQueue::push`] when the queue is already closed.
/// Carries the rejected item back to the caller.
#[derive(thiserror::Error, PartialEq, Eq)]
#[error("push on a closed work queue")]
pub struct PushError<T>(pub T);

impl<T> PushError<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PushError(..)")
    }
}

struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// FIFO queue with blocking pop and a one-way close signal.
pub struct BlockingWorkQueue<T> {
    state: Mutex<State<T>>,
    // signalled on "non-empty OR closed"
    available: Condvar,
}

impl<T> BlockingWorkQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                items: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Append `item` and wake one blocked consumer.
    ///
    /// Pushing after [`close`](Self::close) is a caller bug; the item is
    /// returned inside the error instead of being dropped.
    pub fn push(&self, item: T) -> Result<(), PushError<T>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PushError(item));
        }
        state.items.push_back(item);
        drop(state);

        self.available.notify_one();
        Ok(())
    }

    /// Block until an item is available or the queue is closed and empty.
    ///
    /// Items pushed before `close` are still handed out in FIFO order.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    /// Close the queue and wake every blocked consumer. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        drop(state);

        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }
}

impl<T> Default for BlockingWorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BlockingWorkQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BlockingWorkQueue")
            .field("len", &state.items.len())
            .field("closed", &state.closed)
            .finish()
    }
}
