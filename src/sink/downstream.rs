use crate::Sequence;
use crossbeam_channel::Sender;

/// Receiver of ordered results.
///
/// `accept` runs inside the ordered sink's critical section on whichever
/// worker completed the flush, so it must not block for long.
pub trait Sink<T> {
    fn accept(&mut self, sequence: Sequence, item: T);
}

impl<T, F> Sink<T> for F
where
    F: FnMut(Sequence, T),
{
    fn accept(&mut self, sequence: Sequence, item: T) {
        self(sequence, item)
    }
}

impl<T> Sink<T> for Vec<T> {
    fn accept(&mut self, _sequence: Sequence, item: T) {
        self.push(item);
    }
}

impl<T> Sink<T> for Sender<(Sequence, T)> {
    fn accept(&mut self, sequence: Sequence, item: T) {
        if self.send((sequence, item)).is_err() {
            tracing::debug!(sequence, "downstream receiver dropped, discarding result");
        }
    }
}
