use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::CameraStream;

/// Proof of holding the camera, returned by [`CameraArbiter::activate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraLease(u64);

struct ActiveStream {
    lease: CameraLease,
    stream: Arc<dyn CameraStream>,
}

/// Tracks the single stream allowed to hold the camera.
///
/// The last caller to activate wins: the previous holder's stream is stopped
/// before the new one is recorded.
#[derive(Default)]
pub struct CameraArbiter {
    active: Mutex<Option<ActiveStream>>,
    next_lease: AtomicU64,
}

impl CameraArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    fn active(&self) -> MutexGuard<'_, Option<ActiveStream>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn activate(&self, stream: Arc<dyn CameraStream>) -> CameraLease {
        let lease = CameraLease(self.next_lease.fetch_add(1, Ordering::Relaxed) + 1);
        let previous = self.active().replace(ActiveStream { lease, stream });
        if let Some(previous) = previous {
            debug!(lease = previous.lease.0, "stopping previous camera holder");
            previous.stream.stop();
        }
        lease
    }

    /// Stops the stream if `lease` still holds the camera. Returns false when
    /// another holder has since taken over (its stream was stopped then).
    pub fn release(&self, lease: CameraLease) -> bool {
        let released = {
            let mut active = self.active();
            match active.as_ref() {
                Some(current) if current.lease == lease => active.take(),
                _ => None,
            }
        };
        match released {
            Some(current) => {
                current.stream.stop();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active().is_some()
    }

    pub fn holds(&self, lease: CameraLease) -> bool {
        self.active()
            .as_ref()
            .is_some_and(|current| current.lease == lease)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::CountingStream;

    #[test]
    fn last_acquirer_wins_and_stops_previous_holder() {
        let arbiter = CameraArbiter::new();
        let first = Arc::new(CountingStream::default());
        let second = Arc::new(CountingStream::default());

        let first_lease = arbiter.activate(first.clone());
        let second_lease = arbiter.activate(second.clone());

        assert_eq!(first.stops.load(Ordering::SeqCst), 1);
        assert_eq!(second.stops.load(Ordering::SeqCst), 0);
        assert!(arbiter.holds(second_lease));

        assert!(!arbiter.release(first_lease));
        assert_eq!(first.stops.load(Ordering::SeqCst), 1);

        assert!(arbiter.release(second_lease));
        assert_eq!(second.stops.load(Ordering::SeqCst), 1);
        assert!(!arbiter.is_active());
    }

    #[test]
    fn releasing_twice_stops_once() {
        let arbiter = CameraArbiter::new();
        let stream = Arc::new(CountingStream::default());
        let lease = arbiter.activate(stream.clone());

        assert!(arbiter.release(lease));
        assert!(!arbiter.release(lease));

        assert!(!arbiter.is_active());
        assert_eq!(stream.stops.load(Ordering::SeqCst), 1);
    }
}
