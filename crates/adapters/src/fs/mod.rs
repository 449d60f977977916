mod clock;
mod outbox;

pub use clock::SystemClock;
pub use outbox::FsSubmissionOutbox;
