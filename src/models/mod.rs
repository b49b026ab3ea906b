mod submission;

pub use submission::{Record, SYSTEM_KEYS, Submission, SubmissionIndex};
