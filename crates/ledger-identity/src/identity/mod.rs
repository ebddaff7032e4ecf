//! Identity records: the persisted value and its builders.

pub mod builder;
pub mod record;
pub mod subject;

pub use builder::{build_root, build_verified};
pub use record::{Credential, Identity, Status, SubjectInfo};
pub use subject::{parse_subject_claim, parse_subject_claims};
