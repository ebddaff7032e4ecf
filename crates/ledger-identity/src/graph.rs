//! Identity graph rules: uniqueness and the controlled-by relation.
//!
//! Only one hop of the control chain is checked: the controller must exist
//! at creation time. Whether the controller's own chain reaches a
//! self-controlled root is not examined.

use crate::error::{IdentityError, Result};

/// Outcome of checking whether an identity may be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphCheck {
    Creatable,
    AlreadyExists,
    ControllerNotFound,
}

impl GraphCheck {
    /// Convert into the registry error taxonomy.
    pub fn into_result(self, id: &str, controlled_by: &str) -> Result<()> {
        match self {
            Self::Creatable => Ok(()),
            Self::AlreadyExists => Err(IdentityError::AlreadyExists(id.to_string())),
            Self::ControllerNotFound => Err(IdentityError::ControllerNotFound {
                id: id.to_string(),
                controller: controlled_by.to_string(),
            }),
        }
    }
}

/// Check that `id` is free and that `controlled_by` (if not `id`) exists.
///
/// `exists` is a point-in-time lookup; only storage failures are errors.
pub fn check_creatable<F>(id: &str, controlled_by: &str, mut exists: F) -> Result<GraphCheck>
where
    F: FnMut(&str) -> Result<bool>,
{
    if exists(id)? {
        return Ok(GraphCheck::AlreadyExists);
    }
    if id != controlled_by && !exists(controlled_by)? {
        return Ok(GraphCheck::ControllerNotFound);
    }
    Ok(GraphCheck::Creatable)
}
