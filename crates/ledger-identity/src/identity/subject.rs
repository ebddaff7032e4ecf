//! Parsing of `key:value` subject claims as supplied on the command line.

use crate::error::{IdentityError, Result};

use super::record::SubjectInfo;

/// Parse a single `key:value` claim. The value may itself contain `:`.
pub fn parse_subject_claim(raw: &str) -> Result<(String, String)> {
    match raw.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(IdentityError::InvalidSubjectClaim(raw.to_string())),
    }
}

/// Parse a list of `key:value` claims. Later duplicates overwrite earlier ones.
pub fn parse_subject_claims<S: AsRef<str>>(raw: &[S]) -> Result<SubjectInfo> {
    let mut info = SubjectInfo::new();
    for claim in raw {
        let (key, value) = parse_subject_claim(claim.as_ref())?;
        info.insert(key, value);
    }
    Ok(info)
}
