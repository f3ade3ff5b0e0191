//! Identifier grammar shared by teams, workflows, and runs.
//!
//! Ids double as filenames, so they are restricted to lowercase kebab case:
//! `^[a-z0-9][a-z0-9-]{0,N}$`. Workflow and team ids allow up to 63
//! characters; run ids allow 81 so timestamp-suffixed values fit.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ServerError;

/// Which id namespace a candidate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Team,
    Workflow,
    Run,
}

impl IdKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Workflow => "workflow",
            Self::Run => "run",
        }
    }

    /// Maximum length in characters, including the leading character.
    pub fn max_len(&self) -> usize {
        match self {
            Self::Team | Self::Workflow => 63,
            Self::Run => 81,
        }
    }

    fn pattern(&self) -> &'static Regex {
        static SHORT: OnceLock<Regex> = OnceLock::new();
        static LONG: OnceLock<Regex> = OnceLock::new();
        match self {
            Self::Team | Self::Workflow => SHORT.get_or_init(|| {
                Regex::new(r"^[a-z0-9][a-z0-9-]{0,62}$").expect("static id pattern")
            }),
            Self::Run => LONG.get_or_init(|| {
                Regex::new(r"^[a-z0-9][a-z0-9-]{0,80}$").expect("static id pattern")
            }),
        }
    }
}

/// Trim and check `raw` against the grammar for `kind`.
///
/// Pure: no filesystem access happens here, so stores can reject a bad id
/// before touching disk.
pub fn validate_id(kind: IdKind, raw: &str) -> Result<String, ServerError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ServerError::InvalidId(format!("{} id is required", kind.as_str())));
    }
    if !kind.pattern().is_match(id) {
        return Err(ServerError::InvalidId(format!(
            "invalid {} id '{}': must match [a-z0-9][a-z0-9-]* and be at most {} chars",
            kind.as_str(),
            id,
            kind.max_len()
        )));
    }
    Ok(id.to_string())
}

pub fn validate_team_id(raw: &str) -> Result<String, ServerError> {
    validate_id(IdKind::Team, raw)
}

pub fn validate_workflow_id(raw: &str) -> Result<String, ServerError> {
    validate_id(IdKind::Workflow, raw)
}

pub fn validate_run_id(raw: &str) -> Result<String, ServerError> {
    validate_id(IdKind::Run, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_ids_pass_through_unchanged() {
        for id in ["demo", "a", "0", "marketing-cadence-v1", "x-1-2-3"] {
            assert_eq!(validate_workflow_id(id).unwrap(), id);
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        assert_eq!(validate_workflow_id("  demo \n").unwrap(), "demo");
    }

    #[test]
    fn test_rejects_malformed_ids() {
        for id in ["", "   ", "Demo", "my_flow", "my flow", "-leading", "a/b", "../x", "dé"] {
            let err = validate_workflow_id(id).unwrap_err();
            assert!(matches!(err, ServerError::InvalidId(_)), "{id:?} should be rejected");
        }
    }

    #[test]
    fn test_length_limits_differ_by_kind() {
        let at_limit = "a".repeat(63);
        let over_limit = "a".repeat(64);
        assert!(validate_workflow_id(&at_limit).is_ok());
        assert!(validate_workflow_id(&over_limit).is_err());
        assert!(validate_team_id(&over_limit).is_err());

        assert!(validate_run_id(&over_limit).is_ok());
        assert!(validate_run_id(&"7".repeat(81)).is_ok());
        assert!(validate_run_id(&"7".repeat(82)).is_err());
    }
}
