//! Enum membership and field validation for the content hierarchy.
//!
//! Status and type columns are stored as plain text guarded by CHECK
//! constraints; these functions reject bad values before they reach the
//! database so the API can answer 400 with a useful message.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Episode status
// ---------------------------------------------------------------------------

pub const EPISODE_STATUS_DRAFT: &str = "draft";
pub const EPISODE_STATUS_IN_PROGRESS: &str = "in_progress";
pub const EPISODE_STATUS_COMPLETE: &str = "complete";

const VALID_EPISODE_STATUSES: &[&str] = &[
    EPISODE_STATUS_DRAFT,
    EPISODE_STATUS_IN_PROGRESS,
    EPISODE_STATUS_COMPLETE,
];

// ---------------------------------------------------------------------------
// Character role
// ---------------------------------------------------------------------------

const VALID_CHARACTER_ROLES: &[&str] = &["protagonist", "antagonist", "supporting", "minor"];

// ---------------------------------------------------------------------------
// Setting type / time of day
// ---------------------------------------------------------------------------

const VALID_SETTING_TYPES: &[&str] = &["interior", "exterior", "mixed"];

const VALID_TIMES_OF_DAY: &[&str] = &["dawn", "day", "dusk", "night", "unspecified"];

// ---------------------------------------------------------------------------
// Relationship type
// ---------------------------------------------------------------------------

const VALID_RELATIONSHIP_TYPES: &[&str] = &[
    "family",
    "romantic",
    "friendship",
    "rivalry",
    "mentorship",
    "professional",
    "antagonistic",
    "other",
];

// ---------------------------------------------------------------------------
// Segment status
// ---------------------------------------------------------------------------

pub const SEGMENT_STATUS_DRAFT: &str = "draft";
pub const SEGMENT_STATUS_PROMPT_READY: &str = "prompt_ready";
pub const SEGMENT_STATUS_GENERATING: &str = "generating";
pub const SEGMENT_STATUS_COMPLETE: &str = "complete";
pub const SEGMENT_STATUS_FAILED: &str = "failed";

const VALID_SEGMENT_STATUSES: &[&str] = &[
    SEGMENT_STATUS_DRAFT,
    SEGMENT_STATUS_PROMPT_READY,
    SEGMENT_STATUS_GENERATING,
    SEGMENT_STATUS_COMPLETE,
    SEGMENT_STATUS_FAILED,
];

// ---------------------------------------------------------------------------
// Video status
// ---------------------------------------------------------------------------

pub const VIDEO_STATUS_QUEUED: &str = "queued";
pub const VIDEO_STATUS_PROCESSING: &str = "processing";
pub const VIDEO_STATUS_COMPLETE: &str = "complete";
pub const VIDEO_STATUS_FAILED: &str = "failed";

const VALID_VIDEO_STATUSES: &[&str] = &[
    VIDEO_STATUS_QUEUED,
    VIDEO_STATUS_PROCESSING,
    VIDEO_STATUS_COMPLETE,
    VIDEO_STATUS_FAILED,
];

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum length of a series or episode title.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum length of a character or setting name.
pub const MAX_NAME_LEN: usize = 120;

/// Minimum segment duration in seconds.
pub const MIN_SEGMENT_DURATION_SECS: f64 = 1.0;

/// Maximum segment duration in seconds.
pub const MAX_SEGMENT_DURATION_SECS: f64 = 600.0;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
});

static ASPECT_RATIO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-9][0-9]{0,2}(\.[0-9]{1,2})?:[1-9][0-9]{0,2}$")
        .expect("aspect ratio regex is valid")
});

// ---------------------------------------------------------------------------
// Enum validation
// ---------------------------------------------------------------------------

fn validate_member(field: &str, value: &str, valid: &[&str]) -> Result<(), CoreError> {
    if valid.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid {field} '{value}'. Must be one of: {}",
            valid.join(", ")
        )))
    }
}

pub fn validate_episode_status(status: &str) -> Result<(), CoreError> {
    validate_member("episode status", status, VALID_EPISODE_STATUSES)
}

pub fn validate_character_role(role: &str) -> Result<(), CoreError> {
    validate_member("character role", role, VALID_CHARACTER_ROLES)
}

pub fn validate_setting_type(setting_type: &str) -> Result<(), CoreError> {
    validate_member("setting type", setting_type, VALID_SETTING_TYPES)
}

pub fn validate_time_of_day(time_of_day: &str) -> Result<(), CoreError> {
    validate_member("time of day", time_of_day, VALID_TIMES_OF_DAY)
}

pub fn validate_relationship_type(relationship_type: &str) -> Result<(), CoreError> {
    validate_member(
        "relationship type",
        relationship_type,
        VALID_RELATIONSHIP_TYPES,
    )
}

pub fn validate_segment_status(status: &str) -> Result<(), CoreError> {
    validate_member("segment status", status, VALID_SEGMENT_STATUSES)
}

pub fn validate_video_status(status: &str) -> Result<(), CoreError> {
    validate_member("video status", status, VALID_VIDEO_STATUSES)
}

/// Whether a segment may move from `from` to `to`.
///
/// The forward path is `draft -> prompt_ready -> generating -> complete|failed`.
/// Any status may be reset to `draft`; a failed segment may also go back to
/// `prompt_ready` for a retry. Staying in the same status is always allowed.
pub fn can_transition_segment(from: &str, to: &str) -> bool {
    if from == to || to == SEGMENT_STATUS_DRAFT {
        return true;
    }
    matches!(
        (from, to),
        (SEGMENT_STATUS_DRAFT, SEGMENT_STATUS_PROMPT_READY)
            | (SEGMENT_STATUS_PROMPT_READY, SEGMENT_STATUS_GENERATING)
            | (SEGMENT_STATUS_GENERATING, SEGMENT_STATUS_COMPLETE)
            | (SEGMENT_STATUS_GENERATING, SEGMENT_STATUS_FAILED)
            | (SEGMENT_STATUS_FAILED, SEGMENT_STATUS_PROMPT_READY)
    )
}

/// Every segment status that may move to `to`.
pub fn segment_statuses_reaching(to: &str) -> Vec<&'static str> {
    VALID_SEGMENT_STATUSES
        .iter()
        .copied()
        .filter(|from| can_transition_segment(from, to))
        .collect()
}

/// Validate a segment status change, returning a 400-style error on an
/// illegal transition.
pub fn validate_segment_transition(from: &str, to: &str) -> Result<(), CoreError> {
    validate_segment_status(to)?;
    if can_transition_segment(from, to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Segment cannot move from '{from}' to '{to}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Require a non-blank string no longer than `max_len` characters.
pub fn validate_required_text(field: &str, value: &str, max_len: usize) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_len {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if EMAIL_RE.is_match(email.trim()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )))
    }
}

/// Segment durations must be finite and within
/// [`MIN_SEGMENT_DURATION_SECS`]..=[`MAX_SEGMENT_DURATION_SECS`].
pub fn validate_duration_secs(duration: f64) -> Result<(), CoreError> {
    if !duration.is_finite() {
        return Err(CoreError::Validation(
            "duration_secs must be a finite number".to_string(),
        ));
    }
    if !(MIN_SEGMENT_DURATION_SECS..=MAX_SEGMENT_DURATION_SECS).contains(&duration) {
        return Err(CoreError::Validation(format!(
            "duration_secs must be between {MIN_SEGMENT_DURATION_SECS} and \
             {MAX_SEGMENT_DURATION_SECS}, got {duration}"
        )));
    }
    Ok(())
}

/// Aspect ratios are written `W:H`, e.g. `16:9` or `2.39:1`.
pub fn validate_aspect_ratio(ratio: &str) -> Result<(), CoreError> {
    if ASPECT_RATIO_RE.is_match(ratio) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid aspect ratio '{ratio}'. Expected W:H, e.g. 16:9"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- enums ---------------------------------------------------------------

    #[test]
    fn accepts_known_enum_values() {
        assert!(validate_episode_status("in_progress").is_ok());
        assert!(validate_character_role("antagonist").is_ok());
        assert!(validate_setting_type("exterior").is_ok());
        assert!(validate_time_of_day("dusk").is_ok());
        assert!(validate_relationship_type("mentorship").is_ok());
        assert!(validate_segment_status("prompt_ready").is_ok());
        assert!(validate_video_status("processing").is_ok());
    }

    #[test]
    fn rejects_unknown_enum_values() {
        assert!(validate_episode_status("published").is_err());
        assert!(validate_character_role("hero").is_err());
        assert!(validate_setting_type("space").is_err());
        assert!(validate_time_of_day("noon").is_err());
        assert!(validate_relationship_type("enemies").is_err());
        assert!(validate_segment_status("done").is_err());
        assert!(validate_video_status("ready").is_err());
    }

    #[test]
    fn enum_values_are_case_sensitive() {
        assert!(validate_character_role("Protagonist").is_err());
    }

    #[test]
    fn enum_error_lists_valid_values() {
        let err = validate_setting_type("orbit").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("interior, exterior, mixed"), "got: {msg}");
    }

    // -- segment transitions -------------------------------------------------

    #[test]
    fn forward_segment_transitions_allowed() {
        assert!(can_transition_segment("draft", "prompt_ready"));
        assert!(can_transition_segment("prompt_ready", "generating"));
        assert!(can_transition_segment("generating", "complete"));
        assert!(can_transition_segment("generating", "failed"));
    }

    #[test]
    fn failed_segment_can_retry() {
        assert!(can_transition_segment("failed", "prompt_ready"));
    }

    #[test]
    fn any_segment_can_reset_to_draft() {
        assert!(can_transition_segment("complete", "draft"));
        assert!(can_transition_segment("generating", "draft"));
    }

    #[test]
    fn skipping_segment_stages_rejected() {
        assert!(!can_transition_segment("draft", "complete"));
        assert!(!can_transition_segment("draft", "generating"));
        assert!(!can_transition_segment("complete", "generating"));
    }

    #[test]
    fn statuses_that_reach_prompt_ready() {
        assert_eq!(
            segment_statuses_reaching(SEGMENT_STATUS_PROMPT_READY),
            ["draft", "prompt_ready", "failed"]
        );
    }

    #[test]
    fn transition_to_unknown_status_is_validation_error() {
        assert!(validate_segment_transition("draft", "bogus").is_err());
    }

    // -- text ----------------------------------------------------------------

    #[test]
    fn required_text_rejects_blank() {
        assert!(validate_required_text("title", "   ", MAX_TITLE_LEN).is_err());
    }

    #[test]
    fn required_text_rejects_too_long() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text("name", &long, MAX_NAME_LEN).is_err());
    }

    #[test]
    fn required_text_counts_chars_not_bytes() {
        let name = "é".repeat(MAX_NAME_LEN);
        assert!(validate_required_text("name", &name, MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("writer@scenra.studio").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("space in@example.com").is_err());
    }

    // -- duration ------------------------------------------------------------

    #[test]
    fn duration_bounds() {
        assert!(validate_duration_secs(MIN_SEGMENT_DURATION_SECS).is_ok());
        assert!(validate_duration_secs(MAX_SEGMENT_DURATION_SECS).is_ok());
        assert!(validate_duration_secs(0.5).is_err());
        assert!(validate_duration_secs(601.0).is_err());
        assert!(validate_duration_secs(f64::NAN).is_err());
    }

    // -- aspect ratio --------------------------------------------------------

    #[test]
    fn aspect_ratio_formats() {
        assert!(validate_aspect_ratio("16:9").is_ok());
        assert!(validate_aspect_ratio("2.39:1").is_ok());
        assert!(validate_aspect_ratio("9:16").is_ok());
        assert!(validate_aspect_ratio("16x9").is_err());
        assert!(validate_aspect_ratio("0:9").is_err());
        assert!(validate_aspect_ratio("").is_err());
    }
}
