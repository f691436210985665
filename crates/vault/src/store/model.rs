//! Decrypted record view, partial-update payload, and input bounds.

use uuid::Uuid;

use super::StoreError;

/// Stable identifier of a record. Assigned at creation, never reused.
pub type RecordId = Uuid;

/// Inclusive bounds on `title` length, in characters.
pub const TITLE_MIN_CHARS: usize = 1;
pub const TITLE_MAX_CHARS: usize = 255;

/// Upper bound on `sensitive_text` length, in characters. Empty is allowed.
pub const SENSITIVE_TEXT_MAX_CHARS: usize = 2000;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A record as seen by its owner, with `sensitive_text` already decrypted.
///
/// Only ever handed to the principal identified by `owner_id`.
#[derive(Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub owner_id: String,
    pub title: String,
    pub sensitive_text: String,
    pub completed: bool,
    /// Unix epoch milliseconds, set once.
    pub created_at: i64,
    /// Unix epoch milliseconds, strictly increasing across mutations.
    pub updated_at: i64,
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("owner_id", &self.owner_id)
            .field("title", &self.title)
            .field("sensitive_text", &"[REDACTED]")
            .field("completed", &self.completed)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Partial update: `None` leaves the field untouched.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub sensitive_text: Option<String>,
    pub completed: Option<bool>,
}

impl std::fmt::Debug for RecordPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordPatch")
            .field("title", &self.title)
            .field(
                "sensitive_text",
                &self.sensitive_text.as_ref().map(|_| "[REDACTED]"),
            )
            .field("completed", &self.completed)
            .finish()
    }
}

/// Validated pagination window for `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: u32,
    offset: u32,
}

impl Page {
    /// Build a page from caller input, applying defaults for absent values.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if `limit` is outside
    /// `1..=MAX_PAGE_LIMIT` or `offset` is negative.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self, StoreError> {
        let limit = match limit {
            None => DEFAULT_PAGE_LIMIT,
            Some(value) if (1..=i64::from(MAX_PAGE_LIMIT)).contains(&value) => value as u32,
            Some(value) => {
                return Err(StoreError::Validation(format!(
                    "limit must be between 1 and {MAX_PAGE_LIMIT}, got {value}"
                )))
            }
        };
        let offset = match offset {
            None => 0,
            Some(value) => u32::try_from(value).map_err(|_| {
                StoreError::Validation(format!("offset must be a non-negative integer, got {value}"))
            })?,
        };
        Ok(Self { limit, offset })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

pub(crate) fn validate_title(title: &str) -> Result<(), StoreError> {
    let chars = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&chars) {
        return Err(StoreError::Validation(format!(
            "title must be {TITLE_MIN_CHARS}..={TITLE_MAX_CHARS} characters, got {chars}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_sensitive_text(text: &str) -> Result<(), StoreError> {
    let chars = text.chars().count();
    if chars > SENSITIVE_TEXT_MAX_CHARS {
        return Err(StoreError::Validation(format!(
            "sensitive_text must be at most {SENSITIVE_TEXT_MAX_CHARS} characters, got {chars}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults() {
        let page = Page::new(None, None).unwrap();
        assert_eq!(page.limit(), DEFAULT_PAGE_LIMIT);
        assert_eq!(page.offset(), 0);
        assert_eq!(page, Page::default());
    }

    #[test]
    fn page_rejects_out_of_range_limit() {
        assert!(matches!(Page::new(Some(0), None), Err(StoreError::Validation(_))));
        assert!(matches!(Page::new(Some(101), None), Err(StoreError::Validation(_))));
        assert!(Page::new(Some(1), None).is_ok());
        assert!(Page::new(Some(100), None).is_ok());
    }

    #[test]
    fn page_rejects_negative_offset() {
        assert!(matches!(Page::new(None, Some(-1)), Err(StoreError::Validation(_))));
    }

    #[test]
    fn title_bounds_are_in_characters() {
        assert!(validate_title("").is_err());
        assert!(validate_title(&"é".repeat(255)).is_ok());
        assert!(validate_title(&"a".repeat(256)).is_err());
    }

    #[test]
    fn sensitive_text_allows_empty_and_caps_length() {
        assert!(validate_sensitive_text("").is_ok());
        assert!(validate_sensitive_text(&"x".repeat(2000)).is_ok());
        assert!(validate_sensitive_text(&"x".repeat(2001)).is_err());
    }

    #[test]
    fn debug_output_redacts_sensitive_text() {
        let record = Record {
            id: Uuid::nil(),
            owner_id: "1".into(),
            title: "Buy milk".into(),
            sensitive_text: "2% organic".into(),
            completed: false,
            created_at: 1,
            updated_at: 1,
        };
        let rendered = format!("{record:?}");
        assert!(rendered.contains("Buy milk"));
        assert!(!rendered.contains("2% organic"));

        let patch = RecordPatch {
            sensitive_text: Some("oat milk".into()),
            ..RecordPatch::default()
        };
        assert!(!format!("{patch:?}").contains("oat milk"));
    }
}
