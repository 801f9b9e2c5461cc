//! The admin edit form.
//!
//! [`AdminForm`] edits a private copy of the content. Nothing reaches the
//! presented content until [`AdminForm::save`], which commits the copy
//! locally whether or not the store write succeeds.
//!
//! Fields are addressed by dotted paths rooted at a section key:
//!
//! ```text
//! about
//! whoami.handle
//! skills.2.level
//! projects.0.hasDemo
//! certs.1.verifyUrl
//! contact.email
//! apiKeys.otx
//! ```
//!
//! Values arrive as text and are coerced to the type the field already has.

use std::time::{Duration, Instant};

use chrono::{Datelike, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::content::{Cert, ContentDocument, ListSection, Project, Section, Skill};
use crate::error::{Error, Result};
use crate::presentation::{PresentationState, StatusKind};
use crate::store::ContentStore;

/// Status text after a successful save.
pub const SAVED_TEXT: &str = "Saved successfully!";

/// Status text after a failed save.
pub const SAVE_FAILED_TEXT: &str = "Failed to save to the store, changes kept locally";

/// How long the form stays open after a successful save.
pub const CLOSE_AFTER_SAVE: Duration = Duration::from_millis(1000);

/// Project fields that may be absent from the serialized document.
const OPTIONAL_FIELDS: &[&str] = &["demoType"];

/// Outcome of [`AdminForm::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    /// Whether the store write succeeded.
    pub persisted: bool,
    /// Message shown to the user.
    pub message: &'static str,
    /// Close the form after this long, if at all.
    pub close_after: Option<Duration>,
}

/// Draft editor over a copy of the content.
#[derive(Debug, Clone)]
pub struct AdminForm {
    draft: ContentDocument,
    dirty: bool,
}

impl AdminForm {
    /// Start editing a copy of `content`.
    #[must_use]
    pub fn new(content: &ContentDocument) -> Self {
        Self {
            draft: content.clone(),
            dirty: false,
        }
    }

    /// The draft as edited so far.
    #[must_use]
    pub fn draft(&self) -> &ContentDocument {
        &self.draft
    }

    /// Whether the draft differs from what the form was opened with.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Set one field from text.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not resolve, a list index is past
    /// the end, or the text does not fit the field's type. The draft is left
    /// untouched on error.
    pub fn set_field(&mut self, path: &str, raw: &str) -> Result<()> {
        let mut segments = path.split('.');
        let section: Section = segments.next().unwrap_or_default().parse()?;
        let rest: Vec<&str> = segments.collect();
        if rest.iter().any(|segment| segment.is_empty()) {
            return Err(unknown_field(path));
        }

        if section == Section::Contact {
            return match rest.as_slice() {
                [channel] => self.set_contact(channel, raw),
                _ => Err(unknown_field(path)),
            };
        }

        let mut root = serde_json::to_value(&self.draft)?;
        let node = root
            .get_mut(section.key())
            .ok_or_else(|| unknown_field(path))?;
        let slot = locate(node, section, &rest, path)?;
        let cleared = raw.is_empty() && rest.last().is_some_and(|field| is_optional(field));
        let value = if cleared {
            Value::Null
        } else {
            coerce(slot, raw, path)?
        };
        *slot = value;

        let mut draft: ContentDocument = serde_json::from_value(root)
            .map_err(|e| Error::invalid_value(path, e.to_string()))?;
        draft.normalize();
        debug!(path, "Field updated");
        self.draft = draft;
        self.dirty = true;
        Ok(())
    }

    /// Add or overwrite a contact channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the channel name is blank.
    pub fn set_contact(&mut self, channel: &str, value: &str) -> Result<()> {
        let channel = channel.trim();
        if channel.is_empty() {
            return Err(Error::invalid_value("contact", "channel name is empty"));
        }
        self.draft
            .contact
            .insert(channel.to_string(), value.to_string());
        self.dirty = true;
        Ok(())
    }

    /// Remove a contact channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the channel does not exist.
    pub fn remove_contact(&mut self, channel: &str) -> Result<()> {
        self.draft
            .contact
            .remove(channel.trim())
            .ok_or_else(|| unknown_field(&format!("contact.{}", channel.trim())))?;
        self.dirty = true;
        Ok(())
    }

    /// Append the default record for `section`. Returns its index.
    pub fn add_item(&mut self, section: ListSection) -> usize {
        match section {
            ListSection::Skills => self.draft.skills.push(Skill::new("New Skill", 50)),
            ListSection::SoftSkills => self.draft.soft_skills.push(Skill::new("New Skill", 50)),
            ListSection::Projects => self.draft.projects.push(Project {
                name: "New Project".to_string(),
                description: "Description".to_string(),
                year: Utc::now().year().to_string(),
                has_demo: false,
                demo_type: None,
            }),
            ListSection::Certs => self.draft.certs.push(Cert {
                name: "New Cert".to_string(),
                issuer: "Issuer".to_string(),
                logo: String::new(),
                image_url: String::new(),
                verify_url: String::new(),
            }),
        }
        self.dirty = true;
        self.draft.list_len(section) - 1
    }

    /// Remove the record at `index`; later records shift down.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if there is no such record.
    pub fn remove_item(&mut self, section: ListSection, index: usize) -> Result<()> {
        let len = self.draft.list_len(section);
        if index >= len {
            return Err(Error::IndexOutOfRange {
                section: section.key(),
                index,
                len,
            });
        }
        match section {
            ListSection::Skills => {
                self.draft.skills.remove(index);
            }
            ListSection::SoftSkills => {
                self.draft.soft_skills.remove(index);
            }
            ListSection::Projects => {
                self.draft.projects.remove(index);
            }
            ListSection::Certs => {
                self.draft.certs.remove(index);
            }
        }
        self.dirty = true;
        Ok(())
    }

    /// Commit the draft to `state` and persist it.
    ///
    /// The draft becomes the presented content even when the store write
    /// fails. The outcome is also posted as a status message.
    pub async fn save(
        &mut self,
        store: &ContentStore,
        state: &mut PresentationState,
        now: Instant,
    ) -> SaveReport {
        state.set_status(StatusKind::Pending, "Saving...", now);
        let persisted = store.save(&self.draft).await;
        state.set_content(self.draft.clone());
        self.dirty = false;

        let report = if persisted {
            info!("Admin changes saved");
            SaveReport {
                persisted,
                message: SAVED_TEXT,
                close_after: Some(CLOSE_AFTER_SAVE),
            }
        } else {
            warn!("Admin changes kept locally only");
            SaveReport {
                persisted,
                message: SAVE_FAILED_TEXT,
                close_after: None,
            }
        };

        let kind = if persisted {
            StatusKind::Success
        } else {
            StatusKind::Failure
        };
        state.set_status(kind, report.message, now);
        report
    }
}

/// Walk `rest` down from a section value.
fn locate<'a>(
    mut node: &'a mut Value,
    section: Section,
    rest: &[&str],
    path: &str,
) -> Result<&'a mut Value> {
    for segment in rest {
        node = match node {
            Value::Array(items) => {
                let index: usize = segment.parse().map_err(|_| {
                    Error::invalid_value(path, format!("\"{segment}\" is not a list index"))
                })?;
                let len = items.len();
                items.get_mut(index).ok_or(Error::IndexOutOfRange {
                    section: section.key(),
                    index,
                    len,
                })?
            }
            Value::Object(fields) => {
                let existing = fields
                    .keys()
                    .find(|key| key.eq_ignore_ascii_case(segment))
                    .cloned();
                let optional = OPTIONAL_FIELDS
                    .iter()
                    .filter(|_| section == Section::Projects)
                    .find(|field| is_optional_match(field, segment))
                    .map(ToString::to_string);
                let key = existing.or(optional).ok_or_else(|| unknown_field(path))?;
                fields.entry(key).or_insert(Value::Null)
            }
            _ => return Err(unknown_field(path)),
        };
    }
    Ok(node)
}

/// Convert `raw` to the JSON type `current` already has.
fn coerce(current: &Value, raw: &str, path: &str) -> Result<Value> {
    match current {
        Value::String(_) => Ok(Value::String(raw.to_string())),
        Value::Bool(_) => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| Error::invalid_value(path, "expected true or false")),
        Value::Number(_) => raw
            .trim()
            .parse::<u64>()
            .map(Value::from)
            .map_err(|_| Error::invalid_value(path, "expected a whole number")),
        Value::Null if raw.is_empty() => Ok(Value::Null),
        Value::Null => Ok(Value::String(raw.to_string())),
        Value::Array(_) | Value::Object(_) => Err(Error::invalid_value(
            path,
            "not a single field, address one of its fields",
        )),
    }
}

fn is_optional(segment: &str) -> bool {
    OPTIONAL_FIELDS
        .iter()
        .any(|field| is_optional_match(field, segment))
}

fn is_optional_match(field: &str, segment: &str) -> bool {
    field.eq_ignore_ascii_case(segment)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn unknown_field(path: &str) -> Error {
    Error::UnknownField {
        path: path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::content::initial_content;
    use crate::store::tests::failing_store;

    fn form() -> AdminForm {
        AdminForm::new(&initial_content())
    }

    fn state() -> PresentationState {
        PresentationState::new(initial_content(), Theme::Dark, Duration::from_millis(3000))
    }

    #[test]
    fn test_draft_is_a_copy() {
        let content = initial_content();
        let mut form = AdminForm::new(&content);
        form.set_field("about", "Edited").unwrap();

        assert_eq!(form.draft().about, "Edited");
        assert_eq!(content.about, initial_content().about);
        assert!(form.is_dirty());
    }

    #[test]
    fn test_set_nested_fields() {
        let mut form = form();
        form.set_field("whoami.handle", "@new").unwrap();
        form.set_field("apiKeys.otx", "abc123").unwrap();
        form.set_field("certs.1.verifyUrl", "https://verify.example/1").unwrap();

        let draft = form.draft();
        assert_eq!(draft.whoami.handle, "@new");
        assert_eq!(draft.api_keys.otx, "abc123");
        assert_eq!(draft.certs[1].verify_url, "https://verify.example/1");
    }

    #[test]
    fn test_paths_ignore_case() {
        let mut form = form();
        form.set_field("ApiKeys.OTX", "k").unwrap();
        assert_eq!(form.draft().api_keys.otx, "k");
    }

    #[test]
    fn test_coerces_to_existing_type() {
        let mut form = form();
        form.set_field("skills.0.level", "42").unwrap();
        form.set_field("projects.0.hasDemo", "no").unwrap();

        assert_eq!(form.draft().skills[0].level, 42);
        assert!(!form.draft().projects[0].has_demo);
    }

    #[test]
    fn test_levels_are_clamped() {
        let mut form = form();
        form.set_field("softSkills.0.level", "180").unwrap();
        assert_eq!(form.draft().soft_skills[0].level, 100);
        form.set_field("skills.0.level", "300").unwrap();
        assert_eq!(form.draft().skills[0].level, 100);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let mut form = form();
        let before = form.draft().clone();

        let err = form.set_field("skills.0.level", "high").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
        let err = form.set_field("projects.0.hasDemo", "maybe").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
        let err = form.set_field("whoami", "flat").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));

        assert_eq!(form.draft(), &before);
        assert!(!form.is_dirty());
    }

    #[test]
    fn test_out_of_range_index() {
        let mut form = form();
        let len = form.draft().projects.len();
        let err = form
            .set_field(&format!("projects.{len}.name"), "x")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::IndexOutOfRange { section: "projects", index, len: l } if index == len && l == len
        ));
    }

    #[test]
    fn test_unknown_paths() {
        let mut form = form();
        assert!(matches!(
            form.set_field("secrets", "x").unwrap_err(),
            Error::UnknownSection { .. }
        ));
        assert!(matches!(
            form.set_field("whoami.shoeSize", "x").unwrap_err(),
            Error::UnknownField { .. }
        ));
        assert!(matches!(
            form.set_field("about.x", "x").unwrap_err(),
            Error::UnknownField { .. }
        ));
        assert!(matches!(
            form.set_field("whoami..name", "x").unwrap_err(),
            Error::UnknownField { .. }
        ));
    }

    #[test]
    fn test_optional_demo_type() {
        let mut form = form();
        let index = form.add_item(ListSection::Projects);
        form.set_field(&format!("projects.{index}.demoType"), "phishing-kit")
            .unwrap();
        assert_eq!(
            form.draft().projects[index].demo_type.as_deref(),
            Some("phishing-kit")
        );

        form.set_field(&format!("projects.{index}.demoType"), "").unwrap();
        assert!(form.draft().projects[index].demo_type.is_none());
    }

    #[test]
    fn test_contact_channels() {
        let mut form = form();
        form.set_field("contact.mastodon", "@me@infosec.exchange").unwrap();
        form.set_contact("email", "new@example.com").unwrap();
        assert_eq!(form.draft().contact["mastodon"], "@me@infosec.exchange");
        assert_eq!(form.draft().contact["email"], "new@example.com");

        form.remove_contact("mastodon").unwrap();
        assert!(!form.draft().contact.contains_key("mastodon"));
        assert!(form.remove_contact("mastodon").is_err());
        assert!(form.set_contact("  ", "x").is_err());
    }

    #[test]
    fn test_add_item_defaults() {
        let mut form = form();

        let i = form.add_item(ListSection::Skills);
        assert_eq!(form.draft().skills[i].name, "New Skill");

        let i = form.add_item(ListSection::Projects);
        let project = &form.draft().projects[i];
        assert_eq!(project.name, "New Project");
        assert_eq!(project.year, Utc::now().year().to_string());
        assert!(!project.has_demo);

        let i = form.add_item(ListSection::Certs);
        assert_eq!(form.draft().certs[i].name, "New Cert");
        assert_eq!(i, form.draft().certs.len() - 1);
    }

    #[test]
    fn test_remove_item_shifts() {
        let mut form = form();
        let second = form.draft().skills[1].clone();
        form.remove_item(ListSection::Skills, 0).unwrap();
        assert_eq!(form.draft().skills[0], second);

        let len = form.draft().certs.len();
        let err = form.remove_item(ListSection::Certs, len).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { .. }));
    }

    #[tokio::test]
    async fn test_save_commits_and_persists() {
        let store = ContentStore::in_memory();
        let mut state = state();
        let mut form = AdminForm::new(state.content());
        form.set_field("about", "Saved text").unwrap();

        let now = Instant::now();
        let report = form.save(&store, &mut state, now).await;

        assert!(report.persisted);
        assert_eq!(report.close_after, Some(CLOSE_AFTER_SAVE));
        assert_eq!(state.content().about, "Saved text");
        assert_eq!(store.load().await.unwrap().about, "Saved text");
        assert_eq!(state.status(now).unwrap().text, SAVED_TEXT);
        assert!(state.status(now + Duration::from_millis(3000)).is_none());
    }

    #[tokio::test]
    async fn test_failed_save_still_commits_locally() {
        let mut state = state();
        let mut form = AdminForm::new(state.content());
        form.set_field("resumeUrl", "/cv.pdf").unwrap();

        let now = Instant::now();
        let report = form.save(&failing_store(), &mut state, now).await;

        assert!(!report.persisted);
        assert!(report.close_after.is_none());
        assert_eq!(state.content().resume_url, "/cv.pdf");
        let status = state.status(now).unwrap();
        assert_eq!(status.kind, StatusKind::Failure);
        assert_eq!(status.text, SAVE_FAILED_TEXT);
    }
}
