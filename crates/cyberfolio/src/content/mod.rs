//! Portfolio content model.
//!
//! The whole portfolio is one [`ContentDocument`]. It is read and written as
//! a single JSON document; list items have no durable id and are addressed by
//! position only.

mod defaults;
mod section;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub use defaults::{default_projects, initial_content};
pub use section::{ListSection, Section};

/// Name of the timestamp field the store adds on every write.
pub const LAST_UPDATED_FIELD: &str = "lastUpdated";

/// Highest allowed skill level.
pub const MAX_LEVEL: u8 = 100;

/// A named skill with a 0-100 proficiency level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Skill name.
    #[serde(default)]
    pub name: String,
    /// Proficiency, 0 to 100. Any stored number is clamped into range.
    #[serde(deserialize_with = "clamped_level")]
    pub level: u8,
}

impl Skill {
    /// Create a new skill.
    #[must_use]
    pub fn new(name: impl Into<String>, level: u8) -> Self {
        Self {
            name: name.into(),
            level: level.min(MAX_LEVEL),
        }
    }
}

/// A portfolio project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project name. Also the key used when backfilling demo info.
    #[serde(default)]
    pub name: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Free-form year label ("2024", "Current", "Ongoing").
    #[serde(default)]
    pub year: String,
    /// Whether an interactive demo exists.
    #[serde(default)]
    pub has_demo: bool,
    /// Kind of demo, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_type: Option<String>,
}

/// A certification with links for display and verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cert {
    /// Certification name.
    #[serde(default)]
    pub name: String,
    /// Issuing organization.
    #[serde(default)]
    pub issuer: String,
    /// Fallback logo URL.
    #[serde(default)]
    pub logo: String,
    /// Certificate image URL.
    #[serde(default)]
    pub image_url: String,
    /// Verification URL.
    #[serde(default)]
    pub verify_url: String,
}

/// The identity card shown by `whoami`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Whoami {
    /// Display name.
    pub name: String,
    /// Handle.
    pub handle: String,
    /// Clearance label.
    pub clearance: String,
    /// Status line.
    pub status: String,
}

/// Third-party API credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    /// AlienVault OTX key.
    pub otx: String,
}

/// All portfolio content.
///
/// Missing top-level fields deserialize to the bundled initial content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentDocument {
    /// Free-text biography.
    pub about: String,
    /// Technical skills.
    pub skills: Vec<Skill>,
    /// Soft skills.
    pub soft_skills: Vec<Skill>,
    /// Projects, in display order.
    pub projects: Vec<Project>,
    /// Certifications, in display order.
    pub certs: Vec<Cert>,
    /// Contact channel to value.
    pub contact: BTreeMap<String, String>,
    /// Downloadable resume location.
    pub resume_url: String,
    /// Identity card.
    pub whoami: Whoami,
    /// API credentials.
    pub api_keys: ApiKeys,
}

impl Default for ContentDocument {
    fn default() -> Self {
        initial_content()
    }
}

impl ContentDocument {
    /// Build a document from a stored JSON value.
    ///
    /// Strips [`LAST_UPDATED_FIELD`] and applies [`ContentDocument::normalize`].
    /// Each section is read on its own: a missing, `null` or malformed section
    /// takes the bundled default, and a malformed list item is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object.
    pub fn from_stored(value: Value) -> Result<Self> {
        let Value::Object(mut object) = value else {
            return Err(Error::invalid_value("/", "stored content is not an object"));
        };
        object.remove(LAST_UPDATED_FIELD);
        backfill_demo_fields(&mut object);

        let defaults = initial_content();
        let mut doc = Self {
            about: take_section(&mut object, Section::About, defaults.about),
            skills: take_list(&mut object, Section::Skills, defaults.skills),
            soft_skills: take_list(&mut object, Section::SoftSkills, defaults.soft_skills),
            projects: take_list(&mut object, Section::Projects, defaults.projects),
            certs: take_list(&mut object, Section::Certs, defaults.certs),
            contact: take_section(&mut object, Section::Contact, defaults.contact),
            resume_url: take_section(&mut object, Section::ResumeUrl, defaults.resume_url),
            whoami: take_section(&mut object, Section::Whoami, defaults.whoami),
            api_keys: take_section(&mut object, Section::ApiKeys, defaults.api_keys),
        };
        if !object.is_empty() {
            debug!(fields = ?object.keys().collect::<Vec<_>>(), "Ignoring unknown stored fields");
        }
        doc.normalize();
        Ok(doc)
    }

    /// Serialize the document with a `lastUpdated` stamp for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_stored(&self, now: DateTime<Utc>) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(object) = value.as_object_mut() {
            object.insert(
                LAST_UPDATED_FIELD.to_string(),
                Value::String(now.to_rfc3339()),
            );
        }
        Ok(value)
    }

    /// Bring a loaded document to a fully-populated state.
    ///
    /// Levels are clamped to [`MAX_LEVEL`]. Projects that lack demo info are
    /// handled before deserialization by [`ContentDocument::from_stored`].
    pub fn normalize(&mut self) {
        for skill in self.skills.iter_mut().chain(self.soft_skills.iter_mut()) {
            if skill.level > MAX_LEVEL {
                debug!(skill = %skill.name, level = skill.level, "Clamping skill level");
                skill.level = MAX_LEVEL;
            }
        }
    }

    /// Get one section as JSON for display.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn section_value(&self, section: Section) -> Result<Value> {
        let value = match section {
            Section::About => Value::String(self.about.clone()),
            Section::Skills => serde_json::to_value(&self.skills)?,
            Section::SoftSkills => serde_json::to_value(&self.soft_skills)?,
            Section::Projects => serde_json::to_value(&self.projects)?,
            Section::Certs => serde_json::to_value(&self.certs)?,
            Section::Contact => serde_json::to_value(&self.contact)?,
            Section::ResumeUrl => Value::String(self.resume_url.clone()),
            Section::Whoami => serde_json::to_value(&self.whoami)?,
            Section::ApiKeys => serde_json::to_value(&self.api_keys)?,
        };
        Ok(value)
    }

    /// Get a plain-string section, or `None` for structured sections.
    #[must_use]
    pub fn text_section(&self, section: Section) -> Option<&str> {
        match section {
            Section::About => Some(&self.about),
            Section::ResumeUrl => Some(&self.resume_url),
            _ => None,
        }
    }

    /// Replace a plain-string section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the section is structured.
    pub fn set_text_section(&mut self, section: Section, text: String) -> Result<()> {
        match section {
            Section::About => self.about = text,
            Section::ResumeUrl => self.resume_url = text,
            other => {
                return Err(Error::invalid_value(
                    other.key(),
                    "not a plain text section",
                ))
            }
        }
        Ok(())
    }

    /// Number of items in a list section.
    #[must_use]
    pub fn list_len(&self, section: ListSection) -> usize {
        match section {
            ListSection::Skills => self.skills.len(),
            ListSection::SoftSkills => self.soft_skills.len(),
            ListSection::Projects => self.projects.len(),
            ListSection::Certs => self.certs.len(),
        }
    }
}

/// Read one section, falling back to `fallback` when it is absent or malformed.
fn take_section<T: DeserializeOwned>(
    object: &mut Map<String, Value>,
    section: Section,
    fallback: T,
) -> T {
    match object.remove(section.key()) {
        None | Some(Value::Null) => fallback,
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(section = section.key(), error = %e, "Malformed stored section, using default");
            fallback
        }),
    }
}

/// Read a list section item by item, dropping items that do not parse.
fn take_list<T: DeserializeOwned>(
    object: &mut Map<String, Value>,
    section: Section,
    fallback: Vec<T>,
) -> Vec<T> {
    match object.remove(section.key()) {
        None | Some(Value::Null) => fallback,
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!(section = section.key(), index, error = %e, "Dropping malformed stored item");
                    None
                }
            })
            .collect(),
        Some(_) => {
            warn!(section = section.key(), "Stored section is not a list, using default");
            fallback
        }
    }
}

/// Accept any JSON number as a level and clamp it into `0..=MAX_LEVEL`.
#[allow(clippy::cast_possible_truncation)]
fn clamped_level<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    let level = match (number.as_i64(), number.as_u64(), number.as_f64()) {
        (Some(n), _, _) => n,
        (None, Some(_), _) => i64::MAX,
        (None, None, Some(f)) => f.round() as i64,
        (None, None, None) => 0,
    };
    Ok(u8::try_from(level.clamp(0, i64::from(MAX_LEVEL))).unwrap_or(MAX_LEVEL))
}

/// Fill `hasDemo`/`demoType` on stored projects from the bundled defaults.
fn backfill_demo_fields(object: &mut Map<String, Value>) {
    let Some(Value::Array(projects)) = object.get_mut("projects") else {
        return;
    };
    let defaults = default_projects();

    for project in projects.iter_mut().filter_map(Value::as_object_mut) {
        let name = project.get("name").and_then(Value::as_str).unwrap_or("");
        let known = defaults.iter().find(|p| p.name == name);

        if !project.contains_key("hasDemo") {
            let has_demo = known.is_some_and(|p| p.has_demo);
            project.insert("hasDemo".to_string(), Value::Bool(has_demo));
        }
        if !project.contains_key("demoType") {
            if let Some(demo_type) = known.and_then(|p| p.demo_type.clone()) {
                project.insert("demoType".to_string(), Value::String(demo_type));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_is_initial_content() {
        assert_eq!(ContentDocument::default(), initial_content());
    }

    #[test]
    fn test_from_stored_strips_last_updated() {
        let mut stored = initial_content().to_stored(Utc::now()).unwrap();
        assert!(stored.get(LAST_UPDATED_FIELD).is_some());

        stored["about"] = json!("Changed");
        let doc = ContentDocument::from_stored(stored).unwrap();
        assert_eq!(doc.about, "Changed");
        let back = serde_json::to_value(&doc).unwrap();
        assert!(back.get(LAST_UPDATED_FIELD).is_none());
    }

    #[test]
    fn test_from_stored_missing_sections_take_defaults() {
        let doc = ContentDocument::from_stored(json!({ "about": "Only about" })).unwrap();
        let defaults = initial_content();

        assert_eq!(doc.about, "Only about");
        assert_eq!(doc.skills, defaults.skills);
        assert_eq!(doc.whoami, defaults.whoami);
        assert_eq!(doc.contact, defaults.contact);
    }

    #[test]
    fn test_from_stored_backfills_demo_fields_by_name() {
        let known = default_projects()
            .into_iter()
            .find(|p| p.has_demo)
            .expect("a default project with a demo");

        let doc = ContentDocument::from_stored(json!({
            "projects": [
                { "name": known.name, "description": "d", "year": "2024" },
                { "name": "Unlisted", "description": "d", "year": "2024" },
                { "name": known.name, "description": "d", "year": "2024", "hasDemo": false }
            ]
        }))
        .unwrap();

        assert!(doc.projects[0].has_demo);
        assert_eq!(doc.projects[0].demo_type, known.demo_type);
        assert!(!doc.projects[1].has_demo);
        assert!(doc.projects[1].demo_type.is_none());
        // Stored values win over defaults
        assert!(!doc.projects[2].has_demo);
    }

    #[test]
    fn test_from_stored_rejects_non_object() {
        assert!(ContentDocument::from_stored(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_normalize_clamps_levels() {
        let doc = ContentDocument::from_stored(json!({
            "skills": [{ "name": "OSINT", "level": 140 }],
            "softSkills": [{ "name": "Writing", "level": 70 }]
        }))
        .unwrap();
        assert_eq!(doc.skills[0].level, 100);
        assert_eq!(doc.soft_skills[0].level, 70);
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let value = serde_json::to_value(initial_content()).unwrap();
        assert!(value.get("softSkills").is_some());
        assert!(value.get("resumeUrl").is_some());
        assert!(value.get("apiKeys").is_some());
        assert!(value["certs"][0].get("verifyUrl").is_some());
    }

    #[test]
    fn test_text_sections() {
        let mut doc = initial_content();
        assert_eq!(doc.text_section(Section::About), Some(doc.about.as_str()));
        assert!(doc.text_section(Section::Skills).is_none());

        doc.set_text_section(Section::ResumeUrl, "/cv.pdf".to_string())
            .unwrap();
        assert_eq!(doc.resume_url, "/cv.pdf");

        let err = doc
            .set_text_section(Section::Contact, "x".to_string())
            .unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_section_value_shapes() {
        let doc = initial_content();
        assert!(doc.section_value(Section::About).unwrap().is_string());
        assert!(doc.section_value(Section::Projects).unwrap().is_array());
        assert!(doc.section_value(Section::Whoami).unwrap().is_object());
    }

    #[test]
    fn test_whoami_missing_status_keeps_rest() {
        let doc = ContentDocument::from_stored(json!({
            "about": "mine",
            "whoami": { "name": "Harsh", "handle": "@h", "clearance": "L1" }
        }))
        .unwrap();

        assert_eq!(doc.about, "mine");
        assert_eq!(doc.whoami.name, "Harsh");
        assert_eq!(doc.whoami.status, "");
    }

    #[test]
    fn test_out_of_range_levels_are_clamped_on_load() {
        let doc = ContentDocument::from_stored(json!({
            "about": "mine",
            "skills": [
                { "name": "Huge", "level": 300 },
                { "name": "Negative", "level": -5 },
                { "name": "Fraction", "level": 42.6 }
            ]
        }))
        .unwrap();

        assert_eq!(doc.about, "mine");
        let levels: Vec<u8> = doc.skills.iter().map(|s| s.level).collect();
        assert_eq!(levels, vec![100, 0, 43]);
    }

    #[test]
    fn test_project_missing_year_keeps_rest() {
        let doc = ContentDocument::from_stored(json!({
            "about": "mine",
            "projects": [{ "name": "Recon Kit", "description": "d" }]
        }))
        .unwrap();

        assert_eq!(doc.about, "mine");
        assert_eq!(doc.projects.len(), 1);
        assert_eq!(doc.projects[0].name, "Recon Kit");
        assert_eq!(doc.projects[0].year, "");
    }

    #[test]
    fn test_null_section_takes_default() {
        let doc = ContentDocument::from_stored(json!({
            "about": "mine",
            "softSkills": null,
            "contact": null
        }))
        .unwrap();

        let defaults = initial_content();
        assert_eq!(doc.about, "mine");
        assert_eq!(doc.soft_skills, defaults.soft_skills);
        assert_eq!(doc.contact, defaults.contact);
    }

    #[test]
    fn test_malformed_section_takes_default_alone() {
        let doc = ContentDocument::from_stored(json!({
            "about": "mine",
            "whoami": "not an object",
            "skills": { "name": "not a list" },
            "resumeUrl": 7
        }))
        .unwrap();

        let defaults = initial_content();
        assert_eq!(doc.about, "mine");
        assert_eq!(doc.whoami, defaults.whoami);
        assert_eq!(doc.skills, defaults.skills);
        assert_eq!(doc.resume_url, defaults.resume_url);
    }

    #[test]
    fn test_malformed_list_item_is_dropped() {
        let doc = ContentDocument::from_stored(json!({
            "certs": [
                { "name": "GCTI", "issuer": "GIAC" },
                "garbage",
                { "name": "CTIA", "issuer": "EC-Council" }
            ]
        }))
        .unwrap();

        let names: Vec<&str> = doc.certs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["GCTI", "CTIA"]);
    }

    #[test]
    fn test_skill_new_clamps() {
        assert_eq!(Skill::new("x", 250).level, 100);
    }
}
