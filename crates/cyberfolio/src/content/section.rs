//! Names of the top-level content sections.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A top-level section of [`super::ContentDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Biography text.
    About,
    /// Technical skills.
    Skills,
    /// Soft skills.
    SoftSkills,
    /// Projects.
    Projects,
    /// Certifications.
    Certs,
    /// Contact channels.
    Contact,
    /// Resume location.
    ResumeUrl,
    /// Identity card.
    Whoami,
    /// API credentials.
    ApiKeys,
}

impl Section {
    /// Every section, in document order.
    pub const ALL: [Section; 9] = [
        Self::About,
        Self::Skills,
        Self::SoftSkills,
        Self::Projects,
        Self::Certs,
        Self::Contact,
        Self::ResumeUrl,
        Self::Whoami,
        Self::ApiKeys,
    ];

    /// JSON key of the section.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::About => "about",
            Self::Skills => "skills",
            Self::SoftSkills => "softSkills",
            Self::Projects => "projects",
            Self::Certs => "certs",
            Self::Contact => "contact",
            Self::ResumeUrl => "resumeUrl",
            Self::Whoami => "whoami",
            Self::ApiKeys => "apiKeys",
        }
    }

    /// Whether the section is a single plain string.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, Self::About | Self::ResumeUrl)
    }

    /// Whether viewing the section needs an authenticated session.
    #[must_use]
    pub fn is_sensitive(self) -> bool {
        matches!(self, Self::ApiKeys)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Section {
    type Err = Error;

    /// Parse a section name, ignoring case (`softskills`, `softSkills`, `SOFTSKILLS`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownSection {
                name: s.to_string(),
            })
    }
}

/// A section that holds a list of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListSection {
    /// Technical skills.
    Skills,
    /// Soft skills.
    SoftSkills,
    /// Projects.
    Projects,
    /// Certifications.
    Certs,
}

impl ListSection {
    /// The matching top-level section.
    #[must_use]
    pub fn section(self) -> Section {
        match self {
            Self::Skills => Section::Skills,
            Self::SoftSkills => Section::SoftSkills,
            Self::Projects => Section::Projects,
            Self::Certs => Section::Certs,
        }
    }

    /// JSON key of the list.
    #[must_use]
    pub fn key(self) -> &'static str {
        self.section().key()
    }
}

impl FromStr for ListSection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Section>()? {
            Section::Skills => Ok(Self::Skills),
            Section::SoftSkills => Ok(Self::SoftSkills),
            Section::Projects => Ok(Self::Projects),
            Section::Certs => Ok(Self::Certs),
            other => Err(Error::invalid_value(other.key(), "not a list section")),
        }
    }
}

impl fmt::Display for ListSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_case() {
        assert_eq!("about".parse::<Section>().unwrap(), Section::About);
        assert_eq!("ABOUT".parse::<Section>().unwrap(), Section::About);
        assert_eq!("softskills".parse::<Section>().unwrap(), Section::SoftSkills);
        assert_eq!("resumeUrl".parse::<Section>().unwrap(), Section::ResumeUrl);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "secrets".parse::<Section>().unwrap_err();
        assert!(matches!(err, Error::UnknownSection { .. }));
    }

    #[test]
    fn test_text_sections() {
        let text: Vec<_> = Section::ALL.into_iter().filter(|s| s.is_text()).collect();
        assert_eq!(text, vec![Section::About, Section::ResumeUrl]);
    }

    #[test]
    fn test_list_section_parse() {
        assert_eq!("certs".parse::<ListSection>().unwrap(), ListSection::Certs);
        assert!("about".parse::<ListSection>().is_err());
        assert!("nope".parse::<ListSection>().is_err());
    }

    #[test]
    fn test_display_uses_json_key() {
        assert_eq!(Section::SoftSkills.to_string(), "softSkills");
        assert_eq!(ListSection::Projects.to_string(), "projects");
    }
}
