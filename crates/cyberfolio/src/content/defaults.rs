//! Bundled content used before the store answers and whenever it has nothing.

use std::collections::BTreeMap;

use super::{ApiKeys, Cert, ContentDocument, Project, Skill, Whoami};

/// The content shipped with the binary.
#[must_use]
pub fn initial_content() -> ContentDocument {
    ContentDocument {
        about: "I am a passionate Cyber Threat Intelligence beginner, dedicated to learning the \
                art of tracking digital adversaries and understanding the threat landscape. I'm \
                actively developing my skills in OSINT, data analysis, and malware triage to turn \
                information into protective intelligence. My journey is about building a \
                foundation of knowledge to help organizations anticipate and defend against \
                emerging cyber threats."
            .to_string(),
        skills: vec![
            Skill::new("Threat Analysis", 65),
            Skill::new("OSINT", 75),
            Skill::new("Python Scripting", 80),
            Skill::new("Log Analysis (SIEM)", 60),
            Skill::new("Malware Triage", 55),
            Skill::new("Network Fundamentals", 70),
        ],
        soft_skills: vec![
            Skill::new("Analytical Thinking", 80),
            Skill::new("Report Writing", 70),
            Skill::new("Communication", 75),
            Skill::new("Continuous Learning", 90),
        ],
        projects: default_projects(),
        certs: vec![
            Cert {
                name: "Security+".to_string(),
                issuer: "CompTIA".to_string(),
                logo: "https://cdn.worldvectorlogo.com/logos/comptia-security-ce.svg".to_string(),
                image_url: "https://placehold.co/600x400/0a101f/cyan?text=Cert_Image".to_string(),
                verify_url: "#verify-link-1".to_string(),
            },
            Cert {
                name: "eJPT".to_string(),
                issuer: "INE".to_string(),
                logo: "https://avatars.githubusercontent.com/u/4549474?s=200&v=4".to_string(),
                image_url: "https://placehold.co/600x400/0a101f/cyan?text=Cert_Image".to_string(),
                verify_url: "#verify-link-2".to_string(),
            },
        ],
        contact: BTreeMap::from([
            ("email".to_string(), "harsh.raj@example.dev".to_string()),
            (
                "github".to_string(),
                "https://github.com/secwithharsh".to_string(),
            ),
            (
                "linkedin".to_string(),
                "https://linkedin.com/in/harsh-raj-sec".to_string(),
            ),
        ]),
        resume_url: "/resume.pdf".to_string(),
        whoami: Whoami {
            name: "Harsh Raj".to_string(),
            handle: "SecWithHarsh".to_string(),
            clearance: "LEVEL-1 // BEGINNER".to_string(),
            status: "Actively learning and analyzing...".to_string(),
        },
        api_keys: ApiKeys::default(),
    }
}

/// Default projects, also the lookup table for demo backfill on load.
#[must_use]
pub fn default_projects() -> Vec<Project> {
    vec![
        Project {
            name: "Threat Actor Profile Study".to_string(),
            description: "Analyzed public reports on APT28 to create a comprehensive profile of \
                          their TTPs and infrastructure."
                .to_string(),
            year: "Current".to_string(),
            has_demo: true,
            demo_type: Some("actor-profile".to_string()),
        },
        Project {
            name: "Phishing Kit Analysis".to_string(),
            description: "Deconstructed a captured phishing kit to understand its operation and \
                          identify unique indicators."
                .to_string(),
            year: "Current".to_string(),
            has_demo: true,
            demo_type: Some("phishing-kit".to_string()),
        },
        Project {
            name: "Home Lab Network Monitoring".to_string(),
            description: "Set up a home lab with Security Onion to practice traffic analysis and \
                          alert triage."
                .to_string(),
            year: "Ongoing".to_string(),
            has_demo: false,
            demo_type: None,
        },
    ]
}
