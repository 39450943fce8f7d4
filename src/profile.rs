//! The displayed identity: everything the page renders about a person.

use serde::{Deserialize, Serialize};

/// Icons cycled over the project cards.
const PROJECT_GLYPHS: [&str; 3] = ["✨", "💠", "⚡"];

/// One entry in the projects grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Complete profile record. The page always holds exactly one and swaps it
/// wholesale; fields are never patched individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandProfile {
    pub name: String,
    pub role: String,
    pub tagline: String,
    pub summary: String,
    pub skills: Vec<String>,
    pub projects: Vec<Project>,
    /// Palette rotation in degrees, nominally in [0, 360). Passed to the
    /// background as-is.
    pub hue_shift: f64,
}

impl BrandProfile {
    /// Role split into headline segments. The first segment is set on its own
    /// line, the rest carry the accent gradient.
    pub fn headline_words(&self) -> impl Iterator<Item = &str> {
        self.role.split(' ')
    }

    /// Mailbox part of the footer contact address.
    pub fn contact_handle(&self) -> String {
        self.name.to_lowercase().replacen(' ', "", 1)
    }

    pub fn contact_address(&self) -> String {
        format!("{}@dev.engine", self.contact_handle())
    }
}

impl Default for BrandProfile {
    fn default() -> Self {
        fn project(title: &str, description: &str, tags: [&str; 3]) -> Project {
            Project {
                title: title.to_owned(),
                description: description.to_owned(),
                tags: tags.iter().map(|t| (*t).to_owned()).collect(),
                link: None,
            }
        }

        Self {
            name: "Alex Dev".into(),
            role: "Fullstack Engineer".into(),
            tagline: "Architecting Scalable Digital Experiences".into(),
            summary: "Focused on bridging the gap between elegant design and high-performance \
                      backend systems. Passionate about building impactful software that solves \
                      real-world problems."
                .into(),
            skills: ["React", "TypeScript", "Node.js", "PostgreSQL", "Tailwind CSS", "AWS"]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            projects: vec![
                project(
                    "Nebula Dashboard",
                    "A real-time analytics platform for distributed cloud infrastructure with \
                     99.9% uptime visualization.",
                    ["React", "D3.js", "WebSockets"],
                ),
                project(
                    "Prism Ledger",
                    "Secure, performant blockchain explorer featuring deep-linked transaction \
                     tracing and visual node mapping.",
                    ["Next.js", "Solidity", "GraphQL"],
                ),
                project(
                    "Aura Sync",
                    "Identity management system utilizing biometric hashing for decentralized \
                     authentication across web apps.",
                    ["Go", "Redis", "Docker"],
                ),
            ],
            hue_shift: 240.0,
        }
    }
}

pub fn project_glyph(index: usize) -> &'static str {
    PROJECT_GLYPHS[index % PROJECT_GLYPHS.len()]
}

/// Stagger for skill chips once the about section is revealed.
pub fn skill_reveal_delay_ms(index: usize) -> u32 {
    800 + 100 * index as u32
}

pub fn project_reveal_delay_ms(index: usize) -> u32 {
    150 * index as u32
}
