//! Profile generation boundary.
//!
//! [`ProfileGenerator`] is what the page calls; [`GeminiGenerator`] is the
//! provider-backed implementation. Every failure collapses into a
//! [`GenerateError`].

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::profile::BrandProfile;

/// What the page asks for: the role currently shown and the visitor's prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub target_role: String,
    pub context: String,
}

impl GenerationRequest {
    pub fn prompt(&self) -> String {
        format!(
            "Create a professional portfolio brand identity for a job seeker targeting the role of \"{role}\".\n\
             Context provided: \"{context}\".\n\n\
             Generate a comprehensive profile including:\n\
             - A high-impact professional name (if not provided)\n\
             - A technical tagline\n\
             - A 2-sentence summary\n\
             - Key technical skills (as array)\n\
             - 3 realistic project ideas that demonstrate expertise in this field.\n\
             - A hueShift value (0-360) that represents the \"mood\" of this professional brand \
             (e.g., cool blues for stability, vibrant purples for creativity).\n\n\
             Return as JSON matching the BrandProfile schema.",
            role = self.target_role,
            context = self.context,
        )
    }
}

#[async_trait(?Send)]
pub trait ProfileGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<BrandProfile, GenerateError>;
}

/// Structured-output schema handed to the provider.
pub fn response_schema() -> Value {
    let strings = json!({ "type": "ARRAY", "items": { "type": "STRING" } });
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "role": { "type": "STRING" },
            "tagline": { "type": "STRING" },
            "summary": { "type": "STRING" },
            "skills": strings,
            "projects": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "tags": strings
                    },
                    "required": ["title", "description", "tags"]
                }
            },
            "hueShift": { "type": "NUMBER" }
        },
        "required": ["name", "role", "tagline", "summary", "skills", "projects", "hueShift"]
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

/// Extract the profile from a successful `generateContent` body.
pub fn parse_response(body: &str) -> Result<BrandProfile, GenerateError> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;
    let text = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(GenerateError::EmptyResponse)?;

    let profile: BrandProfile = serde_json::from_str(&text)?;
    Ok(sanitize(profile))
}

/// Boundary clean-up: hue is wrapped into [0, 360) and project links that
/// are not plain http(s) URLs are dropped. The project list is otherwise
/// taken as the provider sent it.
fn sanitize(mut profile: BrandProfile) -> BrandProfile {
    profile.hue_shift = profile.hue_shift.rem_euclid(360.0);
    for project in &mut profile.projects {
        project.link = project.link.take().and_then(web_link);
    }
    profile
}

fn web_link(link: String) -> Option<String> {
    let trimmed = link.trim();
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(trimmed.to_owned()),
        _ => {
            log::debug!("dropping project link {link:?}");
            None
        }
    }
}

fn rejection(status: u16, body: &str) -> GenerateError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_owned());
    GenerateError::Rejected { status, message }
}

pub struct GeminiGenerator {
    config: GeneratorConfig,
    client: Client,
}

impl GeminiGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    fn body(request: &GenerationRequest) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": request.prompt() }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        })
    }
}

#[async_trait(?Send)]
impl ProfileGenerator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<BrandProfile, GenerateError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(GenerateError::MissingApiKey)?;

        log::debug!("requesting profile for role {:?} from {}", request.target_role, self.config.model);
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&Self::body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        log::debug!("generator response status: {status}");

        if !status.is_success() {
            return Err(rejection(status.as_u16(), &body));
        }
        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(text: &str) -> String {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }).to_string()
    }

    fn generated(hue: f64) -> String {
        json!({
            "name": "Rin Sato",
            "role": "ML Platform Engineer",
            "tagline": "Shipping models to production",
            "summary": "Builds training infrastructure. Cares about cost.",
            "skills": ["Rust", "Kubernetes"],
            "projects": [
                { "title": "Atlas", "description": "Feature store", "tags": ["Rust"] }
            ],
            "hueShift": hue
        })
        .to_string()
    }

    #[test]
    fn parses_first_text_part() {
        let profile = parse_response(&envelope(&generated(200.0))).unwrap();
        assert_eq!(profile.name, "Rin Sato");
        assert_eq!(profile.projects.len(), 1);
        assert_eq!(profile.projects[0].link, None);
        assert_eq!(profile.hue_shift, 200.0);
    }

    #[test]
    fn hue_is_wrapped_into_range() {
        assert_eq!(parse_response(&envelope(&generated(400.0))).unwrap().hue_shift, 40.0);
        assert_eq!(parse_response(&envelope(&generated(-30.0))).unwrap().hue_shift, 330.0);
        assert_eq!(parse_response(&envelope(&generated(360.0))).unwrap().hue_shift, 0.0);
    }

    fn with_link(link: &str) -> String {
        json!({
            "name": "Rin Sato",
            "role": "ML Platform Engineer",
            "tagline": "Shipping models to production",
            "summary": "Builds training infrastructure. Cares about cost.",
            "skills": ["Rust"],
            "projects": [
                { "title": "Atlas", "description": "Feature store", "tags": ["Rust"], "link": link }
            ],
            "hueShift": 10
        })
        .to_string()
    }

    #[test]
    fn only_web_links_survive() {
        let link = |raw: &str| {
            parse_response(&envelope(&with_link(raw)))
                .unwrap()
                .projects
                .remove(0)
                .link
        };
        assert_eq!(link("https://example.com/atlas"), Some("https://example.com/atlas".into()));
        assert_eq!(link(" http://example.com "), Some("http://example.com".into()));
        assert_eq!(link("javascript:alert(document.cookie)"), None);
        assert_eq!(link("JavaScript:alert(1)"), None);
        assert_eq!(link("data:text/html,<script>alert(1)</script>"), None);
        assert_eq!(link("/relative/path"), None);
        assert_eq!(link(""), None);
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let text = json!({ "name": "Only Name" }).to_string();
        let err = parse_response(&envelope(&text)).unwrap_err();
        assert!(matches!(err, GenerateError::Malformed(_)));
    }

    #[test]
    fn no_candidates_is_empty_response() {
        let err = parse_response(r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err, GenerateError::EmptyResponse));

        let err = parse_response(&envelope("   ")).unwrap_err();
        assert!(matches!(err, GenerateError::EmptyResponse));
    }

    #[test]
    fn rejection_prefers_provider_message() {
        let err = rejection(403, r#"{"error": {"code": 403, "message": "API key invalid"}}"#);
        match err {
            GenerateError::Rejected { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "API key invalid");
            }
            other => panic!("unexpected {other:?}"),
        }
        let err = rejection(502, "bad gateway\n");
        assert!(matches!(err, GenerateError::Rejected { message, .. } if message == "bad gateway"));
    }

    #[test]
    fn prompt_names_role_and_context() {
        let request = GenerationRequest {
            target_role: "Fullstack Engineer".into(),
            context: "pivot to data engineering".into(),
        };
        let prompt = request.prompt();
        assert!(prompt.contains("\"Fullstack Engineer\""));
        assert!(prompt.contains("pivot to data engineering"));
        assert!(prompt.contains("2-sentence summary"));
    }

    #[test]
    fn schema_requires_every_profile_field() {
        let required = response_schema()["required"].as_array().unwrap().len();
        assert_eq!(required, 7);
    }

    #[test]
    fn url_tolerates_trailing_slash() {
        let generator = GeminiGenerator::new(GeneratorConfig {
            endpoint: "http://localhost:9000/".into(),
            model: "m".into(),
            api_key: None,
        });
        assert_eq!(generator.url(), "http://localhost:9000/v1beta/models/m:generateContent");
    }
}
