//! Candidate profile: the structured record extracted from a resume and
//! enriched by the self-introduction stage.
//!
//! Model output is loosely shaped: list fields arrive as JSON arrays, single
//! strings, or comma-separated strings, and numbers arrive as strings. All of
//! that is normalized here, once, at deserialization time. Nodes only ever see
//! canonical `Vec<String>` / `Option<_>` fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Structured candidate profile.
///
/// Unknown keys returned by the model are preserved in `extra` so nothing the
/// model extracted is silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_years")]
    pub experience_years: Option<f32>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub education: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub recommended_topics: Vec<String>,
    /// Filled in by the self-introduction stage.
    #[serde(default)]
    pub self_intro: Option<IntroSummary>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// What the candidate told us about themself, as summarized by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntroSummary {
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub highlights: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub interests: Vec<String>,
}

impl CandidateProfile {
    /// Converts a raw model response into a profile.
    ///
    /// Returns `None` unless the value is a non-empty JSON object.
    pub fn from_model_value(value: Value) -> Option<Self> {
        match &value {
            Value::Object(map) if !map.is_empty() => serde_json::from_value(value).ok(),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Candidate")
    }

    /// Folds a self-introduction summary into the profile. Skills the
    /// candidate mentioned that the resume did not are appended.
    pub fn merge_intro(&mut self, intro: IntroSummary, mentioned_skills: Vec<String>) {
        for skill in mentioned_skills {
            if !self
                .skills
                .iter()
                .any(|s| s.eq_ignore_ascii_case(skill.as_str()))
            {
                self.skills.push(skill);
            }
        }
        self.self_intro = Some(intro);
    }

    /// Short plain-text rendering used inside prompts.
    pub fn prompt_summary(&self) -> String {
        let mut out = format!("Name: {}\n", self.display_name());
        if let Some(years) = self.experience_years {
            out.push_str(&format!("Experience: {years} years\n"));
        }
        push_list(&mut out, "Skills", &self.skills);
        push_list(&mut out, "Roles", &self.roles);
        if let Some(education) = &self.education {
            out.push_str(&format!("Education: {education}\n"));
        }
        push_list(&mut out, "Strengths", &self.strengths);
        push_list(&mut out, "Areas to probe", &self.weaknesses);
        push_list(&mut out, "Recommended topics", &self.recommended_topics);
        if let Some(intro) = &self.self_intro {
            if let Some(summary) = &intro.summary {
                out.push_str(&format!("Self introduction: {summary}\n"));
            }
            push_list(&mut out, "Interests", &intro.interests);
        }
        out
    }
}

fn push_list(out: &mut String, label: &str, items: &[String]) {
    if !items.is_empty() {
        out.push_str(&format!("{label}: {}\n", items.join(", ")));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Boundary normalization
// ────────────────────────────────────────────────────────────────────────────

/// Accepts `["a", "b"]`, `"a, b"`, `"a\nb"`, a lone scalar, or null.
pub fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_list(&value))
}

fn normalize_list(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => s
            .split([',', '\n', ';'])
            .map(|part| part.trim().trim_start_matches("- ").trim())
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => Some(s.trim().to_string()),
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        other => vec![other.to_string()],
    }
}

/// Accepts a string, or any other JSON value rendered as compact text.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    })
}

/// Accepts `5`, `5.5`, `"5"`, `"5+ years"`; anything else becomes `None`.
pub fn lenient_years<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        Value::String(s) => {
            let numeric: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            numeric.parse::<f32>().ok()
        }
        _ => None,
    })
}
