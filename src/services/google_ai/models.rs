use serde::{Deserialize, Serialize};

/// Caller-facing request. Immutable once built; see [`GenerationRequest::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    user_prompt: String,
    system_prompt: Option<String>,
    enable_search_grounding: bool,
}

impl GenerationRequest {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            system_prompt: None,
            enable_search_grounding: false,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_search_grounding(mut self, enabled: bool) -> Self {
        self.enable_search_grounding = enabled;
        self
    }

    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn search_grounding(&self) -> bool {
        self.enable_search_grounding
    }

    pub fn to_wire(&self) -> GenerateContentRequest {
        let mut request = GenerateContentRequest::new(self.user_prompt.clone());
        if let Some(system) = self.system_prompt.as_ref().filter(|s| !s.is_empty()) {
            request = request.with_system_instruction(system.clone());
        }
        if self.enable_search_grounding {
            request = request.with_search_grounding();
        }
        request
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub sources: Vec<Source>,
}

// Wire format of the generateContent endpoint.

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
}

impl GenerateContentRequest {
    pub fn new(text: String) -> Self {
        Self {
            contents: vec![Content::from_text(text)],
            system_instruction: None,
            tools: None,
        }
    }

    pub fn with_system_instruction(mut self, text: String) -> Self {
        self.system_instruction = Some(Content::from_text(text));
        self
    }

    pub fn with_search_grounding(mut self) -> Self {
        self.tools = Some(vec![Tool::google_search()]);
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Content {
    pub fn from_text(text: String) -> Self {
        Self {
            parts: vec![Part { text: Some(text) }],
            role: None,
        }
    }
}

/// Only text parts are modelled; other part kinds deserialize with `text: None`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Tool {
    pub google_search: GoogleSearch,
}

impl Tool {
    pub fn google_search() -> Self {
        Self {
            google_search: GoogleSearch {},
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct GoogleSearch {}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Candidate {
    pub content: Option<Content>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
    #[serde(rename = "groundingMetadata")]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GroundingMetadata {
    #[serde(rename = "groundingAttributions")]
    pub grounding_attributions: Option<Vec<GroundingAttribution>>,
    #[serde(rename = "groundingChunks")]
    pub grounding_chunks: Option<Vec<GroundingAttribution>>,
}

/// Shared shape of `groundingAttributions[]` and `groundingChunks[]` entries.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GroundingAttribution {
    pub web: Option<WebSource>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct WebSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    pub prompt_token_count: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    pub candidates_token_count: Option<u32>,
    #[serde(rename = "totalTokenCount")]
    pub total_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Text of the first text part of the first candidate.
    pub fn extract_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| part.text.as_deref())
    }

    pub fn extract_sources(&self) -> Vec<Source> {
        let Some(metadata) = self
            .candidates
            .first()
            .and_then(|candidate| candidate.grounding_metadata.as_ref())
        else {
            return Vec::new();
        };

        let entries = metadata
            .grounding_attributions
            .as_ref()
            .or(metadata.grounding_chunks.as_ref());

        entries
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        let web = entry.web.as_ref()?;
                        let uri = web.uri.as_deref().filter(|u| !u.is_empty())?;
                        let title = web.title.as_deref().filter(|t| !t.is_empty())?;
                        Some(Source {
                            uri: uri.to_string(),
                            title: title.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_token_usage(&self) -> Option<u32> {
        self.usage_metadata
            .as_ref()
            .and_then(|meta| meta.total_token_count)
    }

    pub fn get_finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_deref())
    }
}
