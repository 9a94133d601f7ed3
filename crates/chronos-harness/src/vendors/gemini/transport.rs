//! Wire format for Gemini `generateContent`.

use serde::{Deserialize, Serialize};

use crate::content::{DEFAULT_IMAGE_MIME, GeneratedImage, ImagePayload};
use crate::errors::ProviderError;
use crate::model::ProviderId;

pub(crate) const NO_RESPONSE_MESSAGE: &str = "No response generated from the model.";
pub(crate) const NO_IMAGE_MESSAGE: &str = "Could not find image in model response.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub response_modalities: Vec<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Image part first, instruction second.
pub(crate) fn build_request_body(image: &ImagePayload, instruction: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type().to_string(),
                        data: image.to_base64(),
                    },
                },
                Part::Text {
                    text: instruction.to_string(),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["TEXT", "IMAGE"],
        },
    }
}

/// Picks the first inline image from the first candidate that has parts.
pub(crate) fn extract_generated_image(
    provider: &ProviderId,
    response: GenerateContentResponse,
) -> Result<GeneratedImage, ProviderError> {
    let block_reason = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason);
    let Some((parts, finish_reason)) = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .find_map(|candidate| {
            let parts = candidate.content?.parts?;
            Some((parts, candidate.finish_reason))
        })
    else {
        let message = match block_reason {
            Some(reason) => format!("{NO_RESPONSE_MESSAGE} (blocked: {reason})"),
            None => NO_RESPONSE_MESSAGE.to_string(),
        };
        return Err(ProviderError::protocol(provider.clone(), message));
    };

    let mut commentary = Vec::new();
    let mut inline = None;
    for part in parts {
        if let Some(text) = part.text.filter(|t| !t.trim().is_empty()) {
            commentary.push(text);
        }
        if inline.is_none() {
            inline = part.inline_data;
        }
    }
    let Some(inline) = inline else {
        return Err(ProviderError::protocol(provider.clone(), NO_IMAGE_MESSAGE));
    };

    let mime_type = if inline.mime_type.trim().is_empty() {
        DEFAULT_IMAGE_MIME.to_string()
    } else {
        inline.mime_type
    };
    let image = ImagePayload::from_base64(mime_type, &inline.data).map_err(|e| {
        ProviderError::protocol(provider.clone(), format!("undecodable image payload: {e}"))
    })?;
    if image.is_empty() {
        return Err(ProviderError::protocol(provider.clone(), NO_IMAGE_MESSAGE));
    }

    Ok(GeneratedImage {
        image,
        commentary: (!commentary.is_empty()).then(|| commentary.join("\n")),
        finish_reason,
    })
}

/// Turns a non-success HTTP response into a provider error, preferring the
/// structured `{ "error": { "status", "message" } }` body when present.
pub(crate) fn map_http_error(provider: &ProviderId, status: u16, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| format!("Gemini request failed with status {status}: {body}"));
    ProviderError::provider(provider.clone(), message, Some(status))
}
