//! The only way out to the generation backend.
//!
//! [`Generator`] names the five requests the rest of the crate can make.
//! [`OpenAiGateway`] serves them from the OpenAI API. Each call is a single
//! request-and-await: no retries, no caching, and any failure is reported as a
//! [`GenerationError`].

use std::future::Future;
use std::io::Cursor;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
        CreateImageRequestArgs, Image, ImageModel, ImageResponseFormat, ImageSize, ImagesResponse,
        ResponseFormat, ResponseFormatJsonSchema,
    },
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::ImageFormat;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::time::{Duration, timeout};

use crate::error::GenerationError;
use crate::scene::StoryboardScene;
use crate::settings::Settings;

pub trait Generator: Send + Sync {
    /// Free-form text for a compiled instruction.
    fn generate_story(
        &self,
        instruction: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;

    /// Re-flows paragraphs, spacing and punctuation without touching the content.
    fn format_story(
        &self,
        story: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;

    /// Splits a story into scenes. A malformed structured response yields no scenes.
    fn generate_storyboard(
        &self,
        story: &str,
    ) -> impl Future<Output = Result<Vec<StoryboardScene>, GenerationError>> + Send;

    /// One image for a scene description, as a `data:image/jpeg;base64,` URI.
    fn generate_image(
        &self,
        description: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;

    /// Rewrites a template, keeping its markers. Returns the trimmed template only.
    fn optimize_template(
        &self,
        content: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

pub fn format_prompt(story: &str) -> String {
    format!(
        "Please format the following story with proper paragraph breaks, spacing, and punctuation. Do not add or remove any content, just format it for better readability.\n\nSTORY:\n{story}"
    )
}

pub fn storyboard_prompt(story: &str) -> String {
    format!(
        "Based on the following story, create a professional short video storyboard. Break it down into logical scenes.\n\nStory: {story}"
    )
}

pub fn image_prompt(description: &str) -> String {
    format!(
        "Generate a cinematic, photorealistic image for a video storyboard scene with the following description: {description}"
    )
}

pub fn optimize_prompt(content: &str) -> String {
    format!(
        r#"You are an expert in creating effective prompts for generative AI.
Optimize the following story prompt template to be more evocative, detailed, and to produce higher-quality, more creative stories.
Retain the original {{{{variable}}}} placeholders, but feel free to add new ones if it enhances the template.
Return only the optimized template content. Do not include any explanatory text before or after the template.

ORIGINAL TEMPLATE:
"{content}""#
    )
}

/// JSON schema the storyboard response must follow. Every field is required.
pub fn storyboard_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "scenes": {
                "type": "array",
                "description": "An array of storyboard scenes.",
                "items": {
                    "type": "object",
                    "properties": {
                        "sceneNumber": { "type": "integer", "description": "The sequential number of the scene." },
                        "cameraAngle": { "type": "string", "description": "e.g., 'Close-up', 'Wide shot', 'Over-the-shoulder'." },
                        "setting": { "type": "string", "description": "Description of the location and time." },
                        "action": { "type": "string", "description": "What is happening in the scene, the visual description for image generation." },
                        "dialogue": { "type": "string", "description": "Any dialogue spoken by characters in the scene." }
                    },
                    "required": ["sceneNumber", "cameraAngle", "setting", "action", "dialogue"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["scenes"],
        "additionalProperties": false
    })
}

#[derive(Deserialize)]
struct StoryboardResponse {
    #[serde(default)]
    scenes: Vec<StoryboardScene>,
}

/// Reads the scenes out of a structured storyboard response.
pub fn parse_storyboard(body: &str) -> Vec<StoryboardScene> {
    match serde_json::from_str::<StoryboardResponse>(body) {
        Ok(response) => response.scenes,
        Err(e) => {
            log::warn!("Malformed storyboard response, using no scenes: {e}");
            Vec::new()
        }
    }
}

/// Wraps a base64 image payload in a JPEG data URI, re-encoding it if it is not JPEG already.
pub fn jpeg_data_uri(b64: &str) -> Result<String, GenerationError> {
    let b64 = b64.trim();
    let bytes = STANDARD.decode(b64)?;
    if image::guess_format(&bytes)? == ImageFormat::Jpeg {
        return Ok(format!("data:image/jpeg;base64,{b64}"));
    }
    // JPEG has no alpha channel.
    let rgb = image::load_from_memory(&bytes)?.to_rgb8();
    let mut jpeg = Cursor::new(Vec::new());
    rgb.write_to(&mut jpeg, ImageFormat::Jpeg)?;
    Ok(format!(
        "data:image/jpeg;base64,{}",
        STANDARD.encode(jpeg.into_inner())
    ))
}

/// The data URI for the first image of a response.
///
/// No images, a URL-only image, or an empty payload is how the backend reports a
/// safety block, and all of them fail with `ImageRejected`.
pub fn image_data_uri(response: &ImagesResponse) -> Result<String, GenerationError> {
    let Some(image) = response.data.first() else {
        log::warn!("Image request returned no images");
        return Err(GenerationError::ImageRejected);
    };
    match image.as_ref() {
        Image::B64Json { b64_json, .. } if !b64_json.trim().is_empty() => jpeg_data_uri(b64_json),
        _ => {
            log::warn!("Image request returned no image payload");
            Err(GenerationError::ImageRejected)
        }
    }
}

/// An optimized template as the model returned it, minus surrounding whitespace.
pub fn clean_template(response: &str) -> String {
    response.trim().to_string()
}

pub struct OpenAiGateway {
    client: Client<OpenAIConfig>,
    text_model: String,
    storyboard_model: String,
    image_model: ImageModel,
    request_timeout: Duration,
}

impl OpenAiGateway {
    pub fn new(settings: &Settings) -> Self {
        // Without a key in the settings the client reads OPENAI_API_KEY.
        let mut openai_config = OpenAIConfig::new();
        if let Some(api_key) = &settings.openai_api_key {
            openai_config = openai_config.with_api_key(api_key);
        }
        let image_model = match settings.image_model.as_str() {
            "dall-e-2" => ImageModel::DallE2,
            "dall-e-3" => ImageModel::DallE3,
            other => ImageModel::Other(other.to_string()),
        };

        Self {
            client: Client::with_config(openai_config),
            text_model: settings.text_model.clone(),
            storyboard_model: settings.storyboard_model.clone(),
            image_model,
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
        }
    }

    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        response_format: Option<ResponseFormat>,
    ) -> Result<String, GenerationError> {
        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(model).messages(vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        ]);
        if let Some(response_format) = response_format {
            request.response_format(response_format);
        }
        let request = request.build()?;

        let response = timeout(self.request_timeout, self.client.chat().create(request))
            .await
            .map_err(|_| GenerationError::Timeout)??;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GenerationError::EmptyResponse)
    }
}

impl Generator for OpenAiGateway {
    async fn generate_story(&self, instruction: &str) -> Result<String, GenerationError> {
        log::debug!("Generating story with {}", self.text_model);
        self.complete(&self.text_model, instruction, None)
            .await
            .inspect_err(|e| log::error!("Error generating story: {e}"))
    }

    async fn format_story(&self, story: &str) -> Result<String, GenerationError> {
        log::debug!("Formatting story ({} chars)", story.len());
        self.complete(&self.text_model, &format_prompt(story), None)
            .await
            .inspect_err(|e| log::error!("Error formatting story: {e}"))
    }

    async fn generate_storyboard(
        &self,
        story: &str,
    ) -> Result<Vec<StoryboardScene>, GenerationError> {
        log::debug!("Generating storyboard with {}", self.storyboard_model);
        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: Some("A short video storyboard broken into scenes.".into()),
                name: "storyboard".into(),
                schema: Some(storyboard_schema()),
                strict: Some(true),
            },
        };
        let body = self
            .complete(
                &self.storyboard_model,
                &storyboard_prompt(story),
                Some(response_format),
            )
            .await
            .inspect_err(|e| log::error!("Error generating storyboard: {e}"))?;
        Ok(parse_storyboard(&body))
    }

    async fn generate_image(&self, description: &str) -> Result<String, GenerationError> {
        log::debug!("Generating image for: {description}");
        let request = CreateImageRequestArgs::default()
            .prompt(image_prompt(description))
            .model(self.image_model.clone())
            .n(1)
            .response_format(ImageResponseFormat::B64Json)
            .size(ImageSize::S1792x1024)
            .build()?;

        let response = timeout(self.request_timeout, self.client.images().create(request))
            .await
            .map_err(|_| GenerationError::Timeout)?
            .inspect_err(|e| log::error!("Error generating image: {e}"))?;

        image_data_uri(&response)
    }

    async fn optimize_template(&self, content: &str) -> Result<String, GenerationError> {
        log::debug!("Optimizing template with {}", self.storyboard_model);
        let optimized = self
            .complete(&self.storyboard_model, &optimize_prompt(content), None)
            .await
            .inspect_err(|e| log::error!("Error optimizing template: {e}"))?;
        Ok(clean_template(&optimized))
    }
}
