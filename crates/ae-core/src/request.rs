use serde::Serialize;
use crate::error::ValidationError;
use crate::model_types::{AspectRatio, ModelType};

pub const DEFAULT_INFERENCE_STEPS: u32 = 50;
pub const DEFAULT_GUIDANCE_SCALE: f32 = 7.5;

const VARIATION_SUFFIX: &str = " (variation)";

/// Body of `POST /generate`. Only constructible with a non-empty prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    prompt: String,
    model_type: ModelType,
    #[serde(rename = "width_height_ratio")]
    aspect_ratio: AspectRatio,
    #[serde(rename = "num_inference_steps")]
    inference_steps: u32,
    guidance_scale: f32,
}

impl GenerationRequest {
    pub fn new(
        prompt: &str,
        model_type: ModelType,
        aspect_ratio: AspectRatio,
    ) -> Result<Self, ValidationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ValidationError::EmptyPrompt);
        }

        Ok(Self {
            prompt: prompt.to_string(),
            model_type,
            aspect_ratio,
            inference_steps: DEFAULT_INFERENCE_STEPS,
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
        })
    }

    pub fn with_inference_steps(mut self, steps: u32) -> Self {
        self.inference_steps = steps;
        self
    }

    pub fn with_guidance_scale(mut self, scale: f32) -> Self {
        self.guidance_scale = scale;
        self
    }

    /// Same options, prompt marked as a variation of this one
    pub fn variation(&self) -> Self {
        Self {
            prompt: format!("{}{}", self.prompt, VARIATION_SUFFIX),
            ..self.clone()
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn inference_steps(&self) -> u32 {
        self.inference_steps
    }

    pub fn guidance_scale(&self) -> f32 {
        self.guidance_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_prompt_rejected() {
        for prompt in ["", "   ", "\n\t "] {
            assert_eq!(
                GenerationRequest::new(prompt, ModelType::Sketch, AspectRatio::Square),
                Err(ValidationError::EmptyPrompt)
            );
        }
    }

    #[test]
    fn test_prompt_is_trimmed() {
        let req = GenerationRequest::new("  a red fox in snow ", ModelType::Sketch, AspectRatio::Square)
            .unwrap();
        assert_eq!(req.prompt(), "a red fox in snow");
        assert_eq!(req.inference_steps(), DEFAULT_INFERENCE_STEPS);
    }

    #[test]
    fn test_wire_field_names() {
        let req = GenerationRequest::new("a red fox in snow", ModelType::Sketch, AspectRatio::Square)
            .unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["prompt"], "a red fox in snow");
        assert_eq!(json["model_type"], "sketch");
        assert_eq!(json["width_height_ratio"], "1:1");
        assert_eq!(json["num_inference_steps"], 50);
        assert_eq!(json["guidance_scale"], 7.5);
    }

    #[test]
    fn test_variation_keeps_options() {
        let req = GenerationRequest::new("castle", ModelType::Fantasy, AspectRatio::Wide)
            .unwrap()
            .with_guidance_scale(9.0);
        let var = req.variation();
        assert_eq!(var.prompt(), "castle (variation)");
        assert_eq!(var.model_type(), ModelType::Fantasy);
        assert_eq!(var.aspect_ratio(), AspectRatio::Wide);
        assert_eq!(var.guidance_scale(), 9.0);
    }
}
