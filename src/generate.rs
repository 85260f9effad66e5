use image::RgbaImage;
use tracing::{info, warn};

use crate::assets::decode_rgba;
use crate::error::{RoundelError, RoundelResult};

pub const DEFAULT_ENDPOINT: &str = "https://router.huggingface.co/hf-inference/models";

/// Ordered candidate models: primary first, fallback after it.
pub const DEFAULT_MODELS: [&str; 2] = [
    "stabilityai/stable-diffusion-2-1",
    "CompVis/stable-diffusion-v1-4",
];

#[derive(Clone, Copy, Debug)]
pub struct GenerateOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
        }
    }
}

/// Inference step count per model family. Schnell-style models converge in
/// a handful of steps; XL-style models need more.
pub fn steps_for_model(model: &str) -> u32 {
    let model = model.to_ascii_lowercase();
    if model.contains("schnell") {
        4
    } else if model.contains("dev") {
        20
    } else if model.contains("xl") {
        25
    } else {
        20
    }
}

#[derive(Debug, serde::Serialize)]
struct GeneratePayload<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Debug, serde::Serialize)]
struct GenerateParameters {
    width: u32,
    height: u32,
    num_inference_steps: u32,
}

/// Client for a text-to-image inference endpoint. Candidates are tried in
/// order until one returns an image; exhausting the list is the only
/// failure the caller sees.
pub struct Generator {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
    models: Vec<String>,
    opts: GenerateOptions,
}

impl Generator {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        models: Vec<String>,
        opts: GenerateOptions,
    ) -> RoundelResult<Self> {
        if models.is_empty() {
            return Err(RoundelError::validation(
                "generator needs at least one candidate model",
            ));
        }
        if opts.width == 0 || opts.height == 0 {
            return Err(RoundelError::validation(
                "generation width/height must be non-zero",
            ));
        }
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| RoundelError::generate(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
            models,
            opts,
        })
    }

    pub fn generate(&self, prompt: &str) -> RoundelResult<RgbaImage> {
        for model in &self.models {
            info!(%model, "requesting generation");
            match self.request_model(model, prompt) {
                Ok(img) => return Ok(img),
                Err(err) => warn!(%model, %err, "candidate failed, trying next"),
            }
        }
        Err(RoundelError::generate(format!(
            "all {} candidate models failed",
            self.models.len()
        )))
    }

    fn request_model(&self, model: &str, prompt: &str) -> RoundelResult<RgbaImage> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), model);
        let payload = GeneratePayload {
            inputs: prompt,
            parameters: GenerateParameters {
                width: self.opts.width,
                height: self.opts.height,
                num_inference_steps: steps_for_model(model),
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .map_err(|e| RoundelError::generate(format!("request to '{url}' failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RoundelError::generate(format!(
                "'{model}' returned HTTP {status}: {}",
                body.trim()
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| RoundelError::generate(format!("read response body: {e}")))?;
        decode_rgba(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_count_tracks_the_model_family() {
        assert_eq!(steps_for_model("black-forest-labs/FLUX.1-schnell"), 4);
        assert_eq!(steps_for_model("black-forest-labs/FLUX.1-dev"), 20);
        assert_eq!(steps_for_model("stabilityai/stable-diffusion-xl-base-1.0"), 25);
        assert_eq!(steps_for_model("stabilityai/stable-diffusion-2-1"), 20);
    }

    #[test]
    fn payload_serializes_to_the_wire_shape() {
        let payload = GeneratePayload {
            inputs: "a teal eagle",
            parameters: GenerateParameters {
                width: 256,
                height: 256,
                num_inference_steps: 20,
            },
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "inputs": "a teal eagle",
                "parameters": {
                    "width": 256,
                    "height": 256,
                    "num_inference_steps": 20,
                }
            })
        );
    }

    #[test]
    fn empty_candidate_list_is_rejected() {
        let result = Generator::new(DEFAULT_ENDPOINT, "token", vec![], GenerateOptions::default());
        assert!(matches!(result, Err(RoundelError::Validation(_))));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let opts = GenerateOptions {
            width: 0,
            height: 256,
        };
        assert!(Generator::new(DEFAULT_ENDPOINT, "token", vec!["m".into()], opts).is_err());
    }
}
