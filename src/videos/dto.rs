use serde::Deserialize;

/// Longest prompt accepted by the generator.
pub const MAX_PROMPT_LENGTH: usize = 500;

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub prompt: String,
}
