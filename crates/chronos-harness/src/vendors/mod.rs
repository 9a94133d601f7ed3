/// Google Gemini `generateContent` image generation.
pub mod gemini;
