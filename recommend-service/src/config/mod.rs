pub mod default_config;
pub mod gemini_model_config;
pub mod grounding_tool;
