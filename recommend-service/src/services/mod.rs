pub mod gemini_service;
pub mod gemini_types;
