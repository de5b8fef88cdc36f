//! LLM provider backends and the fallback router.

pub mod anthropic;
pub mod base;
pub mod echo;
pub mod factory;
pub mod ollama;
pub mod openai_compat;
pub mod router;
