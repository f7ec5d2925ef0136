//! Speech provider adapters

pub mod elevenlabs;
pub mod openai;
