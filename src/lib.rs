pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod generator;
pub mod json_text;
pub mod normalize;
pub mod player;
pub mod prompt;
pub mod quiz;
pub mod repository;
pub mod service;
pub mod store;

// Convenient re-exports
pub use generator::QuizGenerator;
pub use prompt::QuizRequest;
pub use quiz::{Question, Quiz, QuizMetadata, StoredQuizRecord};
