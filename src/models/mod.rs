pub mod book;
pub mod catalog;
pub mod question;

pub use book::{derive_external_key, BookRef, JobHandle};
pub use catalog::{Category, DifficultyRange};
pub use question::{GenerationRequest, QuestionRecord, QuestionSet, QuestionStats};
