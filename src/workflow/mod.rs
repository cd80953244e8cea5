pub mod generation_flow;
pub mod upload_flow;

pub use generation_flow::{GenerationFlow, GenerationReport, GenerationSource};
pub use upload_flow::UploadFlow;
