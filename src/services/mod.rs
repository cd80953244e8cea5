pub mod exporter;
pub mod normalizer;
pub mod poller;

pub use exporter::{ExportFormat, ExportPayload};
pub use normalizer::{normalize, Normalized};
pub use poller::{JobStatusSource, PollOutcome, Poller};
