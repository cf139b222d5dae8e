//! Ingest services
//!
//! The consumed external interfaces (document fetching, student
//! directory, review queue) and the components that drive one recording
//! through extraction, fusion, and naming.

pub mod document_fetcher;
pub mod file_namer;
pub mod pipeline;
pub mod review_queue;
pub mod student_directory;

pub use document_fetcher::{DocumentFetcher, LocalFileFetcher};
pub use file_namer::FileNamingEngine;
pub use pipeline::{IngestPipeline, ProcessedRecording, RecordingRequest};
pub use review_queue::{EventBusReviewQueue, ReviewQueue};
pub use student_directory::{DirectorySnapshot, InMemoryDirectory, StudentDirectory};
