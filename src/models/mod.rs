//! Core data models for content acquisition and claim verification.

mod claim;
mod content;

pub use claim::{CandidateSource, ClaimVerificationResult};
pub use content::{
    AcquisitionOutcome, DocumentFormat, ExtractedContent, FailureKind, RawDocument,
    RetrievalRequest, StrategyKind, MIN_CONTENT_CHARS,
};
