//! DKGPedia Core Library
//!
//! Domain model and the client-side logic of the DKGPedia marketplace:
//! contradiction-driven article correction, analysis progress tracking,
//! the x402 payment gate, search merging and the scoped answer cache.
//!
//! Nothing in this crate performs network I/O directly. External services
//! are reached through the [`Corrector`], [`ProgressSource`] and
//! [`PaymentSigner`] traits, implemented in `dkgpedia-upstream`.

pub mod cache;
pub mod config;
pub mod correction;
pub mod error;
pub mod model;
pub mod payment;
pub mod progress;
pub mod search;

pub use cache::AnswerCache;
pub use config::Config;
pub use correction::{CorrectionPipeline, CorrectionReport, Corrector};
pub use error::{DkgError, DkgResult};
pub use model::{AnalysisResult, AnswerData, Contradiction, PaymentInfo, PaymentRequirements, SearchHit};
pub use payment::{GateDecision, PaymentGate, PaymentRequired, PaymentSigner};
pub use progress::{ProgressOutcome, ProgressSnapshot, ProgressSource, ProgressTracker};
