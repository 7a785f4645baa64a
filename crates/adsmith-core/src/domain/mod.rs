//! Domain model (briefs, requests, artifacts, outcomes, errors).
//!
//! I/O を持たない純粋な型だけを置きます。

pub mod artifact;
pub mod brief;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod poll;
pub mod request;

pub use artifact::{Artifact, ContentRef, HistoryEntry, InlinePayload};
pub use brief::{AspectRatio, Brief, MediaClass, ReferenceAsset, ServiceId, SizeSelector};
pub use errors::{ErrorKind, GenerationError, HistoryError, RegistryError};
pub use ids::{ArtifactId, RequestId};
pub use outcome::{
    Generation, Rejection, RejectionKind, SubmitOutcome, TaskHandle, TaskStatus,
};
pub use poll::{PollConfig, PollState};
pub use request::GenerationRequest;
