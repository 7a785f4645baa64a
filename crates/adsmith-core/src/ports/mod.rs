//! Ports - the seams between the orchestrator and the outside world.
//!
//! Every trait here has a production implementation (in this crate or in the
//! CLI) and a test double, so the orchestrator can be driven without network,
//! real time or disk.

pub mod clock;
pub mod credentials;
pub mod describer;
pub mod export;
pub mod history_storage;
pub mod id_generator;
pub mod scheduler;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::credentials::{
    Credential, CredentialFamily, CredentialProvider, EnvCredentialProvider, StaticCredentials,
};
pub use self::describer::Describer;
pub use self::export::{ArtifactExport, ExportError, default_filename};
pub use self::history_storage::HistoryStorage;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::scheduler::{Scheduler, TokioScheduler};
