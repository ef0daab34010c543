mod errors;
mod fetch;
mod github;
mod guard;
mod reconcile;
mod registry;

pub use errors::{InstallError, SourceError, UninstallError, UpdateError};
pub use fetch::{FetchError, FetchedTree, ModuleFetcher};
pub use github::GitHubArchiveFetcher;
pub use guard::{ModuleHost, NoHost, SelfGuard};
pub use reconcile::{resolve_source, stage_resolved, validate_module_name, ResolvedSource};
pub use registry::{
    BatchItem, BatchReport, InstallOutcome, LifecycleRegistry, QueryOutcome, ReloadDisposition,
    UninstallOutcome, UpdateOutcome,
};
