//! Enclave Core Library
//!
//! Resolves the capabilities a sandbox receives from the host: bind mounts,
//! variable mappings, proxied host calls, network allow-lists and the
//! container image. Capabilities are grouped into named resource sets that
//! path-scoped apply rules activate.
//!
//! ```no_run
//! use enclave_core::{SandboxRequest, EnclaveResult};
//!
//! fn run() -> EnclaveResult<()> {
//!     let request = SandboxRequest::builder().path("services/api").build()?;
//!     let config = request.load_config()?;
//!     let plan = request.plan(&config)?;
//!
//!     plan.calls.authorize("deploy", "--env=dev")?;
//!     println!("image: {}", plan.image);
//!     Ok(())
//! }
//! ```

pub mod calls;
pub mod config;
pub mod error;
pub mod overlay;
pub mod plan;
pub mod request;
pub mod resource;

pub use calls::{CallEntry, CallTable, aggregate_calls};
pub use config::{ApplyRule, SandboxConfig, SandboxFile, ScopePath, load_from_file};
pub use error::{EnclaveError, EnclaveResult, ResourceLabel};
pub use overlay::{
    ImageSource, OverlayResolver, Resolution, ResolvedResource, order_paths, resolve,
};
pub use plan::SandboxPlan;
pub use request::{SandboxRequest, SandboxRequestBuilder};
pub use resource::{
    ArgsMatcher, Call, CallSpec, Mount, MountMode, MountSpec, Port, ResourceOptions, ResourceSet,
    ResourceSpec, VarMapping, normalize,
};
