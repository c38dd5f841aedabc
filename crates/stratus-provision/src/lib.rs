//! Stratus provisioning workflow
//!
//! Drives one deployment of a service from source to a converged
//! CloudFormation stack:
//!
//! ```text
//! VerifyRoles → Package → Upload → ExportResources → Converge
//! ```
//!
//! Each step works on a single [`WorkflowContext`]. Steps that create remote
//! side effects register [`RollbackAction`]s, which run concurrently when a
//! later step fails. In no-op mode every mutating remote call is replaced by
//! a log entry while the local work (build, packaging, template synthesis)
//! still runs.
//!
//! # Example
//!
//! ```ignore
//! use stratus_provision::{ProvisionOptions, provision};
//!
//! let session = stratus_cloud_aws::connect(None).await;
//! let options = ProvisionOptions::from_manifest(&manifest, None, session)?.with_noop(true);
//! provision(options).await?;
//! ```

pub mod context;
pub mod error;
pub mod poll;
pub mod rollback;
pub mod settings;
pub mod steps;
pub mod workflow;

pub use context::{SiteContext, WorkflowContext};
pub use error::{ProvisionError, Result};
pub use poll::PollPolicy;
pub use rollback::{RollbackAction, RollbackRegistry, RollbackReport};
pub use settings::ProvisionSettings;
pub use steps::converge::{capabilities, template_key};
pub use steps::export::{HOME_OUTPUT, VERSION_OUTPUT};
pub use workflow::{ProvisionOptions, Step, Transition, provision};
