//! Stratus Cloud Services
//!
//! This crate provides the abstraction over the remote services the
//! provisioning workflow talks to, so the workflow can run against AWS or
//! against in-memory fakes in tests.
//!
//! # Services
//!
//! - **Object storage**: lifecycle policy lookup, object upload and delete
//! - **Role directory**: existence check for pre-existing IAM roles
//! - **Stack service**: describe / create / update stacks, stack events
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               stratus-provision                  │
//! │        (verify → package → upload → converge)    │
//! └─────────────────┬───────────────────────────────┘
//!                   │ CloudSession
//! ┌─────────────────▼───────────────────────────────┐
//! │                 stratus-cloud                    │
//! │  trait ObjectStore  trait RoleDirectory          │
//! │  trait StackService  RemoteErrorKind             │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │ stratus-cloud │
//!           │     -aws      │
//!           └───────────────┘
//! ```

pub mod error;
pub mod iam;
pub mod session;
pub mod stack;
pub mod storage;

// Re-exports
pub use error::{CloudError, RemoteErrorKind, Result};
pub use iam::RoleDirectory;
pub use session::CloudSession;
pub use stack::{
    CAPABILITY_IAM, CreateStackRequest, OnFailure, StackDescription, StackEvent, StackEventPage,
    StackOutput, StackService, StatusClass, UpdateStackRequest, classify_stack_status,
    is_failed_resource_status,
};
pub use storage::{LifecycleRule, ObjectBody, ObjectStore, UploadReceipt};
