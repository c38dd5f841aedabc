//! Stratus build and packaging
//!
//! This crate compiles the service binary for the Lambda target, generates
//! the Node.js adapter (`index.js`), and writes the ZIP archives that are
//! uploaded to S3: the code package and the optional static site.

pub mod adapter;
pub mod archive;
pub mod assets;
pub mod error;
pub mod package;
pub mod progress;
pub mod toolchain;

pub use adapter::{GENERATED_MARKER, generate_adapter};
pub use error::{BuildError, Result};
pub use package::{PackageRequest, PackagedArchive, binary_name, package, package_site};
pub use progress::BuildProgress;
pub use toolchain::{CargoToolchain, CompileRequest, Toolchain};
