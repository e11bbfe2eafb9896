//! Builder/publisher for drydock.
//!
//! One invocation is one deployment: run the external build toolchain
//! against a checked-out source tree, then walk its output directory and
//! publish every regular file to the object store under the project's
//! `builds/<project>/` prefix. The proxy finds the artifacts purely by
//! key convention; nothing else is shared.

pub mod pipeline;
pub mod publish;
pub mod toolchain;
pub mod walk;

pub use pipeline::{DeployError, build_and_publish};
pub use publish::{PublishReport, publish_tree};
pub use toolchain::{BuildError, run_toolchain};
pub use walk::{OutputFile, enumerate_files};
