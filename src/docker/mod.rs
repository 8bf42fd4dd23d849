//! Docker plumbing: argument builders, the runtime seam, `docker ps` parsing.

pub mod commands;
pub mod engine;
pub mod types;

pub use commands::parse_ps_output;
pub use engine::{ContainerRuntime, DockerCli};
pub use types::{ContainerSpec, ContainerStatus, PortBinding};
