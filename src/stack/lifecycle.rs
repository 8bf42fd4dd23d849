//! Stack lifecycle verbs on top of a container runtime

use tracing::{info, warn};

use super::services::Service;
use crate::config::StackConfig;
use crate::docker::{commands, parse_ps_output, ContainerRuntime, ContainerStatus};
use crate::error::Result;

/// The three-container stack driven through a [`ContainerRuntime`]
pub struct Stack<'a, R> {
    runtime: R,
    config: &'a StackConfig,
}

impl<'a, R: ContainerRuntime> Stack<'a, R> {
    pub fn new(runtime: R, config: &'a StackConfig) -> Self {
        Self { runtime, config }
    }

    /// Pull every image so `start` does not have to
    pub fn stage(&self) -> Result<()> {
        self.runtime.ensure_available()?;
        for service in Service::ALL {
            let image = service.image(self.config);
            info!(image = %image, "Pulling image");
            self.runtime.exec(&commands::pull(&image))?;
        }
        info!("Images staged");
        Ok(())
    }

    /// Create the network if needed and run every container detached
    pub fn start(&self) -> Result<()> {
        let version = self.runtime.ensure_available()?;
        info!(docker = %version, "Docker is available");

        self.ensure_network()?;

        for service in Service::ALL {
            let spec = service.container_spec(self.config);
            info!(container = %spec.name, image = %spec.image, "Starting container");
            self.runtime.exec(&commands::run_detached(&spec))?;
        }
        Ok(())
    }

    /// Stop and remove every container, then the network.
    ///
    /// Missing containers are expected here, so individual failures only warn.
    pub fn stop(&self) -> Result<()> {
        self.runtime.ensure_available()?;

        for service in Service::ALL {
            let name = service.container_name();
            match self.runtime.exec(&commands::stop(name)) {
                Ok(_) => info!(container = name, "Stopped"),
                Err(e) => warn!(container = name, error = %e, "Could not stop container"),
            }
            match self.runtime.exec(&commands::rm(name)) {
                Ok(_) => info!(container = name, "Removed"),
                Err(e) => warn!(container = name, error = %e, "Could not remove container"),
            }
        }

        match self.runtime.exec(&commands::network_rm(&self.config.network)) {
            Ok(_) => info!(network = %self.config.network, "Network removed"),
            Err(e) => warn!(network = %self.config.network, error = %e, "Could not remove network"),
        }
        Ok(())
    }

    pub fn restart(&self) -> Result<()> {
        self.runtime.ensure_available()?;
        let names = Service::names();
        info!(containers = ?names, "Restarting");
        self.runtime.exec(&commands::restart(&names))?;
        Ok(())
    }

    /// Current state of the stack's containers, in start order
    pub fn status(&self) -> Result<Vec<ContainerStatus>> {
        let names = Service::names();
        let output = self.runtime.exec(&commands::ps(&names))?;
        Ok(parse_ps_output(&output, &names))
    }

    fn ensure_network(&self) -> Result<()> {
        let network = &self.config.network;
        let existing = self.runtime.exec(&commands::network_ls(network))?;
        if existing.lines().any(|line| line.trim() == network) {
            info!(network = %network, "Network already exists");
            return Ok(());
        }
        self.runtime.exec(&commands::network_create(network))?;
        info!(network = %network, "Network created");
        Ok(())
    }
}
