//! Container descriptions passed to and read back from docker

use serde::{Deserialize, Serialize};

/// Host-to-container port mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortBinding {
    pub host: u16,
    pub container: u16,
}

impl PortBinding {
    /// Same port on both sides
    pub fn same(port: u16) -> Self {
        Self {
            host: port,
            container: port,
        }
    }

    pub fn as_arg(&self) -> String {
        format!("{}:{}", self.host, self.container)
    }
}

/// Everything needed to `docker run` one detached container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub network: String,
    pub env: Vec<(String, String)>,
    pub ports: Vec<PortBinding>,
}

impl ContainerSpec {
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// One row of `docker ps --format '{{json .}}'`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    #[serde(rename(deserialize = "Names"))]
    pub name: String,
    #[serde(rename(deserialize = "Image"), default)]
    pub image: String,
    /// `running`, `exited`, ... (absent on very old engines)
    #[serde(rename(deserialize = "State"), default)]
    pub state: String,
    /// Human status such as `Up 3 minutes`
    #[serde(rename(deserialize = "Status"), default)]
    pub status: String,
    #[serde(rename(deserialize = "Ports"), default)]
    pub ports: String,
}

impl ContainerStatus {
    pub fn is_running(&self) -> bool {
        self.state == "running" || self.status.starts_with("Up")
    }
}
