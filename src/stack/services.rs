//! The three services of the stack and how each one is run

use crate::config::{
    StackConfig, ELASTICSEARCH_HTTP_PORT, ELASTICSEARCH_TRANSPORT_PORT, FLEET_SERVER_PORT,
    KIBANA_PORT,
};
use crate::docker::{ContainerSpec, PortBinding};

/// A container of the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Elasticsearch,
    Kibana,
    FleetServer,
}

impl Service {
    /// Start order: each service depends on the ones before it
    pub const ALL: [Service; 3] = [Service::Elasticsearch, Service::Kibana, Service::FleetServer];

    /// Container name, also its hostname on the stack network
    pub fn container_name(&self) -> &'static str {
        match self {
            Service::Elasticsearch => "elasticsearch",
            Service::Kibana => "kibana",
            Service::FleetServer => "fleet-server",
        }
    }

    /// Repository under `docker.elastic.co`
    pub fn repository(&self) -> &'static str {
        match self {
            Service::Elasticsearch => "elasticsearch/elasticsearch",
            Service::Kibana => "kibana/kibana",
            Service::FleetServer => "beats/elastic-agent",
        }
    }

    pub fn ports(&self) -> Vec<PortBinding> {
        match self {
            Service::Elasticsearch => vec![
                PortBinding::same(ELASTICSEARCH_HTTP_PORT),
                PortBinding::same(ELASTICSEARCH_TRANSPORT_PORT),
            ],
            Service::Kibana => vec![PortBinding::same(KIBANA_PORT)],
            Service::FleetServer => vec![PortBinding::same(FLEET_SERVER_PORT)],
        }
    }

    /// URL other containers use to reach this service
    pub fn internal_url(&self) -> String {
        let port = match self {
            Service::Elasticsearch => ELASTICSEARCH_HTTP_PORT,
            Service::Kibana => KIBANA_PORT,
            Service::FleetServer => FLEET_SERVER_PORT,
        };
        format!("http://{}:{}", self.container_name(), port)
    }

    pub fn image(&self, config: &StackConfig) -> String {
        config.image(self.repository())
    }

    pub fn container_spec(&self, config: &StackConfig) -> ContainerSpec {
        ContainerSpec {
            name: self.container_name().to_string(),
            image: self.image(config),
            network: config.network.clone(),
            env: self.env(config),
            ports: self.ports(),
        }
    }

    /// Container names of every service, in start order
    pub fn names() -> [&'static str; 3] {
        Service::ALL.map(|s| s.container_name())
    }

    fn env(&self, config: &StackConfig) -> Vec<(String, String)> {
        let creds = &config.credentials;
        let es_url = Service::Elasticsearch.internal_url();
        let pairs: Vec<(&str, String)> = match self {
            Service::Elasticsearch => vec![
                ("discovery.type", "single-node".into()),
                ("xpack.security.enabled", "true".into()),
                ("xpack.security.authc.api_key.enabled", "true".into()),
                ("ELASTIC_PASSWORD", creds.password.clone()),
                ("ES_JAVA_OPTS", "-Xms1g -Xmx1g".into()),
            ],
            Service::Kibana => vec![
                ("ELASTICSEARCH_HOSTS", es_url.clone()),
                ("ELASTICSEARCH_USERNAME", creds.username.clone()),
                ("ELASTICSEARCH_PASSWORD", creds.password.clone()),
                ("XPACK_SECURITY_ENCRYPTIONKEY", config.encryption_key.clone()),
                (
                    "XPACK_ENCRYPTEDSAVEDOBJECTS_ENCRYPTIONKEY",
                    config.encryption_key.clone(),
                ),
                ("XPACK_REPORTING_ENCRYPTIONKEY", config.encryption_key.clone()),
                (
                    "XPACK_FLEET_AGENTS_ELASTICSEARCH_HOSTS",
                    format!("[\"{}\"]", es_url),
                ),
                (
                    "XPACK_FLEET_AGENTS_FLEET_SERVER_HOSTS",
                    format!("[\"{}\"]", Service::FleetServer.internal_url()),
                ),
            ],
            Service::FleetServer => vec![
                ("FLEET_SERVER_ENABLE", "1".into()),
                ("FLEET_SERVER_INSECURE_HTTP", "1".into()),
                ("FLEET_SERVER_ELASTICSEARCH_HOST", es_url.clone()),
                ("FLEET_SERVER_ELASTICSEARCH_USERNAME", creds.username.clone()),
                ("FLEET_SERVER_ELASTICSEARCH_PASSWORD", creds.password.clone()),
                ("KIBANA_FLEET_SETUP", "1".into()),
                ("KIBANA_FLEET_HOST", Service::Kibana.internal_url()),
                ("KIBANA_FLEET_USERNAME", creds.username.clone()),
                ("KIBANA_FLEET_PASSWORD", creds.password.clone()),
            ],
        };

        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.container_name())
    }
}
