//! Kibana API seam and its reqwest implementation
//!
//! The step only needs three calls: a readiness probe, the detection-engine
//! enable call and the prepackaged-rule install. [`Dashboard`] describes them
//! so the state machine can run against a fake; [`KibanaClient`] is the real
//! thing.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::config::{Credentials, StackConfig};
use crate::error::{Result, StackError};

/// Status Kibana answers on `/` once it has finished booting
pub const READY_STATUS: u16 = 302;

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP verb of a fixed Kibana endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Head,
    Post,
    Put,
}

impl ApiMethod {
    fn as_reqwest(self) -> Method {
        match self {
            ApiMethod::Head => Method::HEAD,
            ApiMethod::Post => Method::POST,
            ApiMethod::Put => Method::PUT,
        }
    }
}

/// What a successful answer from an endpoint looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessMarker {
    /// A specific status code
    Status(u16),
    /// A JSON body with `"acknowledged": true`
    Acknowledged,
    /// The answer is not inspected
    Unchecked,
}

/// A fixed path on the Kibana base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardEndpoint {
    pub name: &'static str,
    pub method: ApiMethod,
    pub path: &'static str,
    pub success: SuccessMarker,
}

pub const READINESS_PROBE: DashboardEndpoint = DashboardEndpoint {
    name: "readiness probe",
    method: ApiMethod::Head,
    path: "/",
    success: SuccessMarker::Status(READY_STATUS),
};

pub const DETECTION_ENGINE_INDEX: DashboardEndpoint = DashboardEndpoint {
    name: "detection engine index",
    method: ApiMethod::Post,
    path: "/api/detection_engine/index",
    success: SuccessMarker::Acknowledged,
};

pub const PREPACKAGED_RULES: DashboardEndpoint = DashboardEndpoint {
    name: "prepackaged rules",
    method: ApiMethod::Put,
    path: "/api/detection_engine/rules/prepackaged",
    success: SuccessMarker::Unchecked,
};

impl DashboardEndpoint {
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path)
    }

    /// Whether an answer carries this endpoint's success marker
    pub fn accepts(&self, status: u16, body: &str) -> bool {
        match self.success {
            SuccessMarker::Status(expected) => status == expected,
            SuccessMarker::Acknowledged => serde_json::from_str::<Acknowledgement>(body)
                .map(|ack| ack.acknowledged)
                .unwrap_or(false),
            SuccessMarker::Unchecked => true,
        }
    }
}

/// Outcome of one readiness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessSignal {
    Ready,
    NotReady(u16),
    /// The probe could not complete (refused, reset, timed out)
    Unreachable,
}

impl ReadinessSignal {
    pub fn from_status(status: u16) -> Self {
        if READINESS_PROBE.accepts(status, "") {
            ReadinessSignal::Ready
        } else {
            ReadinessSignal::NotReady(status)
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ReadinessSignal::Ready)
    }
}

/// Raw answer to the detection-engine enable call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnableResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Deserialize)]
struct Acknowledgement {
    #[serde(default)]
    acknowledged: bool,
}

impl EnableResponse {
    /// True only for a JSON body whose `acknowledged` field is `true`
    pub fn is_acknowledged(&self) -> bool {
        DETECTION_ENGINE_INDEX.accepts(self.status, &self.body)
    }
}

/// The Kibana calls the configuration step depends on
pub trait Dashboard {
    fn probe(&self) -> ReadinessSignal;

    fn enable_detection_engine(&self) -> Result<EnableResponse>;

    /// Returns the HTTP status of the install call
    fn install_prepackaged_rules(&self) -> Result<u16>;
}

impl<T: Dashboard + ?Sized> Dashboard for &T {
    fn probe(&self) -> ReadinessSignal {
        (**self).probe()
    }

    fn enable_detection_engine(&self) -> Result<EnableResponse> {
        (**self).enable_detection_engine()
    }

    fn install_prepackaged_rules(&self) -> Result<u16> {
        (**self).install_prepackaged_rules()
    }
}

/// Blocking Kibana API client
pub struct KibanaClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    stack_version: String,
}

impl KibanaClient {
    pub fn new(config: &StackConfig) -> Result<Self> {
        let client = Client::builder()
            // 302 is the readiness signal, so redirects must surface as-is.
            .redirect(Policy::none())
            .timeout(config.http.request_timeout)
            .connect_timeout(config.http.request_timeout.min(MAX_CONNECT_TIMEOUT))
            .danger_accept_invalid_certs(!config.http.verify_tls)
            .build()
            .map_err(|e| StackError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.kibana_url.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone(),
            stack_version: config.stack_version.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_request(&self, endpoint: &DashboardEndpoint) -> RequestBuilder {
        self.client
            .request(endpoint.method.as_reqwest(), endpoint.url(&self.base_url))
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header("kbn-version", &self.stack_version)
            .header("kbn-xsrf", "kibana")
            .header(CONTENT_TYPE, "application/json")
    }
}

impl Dashboard for KibanaClient {
    fn probe(&self) -> ReadinessSignal {
        let url = READINESS_PROBE.url(&self.base_url);
        // No credentials: only the status of the anonymous root is read.
        match self
            .client
            .request(READINESS_PROBE.method.as_reqwest(), &url)
            .send()
        {
            Ok(response) => ReadinessSignal::from_status(response.status().as_u16()),
            Err(err) => {
                debug!(url = %url, error = %err, "readiness probe did not complete");
                ReadinessSignal::Unreachable
            }
        }
    }

    fn enable_detection_engine(&self) -> Result<EnableResponse> {
        let response = self
            .api_request(&DETECTION_ENGINE_INDEX)
            .send()
            .map_err(|e| StackError::transport(DETECTION_ENGINE_INDEX.name, &e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| StackError::transport(DETECTION_ENGINE_INDEX.name, &e))?;
        debug!(status, body = %body, "detection engine index answered");
        Ok(EnableResponse { status, body })
    }

    fn install_prepackaged_rules(&self) -> Result<u16> {
        let response = self
            .api_request(&PREPACKAGED_RULES)
            .send()
            .map_err(|e| StackError::transport(PREPACKAGED_RULES.name, &e))?;
        Ok(response.status().as_u16())
    }
}
