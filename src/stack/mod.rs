//! The Elasticsearch / Kibana / Fleet Server stack

mod lifecycle;
mod services;

pub use lifecycle::Stack;
pub use services::Service;
