use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{
    Assertion, Synthetic, SyntheticConfig, SyntheticOptions, SyntheticRequest,
};
use crate::app::{Component, Container};

const LOCATIONS: [&str; 3] = ["aws:ap-northeast-1", "aws:us-east-2", "aws:eu-west-1"];

/// An API synthetic that expects a 200 from `url` every minute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Healthcheck {
    pub url: String,
}

impl Healthcheck {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Component for Healthcheck {
    fn apply(&self, container: &mut dyn Container) {
        let app = container.name().to_string();

        let synthetic = Synthetic {
            name: String::new(),
            kind: "api".to_string(),
            subtype: None,
            message: format!("Unable to reach {}, are you sure {} is up?", self.url, app),
            tags: Vec::new(),
            locations: LOCATIONS.iter().map(|l| l.to_string()).collect(),
            config: SyntheticConfig {
                request: SyntheticRequest {
                    method: "GET".to_string(),
                    url: self.url.clone(),
                    timeout: Some(30),
                    port: Some(443),
                    headers: None,
                    body: None,
                },
                assertions: vec![Assertion {
                    kind: "statusCode".to_string(),
                    operator: "is".to_string(),
                    target: json!(200),
                    property: None,
                }],
            },
            options: SyntheticOptions {
                tick_every: 60,
                min_failure_duration: Some(90),
                min_location_failed: Some(1),
                ..Default::default()
            },
            status: None,
        };

        container.add_synthetic(&format!("Healthcheck for {app}"), synthetic);
    }
}
