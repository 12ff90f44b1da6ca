//! Monitor writes.
//!
//! Monitor ids are integers on the wire but strings in the reconciler and
//! lock file.

use std::sync::Arc;

use async_trait::async_trait;

use super::ResourceApi;
use crate::api::Monitor;
use crate::client::DatadogApi;
use crate::error::{Error, Result};

pub struct MonitorApi {
    client: Arc<dyn DatadogApi>,
}

impl MonitorApi {
    pub fn new(client: Arc<dyn DatadogApi>) -> Self {
        Self { client }
    }
}

pub fn parse_id(id: &str) -> Result<i64> {
    id.parse()
        .map_err(|_| Error::InvalidMonitorId(id.to_string()))
}

#[async_trait]
impl ResourceApi<Monitor> for MonitorApi {
    async fn create(&self, item: &Monitor) -> Result<String> {
        let id = self.client.create_monitor(item).await?;
        Ok(id.to_string())
    }

    async fn update(&self, id: &str, item: &Monitor) -> Result<()> {
        self.client.update_monitor(parse_id(id)?, item).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_monitor(parse_id(id)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("222").unwrap(), 222);
        assert!(matches!(
            parse_id("abc-123"),
            Err(Error::InvalidMonitorId(id)) if id == "abc-123"
        ));
    }
}
