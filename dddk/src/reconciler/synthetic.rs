use std::sync::Arc;

use async_trait::async_trait;

use super::ResourceApi;
use crate::api::Synthetic;
use crate::client::DatadogApi;
use crate::error::Result;

/// Synthetic test writes, keyed by public id.
pub struct SyntheticApi {
    client: Arc<dyn DatadogApi>,
}

impl SyntheticApi {
    pub fn new(client: Arc<dyn DatadogApi>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceApi<Synthetic> for SyntheticApi {
    async fn create(&self, item: &Synthetic) -> Result<String> {
        self.client.create_synthetic(item).await
    }

    async fn update(&self, id: &str, item: &Synthetic) -> Result<()> {
        self.client.update_synthetic(id, item).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_synthetic(id).await
    }
}
