use std::sync::Arc;

use async_trait::async_trait;

use super::ResourceApi;
use crate::api::Slo;
use crate::client::DatadogApi;
use crate::error::Result;

pub struct SloApi {
    client: Arc<dyn DatadogApi>,
}

impl SloApi {
    pub fn new(client: Arc<dyn DatadogApi>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceApi<Slo> for SloApi {
    async fn create(&self, item: &Slo) -> Result<String> {
        self.client.create_slo(item).await
    }

    async fn update(&self, id: &str, item: &Slo) -> Result<()> {
        self.client.update_slo(id, item).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_slo(id).await
    }
}
