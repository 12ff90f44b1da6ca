//! Dashboard writes.

use std::sync::Arc;

use async_trait::async_trait;

use super::ResourceApi;
use crate::api::Dashboard;
use crate::client::DatadogApi;
use crate::error::Result;

pub struct DashboardApi {
    client: Arc<dyn DatadogApi>,
}

impl DashboardApi {
    pub fn new(client: Arc<dyn DatadogApi>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceApi<Dashboard> for DashboardApi {
    async fn create(&self, item: &Dashboard) -> Result<String> {
        self.client.create_dashboard(item).await
    }

    async fn update(&self, id: &str, item: &Dashboard) -> Result<()> {
        self.client.update_dashboard(id, item).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_dashboard(id).await
    }
}
