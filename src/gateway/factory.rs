use std::sync::Arc;
use crate::core::domain::Configuration;
use crate::gateway::assets::OwnershipService;
use crate::gateway::GatewayVia;
use crate::gateway::memory::service::MemoryOwnershipService;
use crate::gateway::rest::client::RestOwnershipService;

pub(crate) fn create_ownership_service(config: &Configuration) -> Arc<dyn OwnershipService> {
    match config.ownership_via {
        GatewayVia::Rest => {
            Arc::new(RestOwnershipService::new(config.ownership_service_url.as_str()))
        }
        GatewayVia::InMemory => {
            Arc::new(MemoryOwnershipService::new())
        }
    }
}
