//! Production collaborator factory
//!
//! Builds an [`AttlogSource`] and an [`HttpDeliveryChannel`] from the
//! effective configuration. The HTTP channel owns a connection pool, so it
//! is reused until the endpoint settings change.

use std::sync::Arc;

use parking_lot::Mutex;
use punchsync_core::{ConnectorFactory, DeliveryChannel, RecordSource};
use punchsync_domain::{Config, EndpointConfig, Result};

use crate::api::HttpDeliveryChannel;
use crate::device::AttlogSource;

#[derive(Default)]
pub struct InfraConnectors {
    channel: Mutex<Option<(EndpointConfig, Arc<HttpDeliveryChannel>)>>,
}

impl InfraConnectors {
    pub fn new() -> Self {
        Self::default()
    }

    fn channel_for(&self, config: &EndpointConfig) -> Result<Arc<HttpDeliveryChannel>> {
        let mut cached = self.channel.lock();
        if let Some((built_for, channel)) = cached.as_ref() {
            if built_for == config {
                return Ok(Arc::clone(channel));
            }
        }

        tracing::debug!(endpoint = %config.url, "Building delivery channel");
        let channel = Arc::new(HttpDeliveryChannel::from_config(config)?);
        *cached = Some((config.clone(), Arc::clone(&channel)));
        Ok(channel)
    }
}

impl ConnectorFactory for InfraConnectors {
    fn record_source(&self, config: &Config) -> Result<Arc<dyn RecordSource>> {
        Ok(Arc::new(AttlogSource::from_config(&config.device)))
    }

    fn delivery_channel(&self, config: &Config) -> Result<Arc<dyn DeliveryChannel>> {
        let channel: Arc<dyn DeliveryChannel> = self.channel_for(&config.endpoint)?;
        Ok(channel)
    }
}
