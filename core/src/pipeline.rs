//! # Inventory Service
//!
//! Implements the "build an inventory" use case.
//!
//! Each stage consumes the whole output of the previous one and hands back a
//! new value; nothing is shared between runs:
//!
//! 1. **Enumerate** wired subnets.
//! 2. **Sweep** them for an open SSH port.
//! 3. **Fingerprint** every responsive host.
//! 4. **Assign roles** (router, compute nodes, derived groups).
//! 5. **Synthesize** the inventory document.

use std::sync::Arc;

use tracing::info;

use edgeinv_common::config::Config;
use edgeinv_common::inventory::InventoryDocument;

use crate::enumerator::{
    self, IfconfigConfigurator, InterfaceConfigurator, InterfaceSource, SystemInterfaces,
};
use crate::fingerprint::profiles::{self, Profile};
use crate::fingerprint::{self, Fingerprinter};
use crate::roles;
use crate::ssh::{RemoteExecutor, SshExecutor};
use crate::sweeper::{self, PortProbe, TcpConnectProbe};
use crate::synthesizer;

/// Orchestrates one discovery run through its collaborators.
pub struct InventoryService {
    interfaces: Box<dyn InterfaceSource>,
    configurator: Box<dyn InterfaceConfigurator>,
    probe: Arc<dyn PortProbe>,
    executor: Arc<dyn RemoteExecutor>,
    profiles: Vec<Profile>,
    cfg: Config,
}

impl InventoryService {
    pub fn new(
        interfaces: Box<dyn InterfaceSource>,
        configurator: Box<dyn InterfaceConfigurator>,
        probe: Arc<dyn PortProbe>,
        executor: Arc<dyn RemoteExecutor>,
        cfg: Config,
    ) -> Self {
        Self {
            interfaces,
            configurator,
            probe,
            executor,
            profiles: profiles::default_profiles(&cfg),
            cfg,
        }
    }

    /// Wires the service to the real network stack.
    pub fn system(cfg: Config) -> Self {
        let probe = Arc::new(TcpConnectProbe::new(cfg.probe_timeout()));
        Self::new(
            Box::new(SystemInterfaces),
            Box::new(IfconfigConfigurator),
            probe,
            Arc::new(SshExecutor),
            cfg,
        )
    }

    /// Runs every stage once and returns the finished document.
    ///
    /// Fatal conditions (no wired interface, several routers) are returned as
    /// [`edgeinv_common::error::DiscoveryError`] inside the `anyhow` error.
    pub async fn build_inventory(&self) -> anyhow::Result<InventoryDocument> {
        let subnets = enumerator::enumerate_subnets(
            self.interfaces.as_ref(),
            self.configurator.as_ref(),
            &self.cfg,
        )?;

        let ssh_hosts = sweeper::sweep(
            &subnets,
            self.probe.clone(),
            self.cfg.ssh_port,
            self.cfg.max_concurrent_probes,
        )
        .await;

        let fingerprinter =
            Fingerprinter::new(self.executor.clone(), self.profiles.clone(), &self.cfg);
        let classified = fingerprinter.classify_all(&ssh_hosts).await;
        let classified = fingerprint::known_only(classified);

        let roles = roles::assign_roles(classified)?;
        info!(
            "Classified {} compute node(s) and {} router(s)",
            roles.compute_nodes().count(),
            usize::from(roles.router.is_some())
        );

        Ok(synthesizer::synthesize(&roles, &self.cfg))
    }
}
