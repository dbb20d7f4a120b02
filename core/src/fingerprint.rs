//! Login-and-inspect OS fingerprinting.
//!
//! Every host with an open SSH port is tried against the ordered
//! [`Profile`] list. The first profile that logs in and finds its marker in
//! the banner decides the host's [`OsKind`]; failures of any kind just move on
//! to the next profile.

pub mod profiles;

use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use edgeinv_common::config::Config;
use edgeinv_common::network::host::{ClassifiedHost, OsKind};

use crate::ssh::{RemoteExecutor, RemoteSession, SessionTarget};
use profiles::Profile;

pub struct Fingerprinter {
    executor: Arc<dyn RemoteExecutor>,
    profiles: Arc<[Profile]>,
    port: u16,
    attempt_timeout: Duration,
    max_concurrent: usize,
}

impl Fingerprinter {
    pub fn new(executor: Arc<dyn RemoteExecutor>, profiles: Vec<Profile>, cfg: &Config) -> Self {
        Self {
            executor,
            profiles: profiles.into(),
            port: cfg.ssh_port,
            attempt_timeout: cfg.ssh_timeout(),
            max_concurrent: cfg.max_concurrent_logins.max(1),
        }
    }

    /// Classifies every host, returning them in the iteration order of `hosts`.
    ///
    /// Hosts are fingerprinted concurrently; unknown hosts are included so the
    /// caller decides what to drop.
    pub async fn classify_all(&self, hosts: &BTreeSet<Ipv4Addr>) -> Vec<ClassifiedHost> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks: JoinSet<(usize, ClassifiedHost)> = JoinSet::new();

        for (idx, &addr) in hosts.iter().enumerate() {
            let executor = self.executor.clone();
            let profiles = self.profiles.clone();
            let semaphore = semaphore.clone();
            let (port, attempt_timeout) = (self.port, self.attempt_timeout);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let host =
                    classify_host(executor.as_ref(), &profiles, addr, port, attempt_timeout).await;
                (idx, host)
            });
        }

        let mut classified: Vec<(usize, ClassifiedHost)> = Vec::with_capacity(hosts.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => classified.push(entry),
                Err(e) => warn!("Fingerprint task failed: {e}"),
            }
        }

        classified.sort_by_key(|(idx, _)| *idx);
        classified.into_iter().map(|(_, host)| host).collect()
    }

    #[cfg(test)]
    async fn classify(&self, addr: Ipv4Addr) -> ClassifiedHost {
        classify_host(
            self.executor.as_ref(),
            &self.profiles,
            addr,
            self.port,
            self.attempt_timeout,
        )
        .await
    }
}

async fn classify_host(
    executor: &dyn RemoteExecutor,
    profiles: &[Profile],
    addr: Ipv4Addr,
    port: u16,
    attempt_timeout: Duration,
) -> ClassifiedHost {
    for profile in profiles {
        let target = SessionTarget {
            addr,
            port,
            username: profile.username.clone(),
            auth: profile.auth.clone(),
            timeout: attempt_timeout,
        };

        match attempt(executor, &target, profile).await {
            Ok(Some(host)) => {
                info!("Detected {} on host {addr}", host.os);
                return host;
            }
            Ok(None) => debug!("{addr}: banner does not match profile {}", profile.name),
            Err(e) => debug!("{addr}: profile {} failed: {e:#}", profile.name),
        }
    }

    warn!("Did not detect a known OS on host {addr}");
    ClassifiedHost::unknown(addr)
}

/// One login trial. The session is closed before returning, whatever happened.
async fn attempt(
    executor: &dyn RemoteExecutor,
    target: &SessionTarget,
    profile: &Profile,
) -> anyhow::Result<Option<ClassifiedHost>> {
    let mut session = timeout(target.timeout, executor.connect(target))
        .await
        .context("login timed out")??;

    let outcome = timeout(target.timeout, inspect(session.as_mut(), profile, target.addr)).await;
    session.close().await;

    outcome.context("remote commands timed out")?
}

async fn inspect(
    session: &mut dyn RemoteSession,
    profile: &Profile,
    addr: Ipv4Addr,
) -> anyhow::Result<Option<ClassifiedHost>> {
    let banner = session.exec(&profile.banner_command).await?;
    if !profile.matches(&banner) {
        return Ok(None);
    }

    let mut host = ClassifiedHost::new(addr, profile.kind);
    if let Some(command) = &profile.metric_command {
        let mhz = match session.exec(command).await {
            Ok(output) => profiles::parse_cpu_mhz(&output),
            Err(e) => {
                debug!("{addr}: metric probe failed: {e:#}");
                0
            }
        };
        host = host.with_cpu_mhz(mhz);
    }

    Ok(Some(host))
}

/// Hosts that classified as [`OsKind::Unknown`] take no further part.
pub fn known_only(hosts: Vec<ClassifiedHost>) -> Vec<ClassifiedHost> {
    hosts.into_iter().filter(|h| h.os != OsKind::Unknown).collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
