//! Remote command execution over SSH.
//!
//! The fingerprinter only sees the [`RemoteExecutor`] / [`RemoteSession`]
//! pair; [`SshExecutor`] is the `russh` backed implementation. Unknown host
//! keys are accepted without prompting.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use russh::client;
use russh_keys::key::{KeyPair, PublicKey};
#[cfg(unix)]
use russh_keys::agent::client::AgentClient;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshAuth {
    Password(String),
    /// Private keys tried in order until one is accepted, then the identities
    /// held by `ssh-agent`, then the `none` method.
    KeyFiles(Vec<PathBuf>),
}

/// One authentication request sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthMethod<'a> {
    Password(&'a str),
    KeyFile(&'a Path),
    Agent,
    Passwordless,
}

impl fmt::Display for AuthMethod<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Password(_) => f.write_str("password"),
            AuthMethod::KeyFile(path) => write!(f, "key {}", path.display()),
            AuthMethod::Agent => f.write_str("ssh-agent"),
            AuthMethod::Passwordless => f.write_str("none"),
        }
    }
}

fn auth_methods(auth: &SshAuth) -> Vec<AuthMethod<'_>> {
    match auth {
        SshAuth::Password(password) => vec![AuthMethod::Password(password)],
        SshAuth::KeyFiles(paths) => paths
            .iter()
            .map(|path| AuthMethod::KeyFile(path))
            .chain([AuthMethod::Agent, AuthMethod::Passwordless])
            .collect(),
    }
}

/// Everything needed to open one session against one host.
#[derive(Debug, Clone)]
pub struct SessionTarget {
    pub addr: Ipv4Addr,
    pub port: u16,
    pub username: String,
    pub auth: SshAuth,
    pub timeout: Duration,
}

#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Opens and authenticates a session.
    async fn connect(&self, target: &SessionTarget) -> anyhow::Result<Box<dyn RemoteSession>>;
}

#[async_trait]
pub trait RemoteSession: Send {
    /// Runs `command` and returns its standard output.
    async fn exec(&mut self, command: &str) -> anyhow::Result<String>;

    /// Releases the session. Dropping a session releases it as well.
    async fn close(self: Box<Self>);
}

struct AcceptAnyHostKey;

#[async_trait]
impl client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

pub struct SshExecutor;

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn connect(&self, target: &SessionTarget) -> anyhow::Result<Box<dyn RemoteSession>> {
        let config = Arc::new(client::Config {
            inactivity_timeout: Some(target.timeout),
            ..Default::default()
        });

        let addr = SocketAddr::new(target.addr.into(), target.port);
        let stream = timeout(target.timeout, TcpStream::connect(addr))
            .await
            .with_context(|| format!("connection timeout to {addr}"))?
            .with_context(|| format!("failed to connect to {addr}"))?;

        let mut handle = client::connect_stream(config, stream, AcceptAnyHostKey).await?;

        if !authenticate(&mut handle, &target.username, &target.auth).await {
            let _ = handle
                .disconnect(russh::Disconnect::ByApplication, "", "en")
                .await;
            bail!("authentication failed for user '{}' on {addr}", target.username);
        }

        Ok(Box::new(SshSession { handle }))
    }
}

async fn authenticate(
    handle: &mut client::Handle<AcceptAnyHostKey>,
    username: &str,
    auth: &SshAuth,
) -> bool {
    for method in auth_methods(auth) {
        let accepted = match method {
            AuthMethod::Password(password) => {
                handle.authenticate_password(username, password).await
            }
            AuthMethod::KeyFile(path) => match load_private_key(path).await {
                Ok(key) => handle.authenticate_publickey(username, Arc::new(key)).await,
                Err(e) => {
                    trace!("{e:#}");
                    continue;
                }
            },
            AuthMethod::Agent => Ok(authenticate_with_agent(handle, username).await),
            AuthMethod::Passwordless => handle.authenticate_none(username).await,
        };
        match accepted {
            Ok(true) => return true,
            Ok(false) => trace!("{method} auth rejected for {username}"),
            Err(e) => trace!("{method} auth failed for {username}: {e}"),
        }
    }
    false
}

#[cfg(unix)]
async fn authenticate_with_agent(
    handle: &mut client::Handle<AcceptAnyHostKey>,
    username: &str,
) -> bool {
    let mut agent = match AgentClient::connect_env().await {
        Ok(agent) => agent,
        Err(e) => {
            trace!("ssh-agent unavailable: {e}");
            return false;
        }
    };
    let identities = match agent.request_identities().await {
        Ok(identities) => identities,
        Err(e) => {
            trace!("ssh-agent listed no identities: {e}");
            return false;
        }
    };

    for key in identities {
        let (returned, result) = handle.authenticate_future(username, key, agent).await;
        agent = returned;
        if let Ok(true) = result {
            return true;
        }
    }
    false
}

#[cfg(not(unix))]
async fn authenticate_with_agent(
    _handle: &mut client::Handle<AcceptAnyHostKey>,
    _username: &str,
) -> bool {
    false
}

async fn load_private_key(path: &Path) -> anyhow::Result<KeyPair> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read key file {}", path.display()))?;

    russh_keys::decode_secret_key(&content, None)
        .with_context(|| format!("failed to decode private key {}", path.display()))
}

struct SshSession {
    handle: client::Handle<AcceptAnyHostKey>,
}

#[async_trait]
impl RemoteSession for SshSession {
    async fn exec(&mut self, command: &str) -> anyhow::Result<String> {
        let mut channel = self.handle.channel_open_session().await?;
        channel.exec(true, command).await?;

        let mut stdout = Vec::new();
        loop {
            match channel.wait().await {
                Some(russh::ChannelMsg::Data { data }) => stdout.extend_from_slice(&data),
                Some(russh::ChannelMsg::Close) | None => break,
                _ => {}
            }
        }

        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    async fn close(self: Box<Self>) {
        let _ = self
            .handle
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await;
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
