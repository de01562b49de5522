//! The SSH bootstrap session.
//!
//! Turns a freshly provisioned host, which may still be booting, into a
//! host running the target application: connect within a bounded retry
//! budget, stage the bootstrap script and the content archive, then run
//! the script with elevated privileges and judge success by the remote
//! exit status alone.

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use skylift_core::error::{DeployError, Result};
use ssh2::{HostKeyType, Session};
use tracing::{info, warn};

use crate::hostkey::{HostKeyPolicy, TrustOnFirstUse};
use crate::retry::{retry, RetrySchedule};
use crate::BootstrapRunner;

/// Fixed remote account provisioned by the declaration's metadata entry.
pub const REMOTE_USER: &str = "deploy";
pub const REMOTE_SSH_PORT: u16 = 22;

/// Fixed staging paths on the remote host.
pub const SCRIPT_STAGING_PATH: &str = "/tmp/bootstrap.sh";
pub const ARCHIVE_STAGING_PATH: &str = "/tmp/app-content.tar.gz";

/// Reachability budget: a fresh instance can take a few minutes to boot.
pub const CONNECT_ATTEMPTS: u32 = 10;
pub const CONNECT_INTERVAL: Duration = Duration::from_secs(15);

const TCP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const STDERR_TAIL_LINES: usize = 20;

fn ssh_err(context: &str, e: ssh2::Error) -> DeployError {
    DeployError::Internal(format!("{}: {}", context, e))
}

fn key_algorithm_name(key_type: HostKeyType) -> &'static str {
    match key_type {
        HostKeyType::Rsa => "ssh-rsa",
        HostKeyType::Dss => "ssh-dss",
        HostKeyType::Ecdsa256 => "ecdsa-sha2-nistp256",
        HostKeyType::Ecdsa384 => "ecdsa-sha2-nistp384",
        HostKeyType::Ecdsa521 => "ecdsa-sha2-nistp521",
        HostKeyType::Ed25519 => "ssh-ed25519",
        _ => "unknown",
    }
}

/// Decides what an exhausted or aborted connection loop reports.
/// Policy and authentication refusals are final answers from the host and
/// surface unchanged; everything else is a reachability failure carrying
/// the last underlying error.
fn classify_connect_failure(host: &str, attempts: u32, err: DeployError) -> DeployError {
    match err {
        err @ DeployError::Config(_) => err,
        other => DeployError::UnreachableHost {
            host: host.to_string(),
            attempts,
            reason: other.to_string(),
        },
    }
}

/// SSH implementation of [`BootstrapRunner`].
pub struct SshBootstrap {
    policy: Box<dyn HostKeyPolicy>,
    schedule: RetrySchedule,
    port: u16,
}

impl Default for SshBootstrap {
    fn default() -> Self {
        Self::new()
    }
}

impl SshBootstrap {
    pub fn new() -> Self {
        Self {
            policy: Box::new(TrustOnFirstUse::new()),
            schedule: RetrySchedule::new(CONNECT_ATTEMPTS, CONNECT_INTERVAL),
            port: REMOTE_SSH_PORT,
        }
    }

    pub fn with_policy(mut self, policy: Box<dyn HostKeyPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_schedule(mut self, schedule: RetrySchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    fn connect_once(&self, host: &str, private_key: &Path) -> Result<Session> {
        let addr: SocketAddr = (host, self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| DeployError::Config(format!("Could not resolve host: {}", host)))?;

        let tcp = TcpStream::connect_timeout(&addr, TCP_CONNECT_TIMEOUT)?;
        let mut session = Session::new().map_err(|e| ssh_err("SSH session setup failed", e))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| ssh_err("SSH handshake failed", e))?;

        if let Some((key, key_type)) = session.host_key() {
            self.policy
                .verify(host, key_algorithm_name(key_type), key)?;
        }

        session
            .userauth_pubkey_file(REMOTE_USER, None, private_key, None)
            .map_err(|e| ssh_err("SSH authentication failed", e))?;
        if !session.authenticated() {
            return Err(DeployError::Config(format!(
                "SSH authentication was not accepted for {}@{}",
                REMOTE_USER, host
            )));
        }

        Ok(session)
    }

    fn connect(&self, host: &str, private_key: &Path) -> Result<Session> {
        info!("Connecting to {}@{}:{}", REMOTE_USER, host, self.port);
        retry(
            &self.schedule,
            "SSH connection",
            |_attempt| self.connect_once(host, private_key),
            |e| !matches!(e, DeployError::Config(_)),
        )
        .map_err(|e| classify_connect_failure(host, self.schedule.attempts, e))
    }

    fn upload(session: &Session, bytes: &[u8], remote_path: &str, mode: i32) -> Result<()> {
        info!("Uploading {} bytes to {}", bytes.len(), remote_path);
        let mut channel = session
            .scp_send(Path::new(remote_path), mode, bytes.len() as u64, None)
            .map_err(|e| ssh_err("SCP transfer setup failed", e))?;
        channel.write_all(bytes)?;
        channel
            .send_eof()
            .and_then(|_| channel.wait_eof())
            .and_then(|_| channel.close())
            .and_then(|_| channel.wait_close())
            .map_err(|e| ssh_err("SCP transfer teardown failed", e))?;
        Ok(())
    }

    /// Runs the staged script under sudo with a PTY, streaming remote
    /// stdout line-by-line as it arrives so partial progress is visible
    /// before the outcome is known.
    fn execute_bootstrap(session: &Session) -> Result<()> {
        let mut channel = session
            .channel_session()
            .map_err(|e| ssh_err("Could not open exec channel", e))?;
        // Some installers refuse to run fully detached.
        channel
            .request_pty("xterm", None, None)
            .map_err(|e| ssh_err("PTY request failed", e))?;
        channel
            .exec(&format!("sudo bash {}", SCRIPT_STAGING_PATH))
            .map_err(|e| ssh_err("Remote exec failed", e))?;

        for line in BufReader::new(&mut channel).lines() {
            info!("[remote] {}", line?);
        }

        let mut stderr = String::new();
        channel.stderr().read_to_string(&mut stderr)?;

        channel
            .wait_close()
            .map_err(|e| ssh_err("Channel close failed", e))?;
        let status = channel
            .exit_status()
            .map_err(|e| ssh_err("Could not read remote exit status", e))?;

        if status != 0 {
            let lines: Vec<&str> = stderr.lines().collect();
            let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
            return Err(DeployError::RemoteScript {
                status,
                tail: lines[start..].join("\n"),
            });
        }
        info!("Bootstrap script finished successfully");
        Ok(())
    }

    fn drive(session: &Session, script: &Path, archive: &Path) -> Result<()> {
        let script_bytes = fs::read(script)?;
        let archive_bytes = fs::read(archive)?;

        // Both artifacts are staged before execution begins.
        Self::upload(session, &script_bytes, SCRIPT_STAGING_PATH, 0o755)?;
        Self::upload(session, &archive_bytes, ARCHIVE_STAGING_PATH, 0o644)?;

        Self::execute_bootstrap(session)
    }
}

impl BootstrapRunner for SshBootstrap {
    fn run(&self, host: &str, private_key: &Path, script: &Path, archive: &Path) -> Result<()> {
        let session = self.connect(host, private_key)?;
        let result = Self::drive(&session, script, archive);

        // Closed regardless of the bootstrap outcome.
        if let Err(e) = session.disconnect(None, "bootstrap session closed", None) {
            warn!("SSH disconnect failed: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use tempfile::TempDir;

    // Bind then drop a listener so the port is known to refuse connections.
    fn refused_port() -> anyhow::Result<u16> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        Ok(listener.local_addr()?.port())
    }

    #[test]
    fn exhausted_schedule_reports_unreachable_host() -> anyhow::Result<()> {
        let scratch = TempDir::new()?;
        let key = scratch.path().join("id_rsa");
        std::fs::write(&key, "")?;

        let bootstrap = SshBootstrap::new()
            .with_schedule(RetrySchedule::new(3, Duration::ZERO))
            .with_port(refused_port()?);
        let err = bootstrap
            .connect("127.0.0.1", &key)
            .err()
            .expect("closed port must exhaust the schedule");

        match err {
            DeployError::UnreachableHost {
                host,
                attempts,
                reason,
            } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(attempts, 3);
                assert!(!reason.is_empty());
            }
            other => panic!("expected UnreachableHost, got: {}", other),
        }
        Ok(())
    }

    #[test]
    fn host_refusals_surface_unchanged() {
        let err = classify_connect_failure("h", 3, DeployError::Config("key rejected".into()));
        match err {
            DeployError::Config(msg) => assert_eq!(msg, "key rejected"),
            other => panic!("expected Config to pass through, got: {}", other),
        }
    }

    #[test]
    fn exhausted_failures_carry_the_last_error() {
        let err = classify_connect_failure(
            "203.0.113.5",
            10,
            DeployError::Internal("handshake reset".into()),
        );
        match err {
            DeployError::UnreachableHost {
                host,
                attempts,
                reason,
            } => {
                assert_eq!(host, "203.0.113.5");
                assert_eq!(attempts, 10);
                assert!(reason.contains("handshake reset"));
            }
            other => panic!("expected UnreachableHost, got: {}", other),
        }
    }
}
