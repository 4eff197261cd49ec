use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub const SECRET_LEN: usize = 24;

/// Writes hashed secrets into a tenant's credential file.
///
/// The file format is the reverse proxy's basic-auth store: one
/// `user:hash` line per user.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Replace the entry for `user` in `file`, creating the file if needed.
    async fn write_entry(&self, file: &Path, user: &str, secret: &str) -> Result<()>;

    /// Whether `file` already holds an entry for `user`.
    async fn has_entry(&self, file: &Path, user: &str) -> Result<bool> {
        match tokio::fs::read_to_string(file).await {
            Ok(content) => Ok(content
                .lines()
                .any(|line| line.split_once(':').is_some_and(|(u, h)| u == user && !h.is_empty()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("reading {}", file.display())),
        }
    }
}

/// [`CredentialStore`] that hashes with the `htpasswd` utility (bcrypt).
///
/// The secret is passed on stdin so it never shows up in the process list.
pub struct HtpasswdStore;

#[async_trait]
impl CredentialStore for HtpasswdStore {
    async fn write_entry(&self, file: &Path, user: &str, secret: &str) -> Result<()> {
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let mut child = Command::new("htpasswd")
            .arg("-i")
            .arg("-c")
            .arg("-B")
            .arg(file)
            .arg(user)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("running htpasswd")?;

        let mut stdin = child.stdin.take().context("htpasswd stdin was not captured")?;
        stdin.write_all(secret.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        drop(stdin);

        let output = child.wait_with_output().await.context("waiting on htpasswd")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("htpasswd failed for {}: {}", user, stderr.trim());
        }
        Ok(())
    }
}

/// Random alphanumeric secret for a newly provisioned tenant.
pub fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LEN)
        .map(char::from)
        .collect()
}

/// Plaintext distribution ledger of first-time secrets. Operators delete it
/// once the secrets are handed out.
pub fn ledger_path(install_root: &Path) -> PathBuf {
    install_root.join("credentials.txt")
}

/// Take an exclusive `flock` on `path`, creating it owner-only (0600) if
/// needed. The lock is released when the returned handle is dropped.
fn lock_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let file = options
        .open(path)
        .with_context(|| format!("opening lock file {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        // SAFETY: fd is valid for the lifetime of `file`
        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
        if rc != 0 {
            return Err(std::io::Error::last_os_error())
                .with_context(|| format!("locking {}", path.display()));
        }
    }

    Ok(file)
}

/// Serialize credential creation and rotation for one tenant across
/// processes. Different tenants never share a lock.
pub async fn lock_tenant(credentials_dir: &Path, tenant_id: &str) -> Result<File> {
    let path = credentials_dir.join(format!(".{tenant_id}.lock"));
    tokio::task::spawn_blocking(move || lock_file(&path))
        .await
        .context("credential lock task failed")?
}

/// Append a freshly generated secret to the plaintext ledger.
pub async fn append_ledger(ledger: &Path, tenant_id: &str, secret: &str) -> Result<()> {
    let ledger = ledger.to_path_buf();
    let line = format!("{} {} {}\n", Utc::now().to_rfc3339(), tenant_id, secret);
    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut file = lock_file(&ledger)?;
        // Tighten a ledger left behind by an older run with looser bits.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&ledger, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("restricting {}", ledger.display()))?;
        }
        file.write_all(line.as_bytes())
            .with_context(|| format!("appending to {}", ledger.display()))?;
        file.flush()?;
        Ok(())
    })
    .await
    .context("ledger task failed")?
}
