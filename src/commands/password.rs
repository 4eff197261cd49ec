use std::io::BufRead;
use std::path::Path;

use anyhow::{bail, Context, Result};
use inquire::{Password, PasswordDisplayMode};

use crate::fleet::Fleet;
use crate::platform::HTPASSWD;
use crate::registry::TenantIdentity;

const MIN_LEN: usize = 8;

pub async fn run(config_path: Option<&Path>, ordinal: u32, from_stdin: bool) -> Result<()> {
    let (fleet, identity) = super::prepare_one(config_path, ordinal, &[HTPASSWD])?;

    let secret = if from_stdin {
        read_secret(std::io::stdin().lock())?
    } else {
        let prompt = format!("New password for {}:", identity.id);
        tokio::task::spawn_blocking(move || {
            Password::new(&prompt)
                .with_display_mode(PasswordDisplayMode::Masked)
                .with_custom_confirmation_message("Confirm password:")
                .with_custom_confirmation_error_message("Passwords do not match")
                .prompt()
        })
        .await
        .context("password prompt task failed")?
        .context("reading password")?
    };

    rotate(&fleet, &identity, &secret).await?;
    println!("Password updated for {}", identity.id);
    Ok(())
}

pub async fn rotate(fleet: &Fleet, identity: &TenantIdentity, secret: &str) -> Result<()> {
    check_secret(secret)?;
    fleet.rotate_password(identity, secret).await
}

/// First line of `input`, without its line terminator.
pub fn read_secret<R: BufRead>(mut input: R) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line).context("reading password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn check_secret(secret: &str) -> Result<()> {
    if secret.chars().count() < MIN_LEN {
        bail!("password must be at least {MIN_LEN} characters");
    }
    if secret.chars().any(char::is_control) {
        bail!("password must not contain control characters");
    }
    Ok(())
}
