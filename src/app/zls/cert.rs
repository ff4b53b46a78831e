//! TLS/SSH certificate-check callback (spec §4.7/§6): libgit2 reports
//! whether it already validated the peer's certificate; when it didn't, the
//! user is shown what's available and asked whether to continue anyway.

use git2::{Cert, CertificateCheckStatus, Error as GitError};

use crate::app::prompt::Prompter;

/// Wired into `RemoteCallbacks::certificate_check` for both clone and
/// fetch. `valid` is libgit2's own pre-validation verdict; `host` is the
/// remote host being connected to.
pub fn check(
    cert: &Cert<'_>,
    valid: bool,
    host: &str,
    prompter: &dyn Prompter,
) -> Result<CertificateCheckStatus, GitError> {
    if valid {
        return Ok(CertificateCheckStatus::CertificatePassthrough);
    }

    tracing::warn!(
        target: "zigup::zls",
        "{host} presented a certificate libgit2 could not validate:\n{}",
        describe(cert)
    );

    if prompter.confirm(&format!("continue connecting to {host} anyway?"), None) {
        Ok(CertificateCheckStatus::CertificateOk)
    } else {
        Err(GitError::from_str("certificate rejected by user"))
    }
}

/// Renders whatever fields libgit2 actually exposes for this certificate
/// kind: parsed X.509 data, an SSH host key fingerprint, or — when neither
/// applies — a generic fallback.
fn describe(cert: &Cert<'_>) -> String {
    if let Some(hostkey) = cert.as_hostkey() {
        if let Some(sha256) = hostkey.hostkey_sha256() {
            return format!("SSH host key, SHA256 fingerprint {}", hex(sha256));
        }
        if let Some(sha1) = hostkey.hostkey_sha1() {
            return format!("SSH host key, SHA1 fingerprint {}", hex(sha1));
        }
        if let Some(raw) = hostkey.hostkey() {
            return format!("SSH host key ({} raw bytes, no fingerprint)", raw.len());
        }
        return "SSH host key (no data available)".to_string();
    }

    if let Some(x509) = cert.as_x509() {
        return format!("X.509 certificate ({} bytes of DER data)", x509.data().len());
    }

    "certificate in a form this build cannot parse further (raw data only)".to_string()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::prompt::ScriptedPrompter;

    #[test]
    fn hex_formats_bytes() {
        assert_eq!(hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
    }

    #[test]
    fn scripted_prompter_compiles_against_dyn_trait() {
        let prompter = ScriptedPrompter::default();
        let _: &dyn Prompter = &prompter;
    }
}
