//! Self-signed certificate for the optional HTTPS listener

use anyhow::{Context, Result};
use rcgen::{CertificateParams, DnType, Ia5String, KeyPair, SanType};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};

use crate::config::TlsConfig;

const CERT_COMMON_NAME: &str = "EA Signal Bridge Local Server";
const CERT_ORG_NAME: &str = "EA Signal Bridge";

/// Resolved PEM locations
#[derive(Debug, Clone)]
pub struct CertificatePaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Make sure a certificate/key pair exists under `base_path`, generating one if
/// either file is missing. Existing files are never overwritten.
pub fn ensure_certificate(config: &TlsConfig, base_path: &Path) -> Result<CertificatePaths> {
    let paths = CertificatePaths {
        cert: base_path.join(&config.cert_path),
        key: base_path.join(&config.key_path),
    };

    if paths.cert.exists() && paths.key.exists() {
        tracing::info!("Certificate files found at {:?}", paths.cert);
        return Ok(paths);
    }

    tracing::info!("Certificate not found, generating new self-signed certificate");

    for path in [&paths.cert, &paths.key] {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create certificate directory: {:?}", parent))?;
        }
    }

    let (cert_pem, key_pem) = generate_self_signed_cert(config.validity_days)?;

    fs::write(&paths.cert, &cert_pem)
        .with_context(|| format!("Failed to write certificate to {:?}", paths.cert))?;
    fs::write(&paths.key, &key_pem)
        .with_context(|| format!("Failed to write private key to {:?}", paths.key))?;

    tracing::info!("Certificate files written successfully");
    Ok(paths)
}

/// Certificate for localhost, 127.0.0.1 and ::1; returns (cert PEM, key PEM)
fn generate_self_signed_cert(validity_days: u32) -> Result<(String, String)> {
    let key_pair = KeyPair::generate().context("Failed to generate key pair")?;

    let mut params = CertificateParams::default();
    params
        .distinguished_name
        .push(DnType::CommonName, CERT_COMMON_NAME);
    params
        .distinguished_name
        .push(DnType::OrganizationName, CERT_ORG_NAME);

    let localhost_dns =
        Ia5String::try_from("localhost").context("Failed to create Ia5String for localhost")?;
    params.subject_alt_names = vec![
        SanType::DnsName(localhost_dns),
        SanType::IpAddress(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        SanType::IpAddress(IpAddr::V6(Ipv6Addr::LOCALHOST)),
    ];

    let not_before = time::OffsetDateTime::now_utc();
    params.not_before = not_before;
    params.not_after = not_before + time::Duration::days(validity_days as i64);

    let cert = params
        .self_signed(&key_pair)
        .context("Failed to generate self-signed certificate")?;

    tracing::info!(
        "Generated self-signed certificate valid for {} days",
        validity_days
    );

    Ok((cert.pem(), key_pair.serialize_pem()))
}
