//! TLS client configuration.

use super::ConnectionError;
use crate::config::TlsPaths;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tracing::warn;

/// Build a client config presenting the profile's certificate.
///
/// Trusted roots are the native root set, or exactly the certificates in the
/// CA file when one is configured.
pub fn client_config(paths: &TlsPaths) -> Result<Arc<ClientConfig>, ConnectionError> {
    let certs = load_certs(&paths.cert)?;
    let key = load_key(&paths.key)?;

    let roots = match &paths.ca {
        Some(ca) => {
            let mut roots = RootCertStore::empty();
            let (added, _ignored) = roots.add_parsable_certificates(load_certs(ca)?);
            if added == 0 {
                return Err(ConnectionError::ConnectFailed(format!(
                    "no certificates found in {}",
                    ca.display()
                )));
            }
            roots
        }
        None => native_roots(),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_client_auth_cert(certs, key)
        .map_err(|e| ConnectionError::Tls(e.to_string()))?;

    Ok(Arc::new(config))
}

fn native_roots() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    let native = rustls_native_certs::load_native_certs();
    for cert in native.certs {
        if let Err(e) = roots.add(cert) {
            warn!(error = %e, "Failed to add root cert");
        }
    }
    for e in &native.errors {
        warn!(error = %e, "Error loading native certs");
    }
    roots
}

fn open(path: &Path) -> Result<BufReader<File>, ConnectionError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| ConnectionError::Tls(format!("{}: {e}", path.display())))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, ConnectionError> {
    rustls_pemfile::certs(&mut open(path)?)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ConnectionError::Tls(format!("{}: {e}", path.display())))
}

fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>, ConnectionError> {
    rustls_pemfile::private_key(&mut open(path)?)
        .map_err(|e| ConnectionError::Tls(format!("{}: {e}", path.display())))?
        .ok_or_else(|| ConnectionError::Tls(format!("{}: no private key", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_files_are_tls_errors() {
        let paths = TlsPaths {
            cert: PathBuf::from("/nonexistent/client.pem"),
            key: PathBuf::from("/nonexistent/client.key"),
            ca: None,
        };
        assert!(matches!(client_config(&paths), Err(ConnectionError::Tls(_))));
    }

    #[test]
    fn cert_file_without_pem_blocks_has_no_key() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("client.pem");
        std::fs::write(&cert, "not a certificate\n").unwrap();

        let err = load_key(&cert).unwrap_err();
        assert!(err.to_string().contains("no private key"));
        assert!(load_certs(&cert).unwrap().is_empty());
    }
}
