#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Sender credentials for the SMTP session.
//!
//! Credentials reach the rest of the crate only through
//! [`CredentialProvider`], so callers never depend on how a secret is kept.
//!
//! **Weak protection:** [`FileCredentialStore`] writes the password base64
//! encoded. That is an encoding, not encryption. Anyone able to read the
//! file can recover the password; restrict the file (the store sets mode
//! `0600` on Unix) and prefer app passwords over account passwords.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use base64::prelude::*;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_SMTP_PORT;

/// Errors raised by credential providers.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The stored file could not be read or written.
    #[error("Could not access credential file `{path}`: {source}")]
    Io {
        /// Credential file.
        path:   PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The stored file is not valid JSON.
    #[error("Credential file `{path}` is malformed: {source}")]
    Malformed {
        /// Credential file.
        path:   PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The stored password is not valid base64 or UTF-8.
    #[error("The stored password could not be decoded.")]
    Decode,
    /// An unknown provider name was given.
    #[error("Unknown email provider `{0}`; use gmail, outlook, or host[:port].")]
    UnknownProvider(String),
    /// The provider cannot persist credentials.
    #[error("This credential provider is read-only.")]
    ReadOnly,
}

/// Mail submission service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// `smtp.gmail.com`.
    Gmail,
    /// `smtp-mail.outlook.com`.
    Outlook,
    /// Any other submission server.
    Custom {
        /// Server host name.
        host: String,
        /// Submission port.
        port: u16,
    },
}

impl Provider {
    /// Server host name.
    pub fn host(&self) -> &str {
        match self {
            Self::Gmail => "smtp.gmail.com",
            Self::Outlook => "smtp-mail.outlook.com",
            Self::Custom { host, .. } => host,
        }
    }

    /// Submission port.
    pub fn port(&self) -> u16 {
        match self {
            Self::Gmail | Self::Outlook => DEFAULT_SMTP_PORT,
            Self::Custom { port, .. } => *port,
        }
    }

    /// Recovers a provider from a stored host and port.
    fn from_server(host: &str, port: u16) -> Self {
        match (host, port) {
            ("smtp.gmail.com", DEFAULT_SMTP_PORT) => Self::Gmail,
            ("smtp-mail.outlook.com", DEFAULT_SMTP_PORT) => Self::Outlook,
            _ => Self::Custom {
                host: host.to_string(),
                port,
            },
        }
    }
}

impl FromStr for Provider {
    type Err = CredentialError;

    /// Accepts `gmail`, `outlook`, or any `host[:port]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "gmail" | "1" => return Ok(Self::Gmail),
            "outlook" | "2" => return Ok(Self::Outlook),
            "" => return Err(CredentialError::UnknownProvider(s.to_string())),
            _ => {}
        }
        match s.rsplit_once(':') {
            Some((host, port)) if !host.trim().is_empty() => port
                .parse::<u16>()
                .map(|port| Self::Custom {
                    host: host.trim().to_string(),
                    port,
                })
                .map_err(|_| CredentialError::UnknownProvider(s.to_string())),
            Some(_) => Err(CredentialError::UnknownProvider(s.to_string())),
            None => Ok(Self::Custom {
                host: s.to_string(),
                port: DEFAULT_SMTP_PORT,
            }),
        }
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host(), self.port())
    }
}

/// Sender identity and secret. The secret is never printed.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Submission server.
    pub provider: Provider,
    /// Sender address, also the SMTP user name.
    pub address:  String,
    /// SMTP password or app password.
    pub secret:   SecretString,
}

impl Credential {
    /// Creates a credential.
    pub fn new(provider: Provider, address: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            provider,
            address: address.into(),
            secret: SecretString::from(secret.into()),
        }
    }
}

/// Supplies, persists, and forgets sender credentials.
pub trait CredentialProvider {
    /// Returns the stored credential, if any.
    fn load(&self) -> Result<Option<Credential>, CredentialError>;

    /// Persists `credential`, replacing anything stored.
    fn save(&self, credential: &Credential) -> Result<(), CredentialError>;

    /// Forgets the stored credential. Returns whether anything was removed.
    fn clear(&self) -> Result<bool, CredentialError>;
}

/// On-disk shape of the credential file.
#[derive(Serialize, Deserialize)]
struct StoredCredential {
    /// Submission server host.
    smtp_server: String,
    /// Submission port.
    smtp_port:   u16,
    /// Sender address.
    email:       String,
    /// Base64-encoded password.
    password:    String,
}

/// JSON file store with a base64-encoded password. See the module docs for
/// what that does and does not protect against.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    /// Credential file.
    path: PathBuf,
}

impl FileCredentialStore {
    /// A store backed by `path`. Nothing is read until [`load`] is called.
    ///
    /// [`load`]: CredentialProvider::load
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Credential file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wraps an I/O error with the file path.
    fn io(&self, source: std::io::Error) -> CredentialError {
        CredentialError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialProvider for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, CredentialError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path).map_err(|e| self.io(e))?;
        let stored: StoredCredential =
            serde_json::from_str(&raw).map_err(|source| CredentialError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        let password = BASE64_STANDARD
            .decode(stored.password.as_bytes())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or(CredentialError::Decode)?;

        Ok(Some(Credential::new(
            Provider::from_server(&stored.smtp_server, stored.smtp_port),
            stored.email,
            password,
        )))
    }

    fn save(&self, credential: &Credential) -> Result<(), CredentialError> {
        let stored = StoredCredential {
            smtp_server: credential.provider.host().to_string(),
            smtp_port:   credential.provider.port(),
            email:       credential.address.clone(),
            password:    BASE64_STANDARD.encode(credential.secret.expose_secret().as_bytes()),
        };
        let json = serde_json::to_string_pretty(&stored).map_err(|source| {
            CredentialError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io(e))?;
        }
        std::fs::write(&self.path, json).map_err(|e| self.io(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io(e))?;
        }

        tracing::info!("Credentials saved to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<bool, CredentialError> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path).map_err(|e| self.io(e))?;
        tracing::info!("Credentials cleared from {}", self.path.display());
        Ok(true)
    }
}

/// Read-only provider backed by `LABSEND_SMTP_PROVIDER`,
/// `LABSEND_SMTP_ADDRESS`, and `LABSEND_SMTP_PASSWORD`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialProvider;

impl CredentialProvider for EnvCredentialProvider {
    fn load(&self) -> Result<Option<Credential>, CredentialError> {
        let var = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let (Some(provider), Some(address), Some(password)) = (
            var("LABSEND_SMTP_PROVIDER"),
            var("LABSEND_SMTP_ADDRESS"),
            var("LABSEND_SMTP_PASSWORD"),
        ) else {
            return Ok(None);
        };
        Ok(Some(Credential::new(provider.parse()?, address, password)))
    }

    fn save(&self, _credential: &Credential) -> Result<(), CredentialError> {
        Err(CredentialError::ReadOnly)
    }

    fn clear(&self) -> Result<bool, CredentialError> {
        Err(CredentialError::ReadOnly)
    }
}

/// Tries each provider in order and returns the first stored credential.
pub fn resolve(providers: &[&dyn CredentialProvider]) -> Result<Option<Credential>, CredentialError> {
    for provider in providers {
        if let Some(credential) = provider.load()? {
            return Ok(Some(credential));
        }
    }
    Ok(None)
}
