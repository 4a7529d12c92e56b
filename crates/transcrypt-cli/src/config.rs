use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use transcrypt_crypto::CipherSuite;

/// Top-level CLI configuration (loaded from transcrypt.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscryptConfig {
    pub crypto: CryptoConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Cipher suite name used by `encrypt` when --suite is not given.
    /// Unknown names fall back to CHACHA20_POLY1305.
    pub suite: CipherSuite,
    /// File holding the master secret (hex text, trailing whitespace ignored)
    pub master_secret_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: warn)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            suite: CipherSuite::ChaCha20Poly1305,
            master_secret_file: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

impl TranscryptConfig {
    /// Load configuration from `path`; a missing file yields defaults.
    ///
    /// Returns whether the file existed alongside the config.
    pub fn load(path: &Path) -> Result<(Self, bool)> {
        let path = expand_tilde(path);
        if !path.exists() {
            return Ok((Self::default(), false));
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("parsing config: {}", path.display()))?;
        Ok((config, true))
    }
}

/// Read a master secret file, dropping surrounding whitespace.
pub fn read_secret_file(path: &Path) -> Result<String> {
    let path = expand_tilde(path);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading master secret file: {}", path.display()))?;
    let secret = content.trim();
    if secret.is_empty() {
        anyhow::bail!("master secret file is empty: {}", path.display());
    }
    Ok(secret.to_string())
}

/// Expand `~` in path to the user's home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    match s.strip_prefix("~/") {
        Some(rest) => {
            let home = std::env::var("HOME").unwrap_or_default();
            PathBuf::from(home).join(rest)
        }
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[crypto]
suite = "AES_256_GCM"
master_secret_file = "/etc/transcrypt/master.key"

[log]
level = "debug"
format = "json"
"#;
        let config: TranscryptConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.crypto.suite, CipherSuite::Aes256Gcm);
        assert_eq!(
            config.crypto.master_secret_file,
            Some(PathBuf::from("/etc/transcrypt/master.key"))
        );
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, "json");
    }

    #[test]
    fn test_parse_defaults() {
        let config: TranscryptConfig = toml::from_str("").unwrap();

        assert_eq!(config.crypto.suite, CipherSuite::ChaCha20Poly1305);
        assert!(config.crypto.master_secret_file.is_none());
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.log.format, "text");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[log]
level = "trace"
"#;
        let config: TranscryptConfig = toml::from_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.log.level, "trace");
        // Defaults
        assert_eq!(config.log.format, "text");
        assert_eq!(config.crypto.suite, CipherSuite::ChaCha20Poly1305);
    }

    #[test]
    fn test_unknown_suite_name_falls_back() {
        let config: TranscryptConfig =
            toml::from_str("[crypto]\nsuite = \"BLOWFISH\"\n").unwrap();
        assert_eq!(config.crypto.suite, CipherSuite::ChaCha20Poly1305);
    }

    #[test]
    fn test_suite_serialized_by_name() {
        let mut config = TranscryptConfig::default();
        config.crypto.suite = CipherSuite::Aes256Gcm;
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("suite = \"AES_256_GCM\""), "{toml_str}");
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = TranscryptConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: TranscryptConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.crypto.suite, parsed.crypto.suite);
        assert_eq!(config.log.level, parsed.log.level);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (config, found) = TranscryptConfig::load(&tmp.path().join("absent.toml")).unwrap();

        assert!(!found);
        assert_eq!(config.crypto.suite, CipherSuite::ChaCha20Poly1305);
    }

    #[test]
    fn test_load_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("transcrypt.toml");
        std::fs::write(&path, "[crypto]\nsuite = \"AES_256_GCM\"\n").unwrap();

        let (config, found) = TranscryptConfig::load(&path).unwrap();
        assert!(found);
        assert_eq!(config.crypto.suite, CipherSuite::Aes256Gcm);
    }

    #[test]
    fn test_load_invalid_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.toml");
        std::fs::write(&path, "[crypto\nsuite = ").unwrap();

        let err = TranscryptConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("parsing config"));
    }

    #[test]
    fn test_read_secret_file_trims() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("master.key");
        std::fs::write(&path, "  deadbeef\n").unwrap();

        assert_eq!(read_secret_file(&path).unwrap(), "deadbeef");
    }

    #[test]
    fn test_read_secret_file_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("master.key");
        std::fs::write(&path, "\n").unwrap();

        assert!(read_secret_file(&path).is_err());
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        assert_eq!(
            expand_tilde(Path::new("/etc/transcrypt.toml")),
            PathBuf::from("/etc/transcrypt.toml")
        );
    }
}
