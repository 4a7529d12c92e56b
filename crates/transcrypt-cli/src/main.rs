//! transcrypt: seal scalar values into text-safe envelopes
//!
//! Usage:
//!   transcrypt keygen [--bits 256]
//!   transcrypt salt
//!   transcrypt encrypt [--suite AES_256_GCM] [--salt HEX] [--type int] <VALUE>
//!   transcrypt decrypt [--show-type] <ENVELOPE>
//!   transcrypt config show

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use config::TranscryptConfig;
use transcrypt_crypto::{suite_from_name, Value};

#[derive(Parser, Debug)]
#[command(
    name = "transcrypt",
    version,
    about = "Authenticated, self-describing envelopes for configuration values"
)]
struct Cli {
    /// Path to transcrypt.toml configuration file
    #[arg(
        long,
        short = 'c',
        env = "TRANSCRYPT_CONFIG",
        default_value = "~/.config/transcrypt/config.toml",
        global = true
    )]
    config: PathBuf,

    /// Master secret (prompted for when neither this nor a secret file is set)
    #[arg(
        long,
        env = "TRANSCRYPT_MASTER_SECRET",
        hide_env_values = true,
        global = true
    )]
    secret: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TRANSCRYPT_LOG", global = true)]
    log: Option<String>,

    /// Log format (json, text)
    #[arg(long, env = "TRANSCRYPT_LOG_FORMAT", global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum, PartialEq)]
enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    fn from_config(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a new random master secret (hex)
    Keygen {
        /// Strength of the secret in bits
        #[arg(long, default_value_t = 256)]
        bits: usize,
    },

    /// Generate a fresh 12-byte salt (hex)
    Salt,

    /// Seal a value into an envelope string
    Encrypt {
        /// Value to encrypt
        value: String,

        /// Cipher suite name (AES_256_GCM, CHACHA20_POLY1305)
        #[arg(long)]
        suite: Option<String>,

        /// Salt as hex, at least 12 bytes (generated when omitted)
        #[arg(long)]
        salt: Option<String>,

        /// Value type (string, int)
        #[arg(long = "type", default_value = "string")]
        kind: String,
    },

    /// Open an envelope string and print the value
    Decrypt {
        /// Envelope produced by `encrypt`
        envelope: String,

        /// Print the value's type before the value
        #[arg(long)]
        show_type: bool,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, found) = TranscryptConfig::load(&cli.config)?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| LogFormat::from_config(&config.log.format));
    init_logging(&level, &format);

    if !found {
        warn!(
            "config file not found: {}  (using defaults)",
            cli.config.display()
        );
    }
    info!(version = env!("CARGO_PKG_VERSION"), "transcrypt starting");

    match &cli.command {
        Commands::Keygen { bits } => cmd_keygen(*bits),
        Commands::Salt => cmd_salt(),
        Commands::Encrypt {
            value,
            suite,
            salt,
            kind,
        } => cmd_encrypt(
            &cli,
            &config,
            value,
            suite.as_deref(),
            salt.as_deref(),
            kind,
        ),
        Commands::Decrypt {
            envelope,
            show_type,
        } => cmd_decrypt(&cli, &config, envelope, *show_type),
        Commands::Config { action } => match action {
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries envelopes and values only
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── Master secret ────────────────────────────────────────────────────────────

fn resolve_master_secret(cli: &Cli, config: &TranscryptConfig) -> Result<SecretString> {
    if let Some(secret) = &cli.secret {
        debug!("master secret from flag or environment");
        return Ok(SecretString::from(secret.clone()));
    }

    if let Some(path) = &config.crypto.master_secret_file {
        debug!(path = %path.display(), "master secret from file");
        return config::read_secret_file(path).map(SecretString::from);
    }

    let entered = rpassword::prompt_password("Master secret: ")
        .context("reading master secret from terminal")?;
    Ok(SecretString::from(entered))
}

// ── Commands ─────────────────────────────────────────────────────────────────

fn cmd_keygen(bits: usize) -> Result<()> {
    let secret = transcrypt_crypto::generate_master_secret(bits)
        .with_context(|| format!("generating {bits}-bit master secret"))?;
    println!("{}", secret.expose_secret());
    Ok(())
}

fn cmd_salt() -> Result<()> {
    let salt = transcrypt_crypto::generate_salt().context("generating salt")?;
    println!("{}", hex::encode(salt));
    Ok(())
}

fn cmd_encrypt(
    cli: &Cli,
    config: &TranscryptConfig,
    raw: &str,
    suite: Option<&str>,
    salt_hex: Option<&str>,
    kind: &str,
) -> Result<()> {
    let value = Value::parse(kind, raw).with_context(|| format!("parsing value as {kind}"))?;
    let suite = suite.map_or(config.crypto.suite, suite_from_name);
    let salt = salt_hex
        .map(|s| hex::decode(s).context("--salt must be hex"))
        .transpose()?;

    let master_secret = resolve_master_secret(cli, config)?;
    let envelope = transcrypt_crypto::encrypt(&master_secret, salt.as_deref(), suite, &value)
        .context("encrypting value")?;

    info!(suite = %suite, tag = %value.type_tag(), "sealed value");
    println!("{envelope}");
    Ok(())
}

fn cmd_decrypt(
    cli: &Cli,
    config: &TranscryptConfig,
    envelope: &str,
    show_type: bool,
) -> Result<()> {
    let master_secret = resolve_master_secret(cli, config)?;
    let value = transcrypt_crypto::decrypt(&master_secret, envelope.trim())
        .context("decrypting envelope")?;

    if show_type {
        println!("{}\t{value}", value.type_tag());
    } else {
        println!("{value}");
    }
    Ok(())
}

fn cmd_config_show(config: &TranscryptConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("serializing config")?;
    print!("{rendered}");
    Ok(())
}
