//! mbs: mbsecure command-line interface
//!
//! Commands:
//!   random <count>                  - secure random bytes (raw, hex, base64)
//!   encrypt <input> <output>        - encrypt a file (V0 or V1 framing)
//!   decrypt <input> <output>        - decrypt a file (explicit format or auto-detect)
//!   derive                          - HKDF-derive a key from a master key
//!   detect <input>                  - report the wire format of an encrypted file
//!   config show                     - display current configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};

use mbs_core::config::MbsConfig;
use mbs_core::{CipherAlgorithm, FormatHint, FormatVersion, HashAlgorithm};
use mbs_crypto::KeyMaterial;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "mbs",
    version,
    about = "mbsecure crypto toolkit",
    long_about = "mbs: authenticated file encryption, HKDF key derivation, and secure random generation"
)]
struct Cli {
    /// Path to mbs.toml configuration file
    #[arg(long, short = 'c', env = "MBS_CONFIG", default_value = "mbs.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides config
    #[arg(long, env = "MBS_LOG")]
    log: Option<String>,

    /// Log format; overrides config
    #[arg(long, env = "MBS_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate cryptographically secure random bytes
    Random {
        /// Number of bytes (1 to 1048576)
        count: usize,
        /// Output encoding
        #[arg(long, short = 'e', default_value = "hex")]
        encoding: Encoding,
    },

    /// Encrypt a file
    Encrypt {
        input: PathBuf,
        output: PathBuf,
        /// 32-byte key, hex encoded
        #[arg(long, env = "MBS_KEY", hide_env_values = true)]
        key_hex: String,
        /// Cipher (default: from config)
        #[arg(long, short = 'a')]
        algorithm: Option<AlgorithmArg>,
        /// Output format (default: from config, else v0)
        #[arg(long, short = 'f')]
        format: Option<FormatArg>,
    },

    /// Decrypt a file
    Decrypt {
        input: PathBuf,
        output: PathBuf,
        /// 32-byte key, hex encoded
        #[arg(long, env = "MBS_KEY", hide_env_values = true)]
        key_hex: String,
        /// Cipher (default: from config)
        #[arg(long, short = 'a')]
        algorithm: Option<AlgorithmArg>,
        /// Expected format; omit for legacy V0 without detection
        #[arg(long, short = 'f')]
        format: Option<DecryptFormatArg>,
    },

    /// Derive a key with HKDF and print it as hex
    Derive {
        /// Master key (at least 16 bytes), hex encoded
        #[arg(long, env = "MBS_MASTER_KEY", hide_env_values = true)]
        master_key_hex: String,
        /// Domain, e.g. "myapp.encryption"
        #[arg(long)]
        domain: String,
        /// Context, e.g. "user-data"
        #[arg(long)]
        context: String,
        /// Output size in bytes (default: from config, else 32)
        #[arg(long)]
        size: Option<usize>,
        /// Hash function (default: from config, else sha256)
        #[arg(long)]
        hash: Option<HashArg>,
    },

    /// Report the wire format of an encrypted file
    Detect { input: PathBuf },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Clone, Debug, ValueEnum)]
enum Encoding {
    Raw,
    Hex,
    Base64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AlgorithmArg {
    AesGcm,
    Chacha20Poly1305,
}

impl From<AlgorithmArg> for CipherAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::AesGcm => CipherAlgorithm::AesGcm,
            AlgorithmArg::Chacha20Poly1305 => CipherAlgorithm::ChaCha20Poly1305,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    V0,
    V1,
}

impl From<FormatArg> for FormatVersion {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::V0 => FormatVersion::V0,
            FormatArg::V1 => FormatVersion::V1,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecryptFormatArg {
    V0,
    V1,
    Auto,
}

impl From<DecryptFormatArg> for FormatHint {
    fn from(arg: DecryptFormatArg) -> Self {
        match arg {
            DecryptFormatArg::V0 => FormatHint::Version(FormatVersion::V0),
            DecryptFormatArg::V1 => FormatHint::Version(FormatVersion::V1),
            DecryptFormatArg::Auto => FormatHint::Detect,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HashArg {
    Sha256,
    Sha512,
    /// Legacy only
    Sha1,
}

impl From<HashArg> for HashAlgorithm {
    fn from(arg: HashArg) -> Self {
        match arg {
            HashArg::Sha256 => HashAlgorithm::Sha256,
            HashArg::Sha512 => HashAlgorithm::Sha512,
            HashArg::Sha1 => HashAlgorithm::Sha1,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = MbsConfig::load(&cli.config)?;

    let level = cli.log.as_deref().unwrap_or(&config.logging.level);
    let format = match cli.log_format {
        Some(f) => f,
        None if config.logging.format == "json" => LogFormat::Json,
        None => LogFormat::Text,
    };
    init_logging(level, &format);

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "mbs starting"
    );

    match cli.command {
        Commands::Random { count, encoding } => cmd_random(count, &encoding),
        Commands::Encrypt { input, output, key_hex, algorithm, format } => {
            let algorithm = algorithm.map(Into::into).unwrap_or(config.cipher.algorithm);
            let format = format.map(Into::into).unwrap_or(config.cipher.format);
            cmd_encrypt(&input, &output, &key_hex, algorithm, format)
        }
        Commands::Decrypt { input, output, key_hex, algorithm, format } => {
            let algorithm = algorithm.map(Into::into).unwrap_or(config.cipher.algorithm);
            cmd_decrypt(&input, &output, &key_hex, algorithm, format.map(Into::into))
        }
        Commands::Derive { master_key_hex, domain, context, size, hash } => {
            let size = size.unwrap_or(config.kdf.key_size);
            let hash = hash.map(Into::into).unwrap_or(config.kdf.hash);
            cmd_derive(&master_key_hex, &domain, &context, size, hash)
        }
        Commands::Detect { input } => cmd_detect(&input),
        Commands::Config { action: ConfigAction::Show } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output; logs go to stderr
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

fn parse_key(hex_str: &str, what: &str) -> Result<KeyMaterial> {
    KeyMaterial::from_hex(hex_str).with_context(|| format!("reading {what}"))
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn cmd_random(count: usize, encoding: &Encoding) -> Result<()> {
    match encoding {
        Encoding::Raw => {
            let bytes = mbs_crypto::generate_bytes(count)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes).context("writing random bytes")?;
            stdout.flush().context("flushing stdout")?;
        }
        Encoding::Hex => println!("{}", mbs_crypto::generate_hex(count)?),
        Encoding::Base64 => println!("{}", mbs_crypto::generate_base64(count)?),
    }
    Ok(())
}

fn cmd_encrypt(
    input: &Path,
    output: &Path,
    key_hex: &str,
    algorithm: CipherAlgorithm,
    format: FormatVersion,
) -> Result<()> {
    let key = parse_key(key_hex, "encryption key")?;
    mbs_crypto::encrypt_file(input, output, algorithm, Some(format), &key)
        .with_context(|| format!("encrypting {}", input.display()))?;
    eprintln!(
        "encrypted {} -> {} ({algorithm}, {format})",
        input.display(),
        output.display()
    );
    Ok(())
}

fn cmd_decrypt(
    input: &Path,
    output: &Path,
    key_hex: &str,
    algorithm: CipherAlgorithm,
    format: Option<FormatHint>,
) -> Result<()> {
    let key = parse_key(key_hex, "decryption key")?;
    mbs_crypto::decrypt_file(input, output, algorithm, format, &key)
        .with_context(|| format!("decrypting {}", input.display()))?;
    eprintln!("decrypted {} -> {}", input.display(), output.display());
    Ok(())
}

fn cmd_derive(
    master_key_hex: &str,
    domain: &str,
    context: &str,
    size: usize,
    hash: HashAlgorithm,
) -> Result<()> {
    let master = parse_key(master_key_hex, "master key")?;
    let request = mbs_crypto::DerivationRequest::new(master, domain, context)
        .key_size(size)
        .hash(hash);
    let derived = mbs_crypto::derive(request).context("deriving key")?;
    println!("{}", hex::encode(derived.as_bytes()));
    Ok(())
}

fn cmd_detect(input: &Path) -> Result<()> {
    let found = mbs_crypto::detect_file(input)
        .with_context(|| format!("detecting format of {}", input.display()))?;
    match found.algorithm {
        Some(algorithm) => println!(
            "{} ({} bytes, algorithm {algorithm} [0x{:02x}])",
            found.version,
            found.size,
            mbs_crypto::wire_code_for(algorithm)
        ),
        None => println!("{} ({} bytes)", found.version, found.size),
    }
    Ok(())
}

fn cmd_config_show(config: &MbsConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}
