//! Ledger Identity CLI (`lid`).
//!
//! Exposes the registry operations over a directory-backed ledger, plus key
//! generation and token signing for producing verified-identity proofs.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use ledger_identity::crypto::{sign_compact, EcCurve, EcSigningKey, PrivateKeyJwk, PublicKeyJwk};
use ledger_identity::identity::parse_subject_claims;
use ledger_identity::ledger::encode_identities;
use ledger_identity::{
    FileLedger, Identity, IdentityError, IdentityRegistry, RegistryConfig, VerifiedIdentityRequest,
};

// ── Directory helpers ─────────────────────────────────────────────────────────

const LEDGER_DIR_ENV: &str = "LID_LEDGER_DIR";

fn default_ledger_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(LEDGER_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").map_err(|_| anyhow!("HOME not set; pass --ledger-dir"))?;
    Ok(PathBuf::from(home).join(".ledger-identity").join("ledger"))
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// Ledger Identity CLI: create, verify, read and list ledger identities.
#[derive(Parser, Debug)]
#[command(
    name = "lid",
    about = "Ledger Identity CLI",
    version,
    long_about = "lid: Ledger Identity CLI\n\nCreate root and key-verified identities on an append-only ledger,\nread them back, and produce the JWS proofs verified creation needs."
)]
struct Cli {
    /// Ledger directory (default: $LID_LEDGER_DIR or ~/.ledger-identity/ledger)
    #[arg(long, global = true)]
    ledger_dir: Option<PathBuf>,

    /// Registry configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the well-known genesis identity
    Init,

    /// Create an identity without key proof
    Create {
        /// JSON-LD style context of the identity
        #[arg(long)]
        context: String,

        /// Identifier to register
        #[arg(long)]
        id: String,

        /// Controlling identity (default: the identity itself)
        #[arg(long)]
        controlled_by: Option<String>,
    },

    /// Create an identity proven by a signed token
    CreateVerified {
        #[arg(long)]
        context: String,

        #[arg(long)]
        id: String,

        /// Controlling identity (default: the identity itself)
        #[arg(long)]
        controlled_by: Option<String>,

        /// Public JWK: a JSON object or a path to a file containing one
        #[arg(long)]
        jwk: String,

        /// Compact JWS whose payload is the identifier
        #[arg(long)]
        token: String,

        /// Subject claim as key:value (repeatable)
        #[arg(long = "claim")]
        claims: Vec<String>,

        /// Issuance window in years (default from config)
        #[arg(long)]
        years: Option<u32>,
    },

    /// Read an identity
    Read {
        id: String,
    },

    /// Check whether an identity exists
    Exists {
        id: String,
    },

    /// List identities in key order
    List {
        /// First key to include
        #[arg(long, default_value = "")]
        start: String,

        /// First key to exclude
        #[arg(long, default_value = "")]
        end: String,

        /// Print a JSON array instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Generate an EC key pair as a private JWK
    Keygen {
        /// Where to write the private JWK
        #[arg(long)]
        out: PathBuf,

        #[arg(long, value_enum, default_value_t = CurveArg::P256)]
        curve: CurveArg,

        /// Key id to embed in the JWK (default: the key's RFC 7638 thumbprint)
        #[arg(long)]
        kid: Option<String>,
    },

    /// Sign a payload (normally an identifier) into a compact JWS
    Sign {
        /// Private JWK file from `lid keygen`
        #[arg(long)]
        key: PathBuf,

        /// Payload to sign
        #[arg(long)]
        payload: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CurveArg {
    P256,
    P384,
}

impl From<CurveArg> for EcCurve {
    fn from(arg: CurveArg) -> Self {
        match arg {
            CurveArg::P256 => EcCurve::P256,
            CurveArg::P384 => EcCurve::P384,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<IdentityError>() {
            Some(err) => eprintln!("error[{}]: {e:#}", err.code()),
            None => eprintln!("error: {e:#}"),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let verbose = cli.verbose;

    // Key commands never touch the ledger.
    match &cli.command {
        Commands::Keygen { out, curve, kid } => {
            return cmd_keygen(out, (*curve).into(), kid.as_deref(), verbose)
        }
        Commands::Sign { key, payload } => return cmd_sign(key, payload),
        _ => {}
    }

    let config = match &cli.config {
        Some(path) => RegistryConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RegistryConfig::default(),
    };
    let registry = IdentityRegistry::new(config);

    let ledger_dir = match cli.ledger_dir {
        Some(dir) => dir,
        None => default_ledger_dir()?,
    };
    let ledger = FileLedger::open(&ledger_dir)
        .with_context(|| format!("failed to open ledger at {}", ledger_dir.display()))?;
    if verbose {
        eprintln!("ledger: {}", ledger.base_dir().display());
    }

    match cli.command {
        Commands::Init => cmd_init(&registry, &ledger),
        Commands::Create {
            context,
            id,
            controlled_by,
        } => cmd_create(&registry, &ledger, &context, &id, controlled_by.as_deref()),
        Commands::CreateVerified {
            context,
            id,
            controlled_by,
            jwk,
            token,
            claims,
            years,
        } => {
            let controlled_by = controlled_by.unwrap_or_else(|| id.clone());
            registry.ensure_creatable(&ledger, &id, &controlled_by)?;
            let public_key_jwk = load_public_jwk(&id, &jwk)?;
            let subject_info = parse_subject_claims(&claims)?;
            let mut request =
                VerifiedIdentityRequest::new(context, id, controlled_by, public_key_jwk, token)
                    .subject_info(subject_info);
            if let Some(years) = years {
                request = request.issuance_years(years);
            }
            cmd_create_verified(&registry, &ledger, request)
        }
        Commands::Read { id } => cmd_read(&registry, &ledger, &id),
        Commands::Exists { id } => cmd_exists(&registry, &ledger, &id),
        Commands::List { start, end, json } => cmd_list(&registry, &ledger, &start, &end, json),
        Commands::Keygen { .. } | Commands::Sign { .. } => Ok(()),
    }
}

// ── Input helpers ─────────────────────────────────────────────────────────────

/// Accept either an inline JSON object or a path to a file holding one.
///
/// JSON that does not describe a JWK is a `MalformedKey` error for `id`.
fn load_public_jwk(id: &str, arg: &str) -> Result<PublicKeyJwk> {
    let text = if arg.trim_start().starts_with('{') {
        arg.to_string()
    } else {
        std::fs::read_to_string(arg).with_context(|| format!("failed to read JWK file {arg}"))?
    };
    PublicKeyJwk::from_json(&text).map_err(|e| {
        IdentityError::MalformedKey {
            id: id.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn print_identity(identity: &Identity) -> Result<()> {
    let json = serde_json::to_string_pretty(identity).context("failed to serialize identity")?;
    println!("{json}");
    Ok(())
}

// ── Command implementations ───────────────────────────────────────────────────

/// `lid init`
fn cmd_init(registry: &IdentityRegistry, ledger: &FileLedger) -> Result<()> {
    let genesis = registry.init_ledger(ledger)?;
    println!("Initialized ledger with {}", genesis.id);
    Ok(())
}

/// `lid create --context C --id ID [--controlled-by CTRL]`
fn cmd_create(
    registry: &IdentityRegistry,
    ledger: &FileLedger,
    context: &str,
    id: &str,
    controlled_by: Option<&str>,
) -> Result<()> {
    let identity =
        registry.create_root_identity(ledger, context, id, controlled_by.unwrap_or(id))?;
    print_identity(&identity)
}

/// `lid create-verified ...`
fn cmd_create_verified(
    registry: &IdentityRegistry,
    ledger: &FileLedger,
    request: VerifiedIdentityRequest,
) -> Result<()> {
    let identity = registry.create_verified_identity(ledger, request)?;
    print_identity(&identity)
}

/// `lid read ID`
fn cmd_read(registry: &IdentityRegistry, ledger: &FileLedger, id: &str) -> Result<()> {
    let identity = registry.read_identity(ledger, id)?;
    print_identity(&identity)
}

/// `lid exists ID`
fn cmd_exists(registry: &IdentityRegistry, ledger: &FileLedger, id: &str) -> Result<()> {
    println!("{}", registry.identity_exists(ledger, id)?);
    Ok(())
}

/// `lid list [--start S] [--end E] [--json]`
fn cmd_list(
    registry: &IdentityRegistry,
    ledger: &FileLedger,
    start: &str,
    end: &str,
    json: bool,
) -> Result<()> {
    let identities = registry.get_identities_by_range(ledger, start, end)?;

    if json {
        println!("{}", encode_identities(&identities)?);
        return Ok(());
    }

    if identities.is_empty() {
        println!("No identities found.");
        return Ok(());
    }

    println!("{:<32} {:<32} {:<9} EXPIRES", "ID", "CONTROLLED BY", "KIND");
    println!("{}", "-".repeat(90));
    for identity in &identities {
        let kind = if identity.is_verified() { "verified" } else { "root" };
        println!(
            "{:<32} {:<32} {:<9} {}",
            identity.id,
            identity.controlled_by,
            kind,
            identity.expires_at().unwrap_or("-")
        );
    }
    println!("\n{} identities", identities.len());
    Ok(())
}

/// `lid keygen --out PATH [--curve p256|p384] [--kid KID]`
fn cmd_keygen(out: &Path, curve: EcCurve, kid: Option<&str>, verbose: bool) -> Result<()> {
    let key = EcSigningKey::generate(curve);
    let key_id = match kid {
        Some(kid) => kid.to_string(),
        None => key
            .public_jwk(None)
            .thumbprint()
            .map_err(|e| anyhow!("failed to compute key thumbprint: {e}"))?,
    };
    let kid = Some(key_id.as_str());
    let private =
        serde_json::to_string_pretty(&key.to_private_jwk(kid)).context("failed to serialize key")?;
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    write_private_key(out, private.as_bytes())?;

    if verbose {
        eprintln!("Wrote {} private key to {}", curve.crv(), out.display());
    }
    let public =
        serde_json::to_string_pretty(&key.public_jwk(kid)).context("failed to serialize key")?;
    println!("{public}");
    Ok(())
}

/// Create `path` readable by the owner only. Never replaces an existing file.
fn write_private_key(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = match options.open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(anyhow!(
                "refusing to overwrite existing key at {}",
                path.display()
            ))
        }
        Err(e) => return Err(e).with_context(|| format!("failed to create {}", path.display())),
    };
    file.write_all(contents)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// `lid sign --key PATH --payload ID`
fn cmd_sign(key_path: &Path, payload: &str) -> Result<()> {
    let text = std::fs::read_to_string(key_path)
        .with_context(|| format!("failed to read key {}", key_path.display()))?;
    let private: PrivateKeyJwk =
        serde_json::from_str(&text).context("key file is not a private JWK")?;
    let key = EcSigningKey::from_private_jwk(&private).map_err(|e| anyhow!("invalid key: {e}"))?;
    println!("{}", sign_compact(&key, payload.as_bytes(), private.public.kid.as_deref()));
    Ok(())
}
