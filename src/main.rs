use anyhow::Result;
use clap::{Parser, Subcommand};
mod auth;
use keyseal::{EncryptOptions, Hex, Kdf, Keystore};
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
struct KdfArgs {
    /// Key derivation function: scrypt or pbkdf2
    #[arg(long, value_name = "FUNCTION", default_value = "scrypt")]
    kdf: String,

    /// scrypt cost, must be a power of two (default: 262144)
    #[arg(long = "scrypt-n")]
    n: Option<u32>,

    /// scrypt block size (default: 8)
    #[arg(long = "scrypt-r")]
    r: Option<u32>,

    /// scrypt parallelism (default: 1)
    #[arg(long = "scrypt-p")]
    p: Option<u32>,

    /// pbkdf2 iteration count (default: 262144)
    #[arg(long = "pbkdf2-c")]
    c: Option<u32>,
}

impl KdfArgs {
    fn to_kdf(&self) -> Result<Kdf> {
        match self.kdf.as_str() {
            "scrypt" => {
                let mut kdf = Kdf::scrypt()?;
                if let Kdf::Scrypt(params) = &mut kdf {
                    if let Some(n) = self.n {
                        params.n = n;
                    }
                    if let Some(r) = self.r {
                        params.r = r;
                    }
                    if let Some(p) = self.p {
                        params.p = p;
                    }
                }
                kdf.validate()?;
                Ok(kdf)
            }
            "pbkdf2" => {
                let mut kdf = Kdf::pbkdf2()?;
                if let Kdf::Pbkdf2(params) = &mut kdf {
                    if let Some(c) = self.c {
                        params.c = c;
                    }
                }
                kdf.validate()?;
                Ok(kdf)
            }
            other => anyhow::bail!("unknown key derivation function: {other}"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "keyseal")]
#[command(
    version,
    about = "Encrypts secrets into password-protected keystore files."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts a hex-encoded secret into a new keystore file
    #[command(arg_required_else_help = true)]
    Encrypt {
        /// Secret to encrypt, hex encoded
        secret: String,

        /// Where to write the keystore document
        #[arg(long, value_name = "FILE")]
        out: PathBuf,

        /// Derivation path recorded in the document
        #[arg(long, default_value = "")]
        path: String,

        /// Free-form description recorded in the document
        #[arg(long, default_value = "")]
        description: String,

        /// Public key recorded in the document, hex encoded
        #[arg(long, default_value = "")]
        pubkey: String,

        #[command(flatten)]
        kdf: KdfArgs,
    },

    /// Recovers the secret from a keystore file and prints it as hex
    #[command(arg_required_else_help = true)]
    Decrypt { file: PathBuf },

    /// Shows document metadata; no password required
    #[command(arg_required_else_help = true)]
    Inspect { file: PathBuf },
}

fn main() -> Result<()> {
    let args = Cli::parse();

    match args.command {
        Commands::Encrypt {
            secret,
            out,
            path,
            description,
            pubkey,
            kdf,
        } => {
            if out.exists() {
                anyhow::bail!("refusing to overwrite existing file: {}", out.display());
            }

            let secret: Hex = secret.parse()?;
            let pubkey: Hex = pubkey.parse()?;
            let kdf = kdf.to_kdf()?;

            let password = auth::read_new_password_with_confirmation()?;
            let keystore = Keystore::encrypt(
                &secret,
                &password,
                EncryptOptions {
                    kdf: Some(kdf),
                    description,
                    pubkey,
                    path,
                    ..Default::default()
                },
            )?;
            keystore.save(&out)?;
            println!("keystore written to {}", out.display());
        }

        Commands::Decrypt { file } => {
            let keystore = Keystore::load(&file)?;
            let password = auth::read_password()?;
            let secret = keystore.decrypt(&password)?;
            println!("{}", hex::encode(&*secret));
        }

        Commands::Inspect { file } => {
            let keystore = Keystore::load(&file)?;
            println!("uuid:        {}", keystore.uuid());
            println!("version:     {}", keystore.version());
            println!("kdf:         {}", keystore.crypto().kdf.function());
            println!("cipher:      {}", keystore.crypto().cipher.function());
            println!("checksum:    {}", keystore.crypto().checksum.function());
            if !keystore.path().is_empty() {
                println!("path:        {}", keystore.path());
            }
            if !keystore.pubkey().is_empty() {
                println!("pubkey:      {}", keystore.pubkey());
            }
            if !keystore.description().is_empty() {
                println!("description: {}", keystore.description());
            }
        }
    }

    Ok(())
}
