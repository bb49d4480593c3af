use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use mailfix::{FixPolicy, ResolverOptions};

#[derive(Parser)]
#[command(name = "mailfix-cli", version)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// valide et répare des adresses
    Check(CheckArgs),
    /// fusionne des listes de domaines (*.txt) en un corpus trié
    #[command(name = "build-corpus")]
    BuildCorpus {
        /// répertoire parcouru récursivement
        input: PathBuf,
        /// fichier corpus produit
        output: PathBuf,
    },
    /// distance de Levenshtein entre deux chaînes
    Distance { a: String, b: String },
}

#[derive(Args)]
pub struct CheckArgs {
    /// adresse à tester (ignorée avec --stdin)
    pub email: Option<String>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,

    /// enveloppe MAIL FROM transmise à la sonde
    #[arg(long, default_value = "postmaster@localhost")]
    pub from: String,

    /// fichier corpus (un domaine par ligne)
    #[arg(long)]
    pub corpus: PathBuf,

    /// distance d'édition maximale acceptée
    #[arg(long, default_value_t = 2)]
    pub threshold: usize,

    /// longueur minimale d'un host réparable
    #[arg(long = "min-host-len", default_value_t = 5)]
    pub min_host_len: usize,

    /// désactive l'élagage par longueur
    #[arg(long = "no-length-prune")]
    pub no_length_prune: bool,

    /// timeout DNS par requête (ms)
    #[arg(long = "timeout", default_value_t = 5_000)]
    pub timeout_ms: u64,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// write report to file (JSON/NDJSON/CSV selon --format)
    #[arg(long)]
    pub out: Option<String>,

    /// interroge le MX en SMTP (RCPT TO) après validation DNS
    #[cfg(feature = "with-smtp-verify")]
    #[arg(long)]
    pub smtp: bool,

    /// nom utilisé pour EHLO (par défaut le domaine de --from)
    #[cfg(feature = "with-smtp-verify")]
    #[arg(long)]
    pub helo: Option<String>,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

impl CheckArgs {
    pub fn policy(&self) -> FixPolicy {
        FixPolicy {
            threshold: self.threshold,
            min_host_len: self.min_host_len,
            length_prune: !self.no_length_prune,
        }
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            timeout: Duration::from_millis(self.timeout_ms),
            ..ResolverOptions::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.stdin && self.email.is_none() {
            bail!("une adresse ou --stdin est requis");
        }
        if self.timeout_ms == 0 {
            bail!("--timeout doit être > 0");
        }
        Ok(())
    }

    #[cfg(feature = "with-smtp-verify")]
    pub fn smtp_options(&self) -> mailfix::SmtpProbeOptions {
        mailfix::SmtpProbeOptions {
            helo_domain: self.helo.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            ..mailfix::SmtpProbeOptions::default()
        }
    }
}
