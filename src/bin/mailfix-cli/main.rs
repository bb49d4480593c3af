mod args;
mod output;

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use mailfix::{AddressReport, HostLookup, MailFixer, MailboxProbe, build_corpus, levenshtein};

use crate::args::{CheckArgs, Cli, Commands};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Check(args) => {
            let code = run_check(&args)?;
            // codes de sortie : 0 OK, 2 invalides, 1 fatal
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::BuildCorpus { input, output } => {
            let summary = build_corpus(&input, &output)
                .with_context(|| format!("build corpus from {}", input.display()))?;
            println!(
                "{} fichiers, {} lignes, {} ignorées, {} domaines -> {}",
                summary.files,
                summary.lines,
                summary.skipped,
                summary.unique,
                output.display()
            );
        }
        Commands::Distance { a, b } => println!("{}", levenshtein(&a, &b)),
    }
    Ok(())
}

#[cfg(feature = "with-dns")]
fn run_check(args: &CheckArgs) -> Result<i32> {
    use std::sync::Arc;

    use mailfix::DomainCorpus;

    args.validate()?;
    let corpus = DomainCorpus::load(&args.corpus)
        .with_context(|| format!("load corpus {}", args.corpus.display()))?;
    let fixer = MailFixer::system(Arc::new(corpus), args.resolver_options())
        .context("init DNS resolver")?
        .with_policy(args.policy());

    let emails = read_addresses(args)?;

    #[cfg(feature = "with-smtp-verify")]
    let reports = if args.smtp {
        let probe = mailfix::SmtpProbe::new(args.smtp_options()).context("init SMTP probe")?;
        check_all(&fixer.with_probe(probe), &args.from, &emails)
    } else {
        check_all(&fixer, &args.from, &emails)
    };
    #[cfg(not(feature = "with-smtp-verify"))]
    let reports = check_all(&fixer, &args.from, &emails);

    output::write_reports(&reports, &args.format, args.out.as_deref())?;
    Ok(output::exit_code(&reports))
}

#[cfg(not(feature = "with-dns"))]
fn run_check(_: &CheckArgs) -> Result<i32> {
    anyhow::bail!("check nécessite la feature 'with-dns'")
}

#[cfg_attr(not(feature = "with-dns"), allow(dead_code))]
fn read_addresses(args: &CheckArgs) -> Result<Vec<String>> {
    if !args.stdin {
        return Ok(args.email.iter().cloned().collect());
    }
    let mut emails = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("read stdin")?;
        if !line.trim().is_empty() {
            emails.push(line);
        }
    }
    Ok(emails)
}

#[cfg_attr(not(feature = "with-dns"), allow(dead_code))]
fn check_all<L: HostLookup, P: MailboxProbe>(
    fixer: &MailFixer<L, P>,
    from: &str,
    emails: &[String],
) -> Vec<AddressReport> {
    emails.iter().map(|to| fixer.check(from, to)).collect()
}

#[cfg(feature = "with-tracing")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(not(feature = "with-tracing"))]
fn init_tracing() {}
