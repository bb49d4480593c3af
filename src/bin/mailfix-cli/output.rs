#[cfg(any(feature = "with-serde", feature = "with-csv"))]
use anyhow::Context;
use anyhow::{Result, bail};
use mailfix::{AddressReport, Verdict};

pub fn write_reports(reports: &[AddressReport], format: &str, out: Option<&str>) -> Result<()> {
    match format {
        "human" => write_human(reports),
        "json" => write_json(reports, out),
        "ndjson" => write_ndjson(reports, out),
        "csv" => write_csv(reports, out),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

/// codes de sortie : 0 OK, 2 invalides ou erreurs de transport
pub fn exit_code(reports: &[AddressReport]) -> i32 {
    if reports.iter().all(|r| r.verdict.is_deliverable()) {
        0
    } else {
        2
    }
}

fn write_human(reports: &[AddressReport]) -> Result<()> {
    for report in reports {
        match &report.verdict {
            Verdict::Valid => println!("[OK]       {}", report.original),
            Verdict::Repaired(_) => println!(
                "[REPAIRED] {} -> {}",
                report.original,
                report.final_address().unwrap_or_default()
            ),
            Verdict::Invalid(reason) => match &report.detail {
                Some(detail) => println!("[INVALID]  {} :: {reason} ({detail})", report.original),
                None => println!("[INVALID]  {} :: {reason}", report.original),
            },
            Verdict::TransportError(detail) => {
                println!("[RETRY]    {} :: {detail}", report.original)
            }
        }
    }
    Ok(())
}

#[cfg(feature = "with-serde")]
fn write_json(reports: &[AddressReport], out: Option<&str>) -> Result<()> {
    let s = serde_json::to_string_pretty(reports)?;
    if let Some(path) = out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[AddressReport], _: Option<&str>) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(reports: &[AddressReport], out: Option<&str>) -> Result<()> {
    if let Some(path) = out {
        let mut buf = Vec::new();
        for report in reports {
            let line = serde_json::to_string(report)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for report in reports {
            println!("{}", serde_json::to_string(report)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &[AddressReport], _: Option<&str>) -> Result<()> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-csv")]
fn write_csv(reports: &[AddressReport], out: Option<&str>) -> Result<()> {
    const HEADER: [&str; 7] = [
        "original",
        "normalized",
        "verdict",
        "reason",
        "repaired_host",
        "distance",
        "detail",
    ];
    if let Some(path) = out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(HEADER)?;
        for report in reports {
            wtr.write_record(csv_record(report))?;
        }
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        wtr.write_record(HEADER)?;
        for report in reports {
            wtr.write_record(csv_record(report))?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[AddressReport], _: Option<&str>) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

#[cfg(feature = "with-csv")]
fn csv_record(report: &AddressReport) -> Vec<String> {
    let (verdict, reason) = match &report.verdict {
        Verdict::Valid => ("valid", String::new()),
        Verdict::Invalid(reason) => ("invalid", reason.kind().to_string()),
        Verdict::Repaired(_) => ("repaired", String::new()),
        Verdict::TransportError(detail) => ("transport-error", detail.clone()),
    };
    vec![
        report.original.clone(),
        report.normalized.clone(),
        verdict.to_string(),
        reason,
        report.repaired_host.clone().unwrap_or_default(),
        report
            .distance
            .map(|d| d.to_string())
            .unwrap_or_default(),
        report.detail.clone().unwrap_or_default(),
    ]
}

#[cfg(any(feature = "with-serde", feature = "with-csv"))]
fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    mailfix::write_atomically(std::path::Path::new(path), bytes)
        .with_context(|| format!("write {path}"))
}
