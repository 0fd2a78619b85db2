//! Command-line entry point: convert one PDF to an xlsx file.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tabulift::config::Config;
use tabulift::error::FileError;
use tabulift::export;
use tabulift::extract::{ExtractionClient, HttpExtractionService};
use tabulift::limiter::InMemoryRateLimiter;
use tabulift::session::{ConversionSession, ConversionStep, UploadedFile};

#[derive(Parser, Debug)]
#[command(name = "tabulift")]
#[command(about = "Convert tabular data in a PDF to an xlsx spreadsheet")]
#[command(version)]
struct Cli {
    /// PDF file to convert.
    input: PathBuf,

    /// Output path. Defaults to the input name with an .xlsx extension,
    /// in the current directory.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Password for an encrypted document. Prompted for interactively
    /// when omitted and needed.
    #[arg(long)]
    password: Option<String>,

    /// Treat the caller as logged in (bypasses the guest quota).
    #[arg(long)]
    logged_in: bool,

    /// Client address to attribute the conversion to, as a proxy would
    /// forward it.
    #[arg(long)]
    forwarded_for: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let file = read_input(&cli.input)?;

    let service = HttpExtractionService::new(
        config.endpoint.clone(),
        config.api_key.clone(),
        config.request_timeout,
    )?;
    let client = ExtractionClient::new(Arc::new(service), Arc::new(InMemoryRateLimiter::new()));
    let mut session = ConversionSession::new(
        client,
        config.payload_strategy,
        cli.logged_in,
        cli.forwarded_for.clone(),
    );

    session.convert(file).await;

    let mut password = cli.password;
    loop {
        match session.step() {
            ConversionStep::Preview => break,
            ConversionStep::PasswordPrompt => {
                if session.invalid_password() {
                    eprintln!("Incorrect password, try again.");
                }
                match password.take().map(Ok).unwrap_or_else(prompt_password) {
                    Ok(pw) => session.submit_password(pw).await,
                    Err(_) => {
                        session.cancel_password();
                        bail!("password entry aborted");
                    }
                }
            }
            ConversionStep::Error => {
                let error = session
                    .error()
                    .cloned()
                    .context("session in error step without an error")?;
                if error.rate_limited {
                    eprintln!("{}", error.message);
                    bail!("guest conversion limit reached");
                }
                bail!(error.message);
            }
            ConversionStep::Upload | ConversionStep::Loading => {
                bail!("conversion stalled in step '{}'", session.step());
            }
        }
    }

    let table = session.table().context("no table after preview")?;
    let out_path = cli.out.unwrap_or_else(|| {
        PathBuf::from(
            session
                .export_name()
                .unwrap_or_else(|| "output.xlsx".to_string()),
        )
    });

    let bytes = export::write_workbook(table)?;
    std::fs::write(&out_path, bytes)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    println!(
        "Wrote {} rows x {} columns to {}",
        table.row_count(),
        table.headers().len(),
        out_path.display()
    );
    Ok(())
}

/// Read the input file, rejecting anything that is not named like a PDF.
/// The pipeline would reject non-PDF bytes anyway; this check just fails
/// earlier with a clearer message.
fn read_input(path: &PathBuf) -> anyhow::Result<UploadedFile> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input.pdf".to_string());

    if !name.to_ascii_lowercase().ends_with(".pdf") {
        return Err(FileError::NotPdf { name }.into());
    }

    let bytes = std::fs::read(path).map_err(|e| FileError::ReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    Ok(UploadedFile::new(name, "application/pdf", bytes))
}

fn prompt_password() -> std::io::Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "stdin closed",
        ));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
