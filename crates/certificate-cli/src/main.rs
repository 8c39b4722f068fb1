// Certify - command-line client for the certificate server

mod client;
mod preview;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use client::{CertificateClient, IssuePayload, VerifyOutcome};

/// Certify - issue and verify course certificates
#[derive(Parser)]
#[command(name = "certify")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the certificate server
    #[arg(long, global = true, env = "CERTIFY_SERVER", default_value = "http://localhost:3000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a certificate, or fetch the one already filed under --id
    Issue {
        /// Name printed on the certificate
        #[arg(long)]
        name: String,

        /// Grade printed on the certificate
        #[arg(long)]
        grade: String,

        /// Identity to file the certificate under (generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// Check that a certificate exists
    Verify {
        /// Certificate identity
        id: String,
    },
    /// Render the certificate markup locally without contacting the server
    Preview {
        #[arg(long)]
        name: String,

        #[arg(long)]
        grade: String,

        #[arg(long)]
        id: Option<String>,

        /// Output file path
        #[arg(short, long, default_value = "certificate.html")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Issue { name, grade, id } => handle_issue(&cli.server, &name, &grade, id.as_deref()),
        Commands::Verify { id } => handle_verify(&cli.server, &id),
        Commands::Preview {
            name,
            grade,
            id,
            output,
        } => handle_preview(&output, id.as_deref(), &name, &grade),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn handle_issue(server: &str, name: &str, grade: &str, id: Option<&str>) -> anyhow::Result<()> {
    let client = CertificateClient::new(server);
    let certificate = client.issue(&IssuePayload { id, name, grade })?;

    println!("{} {}", "✓".green().bold(), certificate.message.green());
    println!();
    println!("ID:    {}", certificate.id);
    println!("Name:  {}", certificate.name);
    println!("Grade: {}", certificate.grade);
    println!("Date:  {}", certificate.date);
    println!("URL:   {}", certificate.url);
    Ok(())
}

fn handle_verify(server: &str, id: &str) -> anyhow::Result<()> {
    let client = CertificateClient::new(server);

    match client.verify(id)? {
        VerifyOutcome::Valid(certificate) => {
            println!("{} {}", "✓".green().bold(), certificate.message.green());
            println!();
            println!("Name: {}", certificate.name);
            println!("URL:  {}", certificate.url);
            Ok(())
        }
        VerifyOutcome::Invalid(message) => {
            eprintln!("{} {}", "✗".red().bold(), message.red());
            std::process::exit(1);
        }
    }
}

fn handle_preview(
    output: &std::path::Path,
    id: Option<&str>,
    name: &str,
    grade: &str,
) -> anyhow::Result<()> {
    preview::write_preview(output, id, name, grade)?;
    println!("Preview written to: {}", output.display());
    Ok(())
}
