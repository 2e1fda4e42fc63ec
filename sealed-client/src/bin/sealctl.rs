//! sealctl - seal Kubernetes secrets offline or against a running controller.
//!
//! Configuration (environment variables):
//!   SEALED_SECRETS_CONTROLLER_NAME       - Controller service name
//!   SEALED_SECRETS_CONTROLLER_NAMESPACE  - Controller namespace
//!   SEALED_SECRETS_CONTROLLER_PORT       - Controller port
//!   SEALED_SECRETS_CONTROLLER_URL        - Controller base URL override
//!   RUST_LOG                             - Log filter (default: sealed_client=info)

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use sealed_client::{
    CertificateSource, ControllerConfig, EncryptionRequest, FileCertificateSource,
    HttpCertificateSource, SecretSealer,
};
use sealed_envelope::{PlaintextValue, SealingScope};

#[derive(Parser)]
#[command(name = "sealctl", about = "Seal Kubernetes secrets for the sealed-secrets controller", version)]
struct Cli {
    /// Read the certificate from this file instead of the controller
    #[arg(long, global = true)]
    cert: Option<PathBuf>,

    /// Controller base URL (overrides SEALED_SECRETS_CONTROLLER_URL)
    #[arg(long, global = true)]
    controller_url: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Seal KEY=VALUE pairs and print the SealedSecret as JSON
    Seal {
        /// Secret name
        #[arg(long)]
        name: String,
        /// Secret namespace
        #[arg(long, short = 'n', default_value = "default")]
        namespace: String,
        /// strict, namespace-wide or cluster-wide
        #[arg(long, default_value = "strict")]
        scope: SealingScope,
        /// Secret type for the template
        #[arg(long = "type")]
        secret_type: Option<String>,
        /// Values to seal
        #[arg(required = true, value_parser = parse_pair)]
        pairs: Vec<(String, String)>,
    },

    /// Print certificate metadata as JSON
    Cert,

    /// Check the controller health endpoint
    Health,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

fn init_logging(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sealed_client=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().with_target(true).init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn source(cli: &Cli, config: &ControllerConfig) -> Result<Arc<dyn CertificateSource>, String> {
    match &cli.cert {
        Some(path) => Ok(Arc::new(FileCertificateSource::new(path.clone()))),
        None => HttpCertificateSource::new(config.clone())
            .map(|s| Arc::new(s) as Arc<dyn CertificateSource>)
            .map_err(|e| e.to_string()),
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let mut config = ControllerConfig::from_env();
    if let Some(url) = &cli.controller_url {
        config.base_url = Some(url.clone());
    }

    match &cli.command {
        Command::Seal { name, namespace, scope, secret_type, pairs } => {
            let mut req = EncryptionRequest::new(name.as_str(), namespace.as_str(), *scope);
            for (k, v) in pairs {
                req = req.with_value(k.as_str(), PlaintextValue::new(v.as_str()));
            }
            if let Some(t) = secret_type {
                req = req.with_secret_type(t.as_str());
            }

            let sealer = SecretSealer::new(source(&cli, &config)?);
            let result = sealer.encrypt(&req).await.map_err(|e| e.to_string())?;
            for advisory in &result.advisories {
                eprintln!("warning: {}", advisory);
            }
            let json = serde_json::to_string_pretty(&result.document).map_err(|e| e.to_string())?;
            println!("{}", json);
        }
        Command::Cert => {
            let sealer = SecretSealer::new(source(&cli, &config)?);
            let info = sealer.certificate_info(Utc::now()).await.map_err(|e| e.to_string())?;
            if let Some(advisory) = info.advisory() {
                eprintln!("warning: {}", advisory);
            }
            let json = serde_json::to_string_pretty(&info).map_err(|e| e.to_string())?;
            println!("{}", json);
        }
        Command::Health => {
            let http = HttpCertificateSource::new(config).map_err(|e| e.to_string())?;
            http.health().await.map_err(|e| e.to_string())?;
            println!("ok");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
