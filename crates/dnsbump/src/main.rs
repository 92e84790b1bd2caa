// # dnsbump
//
// Points DNS records at the current public IP.
//
// This binary is a THIN integration layer: it parses arguments, sets up
// logging and the runtime, wires the Cloudflare provider, the HTTP IP source
// and a confirmation policy into `SyncEngine`, and turns the result into an
// exit code. All decision logic lives in dnsbump-core.
//
// ## Usage
//
// ```bash
// dnsbump -token "$CLOUDFLARE_API_TOKEN" foo.com:cloud,bar.net:www
// dnsbump --token ... -y --keep-going foo.com:cloud,foo.com:vpn
// ```
//
// The domains to update are given as a comma separated list of
// `zone:domain-prefix` pairs. Every A (or AAAA, for an IPv6 address) record in
// `zone` whose name starts with `domain-prefix` is pointed at the current IP.

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use dnsbump_core::config::DEFAULT_IP_TIMEOUT_SECS;
use dnsbump_core::{
    AlwaysNo, Confirm, DdnsConfig, EngineConfig, FailurePolicy, InteractivePrompt,
    IpSourceConfig, ProviderConfig, RunReport, SyncEngine, UpdateOutcome, ZoneDomainConfig,
};
use dnsbump_ip_http::{DEFAULT_IP_URL, HttpIpSource};
use dnsbump_provider_cloudflare::CloudflareProvider;
use std::ffi::OsString;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Every zone processed, nothing failed
/// - 1: Configuration error
/// - 2: Runtime error (IP discovery, provider, or write failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DnsbumpExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DnsbumpExitCode> for ExitCode {
    fn from(code: DnsbumpExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Update DNS records at Cloudflare to point at this machine's public IP
#[derive(Debug, Parser)]
#[command(
    name = "dnsbump",
    version,
    after_help = "The domains to update are provided as a comma separated list of zone:domain pairs.\n\
                  For example: foo.com:cloud,bar.net:www"
)]
struct Cli {
    /// Cloudflare API token. Must have edit access to all zone:domain pairs specified
    #[arg(long, env = "CLOUDFLARE_API_TOKEN", hide_env_values = true)]
    token: String,

    /// Skip confirmation of changes
    #[arg(short = 'y', long = "yes")]
    yes: bool,

    /// Look up and report changes without writing them
    #[arg(long)]
    dry_run: bool,

    /// Continue with remaining zones and records after a failure
    #[arg(long)]
    keep_going: bool,

    /// Plaintext endpoint returning the caller's public IP
    #[arg(long, default_value = DEFAULT_IP_URL)]
    ip_url: String,

    /// Upper bound for each record write, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DNSBUMP_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// zone:domain pairs, e.g. foo.com:cloud,bar.net:www
    #[arg(value_name = "ZONE:DOMAIN")]
    domains: String,
}

impl Cli {
    /// Validate arguments that clap cannot check on its own
    fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            anyhow::bail!(
                "A Cloudflare API token is required. \
                Pass -token <TOKEN> or set CLOUDFLARE_API_TOKEN"
            );
        }

        // Check for obvious placeholder tokens (common mistake)
        let token_lower = self.token.to_lowercase();
        if token_lower.contains("your_token")
            || token_lower.contains("replace_me")
            || token_lower == "token"
        {
            anyhow::bail!(
                "The API token appears to be a placeholder. \
                Use an actual API token from Cloudflare."
            );
        }

        if !self.ip_url.starts_with("https://") && !self.ip_url.starts_with("http://") {
            anyhow::bail!("--ip-url must use HTTP or HTTPS scheme. Got: {}", self.ip_url);
        }

        if !(1..=300).contains(&self.timeout_secs) {
            anyhow::bail!(
                "--timeout-secs must be between 1 and 300 seconds. Got: {}",
                self.timeout_secs
            );
        }

        parse_log_level(&self.log_level)?;

        Ok(())
    }

    /// Build the immutable run configuration
    fn to_config(&self) -> dnsbump_core::Result<DdnsConfig> {
        let zones = ZoneDomainConfig::parse(&self.domains)?;

        let config = DdnsConfig {
            zones,
            provider: ProviderConfig::Cloudflare {
                api_token: self.token.clone(),
                dry_run: self.dry_run,
            },
            ip_source: IpSourceConfig::Http {
                url: self.ip_url.clone(),
                timeout_secs: DEFAULT_IP_TIMEOUT_SECS,
            },
            engine: EngineConfig {
                skip_confirmation: self.yes,
                failure_policy: if self.keep_going {
                    FailurePolicy::ContinueOnError
                } else {
                    FailurePolicy::FailFast
                },
                write_timeout_secs: self.timeout_secs,
                ..EngineConfig::default()
            },
        };

        config.validate()?;
        Ok(config)
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "Log level '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

/// Accept Go-style single-dash long flags (`-token x`, `-token=x`)
fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-token") => OsString::from("--token"),
            Some(s) if s.starts_with("-token=") => OsString::from(format!("-{}", s)),
            _ => arg,
        })
        .collect()
}

/// Pick the confirmation policy for this process
///
/// Prompting only makes sense when a human is watching stdout; otherwise
/// every change is declined unless `-y` was given (the engine bypasses the
/// policy in that case).
fn confirmation_policy() -> Box<dyn Confirm> {
    if std::io::stdout().is_terminal() {
        Box::new(InteractivePrompt::stdio())
    } else {
        Box::new(AlwaysNo)
    }
}

/// Parse the command line, mapping clap failures to our exit codes
///
/// `--help` and `--version` exit 0; every other parse failure (missing token,
/// missing `ZONE:DOMAIN`, unknown flag) is a configuration error.
fn parse_args<I>(args: I) -> std::result::Result<Cli, DnsbumpExitCode>
where
    I: IntoIterator<Item = OsString>,
{
    Cli::try_parse_from(normalize_legacy_flags(args)).map_err(|e| {
        if let Err(print_err) = e.print() {
            eprintln!("Failed to print usage: {}", print_err);
        }

        match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => DnsbumpExitCode::Success,
            _ => DnsbumpExitCode::ConfigError,
        }
    })
}

fn main() -> ExitCode {
    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(code) => return code.into(),
    };

    if let Err(e) = cli.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DnsbumpExitCode::ConfigError.into();
    }

    let config = match cli.to_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DnsbumpExitCode::ConfigError.into();
        }
    };

    // Logs go to stderr so the confirmation prompt on stdout stays readable
    let log_level = parse_log_level(&cli.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnsbumpExitCode::ConfigError.into();
    }

    if !config.engine.skip_confirmation && !std::io::stdout().is_terminal() {
        warn!("Not attached to a terminal and -y not given: changes will be reported but not applied");
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnsbumpExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(config).await {
            Ok(report) if report.has_failures() => DnsbumpExitCode::RuntimeError,
            Ok(_) => DnsbumpExitCode::Success,
            Err(e) => {
                error!("{}", e);
                DnsbumpExitCode::RuntimeError
            }
        }
    });

    code.into()
}

/// Wire the collaborators and run the engine once
async fn run(config: DdnsConfig) -> Result<RunReport> {
    info!(
        "Updating {} zone(s) via {}",
        config.zones.len(),
        config.provider.type_name()
    );

    let provider = CloudflareProvider::from_config(&config.provider)?;
    let ip_source = HttpIpSource::from_config(&config.ip_source)?;

    let (engine, _events) = SyncEngine::new(
        Box::new(ip_source),
        Box::new(provider),
        confirmation_policy(),
        config,
    )?;

    let report = engine.run().await?;
    log_summary(&report);

    Ok(report)
}

fn log_summary(report: &RunReport) {
    for failure in &report.zone_failures {
        error!("zone {} not processed: {}", failure.zone, failure.error);
    }
    for outcome in &report.outcomes {
        match &outcome.outcome {
            UpdateOutcome::Failed { error: e } => {
                error!("{} ({}) not updated: {}", outcome.record_name, outcome.zone, e);
            }
            other => debug!(
                "{} ({}): {}",
                outcome.record_name,
                outcome.zone,
                other.label()
            ),
        }
    }

    info!(
        "Done: {} applied, {} skipped, {} failed, {} zone(s) failed",
        report.applied(),
        report.skipped(),
        report.failed(),
        report.zone_failures.len()
    );
}
