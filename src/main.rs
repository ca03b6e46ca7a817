use clap::Parser;
use retreat_notify::utils::error::{ErrorSeverity, NotifyError};
use retreat_notify::utils::{logger, validation::Validate};
use retreat_notify::{CliConfig, FcmTransport, NotificationDispatcher, TomlConfig};

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &NotifyError) -> ! {
    tracing::error!(
        "❌ retreat-notify failed: {} (Severity: {:?})",
        e,
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e.severity()).max(1));
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let config = match TomlConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            fail(&e);
        }
    };

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_logger(&config.logging(), cli.verbose);
    }
    tracing::info!("Starting retreat-notify");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate().and_then(|_| cli.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    let targets = match cli.targets() {
        Ok(targets) => targets,
        Err(e) => fail(&e),
    };
    let transport = match FcmTransport::new(&config) {
        Ok(transport) => transport,
        Err(e) => fail(&e),
    };

    let dispatcher =
        NotificationDispatcher::from_config(transport, &config).with_retry(config.retry_policy());
    let summary = dispatcher.dispatch(&targets, &cli.message()).await;

    println!(
        "✅ Delivered {}/{} notification(s)",
        summary.delivered(),
        summary.reports.len()
    );
    for token in summary.stale_tokens() {
        println!("🗑️ Unregistered token: {}", token);
    }

    let hard_failures = summary.failed() - summary.stale_tokens().len();
    if hard_failures > 0 {
        eprintln!("❌ {} notification(s) could not be delivered", hard_failures);
        std::process::exit(exit_code(ErrorSeverity::Medium));
    }
}
