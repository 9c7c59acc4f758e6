//! CLI entrypoint for tool-concierge
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use concierge_application::{
    ConversationLogger, LlmGateway, NoProgress, Orchestrator, TurnOptions,
};
use concierge_domain::ToolArguments;
use concierge_infrastructure::{
    ConfigLoader, FileConfig, GeminiGateway, JsonlConversationLogger, negotiation_order,
};
use concierge_presentation::{
    ChatRepl, Cli, OutputConfig, OutputFormatter, ProgressReporter, ReplConfig, formatter_for,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose logs `debug = true` raises to debug level
const OWN_TARGETS: [&str; 4] = [
    "concierge_domain",
    "concierge_application",
    "concierge_infrastructure",
    "tool_concierge",
];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
    };
    apply_cli_overrides(&mut config, &cli);
    config.validate()?;

    let _log_guard = init_logging(cli.verbose, config.behavior.debug, &config);

    info!("Starting tool-concierge");

    let output_config = OutputConfig {
        format: config.output.effective_format(cli.output.map(Into::into)),
        color: config.output.colors_enabled(),
        show_details: config.behavior.debug,
    };
    if !output_config.color {
        colored::control::set_override(false);
    }
    let formatter = formatter_for(output_config.format, output_config.show_details);

    // === Dependency Injection ===
    let gateway: Arc<dyn LlmGateway> = Arc::new(GeminiGateway::from_config(&config.model)?);
    let transports = negotiation_order(
        &config.server.endpoint,
        config.server.sse_endpoint(),
        config.request_timeout(),
    );

    let mut orchestrator = Orchestrator::new(transports, gateway, config.behavior_config());
    if let Some(path) = &config.logging.conversation_log {
        match JsonlConversationLogger::new(path) {
            Some(logger) => {
                let logger: Arc<dyn ConversationLogger> = Arc::new(logger);
                orchestrator = orchestrator.with_conversation_logger(logger);
            }
            None => warn!("Conversation log disabled: cannot open {}", path),
        }
    }
    let orchestrator = Arc::new(orchestrator);

    orchestrator.connect().await?;

    let result = run(&cli, &config, orchestrator.clone(), formatter).await;
    orchestrator.disconnect().await;
    result
}

async fn run(
    cli: &Cli,
    config: &FileConfig,
    orchestrator: Arc<Orchestrator>,
    formatter: Box<dyn OutputFormatter>,
) -> Result<()> {
    if cli.list_tools {
        let tools = orchestrator.list_available_tools().await;
        println!("{}", formatter.format_tools(&tools));
        return Ok(());
    }

    if let Some(tool) = &cli.tool {
        let arguments = match &cli.args {
            Some(json) => ToolArguments::parse(json).context("Invalid --args")?,
            None => ToolArguments::new(),
        };
        let result = orchestrator.execute_tool(tool, &arguments).await?;
        println!("{}", formatter.format_tool_result(&result));
        if !result.succeeded() {
            bail!("Tool '{}' failed", tool);
        }
        return Ok(());
    }

    // Chat mode
    if cli.chat {
        let repl_config = ReplConfig {
            show_progress: config.repl.progress_enabled(cli.quiet),
            history_file: config.repl.history_path(),
        };
        let mut repl = ChatRepl::new(orchestrator, formatter).with_config(repl_config);
        if let Some(seconds) = cli.timeout.filter(|s| *s > 0) {
            repl = repl.with_turn_options(TurnOptions::with_timeout(Duration::from_secs(seconds)));
        }
        repl.run().await?;
        return Ok(());
    }

    // Single message mode - message is required
    let message = match &cli.message {
        Some(m) => m,
        None => bail!("A message is required. Use --chat for interactive mode."),
    };

    let show_progress = config.repl.progress_enabled(cli.quiet);
    let turn = tokio::select! {
        turn = process(&orchestrator, message, show_progress) => turn?,
        _ = tokio::signal::ctrl_c() => bail!("Interrupted"),
    };

    println!("{}", formatter.format_turn(&turn));
    if !turn.succeeded {
        bail!(
            "{}",
            turn.error_message.as_deref().unwrap_or("Request failed")
        );
    }

    Ok(())
}

async fn process(
    orchestrator: &Orchestrator,
    message: &str,
    show_progress: bool,
) -> Result<concierge_domain::ConversationTurn> {
    let turn = if show_progress {
        let progress = ProgressReporter::new();
        orchestrator
            .process_user_input(message, TurnOptions::default(), &progress)
            .await?
    } else {
        orchestrator
            .process_user_input(message, TurnOptions::default(), &NoProgress)
            .await?
    };
    Ok(turn)
}

/// Command-line flags take precedence over every configuration source.
fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(endpoint) = &cli.endpoint {
        config.server.endpoint = endpoint.clone();
    }
    if let Some(model) = &cli.model {
        config.model.model = model.clone();
    }
    if let Some(seconds) = cli.timeout {
        config.behavior.turn_timeout_seconds = (seconds > 0).then_some(seconds);
    }
    if cli.strict {
        config.behavior.strict_validation = true;
    }
    if cli.debug {
        config.behavior.debug = true;
    }
}

/// Install the tracing subscriber. The returned guard flushes the log file
/// when dropped.
fn init_logging(verbose: u8, debug: bool, config: &FileConfig) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives = level.to_string();
        if debug && verbose < 2 {
            for target in OWN_TARGETS {
                directives.push_str(&format!(",{}=debug", target));
            }
        }
        EnvFilter::new(directives)
    });

    let (file_layer, guard) = match &config.logging.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "concierge.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    guard
}
