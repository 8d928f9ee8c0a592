//! Main Entrypoint for a Dilemma Session
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment and the command line.
//! 2. Initializing logging.
//! 3. Loading the seed prompts and building the external service clients.
//! 4. Running exactly one session to completion and logging its summary.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use clap::Parser;
use dilemma_core::{
    Orchestrator, Services, SessionContext, TurnTiming,
    llm_client::OpenAICompatibleClient,
    manipulation::RngSource,
    observer::TracingObserver,
};
use dilemma_session::{
    config::Config,
    console::{ConsoleAttention, ConsoleListen, ConsoleVoice, run_until_closed},
    prompts::SessionPrompts,
    robot::RobotClient,
};
use rand::{SeedableRng, rngs::StdRng};
use std::{path::PathBuf, sync::Arc};
use tracing::info;

/// Runs one spoken moral-dilemma session.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Directory holding system_prompt.md and greeting.md (overrides PROMPTS_PATH).
    #[arg(long)]
    prompts_path: Option<PathBuf>,
    /// Talk through the terminal instead of the robot.
    #[arg(long)]
    console: bool,
    /// Seed for the manipulation condition draw, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // --- 1. Load Configuration ---
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(path) = cli.prompts_path {
        config.prompts_path = path;
    }

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Preparing session...");

    // --- 3. Initialize Services ---
    let prompts = SessionPrompts::load(&config.prompts_path)?;
    let context = SessionContext::new(prompts.system_prompt, prompts.greeting);

    let api_key = config
        .api_key()
        .context("API key for the completion provider is not set")?;
    let openai_config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(config.provider.api_base());
    let completion = Arc::new(OpenAICompatibleClient::new(
        openai_config,
        config.chat_model.clone(),
    ));

    let console_listen = cli.console.then(|| Arc::new(ConsoleListen::stdin()));
    let services = if let Some(listen) = &console_listen {
        info!("Using the console in place of the robot.");
        Services {
            voice: Arc::new(ConsoleVoice::stdout()),
            attention: Arc::new(ConsoleAttention),
            listen: listen.clone(),
            completion,
        }
    } else {
        let robot = Arc::new(RobotClient::new(
            config.robot_url.clone(),
            config.robot_voice.clone(),
        ));
        Services {
            voice: robot.clone(),
            attention: robot.clone(),
            listen: robot,
            completion,
        }
    };

    let timing = TurnTiming {
        first_turn_settle: config.first_turn_settle,
        turn_settle: config.turn_settle,
        call_timeout: config.service_timeout,
    };
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    // --- 4. Run the Session ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        robot_url = %config.robot_url,
        console = cli.console,
        "Services configured. Starting session..."
    );
    let orchestrator =
        Orchestrator::new(context, RngSource(rng), services, timing, TracingObserver);
    let session = async {
        match &console_listen {
            Some(listen) => run_until_closed(orchestrator, listen).await,
            None => orchestrator.run().await.map(Some).map_err(anyhow::Error::from),
        }
    };
    let report = tokio::select! {
        report = session => report?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted. Ending session.");
            None
        }
    };
    let Some(report) = report else {
        return Ok(());
    };

    info!(
        condition = ?report.condition,
        extracted_person = report.context.extracted_person().unwrap_or(""),
        messages = report.context.messages().len(),
        "Session complete."
    );
    Ok(())
}
