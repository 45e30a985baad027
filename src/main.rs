use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use copydesk::{
    AnthropicClient, AnthropicConfig, PipelineRequest, PipelineSpec, RunService, RunnerConfig,
    TextGenerator, create_router, decompose, run_pipeline,
};

#[derive(Parser)]
#[command(name = "copydesk")]
#[command(author, version, about = "Brand content pipeline: draft, review, compliance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0:5000")]
        bind: String,

        /// Candidate model identifier, tried in order; repeatable
        #[arg(long = "model")]
        models: Vec<String>,

        /// Per-stage generation timeout in seconds
        #[arg(long, default_value = "120")]
        stage_timeout: u64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the pipeline once in the foreground and print the result
    Run {
        /// Content topic to write about
        #[arg(short, long)]
        topic: String,

        /// Brand guidelines the content must follow
        #[arg(short, long)]
        guidelines: String,

        /// Skip the final compliance stage
        #[arg(long)]
        skip_compliance: bool,

        /// Candidate model identifier, tried in order; repeatable
        #[arg(long = "model")]
        models: Vec<String>,

        /// Per-stage generation timeout in seconds
        #[arg(long, default_value = "120")]
        stage_timeout: u64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            models,
            stage_timeout,
            verbose,
        } => {
            setup_logging(verbose);
            serve(bind, models, stage_timeout).await
        }
        Commands::Run {
            topic,
            guidelines,
            skip_compliance,
            models,
            stage_timeout,
            verbose,
        } => {
            setup_logging(verbose);
            run_once(topic, guidelines, skip_compliance, models, stage_timeout).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn runner_config(stage_timeout: u64) -> RunnerConfig {
    RunnerConfig {
        stage_timeout: Duration::from_secs(stage_timeout),
    }
}

async fn serve(bind: String, models: Vec<String>, stage_timeout: u64) -> Result<()> {
    let generator: Option<Arc<dyn TextGenerator>> = match AnthropicConfig::from_env() {
        Ok(mut config) => {
            if !models.is_empty() {
                config.models = models;
            }
            Some(Arc::new(AnthropicClient::new(config)))
        }
        Err(err) => {
            warn!("{err}; submissions must include an api_key");
            None
        }
    };

    let service = Arc::new(RunService::new(generator, runner_config(stage_timeout)));
    let app = create_router(service);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {bind}"))?;
    info!("Listening on {}", bind);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

async fn run_once(
    topic: String,
    guidelines: String,
    skip_compliance: bool,
    models: Vec<String>,
    stage_timeout: u64,
) -> Result<()> {
    let request = PipelineRequest::new(&topic, &guidelines)?;

    let mut config = AnthropicConfig::from_env()?;
    if !models.is_empty() {
        config.models = models;
    }
    let client = AnthropicClient::new(config);

    let spec = if skip_compliance {
        PipelineSpec::reduced()
    } else {
        PipelineSpec::standard()
    };

    info!(
        "Running {} stages for '{}'",
        spec.stage_count(),
        request.topic
    );

    let execution = run_pipeline(
        &client,
        &spec,
        &request,
        &runner_config(stage_timeout),
        |_| {},
    )
    .await;

    if let Some(failure) = &execution.failure {
        if !execution.stages.is_empty() {
            warn!(
                "{} of {} stages completed before the failure",
                execution.stages.len(),
                spec.stage_count()
            );
        }
        bail!(failure.detail());
    }

    let outcome =
        decompose(&execution.stages, None).context("Pipeline produced no stage output")?;

    println!("Draft");
    println!("=====");
    println!("{}", outcome.draft);
    println!();
    println!("Review");
    println!("======");
    println!("{}", outcome.review);

    if !outcome.verdict.is_empty() {
        println!();
        println!("Verdict");
        println!("=======");
        println!("{}", outcome.verdict);
    }

    Ok(())
}
