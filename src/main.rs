// SPDX-License-Identifier: MIT

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use mealplan_rs::adk::agent::{Agent, LLMAgent};
use mealplan_rs::planner::config::PlannerConfig;
use mealplan_rs::planner::factory::create_model;
use mealplan_rs::planner::search::create_search_service;
use mealplan_rs::planner::workflow::checkpoint::ThreadId;
use mealplan_rs::planner::workflow::events::RunEvent;
use mealplan_rs::MealPlanner;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Produce a meal plan for a task
    Plan {
        /// What the meal plan should satisfy
        #[arg(short, long)]
        task: String,

        /// Number of drafts to write (defaults to the config value)
        #[arg(short, long)]
        max_revisions: Option<u32>,

        /// Thread id to run on (random when omitted)
        #[arg(long)]
        thread: Option<String>,

        /// Path to a YAML config file
        #[arg(short, long)]
        config: Option<String>,

        /// Print progress events as JSON lines while running
        #[arg(long)]
        stream: bool,
    },
    /// Send a single prompt to the configured model
    Prompt {
        #[arg(short, long)]
        prompt: String,

        /// Path to a YAML config file
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn load_config(
    path: Option<&str>,
) -> Result<PlannerConfig, Box<dyn std::error::Error + Send + Sync>> {
    let config = match path {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    }
    .with_env_overrides()?;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Plan {
            task,
            max_revisions,
            thread,
            config,
            stream,
        } => {
            let config = load_config(config.as_deref())?;
            let model = create_model(&config.model)?;
            let search = create_search_service(&config.search.provider)?;
            log::info!(
                "Using model {} ({}) with {} search",
                config.model.model_name,
                model.provider(),
                search.name()
            );

            let planner = MealPlanner::from_config(&config, model, search);
            let max_revisions = max_revisions.unwrap_or_else(|| planner.max_revisions());
            let thread_id = thread
                .map(ThreadId::new)
                .unwrap_or_else(ThreadId::generate);

            let report = if stream {
                let (tx, rx) = mpsc::channel::<RunEvent>(32);
                let printer = tokio::spawn(async move {
                    let mut events = ReceiverStream::new(rx);
                    while let Some(event) = events.next().await {
                        match serde_json::to_string(&event) {
                            Ok(line) => println!("{}", line),
                            Err(e) => log::warn!("Failed to encode event: {}", e),
                        }
                    }
                });
                let result = planner
                    .run_stream(thread_id, &task, max_revisions, tx)
                    .await;
                printer.await?;
                result?
            } else {
                planner.invoke(thread_id, &task, max_revisions).await?
            };

            log::info!(
                "Thread {} wrote {} draft(s)",
                report.thread_id,
                report.revisions
            );
            let draft = report.draft.into_result()?;
            if !stream {
                println!("{}", draft);
            }
        }
        Commands::Prompt { prompt, config } => {
            let config = load_config(config.as_deref())?;
            let model = create_model(&config.model)?;

            let agent = LLMAgent::new(
                "assistant".to_string(),
                "You are a helpful meal planning assistant.".to_string(),
                model,
            )
            .with_config(config.generation_config());

            let response = agent.run(prompt).await?;
            println!("{}", response);
        }
    }

    Ok(())
}
