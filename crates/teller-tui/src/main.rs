mod app;
mod handler;
mod tui;
mod ui;

use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use colored::*;
use teller_core::logging;
use teller_core::money::format_money;
use teller_core::{
    AssistantBackend, AssistantClient, Author, ChatSession, Config, Locale, SubmitOutcome,
    TurnController,
};
use tracing::{info, warn};

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "teller")]
#[command(version, about = "Chat with your bank's virtual assistant")]
struct Cli {
    /// Assistant API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// User the conversation belongs to
    #[arg(long, global = true)]
    user_id: Option<String>,
    /// Interface language (vi or en)
    #[arg(long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the reply
    Ask {
        /// Your question
        question: String,
    },
    /// List suggested questions
    Suggestions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|_| Config::new());
    if let Some(url) = cli.api_url {
        config.api_base_url = Some(url);
    }
    if let Some(user) = cli.user_id {
        config.user_id = Some(user);
    }
    if let Some(locale) = cli.locale {
        if Locale::from_str(&locale).is_none() {
            return Err(anyhow!("Unknown locale '{}', expected one of: {}", locale, locale_names()));
        }
        config.locale = Some(locale);
    }

    match cli.command {
        None => run_tui(&config).await,
        Some(Commands::Ask { question }) => ask_once(&config, &question).await,
        Some(Commands::Suggestions) => list_suggestions(&config).await,
    }
}

fn locale_names() -> String {
    Locale::all()
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

async fn run_tui(config: &Config) -> Result<()> {
    // Logging must not write to the terminal the TUI draws on
    let log_path = logging::default_log_path()?;
    logging::init_file(&log_path)?;

    let backend: Arc<dyn AssistantBackend> = Arc::new(AssistantClient::from_config(config));
    let user_id = config.user_id();
    info!(api = %config.api_base_url(), user = %user_id, "starting chat");

    let suggestions = match backend.recommendations(&user_id).await {
        Ok(list) => list,
        Err(e) => {
            warn!(error = %e, "could not load suggested questions");
            Vec::new()
        }
    };

    let controller = TurnController::new(user_id, config.locale()).with_suggestions(suggestions);
    let session = ChatSession::new(controller, backend, config.reveal_delay());
    let mut app = App::new(session);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run_loop(&mut app, &mut terminal, &mut events).await;

    app.shutdown();
    tui::restore()?;
    result
}

async fn run_loop(app: &mut App, terminal: &mut tui::Tui, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            event = events.next() => match event {
                Some(event) => handler::handle_event(app, event)?,
                None => app.should_quit = true,
            },
            _ = app.session.drive() => {}
        }
    }
    Ok(())
}

async fn ask_once(config: &Config, question: &str) -> Result<()> {
    logging::init_stderr()?;

    let backend = Arc::new(AssistantClient::from_config(config));
    let locale = config.locale();
    let strings = locale.strings();
    let mut session = ChatSession::new(
        TurnController::new(config.user_id(), locale),
        backend,
        config.reveal_delay(),
    );

    match session.run_turn(question).await {
        SubmitOutcome::Sent(_) => {}
        SubmitOutcome::Empty => return Err(anyhow!("Question is empty")),
        SubmitOutcome::Busy | SubmitOutcome::Closed => {
            return Err(anyhow!("Chat is not accepting questions"));
        }
    }

    let controller = session.controller();
    if let Some(entry) = controller.log().last().filter(|e| e.author() == Author::Assistant) {
        println!("{}", format!("{}:", strings.assistant_label).yellow().bold());
        let reply: String = entry
            .segments()
            .iter()
            .map(|s| {
                if s.emphasized {
                    s.text.bold().to_string()
                } else {
                    s.text.clone()
                }
            })
            .collect();
        println!("{}", reply);
    }

    if let Some(payment) = controller.pending_payment() {
        println!("\n{}", strings.confirm_title.cyan().bold());
        println!("  {}: {}", strings.amount_label.dimmed(), format_money(payment.amount, locale).bold());
        println!("  {}: {}", strings.account_id_label.dimmed(), payment.account_id);
        println!("  {}: {}", strings.account_name_label.dimmed(), payment.account_name);
        println!("  {}: {}", strings.description_label.dimmed(), payment.description);
    }

    Ok(())
}

async fn list_suggestions(config: &Config) -> Result<()> {
    logging::init_stderr()?;

    let client = AssistantClient::from_config(config);
    let suggestions = client.recommendations(&config.user_id()).await?;
    let strings = config.locale().strings();

    println!("{}", strings.suggestions_title.bold().blue());
    if suggestions.is_empty() {
        println!("{}", "  (none)".dimmed());
    }
    for (i, question) in suggestions.iter().enumerate() {
        println!("  {}. {}", (i + 1).to_string().dimmed(), question);
    }

    Ok(())
}
