use anyhow::{Context, Result};
use std::sync::Arc;

use rail_concession::config::{ConcessionConfig, StorageBackend};
use rail_concession::identity::{IdentityProvider, Session, SessionFile};
use rail_concession::stations;
use rail_concession::storage::{JsonFileStore, Store};
use rail_concession::workflows::{
    Actor, ApplicationWorkflow, ConcessionApplication, RandomPassIssuer,
};

use super::{Cli, Commands, ConfigAction};

pub mod draft;
pub mod review;
pub mod session;
pub mod show_config;
pub mod stations_list;
pub mod status;
pub mod submit;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// The workflow and login session every command runs against
pub struct CommandContext {
    pub workflow: ApplicationWorkflow,
    pub sessions: SessionFile,
}

impl CommandContext {
    pub async fn from_config(config: &ConcessionConfig) -> Result<Self> {
        let store = open_store(config).await?;
        let workflow = ApplicationWorkflow::new(store)
            .with_pass_issuer(Arc::new(RandomPassIssuer::new(
                config.workflow.pass_prefix.clone(),
            )))
            .with_settings(config.workflow_settings());

        Ok(Self {
            workflow,
            sessions: SessionFile::new(config.session_path()),
        })
    }

    pub async fn session(&self) -> Result<Session> {
        Ok(self.sessions.require_session().await?)
    }

    pub async fn actor(&self) -> Result<Actor> {
        Ok(self.sessions.current_actor().await?)
    }
}

async fn open_store(config: &ConcessionConfig) -> Result<Arc<dyn Store>> {
    match config.storage.backend {
        StorageBackend::File => {
            let store = JsonFileStore::open(&config.storage.data_dir)
                .await
                .with_context(|| {
                    format!(
                        "Failed to open data directory {}",
                        config.storage.data_dir.display()
                    )
                })?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "database")]
        StorageBackend::Sqlite => {
            let store = rail_concession::storage::SqliteStore::connect(
                &config.storage.database_url,
                config.storage.max_connections,
            )
            .await
            .context("Failed to open SQLite store")?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "database"))]
        StorageBackend::Sqlite => {
            anyhow::bail!("The sqlite backend needs a build with the `database` feature")
        }
    }
}

/// Parse the command line result and run it
pub async fn run(cli: Cli, config: &ConcessionConfig) -> Result<()> {
    let Some(command) = cli.command else {
        return show_how_to_get_started().await;
    };

    match command {
        Commands::Stations { query } => stations_list::StationsCommand::new(query).print(),
        Commands::Config {
            action: ConfigAction::Show,
        } => show_config::ConfigShowCommand.print(config),
        Commands::Login { role, id, profile } => {
            with_store(session::LoginCommand::new(role, id, profile), config).await
        }
        Commands::Logout => with_store(session::LogoutCommand, config).await,
        Commands::Whoami => with_store(session::WhoamiCommand, config).await,
        Commands::Submit { journey } => with_store(submit::SubmitCommand::new(journey), config).await,
        Commands::Draft { action } => with_store(draft::DraftCommand::new(action), config).await,
        Commands::Approve { id, remarks } => {
            with_store(review::ApproveCommand::new(id, remarks), config).await
        }
        Commands::Reject { id, reason } => {
            with_store(review::RejectCommand::new(id, reason), config).await
        }
        Commands::Transition { id, status, reason } => {
            with_store(review::TransitionCommand::new(id, status, reason), config).await
        }
        Commands::Queue => with_store(review::QueueCommand, config).await,
        Commands::History => with_store(status::HistoryCommand, config).await,
        Commands::Show { id, json } => with_store(status::ShowCommand::new(id, json), config).await,
        Commands::Status => with_store(status::StatusCommand, config).await,
    }
}

/// Opens the configured store and runs `command` against it
async fn with_store<C: Command>(command: C, config: &ConcessionConfig) -> Result<()> {
    let ctx = CommandContext::from_config(config).await?;
    command.execute(&ctx).await
}

pub async fn show_how_to_get_started() -> Result<()> {
    println!("🚆 Concession - Student Railway Concession Applications");
    println!();
    println!("To get started:");
    println!("  🔑 concession login --role student --id <id>   # Start a session");
    println!("  📝 concession submit --from CSMT --to TNA      # Apply for a pass");
    println!("  📊 concession status                           # Your dashboard");
    println!();
    println!("Reviewer commands:");
    println!("  📋 concession queue                            # Applications awaiting you");
    println!("  ✅ concession approve <id>                     # Approve at your stage");
    println!("  ❌ concession reject <id> --reason <text>      # Reject with a reason");
    println!();
    println!("💡 Run 'concession stations' to look up station codes.");
    Ok(())
}

/// One-line listing entry
pub fn print_application_line(application: &ConcessionApplication) {
    let itinerary = application.itinerary();
    println!(
        "  {}  {:<16} {} → {}  ({}, {})",
        application.id(),
        application.status().label(),
        itinerary.source_station,
        itinerary.destination_station,
        itinerary.travel_class,
        itinerary.duration,
    );
}

pub fn print_application_detail(application: &ConcessionApplication) {
    let itinerary = application.itinerary();
    let applicant = application.applicant();

    println!("📄 Application {}", application.id());
    println!("   Status:       {}", application.status().label());
    println!("   Student:      {}", application.user_id());
    if !applicant.student_name.is_empty() {
        println!("   Name:         {}", applicant.student_name);
    }
    if !applicant.college_name.is_empty() {
        println!("   College:      {}", applicant.college_name);
    }
    println!(
        "   Journey:      {} → {}",
        stations::display_name(&itinerary.source_station),
        stations::display_name(&itinerary.destination_station)
    );
    println!("   Class:        {}", itinerary.travel_class);
    println!("   Duration:     {}", itinerary.duration);
    println!("   Reason:       {}", application.reason());
    println!(
        "   Valid:        {} to {}",
        application.validity().valid_from.format("%Y-%m-%d"),
        application.validity().valid_to.format("%Y-%m-%d")
    );
    println!("   Submitted:    {}", application.created_at().to_rfc3339());

    if let Some(at) = application.state().college_approved_at() {
        println!("   College OK:   {}", at.to_rfc3339());
    }
    if let Some(remarks) = application.college_remarks() {
        println!("   College note: {remarks}");
    }
    if let Some(at) = application.state().railway_approved_at() {
        println!("   Railway OK:   {}", at.to_rfc3339());
    }
    if let Some(remarks) = application.railway_remarks() {
        println!("   Railway note: {remarks}");
    }
    if let Some(token) = application.state().pass_token() {
        println!("   🎫 Pass:      {token}");
    }
    if let Some(reason) = application.state().rejection_reason() {
        println!("   Rejected:     {reason}");
    }
}
