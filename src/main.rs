//! WordBuddy Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::{prelude::*, types::Update};
use tracing::{error, info, warn};

use WordBuddy::{
    config::Settings,
    database::{connection::create_pool, run_migrations, DatabaseService, WordPoolStore},
    handlers::{handle_callback_query, handle_command, handle_message, Command},
    i18n::I18n,
    services::{NotificationService, ServiceFactory, TutorService},
    utils::logging,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging, the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", WordBuddy::info());

    info!("Connecting to database...");
    let db_pool = create_pool(&settings.database).await?;
    run_migrations(&db_pool).await?;
    let store: Arc<dyn WordPoolStore> = Arc::new(DatabaseService::new(db_pool));

    info!("Loading translations...");
    let mut i18n = I18n::new(&settings.i18n);
    i18n.load_translations().await?;
    let i18n = Arc::new(i18n);

    let bot = Bot::new(&settings.bot.token);

    info!("Initializing services...");
    let services = ServiceFactory::new(&settings).await?;
    let health = services.health_check().await;
    for issue in health.get_issues() {
        warn!(issue = %issue, "Service health issue");
    }

    let notifier = Arc::new(NotificationService::new(bot.clone(), i18n.clone()));
    let tutor = Arc::new(services.tutor(&settings, store, notifier.clone(), i18n.clone())?);

    let mut dispatcher = Dispatcher::builder(bot.clone(), create_handler())
        .dependencies(dptree::deps![tutor, i18n])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.kind);
        })
        .enable_ctrlc_handler()
        .build();

    info!("Starting bot with polling mode...");
    dispatcher.dispatch().await;

    let sent = notifier.stats();
    info!(
        notices_sent = sent.total_sent,
        notices_failed = sent.total_failed,
        "WordBuddy bot has been shut down."
    );
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(dptree::entry().filter_command::<Command>().endpoint(handle_commands))
                .branch(dptree::endpoint(handle_messages)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callbacks))
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: Command,
    tutor: Arc<TutorService>,
    i18n: Arc<I18n>,
) -> HandlerResult {
    if let Err(e) = handle_command(bot, msg, cmd, tutor, i18n).await {
        error!(error = %e, "Error handling command");
        return Err(e.into());
    }
    Ok(())
}

/// Handle regular messages
async fn handle_messages(bot: Bot, msg: Message, tutor: Arc<TutorService>, i18n: Arc<I18n>) -> HandlerResult {
    if let Err(e) = handle_message(bot, msg, tutor, i18n).await {
        error!(error = %e, "Error handling message");
        return Err(e.into());
    }
    Ok(())
}

/// Handle callback queries
async fn handle_callbacks(
    bot: Bot,
    query: CallbackQuery,
    tutor: Arc<TutorService>,
    i18n: Arc<I18n>,
) -> HandlerResult {
    let user_id = query.from.id.0 as i64;
    if let Err(e) = handle_callback_query(bot, query, tutor, i18n).await {
        error!(user_id = user_id, error = %e, "Error handling callback query");
        return Err(e.into());
    }
    Ok(())
}
