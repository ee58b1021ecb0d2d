use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;

use email_relay::handlers::{self, AppState};
use email_relay::{Config, Mailer, SmtpClient};

/// Log panics instead of letting them pass silently. actix restarts the
/// worker, so the server keeps accepting connections.
fn install_panic_logger() {
    std::panic::set_hook(Box::new(|info| {
        log::error!("Uncaught panic: {}", info);
    }));
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the logger so RUST_LOG can come from it
    let dotenv = dotenvy::dotenv();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    install_panic_logger();

    if let Ok(path) = dotenv {
        log::info!("Loaded environment from {}", path.display());
    }

    let config = Config::from_env()?;

    log::info!("🚀 Starting email relay");
    log::info!(
        "📫 SMTP: {}:{} as {}",
        config.smtp.host,
        config.smtp.port,
        config.mail.from_email
    );
    log::info!("📄 Templates: {}", config.mail.templates_dir.display());
    if config.dev_mode {
        log::warn!("Development mode: error details are included in 500 responses");
    }

    let smtp = SmtpClient::new(&config.smtp)?;
    let mailer = Mailer::new(&config.mail, Arc::new(smtp))?;

    let state = web::Data::new(AppState {
        mailer,
        default_subject: config.mail.default_subject.clone(),
        dev_mode: config.dev_mode,
    });

    let bind_addr = ("0.0.0.0", config.port);
    log::info!("🌐 Server running at http://localhost:{}", config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(handlers::cors())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
