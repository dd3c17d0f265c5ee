//! `notehub` -- terminal client for the NoteHub notes service.
//!
//! Lists notes page by page with a debounced search, and creates or
//! deletes notes through a validated form. Logs go to stderr; the list is
//! redrawn on stdout whenever it changes.
//!
//! # Environment variables
//!
//! | Variable                       | Required | Default                                       |
//! |--------------------------------|----------|-----------------------------------------------|
//! | `NOTEHUB_API_URL`              | no       | `https://notehub-public.goit.study/api/notes` |
//! | `NOTEHUB_TOKEN`                | no       | --                                            |
//! | `NOTEHUB_PAGE_SIZE`            | no       | `12`                                          |
//! | `NOTEHUB_SEARCH_DEBOUNCE_MS`   | no       | `1000`                                        |
//! | `NOTEHUB_REQUEST_TIMEOUT_SECS` | no       | `30`                                          |

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notehub_app::config::AppConfig;
use notehub_app::mutation::MutationController;
use notehub_app::query::{NotesCache, QueryController};
use notehub_app::render::{help_text, render_view};
use notehub_app::session::{Reply, Session};
use notehub_client::{NotesApi, NotesClient};
use notehub_events::EventBus;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "notehub=info,notehub_app=info,notehub_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    if config.client.token.is_none() {
        tracing::warn!("NOTEHUB_TOKEN is not set; requests are sent without authorization");
    }

    tracing::info!(
        api_url = %config.client.api_url,
        page_size = config.query.page_size,
        "Starting notehub",
    );

    let api: Arc<dyn NotesApi> =
        Arc::new(NotesClient::new(&config.client).context("Failed to build HTTP client")?);
    let bus = Arc::new(EventBus::default());
    let cache = Arc::new(NotesCache::with_events(bus.clone()));
    let cancel = CancellationToken::new();

    let (query, controller) = QueryController::spawn(
        api.clone(),
        cache.clone(),
        &bus,
        config.query.clone(),
        cancel.clone(),
    );
    let mutations = Arc::new(MutationController::new(api, cache, bus));

    // Redraw the list on every view change.
    let mut views = query.subscribe();
    let render_cancel = cancel.clone();
    let renderer = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = render_cancel.cancelled() => break,
                changed = views.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let text = render_view(&views.borrow_and_update());
                    let mut stdout = tokio::io::stdout();
                    let _ = stdout.write_all(format!("\n{text}").as_bytes()).await;
                    let _ = stdout.flush().await;
                }
            }
        }
    });

    let mut session = Session::new(query, mutations);
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(help_text().as_bytes()).await?;

    loop {
        stdout.write_all(session.prompt().as_bytes()).await?;
        stdout.flush().await?;

        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            line = lines.next_line() => line.context("Failed to read stdin")?,
        };

        // End of input.
        let Some(line) = line else { break };

        match session.handle_line(&line).await {
            Reply::Continue(text) if text.is_empty() => {}
            Reply::Continue(text) => {
                stdout.write_all(text.as_bytes()).await?;
                if !text.ends_with('\n') {
                    stdout.write_all(b"\n").await?;
                }
            }
            Reply::Quit => break,
        }
    }

    cancel.cancel();
    let _ = tokio::join!(controller, renderer);
    tracing::info!("notehub stopped");

    Ok(())
}
