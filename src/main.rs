use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;

use musify::config::AppConfig;
use musify::controller::{HomeFeedController, SearchController, SearchSessions};
use musify::model::{CatalogClient, ScreenState, SearchResultKind};
use musify::paging::PageSource;
use musify::{auth, logging};

/// Pages printed per search variant before stopping
const MAX_PAGES: usize = 3;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    if let Err(e) = logging::init_logging(&config.log_dir) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Musify Starting ===");

    let mut args = std::env::args().skip(1);
    let search_term = args.next();
    let kind = match args.next() {
        Some(name) => SearchResultKind::parse(&name)
            .with_context(|| format!("unknown result kind {name:?}"))?,
        None => SearchResultKind::Track,
    };

    let spotify = auth::authenticate().await?;
    let catalog = Arc::new(CatalogClient::new(spotify, config.page_size));
    let locale = Arc::new(config);

    let home = HomeFeedController::new(catalog.clone(), locale.clone()).await;
    home.settled().await;
    println!("{}", home.greeting());
    report_state(&home.state().borrow());
    for carousel in home.carousels().borrow().iter() {
        println!("\n== {} ==", carousel.title);
        for item in &carousel.items {
            println!("  {}", item.caption);
        }
    }
    home.dispose().await;

    if let Some(term) = search_term {
        let search = SearchController::new(catalog, locale);
        if let Some(sessions) = search.search(&term).await {
            search.settled().await;
            report_state(&search.state().borrow());
            println!("\n== {} for {:?} ==", kind.name(), term);
            print_variant(&sessions, kind).await;
        }
        search.dispose().await;
    }

    tracing::info!("Musify shutting down");
    Ok(())
}

fn report_state(state: &ScreenState) {
    if let ScreenState::Error { message, cause } = state {
        tracing::warn!(%cause, "Screen reported an error");
        eprintln!("{message}");
    }
}

async fn print_variant(sessions: &SearchSessions, kind: SearchResultKind) {
    match kind {
        SearchResultKind::Album => {
            print_pages(&sessions.albums, |a| format!("{} - {}", a.name, a.artists_string)).await
        }
        SearchResultKind::Artist => print_pages(&sessions.artists, |a| a.name.clone()).await,
        SearchResultKind::Track => {
            print_pages(&sessions.tracks, |t| format!("{} - {}", t.name, t.artists_string)).await
        }
        SearchResultKind::Playlist => {
            print_pages(&sessions.playlists, |p| format!("{} ({})", p.name, p.owner_name)).await
        }
        SearchResultKind::Podcast => {
            print_pages(&sessions.podcasts, |p| format!("{} - {}", p.name, p.publisher)).await
        }
        SearchResultKind::Episode => {
            print_pages(&sessions.episodes, |e| format!("{} ({})", e.name, e.release_date)).await
        }
    }
}

async fn print_pages<T>(source: &PageSource<T>, describe: impl Fn(&T) -> String)
where
    T: Send + Sync + 'static,
{
    let mut pages = Box::pin(source.subscribe().into_stream().take(MAX_PAGES));
    while let Some(page) = pages.next().await {
        match page {
            Ok(page) => {
                for item in &page.items {
                    println!("  {}", describe(item));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Paging stopped");
                eprintln!("{e}");
                break;
            }
        }
    }
}
