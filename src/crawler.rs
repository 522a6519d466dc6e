use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::fetch::{FetchError, Fetcher, Page};
use crate::parser::listing::{self, CardSummary};
use crate::parser::profile::{self, CardContext, Profile};
use crate::roster::Roster;

/// Department listing pages the crawl starts from.
pub const SEED_URLS: [&str; 9] = [
    "https://iba-suk.edu.pk/faculty/management-science",
    "https://iba-suk.edu.pk/faculty/computer-science",
    "https://iba-suk.edu.pk/faculty/electrical-engineering",
    "https://iba-suk.edu.pk/faculty/Computer-system-engineering",
    "https://iba-suk.edu.pk/faculty/education",
    "https://iba-suk.edu.pk/faculty/mathematics",
    "https://iba-suk.edu.pk/faculty/supporting-faculty/english",
    "https://iba-suk.edu.pk/faculty/physical-education",
    "https://iba-suk.edu.pk/faculty/Media-Communication",
];

pub fn seed_urls() -> Result<Vec<Url>> {
    SEED_URLS
        .iter()
        .map(|s| Url::parse(s).with_context(|| format!("Invalid seed URL {}", s)))
        .collect()
}

/// Crawl stats returned after completion.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlStats {
    pub listings: usize,
    pub cards: usize,
    pub profiles: usize,
    pub degraded: usize,
    pub replaced: usize,
    pub failures: usize,
}

#[derive(Debug, Clone)]
pub enum Request {
    Listing { url: Url },
    Profile { url: Url, card: CardContext },
}

impl Request {
    pub fn url(&self) -> &Url {
        match self {
            Request::Listing { url } | Request::Profile { url, .. } => url,
        }
    }
}

struct Outcome {
    request: Request,
    result: std::result::Result<Page, FetchError>,
}

/// Log a fetch that failed outright. Nothing is retried or recorded.
pub fn on_failure(request: &Request, failure: &FetchError) {
    let status = failure
        .status()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "N/A".into());
    error!(
        url = %request.url(),
        status = %status,
        "Request failed with error: {}",
        failure
    );
}

/// Run the full listing → profile crawl and return every record collected.
pub async fn crawl(
    fetcher: Arc<dyn Fetcher>,
    seeds: Vec<Url>,
    concurrency: usize,
) -> Result<(Roster, CrawlStats)> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages ({per_sec})")?
            .progress_chars("=> "),
    );

    let mut crawl = Crawl {
        fetcher,
        semaphore: Arc::new(Semaphore::new(concurrency.clamp(1, Semaphore::MAX_PERMITS))),
        tasks: JoinSet::new(),
        roster: Roster::new(),
        stats: CrawlStats::default(),
        pb,
    };

    for url in seeds {
        crawl.spawn(Request::Listing { url });
    }

    // Responses are handled one at a time; only fetching runs concurrently.
    while let Some(joined) = crawl.tasks.join_next().await {
        crawl.pb.inc(1);
        match joined {
            Ok(Outcome {
                request,
                result: Ok(page),
            }) => crawl.handle(request, page),
            Ok(Outcome {
                request,
                result: Err(e),
            }) => {
                on_failure(&request, &e);
                crawl.stats.failures += 1;
            }
            Err(e) => {
                error!(error = %e, "fetch task did not complete");
                crawl.stats.failures += 1;
            }
        }
    }

    crawl.pb.finish_and_clear();
    let stats = crawl.stats;
    info!(
        "Crawled {} listings: {} cards, {} profiles ({} degraded), {} failures",
        stats.listings, stats.cards, stats.profiles, stats.degraded, stats.failures
    );
    Ok((crawl.roster, stats))
}

struct Crawl {
    fetcher: Arc<dyn Fetcher>,
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<Outcome>,
    roster: Roster,
    stats: CrawlStats,
    pb: ProgressBar,
}

impl Crawl {
    fn spawn(&mut self, request: Request) {
        let fetcher = Arc::clone(&self.fetcher);
        let sem = Arc::clone(&self.semaphore);
        self.pb.inc_length(1);

        self.tasks.spawn(async move {
            let _permit = sem.acquire().await.ok();
            let result = fetcher.fetch(request.url()).await;
            Outcome { request, result }
        });
    }

    fn handle(&mut self, request: Request, page: Page) {
        debug!(url = %page.url, status = page.status, "settled");
        match request {
            Request::Listing { .. } => self.handle_listing(page),
            Request::Profile { url, card } => self.handle_profile(url, card, page),
        }
    }

    fn handle_listing(&mut self, page: Page) {
        let cards = listing::scan_cards(&page.body);
        info!("Listing {}: {} cards", page.url, cards.len());
        self.stats.listings += 1;
        self.stats.cards += cards.len();

        for card in cards {
            let Some(url) = resolve_card(&page, &card) else {
                continue;
            };
            let card = CardContext {
                name: card.name,
                designation: card.designation,
            };
            self.spawn(Request::Profile { url, card });
        }
    }

    /// Extraction has no failure path: every missing piece of markup maps to a
    /// placeholder, so each fetched profile yields exactly one record.
    fn handle_profile(&mut self, url: Url, card: CardContext, page: Page) {
        let Profile {
            name,
            record,
            degraded,
        } = profile::extract(&page.body, &card);

        if degraded {
            warn!(url = %url, name = ?card.name, "No details block found");
            self.stats.degraded += 1;
        }

        let name = name.unwrap_or_else(|| {
            warn!(url = %url, "profile has no name, keying by URL");
            url.to_string()
        });
        if self.roster.insert(name.clone(), record) {
            debug!(name = %name, url = %url, "replaced earlier record with same name");
            self.stats.replaced += 1;
        }
        self.stats.profiles += 1;
    }
}

/// Absolute profile URL for a card, if it has a usable link.
fn resolve_card(page: &Page, card: &CardSummary) -> Option<Url> {
    let Some(link) = card.detail_link.as_deref() else {
        debug!(name = ?card.name, "card has no profile link");
        return None;
    };
    match page.resolve(link) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(link, error = %e, "unresolvable profile link");
            None
        }
    }
}

/// Fetch one listing page and return its cards with resolved profile URLs.
pub async fn fetch_listing(
    fetcher: &dyn Fetcher,
    url: &Url,
) -> Result<Vec<(CardSummary, Option<Url>)>> {
    let page = fetcher
        .fetch(url)
        .await
        .with_context(|| format!("Failed to fetch listing {}", url))?;
    let cards = listing::scan_cards(&page.body)
        .into_iter()
        .map(|card| {
            let resolved = resolve_card(&page, &card);
            (card, resolved)
        })
        .collect();
    Ok(cards)
}

/// Fetch one profile page and extract its record.
pub async fn fetch_profile(fetcher: &dyn Fetcher, url: &Url, card: &CardContext) -> Result<Profile> {
    let page = fetcher
        .fetch(url)
        .await
        .with_context(|| format!("Failed to fetch profile {}", url))?;
    Ok(profile::extract(&page.body, card))
}

// ── Tests ──
