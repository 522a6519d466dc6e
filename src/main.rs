mod crawler;
mod fetch;
mod parser;
mod roster;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use url::Url;

use crate::fetch::HttpFetcher;
use crate::parser::profile::CardContext;
use crate::roster::Roster;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "siba_faculty_scraper", about = "Sukkur IBA faculty directory scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl every department and write all instructor records to one JSON file
    Crawl {
        /// Output file (default: instructors_data.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Max concurrent requests
        #[arg(short = 'c', long)]
        concurrency: Option<usize>,
    },
    /// Show the instructor cards found on one listing page
    Listing {
        url: Url,
    },
    /// Extract one instructor profile page and print it as JSON
    Profile {
        url: Url,
        /// Name to use if the page has none
        #[arg(long)]
        name: Option<String>,
        /// Designation to use if the page has none
        #[arg(long)]
        designation: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load().context("Invalid SIBA_* configuration")?;

    let result = match cli.command {
        Commands::Crawl {
            output,
            concurrency,
        } => {
            let settings = settings
                .with_overrides(output, concurrency)
                .context("Invalid command-line options")?;
            let fetcher = HttpFetcher::new(&settings.user_agent, settings.timeout())?;
            let seeds = crawler::seed_urls()?;

            println!(
                "Crawling {} departments ({} concurrent requests)...",
                seeds.len(),
                settings.concurrency
            );
            let (roster, stats) =
                crawler::crawl(Arc::new(fetcher), seeds, settings.concurrency).await?;

            if roster.is_empty() {
                println!("No instructor records collected; writing an empty document.");
            }
            roster.write_json(&settings.output)?;
            println!(
                "Done: {} listings, {} cards, {} profiles ({} degraded, {} replaced), {} failed requests.",
                stats.listings,
                stats.cards,
                stats.profiles,
                stats.degraded,
                stats.replaced,
                stats.failures
            );
            println!(
                "Wrote {} instructors to {}",
                roster.len(),
                settings.output.display()
            );
            Ok(())
        }
        Commands::Listing { url } => {
            let fetcher = HttpFetcher::new(&settings.user_agent, settings.timeout())?;
            let cards = crawler::fetch_listing(&fetcher, &url).await?;
            if cards.is_empty() {
                println!("No instructor cards found.");
                return Ok(());
            }

            println!("{:>3} | {:<30} | {:<28} | {}", "#", "Name", "Designation", "Profile");
            println!("{}", "-".repeat(100));
            for (i, (card, link)) in cards.iter().enumerate() {
                let name = truncate(card.name.as_deref().unwrap_or("-"), 30);
                let designation = truncate(card.designation.as_deref().unwrap_or("-"), 28);
                let link = link.as_ref().map(Url::as_str).unwrap_or("-");
                println!("{:>3} | {:<30} | {:<28} | {}", i + 1, name, designation, link);
            }
            println!("\n{} cards", cards.len());
            Ok(())
        }
        Commands::Profile {
            url,
            name,
            designation,
        } => {
            let fetcher = HttpFetcher::new(&settings.user_agent, settings.timeout())?;
            let card = CardContext { name, designation };
            let profile = crawler::fetch_profile(&fetcher, &url, &card).await?;
            if profile.degraded {
                println!("(no details block; placeholders shown)");
            }
            let mut roster = Roster::new();
            roster.insert(
                profile.name.unwrap_or_else(|| url.to_string()),
                profile.record,
            );
            println!("{}", roster.to_json()?);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("Ali Raza", 10), "Ali Raza");
        assert_eq!(truncate("Ali Raza", 3), "Ali...");
        assert_eq!(truncate("Ümit Şahin", 4), "Ümit...");
    }

    #[test]
    fn durations_in_seconds_then_minutes() {
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "62m 5s");
    }
}
