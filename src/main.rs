use anyhow::{Context, Result};
use ayah_search::format::{format_verse_ref, to_kurdish_number, truncate_text};
use ayah_search::{api, Corpus, SearchEngine, SearchOptions, SearchResults};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Search surahs, verses and tafsir books", long_about = None)]
struct Args {
    /// Corpus bundle (JSON, optionally gzipped)
    #[arg(short, long, env = "AYAH_SEARCH_DATA", default_value = "data/data.json", global = true)]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single query and print the matches
    Search {
        query: String,

        /// Print the result envelope as JSON
        #[arg(long)]
        json: bool,

        #[arg(long, default_value_t = 6)]
        surahs: usize,

        #[arg(long, default_value_t = 8)]
        verses: usize,

        #[arg(long, default_value_t = 6)]
        books: usize,
    },
    /// Serve the search API over HTTP
    Serve {
        #[arg(short, long, env = "AYAH_SEARCH_ADDR", default_value = "127.0.0.1:3000")]
        addr: String,
    },
    /// Print corpus statistics
    Stats,
}

fn load_corpus(path: &Path) -> Result<Corpus> {
    let start = Instant::now();
    let corpus = Corpus::load(path)
        .with_context(|| format!("Failed to load corpus from {}", path.display()))?;
    tracing::debug!("Loaded corpus in {:?}", start.elapsed());
    Ok(corpus)
}

fn print_results(results: &SearchResults) {
    if results.is_empty() {
        println!("No results");
        return;
    }

    if !results.surahs.is_empty() {
        println!("Surahs");
        for surah in &results.surahs {
            println!(
                "  {}  {} ({})  [{:?} {}]",
                to_kurdish_number(surah.number),
                surah.name_kurdish,
                surah.name_arabic,
                surah.match_field,
                surah.score
            );
        }
        println!();
    }

    if !results.verses.is_empty() {
        println!("Verses");
        for verse in &results.verses {
            let name = if verse.surah_name_kurdish.is_empty() {
                &verse.surah_name_arabic
            } else {
                &verse.surah_name_kurdish
            };
            println!(
                "  {} {}  [{:?} {}]",
                name,
                format_verse_ref(verse.surah_number, verse.verse_number),
                verse.match_type,
                verse.score
            );
            println!("    {}", verse.snippet);
        }
        println!();
    }

    if !results.books.is_empty() {
        println!("Books");
        for book in &results.books {
            println!(
                "  {} / {}  [{:?} {}]",
                book.title, book.author, book.match_field, book.score
            );
            if let Some(snippet) = &book.snippet {
                println!("    {}", truncate_text(snippet, 120));
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Search {
            query,
            json,
            surahs,
            verses,
            books,
        } => {
            let options = SearchOptions {
                surah_limit: surahs,
                verse_limit: verses,
                book_limit: books,
                ..SearchOptions::default()
            };
            let engine = SearchEngine::with_options(load_corpus(&args.data)?, options);

            let start = Instant::now();
            let results = engine.search(&query);
            tracing::info!("Search found {} matches in {:?}", results.total(), start.elapsed());

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_results(&results);
            }
        }
        Command::Serve { addr } => {
            let engine = Arc::new(SearchEngine::new(load_corpus(&args.data)?));
            let app = api::create_router(engine);

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Listening on {}", addr);

            axum::serve(listener, app).await.context("Server error")?;
        }
        Command::Stats => {
            let stats = load_corpus(&args.data)?.stats();
            println!("Surahs: {}", stats.surahs);
            println!("Verses: {}", stats.verses);
            println!("Books:  {}", stats.books);
        }
    }

    Ok(())
}
