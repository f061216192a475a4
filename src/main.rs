// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing)
// 3. Dispatch to the build or serve handler
// 4. Emit the report
// 5. Exit with proper code (0 = no broken links, 1 = broken links, 2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - extract, resolve, verify, cache, scan
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - run options
mod crawl; // src/crawl/ - serve mode (dev server crawling)
mod report; // src/report/ - aggregation and report output
mod site; // src/site.rs - build mode (dist directory)

#[cfg(test)]
mod testing;

use anyhow::{bail, Result};
use checker::LinkChecker;
use clap::Parser; // Parser trait enables the parse() method
use cli::{Cli, Commands};
use config::CheckerOptions;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, log it and exit with code 2
            error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins; otherwise info and up
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Err = the run itself failed (bad input, report could not be written)
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Build { dist_dir, report } => {
            let options = report.to_options()?;
            handle_build(&dist_dir, &options).await
        }
        Commands::Serve {
            url,
            max_depth,
            verify_routes,
            report,
        } => {
            let mut options = report.to_options()?;
            options.verify_live_routes |= verify_routes;
            handle_serve(&url, max_depth, &options).await
        }
    }
}

// Handles the 'build' subcommand
async fn handle_build(dist_dir: &std::path::Path, options: &CheckerOptions) -> Result<i32> {
    let checker = LinkChecker::new(options)?;

    site::check_build_output(&checker, dist_dir).await?;

    finish(&checker, options, true)
}

// Handles the 'serve' subcommand
async fn handle_serve(url: &str, max_depth: usize, options: &CheckerOptions) -> Result<i32> {
    let checker = LinkChecker::new(options)?;
    let interceptor = crawl::HtmlInterceptor::new(&checker);

    info!("Checking links on dev server {} (max depth {})", url, max_depth);
    let summary = crawl::crawl_dev_server(checker.client(), url, max_depth, &interceptor).await?;

    if summary.responses == 0 {
        bail!("Could not fetch any page from {}", url);
    }
    info!("Crawled {} page(s), {} HTML", summary.responses, summary.html_pages);

    finish(&checker, options, false)
}

// Logs the run summary, emits the report and picks the exit code
fn finish(checker: &LinkChecker, options: &CheckerOptions, echo_report: bool) -> Result<i32> {
    let stats = checker.stats();
    info!(
        documents = stats.documents,
        links = stats.links,
        probes = stats.probes,
        cache_hits = stats.cache_hits,
        skipped = stats.skipped,
        malformed = stats.malformed,
        unchecked = stats.unchecked,
        targets = checker.cache().len(),
        broken = checker.broken_links().len(),
        "Link check finished"
    );

    report::emit(checker.broken_links(), options, echo_report)?;

    if checker.broken_links().is_empty() {
        Ok(0) // Exit code 0 = all good
    } else {
        Ok(1) // Exit code 1 = broken links found
    }
}
