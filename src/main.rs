// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Apiscope CLI - API Surface Extraction
//!
//! Scans a live URL or a local file and prints the findings report.

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use apiscope::{ExportFormat, FetcherConfig, PageFetcher, ScanOutcome, Scanner};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("apiscope=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "scan" => {
            if args.len() < 3 {
                eprintln!("Usage: apiscope scan <url> [--format <json|csv|yaml|md>]");
                return ExitCode::from(1);
            }
            let format = match parse_format(&args[3..]) {
                Ok(f) => f,
                Err(code) => return code,
            };
            scan_url(&args[2], format).await
        }
        "file" => {
            if args.len() < 3 {
                eprintln!("Usage: apiscope file <path> [--format <json|csv|yaml|md>]");
                return ExitCode::from(1);
            }
            let format = match parse_format(&args[3..]) {
                Ok(f) => f,
                Err(code) => return code,
            };
            scan_file(&args[2], format)
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("apiscope {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Apiscope - API Surface Extraction for Security Testing

USAGE:
    apiscope <COMMAND> [OPTIONS]

COMMANDS:
    scan <url>      Fetch a URL and extract its API surface
    file <path>     Analyze a local HTML or script file
    help            Show this help message
    version         Show version information

OPTIONS:
    --format <f>    Output format: json, csv, yaml, md (default: md)

EXAMPLES:
    apiscope scan https://example.com
    apiscope scan https://example.com --format json
    apiscope file ./page.html --format csv

For more information, see: https://github.com/bountyyfi/apiscope
"#
    );
}

fn parse_format(options: &[String]) -> Result<ExportFormat, ExitCode> {
    let mut format = ExportFormat::Markdown;
    let mut iter = options.iter();
    while let Some(option) = iter.next() {
        match option.as_str() {
            "--format" => {
                let Some(value) = iter.next() else {
                    eprintln!("--format requires a value");
                    return Err(ExitCode::from(1));
                };
                format = match value.parse() {
                    Ok(f) => f,
                    Err(e) => {
                        eprintln!("{}", e);
                        return Err(ExitCode::from(1));
                    }
                };
            }
            other => {
                eprintln!("Unknown option: {}", other);
                return Err(ExitCode::from(1));
            }
        }
    }
    Ok(format)
}

async fn scan_url(url: &str, format: ExportFormat) -> ExitCode {
    let scanner = Scanner::new();
    let fetcher = match PageFetcher::with_config(FetcherConfig {
        timeout: Duration::from_secs(scanner.config().timeout_secs),
        ..FetcherConfig::default()
    }) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to build fetcher: {}", e);
            return ExitCode::from(1);
        }
    };

    let page = match fetcher.fetch(url).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to fetch {}: {}", url, e);
            return ExitCode::from(1);
        }
    };

    match scanner.scan_page(&page) {
        Ok(outcome) => print_outcome(&outcome, format),
        Err(e) => {
            eprintln!("Failed to analyze {}: {}", url, e);
            ExitCode::from(1)
        }
    }
}

fn scan_file(path: &str, format: ExportFormat) -> ExitCode {
    let raw = match std::fs::read(path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            return ExitCode::from(1);
        }
    };

    let scanner = Scanner::new();
    match scanner.scan_content(&raw, None, path, vec![]) {
        Ok(outcome) => print_outcome(&outcome, format),
        Err(e) => {
            eprintln!("Failed to analyze {}: {}", path, e);
            ExitCode::from(1)
        }
    }
}

fn print_outcome(outcome: &ScanOutcome, format: ExportFormat) -> ExitCode {
    for diagnostic in &outcome.diagnostics {
        eprintln!("note: {}", diagnostic);
    }
    match outcome.export(format) {
        Ok(artifact) => {
            println!("{}", artifact.content);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Export failed: {}", e);
            ExitCode::from(1)
        }
    }
}
