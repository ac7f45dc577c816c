//! vcr-handler CLI

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use vcr_handler::recording::RECORDING_HEADER;
use vcr_handler::storage::{decode_body, is_binary, CassetteReader};
use vcr_handler::{turn_on, Client, Mode, VcrConfig};

fn usage() -> ! {
    eprintln!("vcr-handler v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("Usage: vcr-handler <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  show  <cassette>           List the responses stored in a cassette");
    eprintln!("  fetch <cassette> <url>...  GET each URL, recording or replaying");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <file>        Load settings from a TOML file");
    eprintln!("  --only-encode-binary   Store non-binary bodies as plain text");
    process::exit(1);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    if let Err(e) = run(&args).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(args: &[String]) -> anyhow::Result<()> {
    let (config, positional) = parse_options(&args[1..])?;

    match args[0].as_str() {
        "show" => {
            let [cassette] = positional.as_slice() else {
                bail!("show takes exactly one cassette path");
            };
            show(Path::new(cassette), &config)
        }
        "fetch" => {
            let Some((cassette, urls)) = positional.split_first() else {
                bail!("fetch needs a cassette path");
            };
            if urls.is_empty() {
                bail!("fetch needs at least one URL");
            }
            fetch(&PathBuf::from(cassette), urls, config).await
        }
        other => {
            eprintln!("Unknown command: {other}");
            usage();
        }
    }
}

fn parse_options(args: &[String]) -> anyhow::Result<(VcrConfig, Vec<String>)> {
    let mut config = VcrConfig::default();
    let mut only_encode_binary = false;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config needs a file path")?;
                config = VcrConfig::from_file(Path::new(path))?;
            }
            "--only-encode-binary" => only_encode_binary = true,
            flag if flag.starts_with("--") => bail!("Unknown option: {flag}"),
            _ => positional.push(arg.clone()),
        }
    }

    if only_encode_binary {
        config.only_encode_binary = true;
    }
    Ok((config, positional))
}

fn show(cassette: &Path, config: &VcrConfig) -> anyhow::Result<()> {
    let entries = CassetteReader::open(cassette)
        .with_context(|| format!("Failed to read {}", cassette.display()))?;

    println!("Cassette: {}", cassette.display());
    println!("Responses: {}", entries.len());
    println!();

    for (index, entry) in entries.iter().enumerate() {
        let body = decode_body(entry, config)
            .with_context(|| format!("Entry {index} has an undecodable body"))?;
        let stamp = entry
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(RECORDING_HEADER))
            .and_then(|(_, values)| values.first())
            .map_or("-", String::as_str);

        println!(
            "#{index:<3} HTTP/{} {} {:<20} headers={:<3} body={} bytes{} recorded={stamp}",
            entry.version,
            entry.status,
            entry.reason,
            entry.headers.len(),
            body.len(),
            if is_binary(&entry.headers) { " (binary)" } else { "" },
        );
    }

    Ok(())
}

async fn fetch(cassette: &Path, urls: &[String], config: VcrConfig) -> anyhow::Result<()> {
    let mode = Mode::for_cassette(cassette);
    let stack = turn_on(cassette, Some(config))?;
    let client = Client::new(&stack)?;

    println!("Mode: {mode:?}");
    for url in urls {
        let response = client
            .get(url)
            .await
            .with_context(|| format!("GET {url} failed"))?;
        println!(
            "GET {url} -> {} ({} bytes)",
            response.status(),
            response.body().len()
        );
    }

    Ok(())
}
