use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ipcheck::app::EXIT_PROMPT;
use ipcheck::*;
use std::io::{BufRead, Write};
use tracing::{error, warn, Level};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.ipcheck/ipcheck.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// ipinfo.io access token, overrides the configuration file and IPCHECK_TOKEN
    #[clap(short, long)]
    token: Option<String>,

    /// Output format for lookup results
    #[clap(short, long, value_enum, default_value = "text")]
    format: ReportFormat,

    /// Exit without waiting for a final key-press
    #[clap(long)]
    no_pause: bool,

    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective configuration
    Config,
}

fn run<R: BufRead, W: Write>(cli: &Cli, prompter: &mut Prompter<R, W>) -> Result<()> {
    let config = IpCheckConfig::new(&cli.config)
        .context("unable to load configuration")?
        .with_token(cli.token.clone());

    if let Some(Commands::Config) = cli.command {
        prompter.say(config.summary())?;
        return Ok(());
    }

    if config.token.is_none() {
        warn!("no ipinfo.io token configured, lookups are subject to anonymous rate limits");
    }

    let app = IpCheck::new(
        IpInfoLens::from_config(&config),
        Reporter::new(config.reference_country.clone(), cli.format),
    );
    app.run(prompter)?;
    Ok(())
}

/// Report a failed run, wait for Enter if asked to, and return the exit status
fn finish<R: BufRead, W: Write>(
    result: Result<()>,
    pause: bool,
    prompter: &mut Prompter<R, W>,
) -> i32 {
    let status = match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("ERROR: {:#}", e);
            1
        }
    };

    if pause {
        if let Err(e) = prompter.pause(EXIT_PROMPT) {
            eprintln!("ERROR: {e}");
        }
    }

    status
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(Level::DEBUG)
            .init();
    }

    let mut prompter = Prompter::stdio();
    let result = run(&cli, &mut prompter);
    let status = finish(result, !cli.no_pause, &mut prompter);

    std::process::exit(status);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn cli(dir: &tempfile::TempDir, extra: &[&str]) -> Cli {
        let config = dir.path().join("ipcheck.toml");
        let mut args = vec![
            "ipcheck".to_string(),
            "--config".to_string(),
            config.to_string_lossy().to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        Cli::parse_from(args)
    }

    #[test]
    fn test_failed_run_still_pauses() {
        let dir = tempfile::tempdir().unwrap();
        let cli = cli(&dir, &[]);
        let mut p = prompter("999.999.999.999\n");

        let result = run(&cli, &mut p);
        assert!(result.is_err());
        let status = finish(result, !cli.no_pause, &mut p);

        assert_eq!(status, 1);
        let out = String::from_utf8(p.into_inner().1).unwrap();
        assert!(out.starts_with(ipcheck::app::IP_PROMPT));
        assert!(out.ends_with(EXIT_PROMPT));
    }

    #[test]
    fn test_no_pause_skips_exit_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let cli = cli(&dir, &["--no-pause"]);
        let mut p = prompter("999.999.999.999\n");

        let result = run(&cli, &mut p);
        assert_eq!(finish(result, !cli.no_pause, &mut p), 1);
        let out = String::from_utf8(p.into_inner().1).unwrap();
        assert!(!out.contains(EXIT_PROMPT));
    }

    #[test]
    fn test_config_command_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let cli = cli(&dir, &["--token", "abcdef123456", "config"]);
        let mut p = prompter("");

        let result = run(&cli, &mut p);
        assert_eq!(finish(result, !cli.no_pause, &mut p), 0);
        let out = String::from_utf8(p.into_inner().1).unwrap();
        assert!(out.contains("********3456"));
        assert!(out.ends_with(EXIT_PROMPT));
    }
}
