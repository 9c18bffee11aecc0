use std::{env, path::PathBuf};

use structopt::StructOpt;

use ledger_config as config;

mod replay;

pub fn from_args() -> Cli {
    Cli::from_args()
}

pub fn exec(command: Cli) -> anyhow::Result<()> {
    let Cli {
        config,
        debug,
        trace,
        no_timestamp,
        no_module_path,
        cmd,
    } = command;

    let mut log_opts = LogOptions::default();
    let config = get_config(config)?;

    log_opts.level = config.log.level;
    log_opts.source = LogOptionsSource::Config;
    log_opts.timestamp = !no_timestamp;
    log_opts.module_path = !no_module_path;

    if let Ok(rust_log) = env::var("RUST_LOG") {
        if rust_log.contains("ledger") {
            log_opts.level = env_logger::Logger::from_default_env().filter();
            log_opts.source = LogOptionsSource::Env;
        }
    }

    if trace {
        log_opts.level = log::LevelFilter::Trace;
        log_opts.source = LogOptionsSource::Flag;
    } else if debug {
        log_opts.level = log::LevelFilter::Debug;
        log_opts.source = LogOptionsSource::Flag;
    }

    init_logger(log_opts);

    exec_cmd(cmd, config)
}

fn exec_cmd(command: Command, config: config::config::Config) -> anyhow::Result<()> {
    match command {
        Command::Replay(cmd) => replay::exec_cmd(cmd, config),
    }
}

fn init_logger(opts: LogOptions) {
    eprintln!(
        "Setting log level to: {}, source: {:?}",
        opts.level, opts.source
    );
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if !opts.timestamp {
        builder.format_timestamp(None);
    }
    builder
        .format_module_path(opts.module_path)
        .filter_level(log::LevelFilter::Info)
        .filter_module("ledger", opts.level)
        .init();
}

fn get_config(path: Option<PathBuf>) -> anyhow::Result<config::config::Config> {
    match path {
        Some(p) => {
            eprintln!("Loading config from: {}", p.display());
            let config = config::loaders::toml::from_file(&p)
                .map(|p| config::config::Config::from_partial(&p))?;
            Ok(config)
        }
        None => {
            eprintln!("No configuration specified. Using default one!");
            Ok(config::config::Config::default())
        }
    }
}

#[derive(Debug, StructOpt)]
#[structopt(name = "ledger", about = "UTXO ledger with per-epoch transaction selection.")]
pub struct Cli {
    /// Load configuration from this TOML file. If not specified the default configuration is
    /// used.
    #[structopt(short = "c", long = "config")]
    config: Option<PathBuf>,
    /// Turn on DEBUG logging.
    #[structopt(long = "debug")]
    debug: bool,
    /// Turn on TRACE logging.
    #[structopt(long = "trace")]
    trace: bool,
    /// Do not show timestamps in logs.
    #[structopt(long = "no-timestamp")]
    no_timestamp: bool,
    /// Do not show module path in logs.
    #[structopt(long = "no-module-path")]
    no_module_path: bool,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    #[structopt(
        name = "replay",
        about = "Run the epochs of a scenario file against its initial unspent outputs."
    )]
    Replay(replay::Command),
}

struct LogOptions {
    level: log::LevelFilter,
    timestamp: bool,
    module_path: bool,
    source: LogOptionsSource,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: log::LevelFilter::Error,
            timestamp: true,
            module_path: true,
            source: LogOptionsSource::Defaults,
        }
    }
}

#[derive(Debug)]
enum LogOptionsSource {
    Defaults,
    Config,
    Env,
    Flag,
}
