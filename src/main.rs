mod cli;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use stepup_setup::config::SetupConfig;
use stepup_setup::install::settings::ALL_SETTINGS;
use stepup_setup::install::{
    FileStore, FsFileService, RegistryConfiguration, SetupContext, SignatureSupport, run_setup,
};

fn main() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .init();

    match real_main() {
        Ok(status) => std::process::exit(status),
        Err(e) => {
            error!("{e:#}");
            std::process::exit(1);
        }
    }
}

fn real_main() -> Result<i32> {
    let args = cli::Args::parse();

    match args.sub {
        cli::Cmd::Run { phases, config } => run(phases.flags(), config),
        cli::Cmd::Settings => {
            list_settings();
            Ok(0)
        }
    }
}

fn load_config(config_path: Option<String>) -> Result<SetupConfig> {
    let cfg_path = match config_path {
        Some(path) => PathBuf::from(path),
        None => SetupConfig::default_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?,
    };

    // Auto-generate config file if it doesn't exist
    if !cfg_path.exists() {
        info!("Config not found at {}, creating default configuration", cfg_path.display());

        if let Some(parent) = cfg_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let default_toml = toml::to_string_pretty(&SetupConfig::default())
            .context("Failed to serialize default config")?;
        fs::write(&cfg_path, default_toml).context("Failed to write config file")?;

        info!("Created default configuration at {}", cfg_path.display());
    }

    let cfg_str = fs::read_to_string(&cfg_path)
        .with_context(|| format!("Failed to read config file {}", cfg_path.display()))?;
    let cfg: SetupConfig = toml::from_str(&cfg_str).context("Failed to parse config")?;

    info!("Using config from: {}", cfg_path.display());
    Ok(cfg)
}

fn run(flags: stepup_setup::install::SetupFlags, config_path: Option<String>) -> Result<i32> {
    let cfg = load_config(config_path)?;

    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
    let files = FsFileService::new(cfg.layout(&stamp));
    let store = FileStore::open(cfg.store_path())
        .with_context(|| format!("Failed to open store {}", cfg.store_path().display()))?;

    let signature = SignatureSupport::enable();
    let mut ctx = SetupContext::new(Box::new(files), Box::new(store), signature)
        .with_registry(RegistryConfiguration::new(&cfg.store.root))
        .with_overrides(cfg.settings.clone())
        .with_enforced_backup(cfg.enforce_backup);

    let status = run_setup(flags, &mut ctx);
    if status == 0 {
        info!("Setup finished");
    } else {
        error!("Setup failed with status {status}");
    }
    Ok(status)
}

fn list_settings() {
    println!("{:<34} {:<48} REQUIREMENT", "SETTING", "DISPLAY NAME");
    for def in ALL_SETTINGS {
        println!("{:<34} {:<48} {:?}", def.name, def.display_name, def.requirement);
    }
}
