use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tetrad_core::TetradConfig;

use crate::state::ensure_tetrad_home;

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tetrad_home()?.join("config.toml"))
}

pub fn load_config() -> Result<TetradConfig> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(TetradConfig::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let cfg: TetradConfig = toml::from_str(&s).context("parse config.toml")?;
    cfg.validate().with_context(|| format!("validate {}", p.display()))?;
    Ok(cfg)
}

pub fn save_config(cfg: &TetradConfig) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = TetradConfig::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}
