use crate::calendar::FUTURE_DATE_MESSAGE;
use crate::config::{parse_date, Config};
use crate::dates;
use crate::diary::DiaryStore;
use crate::model::MonthIndex;
use crate::render::Countdown;
use crate::ui;
use anyhow::{bail, Result};
use chrono::{Datelike, Local};
use std::path::Path;

pub fn tui(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    ui::run(config)
}

pub fn open(config_path: Option<&Path>, date: Option<String>) -> Result<()> {
    let config = Config::load(config_path)?;
    let today = dates::today();
    let date = match date.as_deref() {
        Some(raw) => parse_date("date", raw.trim())?,
        None => today,
    };
    if date > today {
        bail!("{} ({})", FUTURE_DATE_MESSAGE, date);
    }
    let store = DiaryStore::from_config(&config);
    store.ensure_template(config.template_fallback.as_deref());
    let path = store.open(date.year(), date.month(), date.day(), &config.editor)?;
    println!("Saved {}", path.display());
    Ok(())
}

pub fn stats(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let today = dates::today();
    let store = DiaryStore::from_config(&config);
    let mut months = MonthIndex::build(config.birth, config.death, today)?;
    months.refresh_diary_status(&store, today);

    let total = months.len();
    let lived = months.past_count();
    let percent = lived as f64 * 100.0 / total as f64;
    println!("Lifetime: {} to {}", config.birth, config.death_label);
    println!("Months lived: {} of {} ({:.1}%)", lived, total, percent);
    println!("Fully diaried months: {}", months.full_count());
    println!(
        "Countdown: {}",
        Countdown::until(config.death, Local::now().naive_local())
    );
    Ok(())
}
