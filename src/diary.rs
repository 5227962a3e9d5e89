use crate::config::Config;
use crate::model::DiaryStatus;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const DEFAULT_TEMPLATE: &str = "# Diary Entry: {date}\n\n## What happened today?\n- \n\n## Mood / Energy\n- \n\n## Reflection\n- \n";
const PREVIEW_WIDTH: usize = 64;

/// Notes live at `<root>/<YYYY>/<YYYY-MM-DD>.md`.
#[derive(Debug, Clone)]
pub struct DiaryStore {
    root: PathBuf,
    template: PathBuf,
}

impl DiaryStore {
    pub fn new(root: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        DiaryStore {
            root: root.into(),
            template: template.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        DiaryStore::new(&config.diary_dir, &config.diary_template)
    }

    pub fn note_path(&self, year: i32, month: u32, day: u32) -> PathBuf {
        self.root
            .join(year.to_string())
            .join(format!("{}.md", format_date(year, month, day)))
    }

    /// Writes a template if none exists yet, copying `fallback` when it is
    /// present. Failures are logged and otherwise ignored.
    pub fn ensure_template(&self, fallback: Option<&Path>) {
        if self.template.exists() {
            return;
        }
        let result = (|| -> Result<()> {
            if let Some(parent) = self.template.parent() {
                fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
            }
            match fallback.filter(|p| p.exists()) {
                Some(source) => {
                    fs::copy(source, &self.template)
                        .with_context(|| format!("copying {:?}", source))?;
                }
                None => fs::write(&self.template, DEFAULT_TEMPLATE)
                    .with_context(|| format!("writing {:?}", self.template))?,
            }
            Ok(())
        })();
        if let Err(err) = result {
            let message = format!("{err:#}");
            tracing::warn!(error = %message, "could not create diary template");
        }
    }

    /// Creates the note if needed and returns its path.
    pub fn create_note(&self, year: i32, month: u32, day: u32) -> Result<PathBuf> {
        let path = self.note_path(year, month, day);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
        if path.exists() {
            return Ok(path);
        }
        let template = fs::read_to_string(&self.template).unwrap_or_default();
        let mut body = if template.is_empty() {
            format!("# Diary - {}\n\n", format_date(year, month, day))
        } else {
            apply_template(&template, year, month, day)
        };
        if !body.ends_with('\n') {
            body.push('\n');
        }
        fs::write(&path, body).with_context(|| format!("writing {:?}", path))?;
        tracing::info!(path = %path.display(), "created diary note");
        Ok(path)
    }

    /// Creates the note and blocks while `editor` runs on it.
    pub fn open(&self, year: i32, month: u32, day: u32, editor: &str) -> Result<PathBuf> {
        let path = self.create_note(year, month, day)?;
        launch_editor(editor, &path)?;
        Ok(path)
    }

    pub fn preview_lines(&self, year: i32, month: u32, day: u32, max_lines: usize) -> Vec<String> {
        let Ok(text) = fs::read_to_string(self.note_path(year, month, day)) else {
            return Vec::new();
        };
        text.lines()
            .take(max_lines)
            .map(|line| truncate_line(line, PREVIEW_WIDTH))
            .collect()
    }
}

impl DiaryStatus for DiaryStore {
    fn exists(&self, year: i32, month: u32, day: u32) -> bool {
        self.note_path(year, month, day).exists()
    }
}

pub fn format_date(year: i32, month: u32, day: u32) -> String {
    format!("{:04}-{:02}-{:02}", year, month, day)
}

pub fn apply_template(template: &str, year: i32, month: u32, day: u32) -> String {
    template
        .replace("{date}", &format_date(year, month, day))
        .replace("{year}", &year.to_string())
        .replace("{month}", &month.to_string())
        .replace("{day}", &day.to_string())
}

fn truncate_line(line: &str, max: usize) -> String {
    if line.chars().count() <= max {
        return line.to_string();
    }
    let kept: String = line.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn launch_editor(editor: &str, path: &Path) -> Result<()> {
    let command = format!("{} {}", editor, shell_quote(&path.to_string_lossy()));
    tracing::info!(%command, "launching editor");
    let status = Command::new("sh")
        .arg("-c")
        .arg(&command)
        .status()
        .with_context(|| format!("running editor `{}`", editor))?;
    if !status.success() {
        bail!("editor `{}` exited with {}", editor, status);
    }
    Ok(())
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}
