//! Terminal implementation of the panel's user interface seam.

use std::path::Path;

use async_trait::async_trait;
use fast_tasks_core::api::{PickItem, UserInterface};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Default)]
pub struct TerminalUi;

impl TerminalUi {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UserInterface for TerminalUi {
    fn show_warning(&self, message: &str) {
        eprintln!("warning: {message}");
    }

    fn show_error(&self, message: &str) {
        eprintln!("error: {message}");
    }

    async fn pick_many(&self, title: &str, items: Vec<PickItem>) -> Option<Vec<PickItem>> {
        if items.is_empty() {
            eprintln!("No tasks to choose from.");
            return None;
        }
        println!("{title}:");
        for (i, item) in items.iter().enumerate() {
            let mark = if item.picked { 'x' } else { ' ' };
            match &item.description {
                Some(desc) => println!("  {:>2}. [{mark}] {}  ({desc})", i + 1, item.label),
                None => println!("  {:>2}. [{mark}] {}", i + 1, item.label),
            }
        }
        let current: Vec<bool> = items.iter().map(|i| i.picked).collect();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            println!("Numbers or ranges (e.g. 1 3-5), '-' for none, Enter to keep, 'q' to cancel:");
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!("failed to read selection: {e}");
                    return None;
                }
            };
            match parse_picks(&line, &current) {
                Ok(None) => return None,
                Ok(Some(indices)) => {
                    return Some(
                        items
                            .into_iter()
                            .enumerate()
                            .filter(|(i, _)| indices.contains(i))
                            .map(|(_, item)| item)
                            .collect(),
                    );
                }
                Err(msg) => eprintln!("{msg}"),
            }
        }
    }

    async fn open_document(&self, path: &Path, line: u32) -> anyhow::Result<()> {
        let editor = std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .ok()
            .filter(|e| !e.trim().is_empty());
        let Some(editor) = editor else {
            println!("{}:{}", path.display(), line + 1);
            return Ok(());
        };

        let mut parts = editor.split_whitespace();
        let program = parts.next().unwrap_or("vi");
        let status = tokio::process::Command::new(program)
            .args(parts)
            .arg(format!("+{}", line + 1))
            .arg(path)
            .status()
            .await?;
        if !status.success() {
            anyhow::bail!("{program} exited with {status}");
        }
        Ok(())
    }
}

/// Parse a picker answer into zero-based indices.
///
/// `Ok(None)` cancels, an empty answer keeps `current`, `-` picks nothing.
pub fn parse_picks(input: &str, current: &[bool]) -> Result<Option<Vec<usize>>, String> {
    let input = input.trim();
    match input {
        "q" | "Q" => return Ok(None),
        "" => {
            return Ok(Some(
                current
                    .iter()
                    .enumerate()
                    .filter(|(_, picked)| **picked)
                    .map(|(i, _)| i)
                    .collect(),
            ))
        }
        "-" => return Ok(Some(Vec::new())),
        _ => {}
    }

    let count = current.len();
    let number = |s: &str| -> Result<usize, String> {
        match s.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
            _ => Err(format!("'{s}' is not a number between 1 and {count}")),
        }
    };

    let mut picked = Vec::new();
    for token in input.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
        let (lo, hi) = match token.split_once('-') {
            Some((lo, hi)) => (number(lo)?, number(hi)?),
            None => {
                let n = number(token)?;
                (n, n)
            }
        };
        if lo > hi {
            return Err(format!("'{token}' is an empty range"));
        }
        for i in lo..=hi {
            if !picked.contains(&i) {
                picked.push(i);
            }
        }
    }
    picked.sort_unstable();
    Ok(Some(picked))
}
