use crate::model::{Contributor, Summary};
use console::style;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Reviews,
    Commits,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Reviews,
    Commits,
}

impl Metric {
    fn count(self, contributor: &Contributor) -> u64 {
        match self {
            Metric::Reviews => contributor.review_count,
            Metric::Commits => contributor.commits,
        }
    }

    fn total(self, summary: &Summary) -> u64 {
        match self {
            Metric::Reviews => summary.totals.reviews,
            Metric::Commits => summary.totals.commits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub account_id: u64,
    pub name: String,
    pub count: u64,
    pub share: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, Serialize)]
struct SummaryOutput<'a> {
    additions: u64,
    deletions: u64,
    commits: u64,
    reviews: u64,
    contributors: usize,
    repositories: &'a [crate::model::RepositoryTotals],
}

/// Contributors ranked by `metric`, highest first. Ties keep creation order
/// and contributors with a zero count are left out.
pub fn leaderboard(summary: &Summary, metric: Metric) -> Vec<LeaderboardRow> {
    let mut sorted: Vec<&Contributor> = summary.contributors.iter().collect();
    sorted.sort_by(|a, b| metric.count(b).cmp(&metric.count(a)));

    let total = metric.total(summary) as f64;
    let mut cumulative = 0.0;
    let mut rows = Vec::new();
    for (i, c) in sorted.into_iter().enumerate() {
        let count = metric.count(c);
        if count == 0 {
            continue;
        }
        let share = count as f64 / total;
        cumulative += share;
        rows.push(LeaderboardRow {
            rank: i + 1,
            account_id: c.account_id,
            // Commas are the field delimiter.
            name: c.name.replace(',', " "),
            count,
            share,
            cumulative,
        });
    }
    rows
}

pub fn write_report<W: Write>(out: &mut W, summary: &Summary, mode: Mode, color: bool) -> io::Result<()> {
    match mode {
        Mode::Reviews => write_leaderboard(out, &leaderboard(summary, Metric::Reviews)),
        Mode::Commits => write_leaderboard(out, &leaderboard(summary, Metric::Commits)),
        Mode::Summary => write_summary(out, summary, color),
    }
}

fn write_leaderboard<W: Write>(out: &mut W, rows: &[LeaderboardRow]) -> io::Result<()> {
    for row in rows {
        writeln!(
            out,
            "{},{},{},{:.6},{:.6}",
            row.rank, row.name, row.count, row.share, row.cumulative
        )?;
    }
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, summary: &Summary, color: bool) -> io::Result<()> {
    let totals = &summary.totals;
    let additions = style(format!("+{}", totals.additions)).green().force_styling(color);
    let deletions = style(format!("-{}", totals.deletions)).red().force_styling(color);
    writeln!(out, "{} {}", additions, deletions)?;
    writeln!(out, "{} patches merged", totals.commits)?;
    writeln!(out, "{} patches reviewed", totals.reviews)?;
    writeln!(out, "{} total contributors", summary.contributors.len())?;
    Ok(())
}

pub fn write_json<W: Write>(out: &mut W, summary: &Summary, mode: Mode) -> anyhow::Result<()> {
    let text = match mode {
        Mode::Reviews => serde_json::to_string_pretty(&leaderboard(summary, Metric::Reviews))?,
        Mode::Commits => serde_json::to_string_pretty(&leaderboard(summary, Metric::Commits))?,
        Mode::Summary => serde_json::to_string_pretty(&SummaryOutput {
            additions: summary.totals.additions,
            deletions: summary.totals.deletions,
            commits: summary.totals.commits,
            reviews: summary.totals.reviews,
            contributors: summary.contributors.len(),
            repositories: &summary.repositories,
        })?,
    };
    writeln!(out, "{text}")?;
    Ok(())
}
