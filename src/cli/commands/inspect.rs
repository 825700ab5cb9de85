//! Inspect command - Print the contents of a stored table

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    app::{App, DEFAULT_TABLE_FILE},
    cli::output::{format_number, format_share, print_kv, print_section, print_subsection},
    q_learning::{Action, DistanceBucket, QTable},
};

#[derive(Parser, Debug)]
#[command(about = "Print the learned values of a table")]
pub struct InspectArgs {
    /// Path to the table
    #[arg(default_value = DEFAULT_TABLE_FILE)]
    pub table: PathBuf,

    /// Maximum number of rows to print (0 prints none)
    #[arg(long, short = 'n', default_value_t = 50)]
    pub limit: usize,

    /// Only print rows in this distance bucket (close, middle, far)
    #[arg(long)]
    pub distance: Option<String>,
}

/// Aggregate counts over a table
#[derive(Debug, Default, PartialEq)]
pub struct TableStats {
    pub states: usize,
    pub per_bucket: [usize; 3],
    pub best_actions: [usize; Action::COUNT],
    pub untouched: usize,
}

impl TableStats {
    pub fn collect(table: &QTable) -> Self {
        let mut stats = Self {
            states: table.len(),
            ..Self::default()
        };
        for (state, values) in table {
            stats.per_bucket[state.distance.ordinal() as usize] += 1;
            if values.0 == [0.0; Action::COUNT] {
                stats.untouched += 1;
            } else {
                stats.best_actions[values.best_action().index()] += 1;
            }
        }
        stats
    }
}

fn parse_bucket(value: &str) -> Result<DistanceBucket> {
    match value.trim().to_ascii_lowercase().as_str() {
        "close" => Ok(DistanceBucket::Close),
        "middle" => Ok(DistanceBucket::Middle),
        "far" => Ok(DistanceBucket::Far),
        other => Err(anyhow::anyhow!(
            "Unknown distance bucket '{other}'. Supported: close, middle, far"
        )),
    }
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let bucket = args.distance.as_deref().map(parse_bucket).transpose()?;
    let table = App::new()
        .load_table(&args.table)
        .with_context(|| format!("Failed to load table from {}", args.table.display()))?;

    let stats = TableStats::collect(&table);
    print_section(&format!("Q-table {}", args.table.display()));
    print_kv("States", &format_number(stats.states));
    for (name, count) in ["Close", "Middle", "Far"].iter().zip(stats.per_bucket) {
        print_kv(name, &format_share(count, stats.states));
    }
    print_kv("All-zero rows", &format_share(stats.untouched, stats.states));

    print_subsection("Greedy action");
    for action in Action::ALL {
        print_kv(
            &action.to_string(),
            &format_share(stats.best_actions[action.index()], stats.states),
        );
    }

    if args.limit == 0 {
        return Ok(());
    }

    let filtered: QTable = table
        .iter()
        .filter(|(state, _)| bucket.is_none_or(|b| state.distance == b))
        .map(|(state, values)| (*state, *values))
        .collect();
    let mut lines = filtered.describe();
    lines.sort();

    print_subsection("Rows");
    for line in lines.iter().take(args.limit) {
        println!("  {line}");
    }
    if lines.len() > args.limit {
        println!("  ... {} more", format_number(lines.len() - args.limit));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::q_learning::{ActionValues, State};

    #[test]
    fn test_table_stats() {
        let mut table = QTable::new();
        table.insert(State::default(), ActionValues::new(0.0, 2.0, 0.0, 0.0));
        table.insert(
            State {
                distance: DistanceBucket::Far,
                ..State::default()
            },
            ActionValues::default(),
        );

        let stats = TableStats::collect(&table);
        assert_eq!(stats.states, 2);
        assert_eq!(stats.per_bucket, [1, 0, 1]);
        assert_eq!(stats.untouched, 1);
        assert_eq!(stats.best_actions[Action::East.index()], 1);
    }

    #[test]
    fn test_parse_bucket() {
        assert_eq!(parse_bucket("FAR").unwrap(), DistanceBucket::Far);
        assert!(parse_bucket("near").is_err());
    }
}
