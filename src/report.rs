//! Persisted per-true-count results: a commented header, then one row per
//! count from -10 to +10. This is the artifact the risk calculator reads
//! back.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EdgeError, EdgeResult};
use crate::simulation::SimulationConfig;
use crate::stats::{TrueCountRow, TrueCountStat, TrueCountTable};

pub const TITLE: &str = "Blackjack High-Low Simulation Results with Player Edge Analysis";
pub const COLUMNS: &str = "True Count,Frequency,Percentage,Player Edge,Total Profit,Total Wagered";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub config: SimulationConfig,
    pub total_hands: u64,
    pub generated: String,
    pub rows: Vec<TrueCountRow>,
}

impl SimulationReport {
    pub fn new(config: SimulationConfig, table: &TrueCountTable) -> SimulationReport {
        SimulationReport {
            config,
            total_hands: table.total_hands(),
            generated: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            rows: table.rows(),
        }
    }

    /// Rebuild the statistics table from the rows.
    pub fn table(&self) -> TrueCountTable {
        let mut table = TrueCountTable::new();
        table.shoes = self.config.num_shoes;
        for row in self.rows.iter().filter(|r| r.frequency > 0) {
            table.stats.insert(
                row.true_count,
                TrueCountStat {
                    frequency: row.frequency,
                    total_profit: row.total_profit,
                    total_wagered: row.total_wagered,
                },
            );
        }
        table
    }

    pub fn write<W: Write>(&self, w: &mut W) -> EdgeResult<()> {
        writeln!(w, "# {}", TITLE)?;
        writeln!(w, "# Deck Count: {}", self.config.deck_count)?;
        writeln!(w, "# Penetration: {}", self.config.penetration_description())?;
        writeln!(w, "# Total Shoes: {}", self.config.num_shoes)?;
        writeln!(w, "# Total Hands: {}", self.total_hands)?;
        writeln!(w, "# Generated: {}", self.generated)?;
        writeln!(w)?;
        writeln!(w, "{}", COLUMNS)?;
        for row in &self.rows {
            writeln!(
                w,
                "{},{},{:.6},{:.6},{:.2},{:.2}",
                row.true_count,
                row.frequency,
                row.percentage,
                row.edge,
                row.total_profit,
                row.total_wagered
            )?;
        }
        Ok(())
    }

    pub fn parse<R: BufRead>(reader: R) -> EdgeResult<SimulationReport> {
        let mut deck_count: Option<usize> = None;
        let mut penetration: Option<f64> = None;
        let mut num_shoes: u64 = 0;
        let mut total_hands: Option<u64> = None;
        let mut generated = String::new();
        let mut rows = Vec::new();
        let mut in_table = false;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(meta) = line.strip_prefix('#') {
                if let Some((key, value)) = meta.split_once(':') {
                    let value = value.trim();
                    match key.trim() {
                        "Deck Count" => deck_count = Some(parse_number(value, line_no)?),
                        "Penetration" => penetration = Some(parse_penetration(value, line_no)?),
                        "Total Shoes" => num_shoes = parse_number(value, line_no)?,
                        "Total Hands" => total_hands = Some(parse_number(value, line_no)?),
                        "Generated" => generated = value.to_string(),
                        _ => {}
                    }
                }
                continue;
            }
            if line.starts_with("True Count") {
                in_table = true;
                continue;
            }
            if in_table {
                rows.push(parse_row(line, line_no)?);
            }
        }

        if !in_table {
            return Err(EdgeError::InvalidReport(format!("missing header row '{}'", COLUMNS)));
        }
        let deck_count =
            deck_count.ok_or_else(|| EdgeError::InvalidReport("missing Deck Count".to_string()))?;
        let penetration = penetration.unwrap_or(0.0);
        let total_hands = total_hands.unwrap_or_else(|| rows.iter().map(|r| r.frequency).sum());

        Ok(SimulationReport {
            config: SimulationConfig::new(deck_count, penetration, num_shoes),
            total_hands,
            generated,
            rows,
        })
    }

    pub fn save(&self, path: &Path) -> EdgeResult<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write(&mut w)?;
        w.flush()?;
        Ok(())
    }

    pub fn load(path: &Path) -> EdgeResult<SimulationReport> {
        SimulationReport::parse(BufReader::new(File::open(path)?))
    }

    pub fn to_json(&self) -> EdgeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> EdgeResult<SimulationReport> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Numbers may carry thousands separators and quotes.
fn clean(field: &str) -> String {
    field.chars().filter(|c| *c != ',' && *c != '"').collect::<String>().trim().to_string()
}

fn parse_number<T: std::str::FromStr>(value: &str, line_no: usize) -> EdgeResult<T> {
    clean(value).parse::<T>().map_err(|_| {
        EdgeError::InvalidReport(format!("line {}: bad number '{}'", line_no + 1, value))
    })
}

fn parse_penetration(value: &str, line_no: usize) -> EdgeResult<f64> {
    if value.to_ascii_lowercase().starts_with("no penetration") {
        return Ok(0.0);
    }
    let number = value.split_whitespace().next().unwrap_or_default();
    parse_number(number, line_no)
}

/// Split on commas outside double quotes.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in line.chars() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_row(line: &str, line_no: usize) -> EdgeResult<TrueCountRow> {
    let fields = split_fields(line);
    if fields.len() != 6 {
        return Err(EdgeError::InvalidReport(format!(
            "line {}: expected 6 columns, got {}",
            line_no + 1,
            fields.len()
        )));
    }
    Ok(TrueCountRow {
        true_count: parse_number(&fields[0], line_no)?,
        frequency: parse_number(&fields[1], line_no)?,
        percentage: parse_number(&fields[2], line_no)?,
        edge: parse_number(&fields[3], line_no)?,
        total_profit: parse_number(&fields[4], line_no)?,
        total_wagered: parse_number(&fields[5], line_no)?,
    })
}
