//! Deterministic stand-in for a matrix-element program.
//!
//! Reads the named parameter values from a rendered card and writes, for
//! every event with outgoing particles,
//! `w = k * (1 + sum_i (i+1) p_i + sum_{i<=j} p_i p_j)` with `k = 1 + |id| % 5`
//! and `p_i` the value of the `i`-th name given on the command line.

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use log::{info, warn};
use rwgt_events::{open_reader, write_weight_table, EventFormat, WeightRecord};

const USAGE: &str = "usage: toy-evaluator <events> <weights.csv> <card> <name>...";

/// Collects `name -> value` from SLHA (`id value # name`, `DECAY id value # name`)
/// and key-value (`name = value`, `name value`) card lines.
fn card_values(card: &str) -> BTreeMap<String, f64> {
    let mut values = BTreeMap::new();
    for line in card.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(['#', '!', '[']) {
            continue;
        }
        let (data, comment) = match line.split_once('#') {
            Some((data, comment)) => (data, comment.split_whitespace().next()),
            None => (line, None),
        };
        let fields: Vec<&str> = data
            .split(|c: char| c.is_whitespace() || c == '=')
            .filter(|field| !field.is_empty())
            .collect();
        let Some(first) = fields.first() else {
            continue;
        };
        if first.eq_ignore_ascii_case("block") {
            continue;
        }
        let slha_entry = first.parse::<i64>().is_ok() || first.eq_ignore_ascii_case("decay");
        match (comment, slha_entry) {
            (Some(name), true) if fields.len() >= 2 => {
                if let Some(Ok(value)) = fields.last().map(|field| field.parse::<f64>()) {
                    values.insert(name.to_string(), value);
                }
            }
            _ if fields.len() == 2 => {
                if let Ok(value) = fields[1].parse::<f64>() {
                    values.insert(first.to_string(), value);
                }
            }
            _ => {}
        }
    }
    values
}

fn toy_weight(id: i32, params: &[f64]) -> f64 {
    let k = 1.0 + f64::from(id.unsigned_abs() % 5);
    let mut sum = 1.0;
    for (i, p) in params.iter().enumerate() {
        sum += (i + 1) as f64 * p;
        for q in &params[i..] {
            sum += p * q;
        }
    }
    k * sum
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let mut args = std::env::args().skip(1);
    let events = args.next().ok_or(USAGE)?;
    let output = args.next().ok_or(USAGE)?;
    let card = args.next().ok_or(USAGE)?;
    let names: Vec<String> = args.collect();
    if names.is_empty() {
        return Err(USAGE.into());
    }

    let values = card_values(&fs::read_to_string(&card)?);
    let missing: Vec<&str> = names
        .iter()
        .filter(|name| !values.contains_key(name.as_str()))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(format!("card {card} has no value for {}", missing.join(",")).into());
    }
    let params: Vec<f64> = names.iter().map(|name| values[name.as_str()]).collect();
    info!("toy evaluation at {names:?} = {params:?}");

    let events = Path::new(&events);
    let mut reader = open_reader(events, EventFormat::from_path(events))?;
    let mut records = Vec::new();
    while let Some(event) = reader.read_event()? {
        if event.output.is_empty() {
            warn!("skipping event {}: no outgoing particles", event.id);
            continue;
        }
        records.push(WeightRecord {
            event_id: event.id,
            weight: toy_weight(event.id, &params),
        });
    }
    write_weight_table(Path::new(&output), &records)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_cards_bind_by_name() {
        let values = card_values("# couplings\ny 1.5\nx = -2.0E+00  # note\n[run]\n");
        assert_eq!(values.get("x"), Some(&-2.0));
        assert_eq!(values.get("y"), Some(&1.5));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn slha_cards_bind_by_comment_name() {
        let card = "Block SMINPUTS\n  2  4.0000000000000E+00  # cHB\n  1  5.0E-01  # cW\nDECAY  25  4.07E-03  # WH\n";
        let values = card_values(card);
        assert_eq!(values.get("cW"), Some(&0.5));
        assert_eq!(values.get("cHB"), Some(&4.0));
        assert_eq!(values.get("WH"), Some(&4.07e-3));
    }
}
