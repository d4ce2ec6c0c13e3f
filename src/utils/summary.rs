use crate::catalog::Catalog;
use crate::render::draw;
use crate::render::recording::RecordingBackend;
use crate::utils::style::swatch;
use comfy_table::{Attribute, Cell, CellAlignment, Table};

fn header(name: &str) -> Cell {
    Cell::new(name)
        .add_attribute(Attribute::Bold)
        .set_alignment(CellAlignment::Center)
}

/// Build the startup table and collect warnings. Each map is drawn on a
/// recording surface so the draw-call count reflects what visitors will get.
pub fn catalog_summary(catalog: &Catalog) -> (Table, Vec<String>) {
    let mut table = Table::new();
    table
        .set_header(vec![
            header(""),
            header("#"),
            header("Challenge"),
            header("Points"),
            header("Difficulty"),
            header("Map"),
            header("Calls"),
            Cell::new("Colours").add_attribute(Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED);

    let backend = RecordingBackend::default();
    let mut warnings = Vec::new();

    for (i, record) in catalog.challenges().iter().enumerate() {
        let mut status = "✅";
        let (features, calls, colours) = match catalog.map_config(&record.id) {
            Some(config) => {
                let calls = match draw(config, &backend, "summary") {
                    Ok(surface) => surface.calls.len().to_string(),
                    Err(e) => {
                        warnings.push(format!("  ⚠️{}: map failed to draw: {}", record.id, e));
                        status = "⚠️";
                        "-".to_string()
                    }
                };
                let colours: String = config.colors().iter().map(|(_, c)| swatch(c)).collect();
                (config.feature_labels().join(", "), calls, colours)
            }
            None => {
                warnings.push(format!("  ⚠️{}: no map config, map area stays empty", record.id));
                status = "⚠️";
                ("-".to_string(), "0".to_string(), String::new())
            }
        };

        if !(record.flag.starts_with("CTF{") && record.flag.ends_with('}')) {
            warnings.push(format!(
                "  ⚠️{}: flag does not follow the CTF{{...}} format",
                record.id
            ));
            status = "⚠️";
        }
        let penalty: u64 = record.hints.iter().map(|h| u64::from(h.points_penalty)).sum();
        if penalty > u64::from(record.points) {
            warnings.push(format!(
                "  ⚠️{}: hint penalties ({}) exceed the challenge's {} points",
                record.id, penalty, record.points
            ));
            status = "⚠️";
        }

        table.add_row(vec![
            Cell::new(status).set_alignment(CellAlignment::Center),
            Cell::new(i + 1).set_alignment(CellAlignment::Center),
            Cell::new(&record.title),
            Cell::new(record.points).set_alignment(CellAlignment::Center),
            Cell::new(record.difficulty()).set_alignment(CellAlignment::Center),
            Cell::new(features),
            Cell::new(calls).set_alignment(CellAlignment::Center),
            Cell::new(colours),
        ]);
    }

    (table, warnings)
}

pub fn print_catalog_summary(catalog: &Catalog) {
    let (table, warnings) = catalog_summary(catalog);
    println!(
        "\nChallenge summary ({} challenges, {} points):\n{}",
        catalog.len(),
        catalog.total_points(),
        table
    );

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in warnings {
            println!("{}", warning);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{builtin, load_challenges};

    #[test]
    fn test_builtin_catalog_has_no_warnings() {
        let (table, warnings) = catalog_summary(&load_challenges());
        assert!(warnings.is_empty(), "{warnings:?}");
        let rendered = table.to_string();
        assert!(rendered.contains("Geofence Escape"));
        assert!(rendered.contains("geofence, poi"));
    }

    #[test]
    fn test_missing_map_and_odd_flag_warn() {
        let mut challenges = builtin::challenges();
        challenges[0].flag = "plain".into();
        let catalog = crate::catalog::Catalog::from_parts(challenges, Vec::new()).unwrap();
        let (_, warnings) = catalog_summary(&catalog);
        assert_eq!(warnings.len(), 6);
        assert!(warnings.iter().any(|w| w.contains("gps-spoofing: flag")));
    }

    #[test]
    fn test_large_hint_penalties_are_summed_wide() {
        let mut challenges = builtin::challenges();
        challenges.truncate(1);
        let hint = crate::models::challenge::Hint {
            text: "look closer".into(),
            points_penalty: u32::MAX,
        };
        challenges[0].hints = vec![hint.clone(), hint];
        let catalog = crate::catalog::Catalog::from_parts(challenges, Vec::new()).unwrap();
        let (_, warnings) = catalog_summary(&catalog);
        assert!(
            warnings
                .iter()
                .any(|w| w.contains("hint penalties (8589934590)"))
        );
    }
}
