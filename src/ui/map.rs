use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Polygon};

use crate::color::MUTED;
use crate::data::model::{COMPLETION_YEAR, FORMATION, OPERATOR, PURPOSE, WellRecord};
use crate::state::{AppState, MapMode};

/// Click radius, in screen points, for picking a single well.
const PICK_RADIUS: f32 = 8.0;

// ---------------------------------------------------------------------------
// Well map (central panel)
// ---------------------------------------------------------------------------

/// Render the well map and apply box / click selections to the state.
pub fn well_map(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = &state.table else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to view wells  (File → Open dataset…)");
        });
        return;
    };
    if table.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("The metadata file lists no wells.");
        });
        return;
    }

    let mut qualified = vec![false; table.len()];
    for &idx in &state.qualified {
        qualified[idx] = true;
    }

    // Group qualifying wells by colour so each value gets one legend entry.
    let color_col = state.color_column.as_deref();
    let mut groups: BTreeMap<String, (Color32, Vec<[f64; 2]>)> = BTreeMap::new();
    let mut muted: Vec<[f64; 2]> = Vec::new();
    let mut picked: Vec<[f64; 2]> = Vec::new();
    for (idx, well) in table.wells.iter().enumerate() {
        let pos = [well.longitude, well.latitude];
        if state.is_picked(&well.name) {
            picked.push(pos);
        }
        if !qualified[idx] {
            muted.push(pos);
            continue;
        }
        let (label, color) = match (color_col, &state.color_map) {
            (Some(col), Some(cm)) => {
                let value = well.value(col);
                (value.to_string(), cm.color_for(&value))
            }
            _ => (String::from("wells"), Color32::LIGHT_BLUE),
        };
        groups.entry(label).or_insert((color, Vec::new())).1.push(pos);
    }

    let hover: Vec<([f64; 2], String)> = table
        .wells
        .iter()
        .map(|w| ([w.longitude, w.latitude], hover_text(w)))
        .collect();
    let positions: Vec<(String, PlotPoint)> = table
        .wells
        .iter()
        .map(|w| (w.name.clone(), PlotPoint::new(w.longitude, w.latitude)))
        .collect();
    let aspect = lon_aspect(&table.wells);

    let box_select = state.map_mode == MapMode::BoxSelect;
    let box_start = state.box_start;

    let plot_response = Plot::new("well_map")
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(aspect)
        .allow_drag(!box_select)
        .allow_boxed_zoom(!box_select)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(move |name, value| {
            if name.is_empty() {
                return format!("{:.3}°E  {:.3}°N", value.x, value.y);
            }
            nearest_label(&hover, value.x, value.y).unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::new(muted))
                    .name("Not matching")
                    .color(MUTED)
                    .radius(2.5),
            );
            for (label, (color, points)) in groups {
                plot_ui.points(
                    Points::new(PlotPoints::new(points))
                        .name(label)
                        .color(color)
                        .radius(4.0),
                );
            }
            if !picked.is_empty() {
                plot_ui.points(
                    Points::new(PlotPoints::new(picked))
                        .name("Map selection")
                        .shape(MarkerShape::Circle)
                        .filled(false)
                        .color(Color32::WHITE)
                        .radius(7.0),
                );
            }

            let pointer = plot_ui.pointer_coordinate();
            if let (true, Some(start), Some(end)) = (box_select, box_start, pointer) {
                let corners = vec![
                    [start[0], start[1]],
                    [end.x, start[1]],
                    [end.x, end.y],
                    [start[0], end.y],
                ];
                plot_ui.polygon(
                    Polygon::new(PlotPoints::new(corners))
                        .stroke(Stroke::new(1.0, Color32::WHITE))
                        .fill_color(Color32::from_white_alpha(24)),
                );
            }
        });

    if !box_select {
        return;
    }

    let response = &plot_response.response;
    let transform = &plot_response.transform;
    let latest = ui.input(|i| i.pointer.latest_pos());

    if response.drag_started() {
        state.box_start = latest.map(|p| {
            let v = transform.value_from_position(p);
            [v.x, v.y]
        });
    } else if response.drag_stopped() {
        if let (Some(start), Some(end)) = (state.box_start.take(), latest) {
            let end = transform.value_from_position(end);
            state.select_in_box(start, [end.x, end.y]);
        }
    } else if response.clicked() {
        let hit = response.interact_pointer_pos().and_then(|click| {
            positions
                .iter()
                .map(|(name, p)| (name, transform.position_from_point(p).distance(click)))
                .filter(|(_, d)| *d <= PICK_RADIUS)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(name, _)| name.clone())
        });
        match hit {
            Some(name) => state.select_on_map(BTreeSet::from([name])),
            None => state.clear_map_selection(),
        }
    }
}

/// Plot aspect (x units per pixel over y units per pixel) that narrows a
/// degree of longitude to its ground width at the wells' mean latitude.
fn lon_aspect(wells: &[WellRecord]) -> f32 {
    if wells.is_empty() {
        return 1.0;
    }
    let mean_lat = wells.iter().map(|w| w.latitude).sum::<f64>() / wells.len() as f64;
    let cos = mean_lat.to_radians().cos().abs().max(0.1);
    (1.0 / cos) as f32
}

fn hover_text(well: &WellRecord) -> String {
    let mut text = format!("{}\n{}", well.name, well.partition);
    for (label, key) in [
        ("Operator", OPERATOR),
        ("Purpose", PURPOSE),
        ("Completed", COMPLETION_YEAR),
        ("Formation at TD", FORMATION),
    ] {
        let value = well.value(key);
        if !value.is_null() {
            text.push_str(&format!("\n{label}: {value}"));
        }
    }
    text
}

fn nearest_label(points: &[([f64; 2], String)], x: f64, y: f64) -> Option<String> {
    points
        .iter()
        .map(|(p, label)| ((p[0] - x).powi(2) + (p[1] - y).powi(2), label))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, label)| label.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{MetadataValue, Partition};

    #[test]
    fn hover_text_skips_missing_metadata() {
        let mut well = WellRecord::new("15/9-13", Partition::Training, 58.4, 1.9);
        well.metadata
            .insert(OPERATOR.into(), MetadataValue::String("Statoil".into()));
        well.metadata.insert(FORMATION.into(), MetadataValue::Null);
        assert_eq!(hover_text(&well), "15/9-13\nTraining\nOperator: Statoil");
    }

    #[test]
    fn nearest_label_picks_closest_point() {
        let points = vec![([2.0, 58.0], "A".to_string()), ([3.0, 59.0], "B".to_string())];
        assert_eq!(nearest_label(&points, 2.9, 58.8).as_deref(), Some("B"));
        assert_eq!(nearest_label(&[], 0.0, 0.0), None);
    }

    #[test]
    fn aspect_narrows_longitude_at_high_latitude() {
        let wells = vec![WellRecord::new("A", Partition::Test, 60.0, 2.0)];
        assert!((lon_aspect(&wells) - 2.0).abs() < 1e-4);
        assert_eq!(lon_aspect(&[]), 1.0);
    }
}
