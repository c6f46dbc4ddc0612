use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::Partition;
use crate::state::{AppState, MapMode};

// ---------------------------------------------------------------------------
// Left side panel – colour and filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let columns = table.column_names.clone();
    let curves: Vec<(String, usize)> = table
        .catalog
        .iter()
        .map(|c| (c.to_string(), table.coverage(c)))
        .collect();
    let n_wells = table.len();
    let no_catalog = table.catalog.is_empty();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Colour-by selector ----
            ui.strong("Color by");
            let current = state.color_column.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("color_by")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &columns {
                        if ui.selectable_label(current == *col, col).clicked() {
                            state.set_color_column(col.clone());
                        }
                    }
                });
            if let Some(cm) = &state.color_map {
                for (label, color) in cm.legend_entries() {
                    ui.label(RichText::new(format!("● {label}")).color(color));
                }
            }
            ui.separator();

            // ---- Partitions ----
            ui.strong("Dataset");
            for partition in Partition::ALL {
                let mut checked = state.criteria.partitions.contains(&partition);
                if ui.checkbox(&mut checked, partition.label()).changed() {
                    state.toggle_partition(partition);
                }
            }
            ui.separator();

            // ---- Required curves ----
            let n_required = state.criteria.required_curves.len();
            egui::CollapsingHeader::new(
                RichText::new(format!("Required curves  ({n_required}/{})", curves.len()))
                    .strong(),
            )
            .id_salt("required_curves")
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                if no_catalog {
                    ui.label("The curve catalog is empty.");
                    return;
                }
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("All").clicked() {
                        state.require_all_curves();
                    }
                    if ui.small_button("None").clicked() {
                        state.require_no_curves();
                    }
                });

                for (curve, coverage) in &curves {
                    let mut checked = state.criteria.required_curves.contains(curve);
                    let text = format!("{curve}  ({coverage}/{n_wells})");
                    let text = if *coverage == 0 {
                        RichText::new(text).weak()
                    } else {
                        RichText::new(text)
                    };
                    let hint = format!("{coverage} wells have at least one {curve} reading");
                    if ui.checkbox(&mut checked, text).on_hover_text(hint).changed() {
                        state.toggle_curve(curve);
                    }
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dataset…").clicked() {
                open_dataset_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} wells loaded, {} selected",
                table.len(),
                state.selection.count()
            ));
        }

        ui.separator();

        ui.selectable_value(&mut state.map_mode, MapMode::Pan, "Pan")
            .on_hover_text("Drag to pan, scroll to zoom");
        ui.selectable_value(&mut state.map_mode, MapMode::BoxSelect, "Box select")
            .on_hover_text("Drag a rectangle or click a well to select");

        let has_selection = state.criteria.interactive.is_some();
        if ui
            .add_enabled(has_selection, egui::Button::new("Clear map selection"))
            .clicked()
        {
            state.clear_map_selection();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

/// Ask for the well metadata file, then the log file, and load both.
pub fn open_dataset_dialog(state: &mut AppState) {
    let Some(metadata) = rfd::FileDialog::new()
        .set_title("Open well metadata")
        .add_filter("Well metadata", &["csv", "json"])
        .pick_file()
    else {
        return;
    };

    let mut logs_dialog = rfd::FileDialog::new()
        .set_title("Open log data")
        .add_filter("Log data", &["csv", "parquet", "pq"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("CSV", &["csv"]);
    if let Some(dir) = metadata.parent() {
        logs_dialog = logs_dialog.set_directory(dir);
    }
    let Some(logs) = logs_dialog.pick_file() else {
        return;
    };

    state.load_dataset(&metadata, &logs);
}
