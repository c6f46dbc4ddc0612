use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::WellTable;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Bottom panel – selected wells and their curve availability
// ---------------------------------------------------------------------------

pub fn selection_panel(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        return;
    };

    let text = state.selection.render();
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Selected wells");
        if ui.small_button("Copy").clicked() {
            ui.ctx().copy_text(text.trim_start().to_string());
        }
        if state.selection.is_empty() {
            ui.label(RichText::new("no well matches the current filters").weak());
        } else if state
            .criteria
            .interactive
            .as_ref()
            .is_some_and(|ids| ids.is_empty())
        {
            ui.label(RichText::new("empty map selection: showing all matching wells").weak());
        }
    });

    ScrollArea::vertical()
        .id_salt("selection_text")
        .max_height(90.0)
        .show(ui, |ui: &mut Ui| {
            ui.add(egui::Label::new(RichText::new(text.trim_start()).monospace()).wrap());
        });

    egui::CollapsingHeader::new("Curve availability")
        .id_salt("availability_grid")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            availability_grid(ui, table, &state.selection.wells);
        });
}

/// Wells × curves grid of the given wells, in table order.
fn availability_grid(ui: &mut Ui, table: &WellTable, wells: &[String]) {
    let curves: Vec<&str> = table.catalog.iter().collect();
    let rows: Vec<_> = wells.iter().filter_map(|name| table.get(name)).collect();

    ScrollArea::horizontal()
        .id_salt("availability_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(240.0)
                .column(Column::auto().at_least(90.0))
                .column(Column::auto())
                .columns(Column::exact(44.0), curves.len())
                .header(20.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Well");
                    });
                    header.col(|ui| {
                        ui.strong("Dataset");
                    });
                    for curve in &curves {
                        header.col(|ui| {
                            ui.strong(*curve);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, rows.len(), |mut row| {
                        let well = rows[row.index()];
                        row.col(|ui| {
                            ui.label(&well.name);
                        });
                        row.col(|ui| {
                            ui.label(well.partition.label());
                        });
                        for curve in &curves {
                            row.col(|ui| {
                                if well.has_curve(curve) {
                                    ui.label(RichText::new("✔").color(Color32::LIGHT_GREEN));
                                } else {
                                    ui.label(RichText::new("–").weak());
                                }
                            });
                        }
                    });
                });
        });
}
