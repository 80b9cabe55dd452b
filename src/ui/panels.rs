use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::schema::Concept;
use crate::data::view::Page;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Filters");
        if !state.criteria.is_empty() && ui.small_button("Reset").clicked() {
            state.reset_filters();
        }
    });
    ui.separator();

    if state.data.is_none() {
        ui.label("No data loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for concept in Concept::ALL {
                concept_filter(ui, state, concept);
            }
        });
}

/// One collapsible block of checkboxes. Nothing ticked means no filter.
fn concept_filter(ui: &mut Ui, state: &mut AppState, concept: Concept) {
    let values = state.options.values(concept);
    if values.is_empty() {
        return;
    }

    let n_selected = state.criteria.selection(concept).len();
    let header_text = if n_selected == 0 {
        format!("{concept}  (all)")
    } else {
        format!("{concept}  ({n_selected}/{})", values.len())
    };

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(concept.label())
        .default_open(matches!(concept, Concept::Medal | Concept::Gender))
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(concept);
                }
                if ui.small_button("Clear").clicked() {
                    state.clear(concept);
                }
            });

            for value in &values {
                let mut checked = state.criteria.selection(concept).contains(value);
                let label = state.options.display(concept, value).to_string();
                if ui.checkbox(&mut checked, label).changed() {
                    state.toggle_value(concept, value);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, page tabs and status.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for page in Page::ALL {
            if ui.selectable_label(state.page == page, page.title()).clicked() {
                state.set_page(page);
            }
        }

        ui.separator();

        if let Some(data) = &state.data {
            let source = data
                .source
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            ui.label(format!("{} rows loaded {source}", data.total_rows()));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open Olympic data folder")
        .pick_folder();

    if let Some(path) = folder {
        state.load_dir(&path);
    }
}
