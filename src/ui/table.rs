use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::insights::Insight;
use crate::data::model::Table;
use crate::state::AppState;

/// Rows drawn per table; the rest is summarised in a footer line.
const MAX_ROWS: usize = 1000;

// ---------------------------------------------------------------------------
// Central panel: KPI strip, table picker, table body
// ---------------------------------------------------------------------------

pub fn view_panel(ui: &mut Ui, state: &mut AppState) {
    if state.data.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a data folder to start  (File → Open data folder…)");
        });
        return;
    }

    ui.heading(state.page.title());
    kpi_strip(ui, state);
    ui.separator();

    ui.horizontal_wrapped(|ui: &mut Ui| {
        let showing_table = state.selected_insight.is_none();
        let mut clicked_table = None;
        for (kind, table) in state.view.iter() {
            let text = format!("{kind} ({})", table.len());
            if ui
                .selectable_label(showing_table && state.selected_table == kind, text)
                .clicked()
            {
                clicked_table = Some(kind);
            }
        }
        if let Some(kind) = clicked_table {
            state.select_table(kind);
        }

        ui.separator();

        let mut clicked_insight = None;
        for &insight in Insight::for_page(state.page) {
            if ui
                .selectable_label(state.selected_insight == Some(insight), insight.title())
                .clicked()
            {
                clicked_insight = Some(insight);
            }
        }
        if let Some(insight) = clicked_insight {
            state.select_insight(insight);
        }
    });
    ui.separator();

    let table = match state.selected_insight {
        Some(insight) => {
            insight_choices(ui, state, insight);
            Some(&state.insight_table)
        }
        None => state.view.table(state.selected_table),
    };
    match table {
        Some(table) if !table.is_empty() => table_body(ui, table),
        _ => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label(RichText::new("No data available with current filters").italics());
            });
        }
    }
}

/// Pickers for the athlete, countries or day an insight depends on.
fn insight_choices(ui: &mut Ui, state: &mut AppState, insight: Insight) {
    let mut params = state.insight_params.clone();
    let choices = &state.insight_choices;

    ui.horizontal(|ui: &mut Ui| match insight {
        Insight::AthleteProfile => {
            ui.label("Athlete");
            choice_box(ui, "athlete", &mut params.athlete, &choices.athletes);
        }
        Insight::HeadToHead => {
            let (mut a, mut b) = params.compare.clone().unzip();
            ui.label("Country A");
            choice_box(ui, "country_a", &mut a, &choices.countries);
            ui.label("Country B");
            choice_box(ui, "country_b", &mut b, &choices.countries);
            params.compare = a.zip(b);
        }
        Insight::MedalsOfDay | Insight::EventsOfDay => {
            let days: Vec<String> = choices.days.iter().map(ToString::to_string).collect();
            let mut day = params.day.map(|d| d.to_string());
            ui.label("Day");
            choice_box(ui, "day", &mut day, &days);
            params.day = day.and_then(|d| d.parse().ok());
        }
        _ => {}
    });

    if params != state.insight_params {
        state.set_insight_params(params);
    }
}

fn choice_box(ui: &mut Ui, id: &str, selected: &mut Option<String>, values: &[String]) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected.as_deref().unwrap_or("–"))
        .height(300.0)
        .show_ui(ui, |ui: &mut Ui| {
            for value in values {
                ui.selectable_value(selected, Some(value.clone()), value.as_str());
            }
        });
}

fn kpi_strip(ui: &mut Ui, state: &AppState) {
    let k = &state.kpis;
    ui.horizontal(|ui: &mut Ui| {
        for (label, value) in [
            ("Athletes", k.athletes),
            ("Countries", k.countries),
            ("Sports", k.sports),
            ("Medals", k.medals),
            ("Events", k.events),
        ] {
            ui.vertical(|ui: &mut Ui| {
                ui.label(label);
                ui.strong(value.to_string());
            });
            ui.add_space(16.0);
        }
        if !k.medals_by_type.is_empty() {
            ui.separator();
            for (medal, count) in &k.medals_by_type {
                ui.label(format!("{medal}: {count}"));
            }
        }
        if let Some(leader) = &k.leaders.most_medals {
            ui.separator();
            ui.label(format!("Most medals: {} ({})", leader.country, leader.count));
        }
        if let Some(leader) = &k.leaders.most_gold {
            ui.label(format!("Most gold: {} ({})", leader.country, leader.count));
        }
    });
}

fn table_body(ui: &mut Ui, table: &Table) {
    let shown = table.len().min(MAX_ROWS);
    if shown < table.len() {
        ui.label(format!("Showing first {shown} of {} rows", table.len()));
    }

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(60.0).clip(true), table.columns().len())
            .header(20.0, |mut header| {
                for name in table.columns() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, shown, |mut row| {
                    let idx = row.index();
                    if let Some(cells) = table.rows().get(idx) {
                        for cell in cells {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell.to_string());
                            });
                        }
                    }
                });
            });
    });
}
