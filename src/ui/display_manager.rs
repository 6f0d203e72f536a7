use crate::core::graph::CriticalPath;
use crate::core::schedule::Schedule;
use crate::scope::ledger::ChangeLedger;
use crate::ui::ansi::{FG_YELLOW, STYLE_RESET};
use crate::ui::table_printer::TablePrinter;

/// Renders schedule state as tables on stdout.
#[derive(Debug, Default, Clone)]
pub struct DisplayManager {
    printer: TablePrinter,
}

impl DisplayManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_activities(&self, schedule: &Schedule) {
        let rows: Vec<Vec<String>> = schedule
            .activities()
            .iter()
            .enumerate()
            .map(|(i, a)| {
                vec![
                    (i + 1).to_string(),
                    a.name.clone(),
                    a.description.clone(),
                    format_days(a.duration),
                ]
            })
            .collect();
        self.printer.print_table(
            "Activities",
            &["#", "Name", "Description", "Duration (days)"],
            &rows,
            Some("No activities yet. Add one from the menu or the prompt."),
        );
    }

    pub fn show_relationships(&self, schedule: &Schedule) {
        let rows: Vec<Vec<String>> = schedule
            .relationships()
            .iter()
            .enumerate()
            .map(|(i, r)| {
                vec![
                    (i + 1).to_string(),
                    activity_name(schedule, r.predecessor),
                    activity_name(schedule, r.successor),
                    r.relation.to_string(),
                    format_days(r.lag),
                ]
            })
            .collect();
        self.printer.print_table(
            "Relationships",
            &["#", "Predecessor", "Successor", "Type", "Lag (days)"],
            &rows,
            Some("No relationships yet."),
        );
    }

    pub fn show_critical_path(&self, schedule: &Schedule, cp: &CriticalPath) {
        let rows: Vec<Vec<String>> = cp
            .timings
            .iter()
            .map(|t| {
                let name = activity_name(schedule, t.id);
                let name = if t.is_critical() {
                    format!("{FG_YELLOW}{name}{STYLE_RESET}")
                } else {
                    name
                };
                vec![
                    name,
                    format_days(t.early_start),
                    format_days(t.early_finish),
                    format_days(t.late_start),
                    format_days(t.late_finish),
                    format_days(t.total_float),
                    if t.is_critical() { "yes" } else { "" }.to_string(),
                ]
            })
            .collect();
        self.printer.print_table(
            &format!("Critical Path ({} days total)", format_days(cp.duration)),
            &["Activity", "ES", "EF", "LS", "LF", "Float", "Critical"],
            &rows,
            Some("The schedule is empty."),
        );
    }

    pub fn show_change_summary(&self, ledger: &ChangeLedger) {
        let rows: Vec<Vec<String>> = ledger
            .summary()
            .into_iter()
            .map(|line| vec![line])
            .collect();
        self.printer.print_table(
            "Proposed Changes",
            &["Change"],
            &rows,
            Some("No changes."),
        );
    }
}

fn activity_name(schedule: &Schedule, id: uuid::Uuid) -> String {
    schedule
        .activity(id)
        .map(|a| a.name.clone())
        .unwrap_or_else(|_| id.to_string())
}

/// Days print without a trailing ".0" when whole.
pub fn format_days(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}
