//! Terminal output
//!
//! Formatting is kept apart from printing so it can be checked without a
//! terminal.

use anstyle::{AnsiColor, Style};
use ons_core::{ApplyOutcome, ListedRecord, Plan, ReconcileEvent, Record};
use std::io::IsTerminal;
use tokio::sync::mpsc;

const ADDITION: Style = AnsiColor::Green.on_default();
const REMOVAL: Style = AnsiColor::Red.on_default();
const CREATED: Style = AnsiColor::Green.on_default().bold();
const DELETED: Style = AnsiColor::Red.on_default().bold();
const SUMMARY: Style = AnsiColor::Cyan.on_default();
const TARGET: Style = AnsiColor::Magenta.on_default();
const NAME: Style = AnsiColor::Green.on_default();

/// Renders reconciler output, with or without ANSI styling
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Styled when stdout is a terminal
    pub fn stdout() -> Self {
        Self::new(std::io::stdout().is_terminal())
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.color {
            format!("{}{}{}", style.render(), text, style.render_reset())
        } else {
            text.to_string()
        }
    }

    /// One line per planned change
    pub fn plan_lines(&self, plan: &Plan) -> Vec<String> {
        let additions = plan.to_add.iter().map(|r| {
            self.paint(
                ADDITION,
                &format!("+ dns record: {:<16} {}", r.target, r.fqdn()),
            )
        });
        let removals = plan.to_remove.iter().map(|r| {
            let comment = if r.has_live_id() {
                ""
            } else {
                " (already removed from the DNS zone)"
            };
            self.paint(
                REMOVAL,
                &format!("- dns record: {:<16} {}{}", r.target, r.fqdn(), comment),
            )
        });
        additions.chain(removals).collect()
    }

    pub fn plan_summary(&self, plan: &Plan) -> String {
        self.paint(
            SUMMARY,
            &format!(
                "Plan: {} to add, {} to remove.",
                plan.to_add.len(),
                plan.to_remove.len()
            ),
        )
    }

    pub fn apply_summary(&self, outcome: &ApplyOutcome) -> String {
        self.paint(
            SUMMARY,
            &format!(
                "Apply: {} added, {} removed.",
                outcome.added, outcome.removed
            ),
        )
    }

    /// Progress line for an event, if it is worth showing
    pub fn event_line(&self, event: &ReconcileEvent) -> Option<String> {
        match event {
            ReconcileEvent::RecordCreated { record } => {
                Some(self.paint(CREATED, &progress(record, "added")))
            }
            ReconcileEvent::RecordDeleted { record } => {
                Some(self.paint(DELETED, &progress(record, "removed")))
            }
            ReconcileEvent::RecordForgotten { record } => {
                Some(self.paint(DELETED, &progress(record, "forgotten")))
            }
            ReconcileEvent::ApplyInterrupted { added, removed, .. } => Some(self.paint(
                REMOVAL,
                &format!("Apply interrupted: {} added, {} removed.", added, removed),
            )),
            ReconcileEvent::ZonePublished { .. } | ReconcileEvent::TrackedPersisted { .. } => None,
        }
    }

    /// A live record; `*` marks declared ones
    pub fn listed_line(&self, listed: &ListedRecord) -> String {
        let record = &listed.record;
        let target = format!("{:<16}", record.target);
        format!(
            "{} {} {}",
            self.paint(TARGET, &target),
            if listed.managed { "*" } else { " " },
            self.paint(NAME, &record.fqdn())
        )
    }
}

fn progress(record: &Record, action: &str) -> String {
    format!("{:<16} {}  {}", record.target, record.fqdn(), action)
}

/// Print events until the reconciler is dropped
pub async fn print_events(mut events: mpsc::Receiver<ReconcileEvent>, reporter: Reporter) {
    while let Some(event) = events.recv().await {
        tracing::trace!("Event: {:?}", event);
        if let Some(line) = reporter.event_line(&event) {
            println!("{}", line);
        }
    }
}
