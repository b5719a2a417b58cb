use colored::Colorize;
use ipcfg_core::{InterfaceState, Ipv4Record, RecordKind};

use crate::engine::{RunReport, Severity};

/// Render a reconciliation run for terminal output. Info-level events are
/// shown only in verbose mode; warnings and errors always appear.
pub fn render_run_text(report: &RunReport, verbose: bool) -> String {
    let mut out = Vec::new();
    out.push(format!(
        "reconcile interfaces={} change_occurred={}",
        report.interfaces.len(),
        report.change_occurred
    ));

    for outcome in &report.interfaces {
        out.push(format!(
            "- {} ordinal={} class={} decision={} applications={}",
            outcome.name,
            outcome.ordinal,
            outcome.class.as_str(),
            outcome.decision.as_str(),
            outcome.applications
        ));
        for event in &outcome.events {
            if event.severity == Severity::Info && !verbose {
                continue;
            }
            out.push(format!("  {} {}", severity_tag(event.severity), event.message));
        }
        if let Some(error) = &outcome.error {
            out.push(format!("  {} {}", severity_tag(Severity::Error), error));
        }
    }

    out.push(format!(
        "result errors={} warnings={}",
        report.errors, report.warnings
    ));
    out.join("\n")
}

/// Render the inspector's view of the active interfaces.
pub fn render_interfaces_text(states: &[InterfaceState]) -> String {
    let mut out = Vec::new();
    out.push(format!("interfaces active={}", states.len()));
    for state in states {
        let address = match (state.address, state.prefix_length) {
            (Some(address), Some(prefix)) => format!("{address}/{prefix}"),
            _ => "none".to_string(),
        };
        let gateway = state
            .gateway
            .map(|g| g.to_string())
            .unwrap_or_else(|| "none".to_string());
        out.push(format!(
            "- {} ordinal={} address={} gateway={} dhcp={}",
            state.name, state.ordinal, address, gateway, state.dhcp_enabled
        ));
    }
    out.join("\n")
}

/// Render one stored record line for `records show`.
pub fn render_record_line(kind: RecordKind, record: Option<&Ipv4Record>) -> String {
    match record {
        Some(record) => format!("- {kind}: {record}"),
        None => format!("- {kind}: none"),
    }
}

fn severity_tag(severity: Severity) -> String {
    match severity {
        Severity::Info => "[info]".cyan().to_string(),
        Severity::Warn => "[warn]".yellow().to_string(),
        Severity::Error => "[error]".red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::classify::InterfaceClass;
    use crate::engine::{Decision, Event, InterfaceOutcome, RunReport, Severity};

    use super::render_run_text;

    fn report() -> RunReport {
        RunReport {
            interfaces: vec![InterfaceOutcome {
                ordinal: 0,
                name: "eth0".to_string(),
                class: InterfaceClass::Dhcp,
                decision: Decision::ApplyProduction,
                applications: 1,
                events: vec![
                    Event {
                        severity: Severity::Info,
                        message: "classified as dhcp".to_string(),
                    },
                    Event {
                        severity: Severity::Warn,
                        message: "apply-production did not validate".to_string(),
                    },
                ],
                error: None,
            }],
            change_occurred: true,
            errors: 0,
            warnings: 1,
        }
    }

    #[test]
    fn hides_info_events_unless_verbose() {
        colored::control::set_override(false);
        let quiet = render_run_text(&report(), false);
        assert!(!quiet.contains("classified as dhcp"));
        assert!(quiet.contains("did not validate"));
        assert!(quiet.contains("decision=apply-production"));

        let verbose = render_run_text(&report(), true);
        assert!(verbose.contains("classified as dhcp"));
    }

    #[test]
    fn summarizes_run_counters() {
        colored::control::set_override(false);
        let text = render_run_text(&report(), false);
        assert!(text.starts_with("reconcile interfaces=1 change_occurred=true"));
        assert!(text.ends_with("result errors=0 warnings=1"));
    }
}
