use std::net::Ipv4Addr;
use std::time::Duration;

use ipcfg_core::{InterfaceState, Ipv4Record, RecordKind, RecordStore, StoreError};
use serde::Serialize;
use thiserror::Error;

use crate::classify::{classify, InterfaceClass};
use crate::netops::{NetOps, NetOpsError};

/// Run-fatal reconciliation errors. Apply failures are interface-scoped and
/// land in [`InterfaceOutcome::error`] instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no active network interface found")]
    NoActiveInterface,
    #[error("missing required {kind} record for interface ordinal {ordinal}")]
    MissingRequiredRecord { kind: RecordKind, ordinal: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    NetOps(#[from] NetOpsError),
}

/// The target selected for one interface in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    ApplyProduction,
    ApplyDr,
    Restore,
    NoChange,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::ApplyProduction => "apply-production",
            Decision::ApplyDr => "apply-dr",
            Decision::Restore => "restore",
            Decision::NoChange => "no-change",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// One logged step of the decision procedure, emitted before it is acted on.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceOutcome {
    pub ordinal: u32,
    pub name: String,
    pub class: InterfaceClass,
    pub decision: Decision,
    /// Configuration applications performed; never exceeds three.
    pub applications: u32,
    pub events: Vec<Event>,
    /// Interface-scoped apply failure, if any. The run continues.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub interfaces: Vec<InterfaceOutcome>,
    pub change_occurred: bool,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Wait after every configuration change before the next probe.
    pub settle: Duration,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(10),
        }
    }
}

/// Run the reconciliation procedure over every active interface, in ordinal
/// order, threading the change-occurred accumulator through the loop.
pub fn reconcile(
    netops: &mut dyn NetOps,
    store: &RecordStore,
    options: &ReconcileOptions,
) -> Result<RunReport, EngineError> {
    let interfaces = netops.list_active_interfaces()?;
    if interfaces.is_empty() {
        return Err(EngineError::NoActiveInterface);
    }

    let mut change_occurred = false;
    let mut outcomes = Vec::with_capacity(interfaces.len());
    for state in &interfaces {
        outcomes.push(reconcile_interface(
            netops,
            store,
            options,
            state,
            &mut change_occurred,
        )?);
    }

    let errors = outcomes.iter().filter(|o| o.error.is_some()).count();
    let warnings = outcomes
        .iter()
        .flat_map(|o| &o.events)
        .filter(|e| e.severity == Severity::Warn)
        .count();
    Ok(RunReport {
        interfaces: outcomes,
        change_occurred,
        errors,
        warnings,
    })
}

fn reconcile_interface(
    netops: &mut dyn NetOps,
    store: &RecordStore,
    options: &ReconcileOptions,
    state: &InterfaceState,
    change_occurred: &mut bool,
) -> Result<InterfaceOutcome, EngineError> {
    let ordinal = state.ordinal;
    let production = store.load(RecordKind::Production, ordinal)?;
    let dr = store.load(RecordKind::Dr, ordinal)?;
    let previous = store.load(RecordKind::Previous, ordinal)?;
    let class = classify(state, production.as_ref(), dr.as_ref());
    let observed = state.to_record();

    let mut run = InterfaceRun {
        netops,
        options,
        state,
        observed: observed.clone(),
        change_occurred,
        events: Vec::new(),
        applications: 0,
        apply_error: None,
    };
    run.info(format!("classified as {}", class.as_str()));

    let decision = match class {
        InterfaceClass::Dhcp => run.reconcile_dhcp(production, dr, previous)?,
        InterfaceClass::MatchesProduction => {
            run.reconcile_matching(Decision::ApplyProduction, production, dr)?
        }
        InterfaceClass::MatchesDr => run.reconcile_matching(Decision::ApplyDr, production, dr)?,
        InterfaceClass::MatchesNeither => {
            if production.is_none() && dr.is_none() {
                match &observed {
                    Some(record) => {
                        run.info(
                            "no records on disk; capturing current configuration as production baseline",
                        );
                        store.save(RecordKind::Production, ordinal, record)?;
                    }
                    None => run.warn(
                        "no records on disk and observed configuration is incomplete; nothing captured",
                    ),
                }
                Decision::NoChange
            } else {
                run.reconcile_unrecognized(production, dr)?
            }
        }
    };

    // Persist the pre-change observation so the next run can classify the
    // transition, unless this interface aborted on an apply failure.
    if run.apply_error.is_none() {
        match &observed {
            Some(record) => {
                store.save(RecordKind::Previous, ordinal, record)?;
                run.info("persisted observed configuration as previous record");
            }
            None => run.warn("observed configuration is incomplete; previous record not updated"),
        }
    }

    let InterfaceRun {
        events,
        applications,
        apply_error,
        ..
    } = run;
    Ok(InterfaceOutcome {
        ordinal,
        name: state.name.clone(),
        class,
        decision,
        applications,
        events,
        error: apply_error,
    })
}

struct InterfaceRun<'a> {
    netops: &'a mut dyn NetOps,
    options: &'a ReconcileOptions,
    state: &'a InterfaceState,
    observed: Option<Ipv4Record>,
    change_occurred: &'a mut bool,
    events: Vec<Event>,
    applications: u32,
    apply_error: Option<String>,
}

impl InterfaceRun<'_> {
    fn reconcile_dhcp(
        &mut self,
        production: Option<Ipv4Record>,
        dr: Option<Ipv4Record>,
        previous: Option<Ipv4Record>,
    ) -> Result<Decision, EngineError> {
        let Some(dr) = dr else {
            // No DR target is known for this interface.
            let production = self.require(RecordKind::Production, production)?;
            self.info("dhcp with no dr record; applying production unconditionally");
            return Ok(self.apply_once(Decision::ApplyProduction, &production));
        };

        let Some(previous) = previous else {
            let production = self.require(RecordKind::Production, production)?;
            self.info("dhcp with no previous record; applying production as first-time baseline");
            return Ok(self.apply_once(Decision::ApplyProduction, &production));
        };

        let production = self.require(RecordKind::Production, production)?;
        if previous.address == production.address {
            self.info("previously on production; failing over to dr");
            Ok(self.run_chain(
                vec![
                    (Decision::ApplyDr, dr),
                    (Decision::ApplyProduction, production),
                ],
                true,
            ))
        } else if previous.address == dr.address {
            self.info("previously on dr; failing back to production");
            Ok(self.run_chain(
                vec![
                    (Decision::ApplyProduction, production),
                    (Decision::ApplyDr, dr),
                ],
                true,
            ))
        } else {
            self.info("previous state unrecognized; trying dr first");
            Ok(self.run_chain(
                vec![
                    (Decision::ApplyDr, dr),
                    (Decision::ApplyProduction, production),
                ],
                false,
            ))
        }
    }

    /// Rows for a static address matching one of the stored records.
    /// `current` names the matching side.
    fn reconcile_matching(
        &mut self,
        current: Decision,
        production: Option<Ipv4Record>,
        dr: Option<Ipv4Record>,
    ) -> Result<Decision, EngineError> {
        let gateway = self.state.gateway;
        if self.probe(gateway) {
            self.info("current configuration validated; no change needed");
            return Ok(Decision::NoChange);
        }

        let Some(dr) = dr else {
            self.warn("gateway validation failed but no dr record exists to fail over to");
            return Ok(Decision::NoChange);
        };
        let production = self.require(RecordKind::Production, production)?;

        let steps = if current == Decision::ApplyProduction {
            self.warn("production gateway validation failed; failing over to dr");
            vec![
                (Decision::ApplyDr, dr),
                (Decision::ApplyProduction, production),
            ]
        } else {
            self.warn("dr gateway validation failed; failing back to production");
            vec![
                (Decision::ApplyProduction, production),
                (Decision::ApplyDr, dr),
            ]
        };
        Ok(self.run_chain(steps, true))
    }

    /// Static address matching neither record, with at least one record on
    /// disk: the current configuration is not one of ours, so treat it like
    /// an unrecognized previous state.
    fn reconcile_unrecognized(
        &mut self,
        production: Option<Ipv4Record>,
        dr: Option<Ipv4Record>,
    ) -> Result<Decision, EngineError> {
        match dr {
            Some(dr) => {
                let production = self.require(RecordKind::Production, production)?;
                self.info("current configuration unrecognized; trying dr first");
                Ok(self.run_chain(
                    vec![
                        (Decision::ApplyDr, dr),
                        (Decision::ApplyProduction, production),
                    ],
                    false,
                ))
            }
            None => {
                let production = self.require(RecordKind::Production, production)?;
                self.info("current configuration unrecognized; applying production");
                Ok(self.apply_once(Decision::ApplyProduction, &production))
            }
        }
    }

    /// Apply each step in turn until one validates. Each step is apply,
    /// settle, probe; at most two alternates are tried before either
    /// restoring the observed configuration or letting the last step stand.
    fn run_chain(&mut self, steps: Vec<(Decision, Ipv4Record)>, restore_on_exhaust: bool) -> Decision {
        let mut last = Decision::NoChange;
        for (decision, record) in steps {
            match self.apply(decision, &record) {
                ApplyStep::Failed => return decision,
                ApplyStep::Skipped => continue,
                ApplyStep::Applied => {}
            }
            last = decision;
            self.netops.settle(self.options.settle);
            if self.validate_applied(&record) {
                self.info(format!("{} validated", decision.as_str()));
                return decision;
            }
            self.warn(format!("{} did not validate", decision.as_str()));
        }

        if last == Decision::NoChange {
            // Every step was deferred; nothing to roll back.
            return Decision::NoChange;
        }
        if !restore_on_exhaust {
            self.warn(format!(
                "no alternative validated; leaving {} in place",
                last.as_str()
            ));
            return last;
        }
        match self.observed.clone() {
            Some(record) => {
                self.warn("no alternative validated; restoring last observed configuration");
                self.apply(Decision::Restore, &record);
                Decision::Restore
            }
            None => {
                self.warn(
                    "no alternative validated and observed configuration is incomplete; cannot restore",
                );
                last
            }
        }
    }

    /// Unconditional single application; the probe outcome is reported but
    /// does not change the decision.
    fn apply_once(&mut self, decision: Decision, record: &Ipv4Record) -> Decision {
        match self.apply(decision, record) {
            ApplyStep::Applied => {
                self.netops.settle(self.options.settle);
                if self.validate_applied(record) {
                    self.info(format!("{} validated", decision.as_str()));
                } else {
                    self.warn(format!("{} did not validate", decision.as_str()));
                }
                decision
            }
            ApplyStep::Skipped => Decision::NoChange,
            ApplyStep::Failed => decision,
        }
    }

    fn apply(&mut self, decision: Decision, record: &Ipv4Record) -> ApplyStep {
        // A record without a gateway only ever moves in lockstep with a
        // defining change elsewhere in the run.
        if record.gateway.is_none() && !*self.change_occurred {
            self.warn(format!(
                "{} has no gateway and no defining interface has changed; deferring",
                decision.as_str()
            ));
            return ApplyStep::Skipped;
        }
        self.info(format!("applying {} ({record})", decision.as_str()));
        match self.netops.apply(self.state, record) {
            Ok(()) => {
                self.applications += 1;
                if record.gateway.is_some() {
                    *self.change_occurred = true;
                }
                ApplyStep::Applied
            }
            Err(err) => {
                let message = err.to_string();
                self.event(Severity::Error, message.clone());
                self.apply_error = Some(message);
                ApplyStep::Failed
            }
        }
    }

    /// Validate a configuration that was just applied. A record with no
    /// gateway has nothing to probe; the move itself was already gated on a
    /// defining change, so it counts as validated.
    fn validate_applied(&mut self, record: &Ipv4Record) -> bool {
        match record.gateway {
            Some(gateway) => {
                let reachable = self.netops.probe_gateway(gateway);
                self.info(format!("gateway {gateway} reachable={reachable}"));
                reachable
            }
            None => {
                self.info("applied configuration has no gateway; nothing to validate");
                true
            }
        }
    }

    /// Validate the configuration an interface is currently running.
    fn probe(&mut self, gateway: Option<Ipv4Addr>) -> bool {
        match gateway {
            Some(gateway) => {
                let reachable = self.netops.probe_gateway(gateway);
                self.info(format!("gateway {gateway} reachable={reachable}"));
                reachable
            }
            None => {
                let unchanged = !*self.change_occurred;
                self.info(format!(
                    "no gateway to probe; change elsewhere in run={}",
                    !unchanged
                ));
                unchanged
            }
        }
    }

    fn require(
        &self,
        kind: RecordKind,
        record: Option<Ipv4Record>,
    ) -> Result<Ipv4Record, EngineError> {
        record.ok_or(EngineError::MissingRequiredRecord {
            kind,
            ordinal: self.state.ordinal,
        })
    }

    fn info(&mut self, message: impl Into<String>) {
        self.event(Severity::Info, message.into());
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.event(Severity::Warn, message.into());
    }

    fn event(&mut self, severity: Severity, message: String) {
        self.events.push(Event { severity, message });
    }
}

enum ApplyStep {
    Applied,
    Skipped,
    Failed,
}
