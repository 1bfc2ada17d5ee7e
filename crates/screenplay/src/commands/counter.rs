//! `counter`: one counter screen driven through a list of steps.

use serde::Serialize;
use tabled::Tabled;

use screenplay_config::Config;
use screenplay_core::{
    Command as RuntimeCommand, CounterScreen, CounterStrategy, Lifecycle, Outcome, Screen,
};

use crate::cli::{CounterArgs, CounterStep};
use crate::error::CliError;
use crate::output::{self, Presentation};

// ── Report ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct StepRecord {
    step: usize,
    action: &'static str,
    outcome: &'static str,
    delta: Option<i64>,
    total: i64,
    can_decrement: bool,
}

#[derive(Debug, Serialize)]
struct CounterReport {
    counter: String,
    strategy: CounterStrategy,
    seed: i64,
    steps: Vec<StepRecord>,
    total: i64,
    activations: u64,
}

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "#")]
    step: usize,
    #[tabled(rename = "Action")]
    action: &'static str,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Delta")]
    delta: String,
    #[tabled(rename = "Total")]
    total: i64,
    #[tabled(rename = "Can Decrement")]
    can_decrement: bool,
}

fn to_row(r: &StepRecord, color: bool) -> StepRow {
    StepRow {
        step: r.step,
        action: r.action,
        outcome: output::status(r.outcome, color),
        delta: r.delta.map_or_else(|| "-".into(), |d| format!("{d:+}")),
        total: r.total,
        can_decrement: r.can_decrement,
    }
}

// ── Handler ──────────────────────────────────────────────────────────

pub fn handle(args: &CounterArgs, cfg: &Config, p: &Presentation) -> Result<(), CliError> {
    let strategy = args.strategy.unwrap_or(cfg.defaults.strategy);
    let counter = CounterScreen::new("counter", args.seed, strategy);
    counter.activate()?;

    let mut steps = Vec::with_capacity(args.steps.len());
    for (i, step) in args.steps.iter().enumerate() {
        let outcome = match step {
            CounterStep::Increment => Some(wired(counter.increment(), &counter)?.invoke()),
            CounterStep::Decrement => Some(wired(counter.decrement(), &counter)?.invoke()),
            CounterStep::Reset => Some(wired(counter.reset(), &counter)?.invoke()),
            CounterStep::Cycle => {
                counter.deactivate(false);
                counter.activate()?;
                None
            }
        };
        if let Some(Outcome::Faulted(err)) = &outcome {
            tracing::warn!(step = i + 1, error = %err, "counter command faulted");
        }
        steps.push(StepRecord {
            step: i + 1,
            action: action_name(*step),
            outcome: outcome.as_ref().map_or("cycled", outcome_name),
            delta: outcome.and_then(Outcome::executed),
            total: counter.value(),
            can_decrement: counter.can_decrement(),
        });
    }

    let report = CounterReport {
        counter: counter.core().name().to_owned(),
        strategy,
        seed: args.seed,
        total: counter.value(),
        activations: counter.core().activations(),
        steps,
    };
    counter.dispose();

    let rows: Vec<StepRow> = report.steps.iter().map(|r| to_row(r, p.color)).collect();
    let summary = format!(
        "Total: {} ({strategy} wiring, {} activation(s))",
        report.total, report.activations
    );
    let out = output::render_report(p, &report, &rows, &summary)?;
    output::print_output(&out, p.quiet);
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Commands exist only once the counter has been initialized.
fn wired<'a>(
    command: Option<&'a RuntimeCommand<i64>>,
    counter: &CounterScreen,
) -> Result<&'a RuntimeCommand<i64>, CliError> {
    command.ok_or_else(|| CliError::Operation {
        message: format!("counter '{}' has no commands yet", counter.core().name()),
    })
}

fn action_name(step: CounterStep) -> &'static str {
    match step {
        CounterStep::Increment => "increment",
        CounterStep::Decrement => "decrement",
        CounterStep::Reset => "reset",
        CounterStep::Cycle => "cycle",
    }
}

pub(crate) fn outcome_name<O>(outcome: &Outcome<O>) -> &'static str {
    match outcome {
        Outcome::Executed(_) => "executed",
        Outcome::Refused => "refused",
        Outcome::Faulted(_) => "faulted",
    }
}
