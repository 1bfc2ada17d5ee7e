//! `combined`: several counters on a board, reset through one command.

use std::rc::Rc;

use serde::Serialize;
use tabled::Tabled;

use screenplay_config::Config;
use screenplay_core::{CounterBoard, CounterScreen, CounterStrategy, Lifecycle, Screen};

use super::counter::outcome_name;
use crate::cli::CombinedArgs;
use crate::error::CliError;
use crate::output::{self, Presentation};

#[derive(Debug, Serialize)]
struct Invocation {
    round: u32,
    could_execute: bool,
    outcome: &'static str,
    deltas: Vec<i64>,
}

#[derive(Debug, Serialize)]
struct CounterRecord {
    counter: String,
    before: i64,
    after: i64,
    can_decrement: bool,
}

#[derive(Debug, Serialize)]
struct BoardReport {
    strategy: CounterStrategy,
    invocations: Vec<Invocation>,
    counters: Vec<CounterRecord>,
    reset_total: i64,
    grand_total: i64,
}

#[derive(Tabled)]
struct CounterRow {
    #[tabled(rename = "Counter")]
    counter: String,
    #[tabled(rename = "Before")]
    before: i64,
    #[tabled(rename = "After")]
    after: i64,
    #[tabled(rename = "Can Decrement")]
    can_decrement: bool,
}

pub fn handle(args: &CombinedArgs, cfg: &Config, p: &Presentation) -> Result<(), CliError> {
    let strategy = args.strategy.unwrap_or(cfg.defaults.strategy);
    let counters: Vec<Rc<CounterScreen>> = args
        .seeds
        .iter()
        .enumerate()
        .map(|(i, seed)| Rc::new(CounterScreen::new(format!("counter-{}", i + 1), *seed, strategy)))
        .collect();

    let board = CounterBoard::new("board", counters)?;
    board.conductor().activate()?;
    let before: Vec<i64> = board.counters().iter().map(|c| c.value()).collect();

    let reset_all = board.reset_all();
    let invocations = (1..=args.times)
        .map(|round| {
            let could_execute = reset_all.can_execute().get();
            let outcome = reset_all.invoke();
            Invocation {
                round,
                could_execute,
                outcome: outcome_name(&outcome),
                deltas: outcome.executed().unwrap_or_default(),
            }
        })
        .collect::<Vec<_>>();

    let counters = board
        .counters()
        .iter()
        .zip(before)
        .map(|(c, before)| CounterRecord {
            counter: c.core().name().to_owned(),
            before,
            after: c.value(),
            can_decrement: c.can_decrement(),
        })
        .collect();

    let report = BoardReport {
        strategy,
        invocations,
        counters,
        reset_total: board.reset_total().get(),
        grand_total: board.grand_total(),
    };
    board.conductor().dispose();

    let rows: Vec<CounterRow> = report
        .counters
        .iter()
        .map(|c| CounterRow {
            counter: c.counter.clone(),
            before: c.before,
            after: c.after,
            can_decrement: c.can_decrement,
        })
        .collect();
    let rounds = report
        .invocations
        .iter()
        .map(|i| output::status(i.outcome, p.color))
        .collect::<Vec<_>>()
        .join(", ");
    let summary = format!("reset_all: {rounds}\nReset total: {}", report.reset_total);

    let out = output::render_report(p, &report, &rows, &summary)?;
    output::print_output(&out, p.quiet);
    Ok(())
}
