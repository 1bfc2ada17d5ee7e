//! `dialog`: show a prompt screen modally and answer it from the command line.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use screenplay_config::Config;
use screenplay_core::{
    CoreError, DialogHost, DialogPresenter, DialogRequest, DialogResponse, DialogResult,
    DialogSettings, LifecycleState, OptionSet, Scope, Screen, ScreenCore, StandardChoice,
};

use crate::cli::{DialogArgs, Preset};
use crate::error::CliError;
use crate::output::{self, Presentation};

// ── Prompt screen ────────────────────────────────────────────────────

struct PromptScreen {
    core: ScreenCore,
    shown: Cell<u32>,
}

impl Screen for PromptScreen {
    fn core(&self) -> &ScreenCore {
        &self.core
    }

    fn on_activate(&self, _scope: &Scope) -> Result<(), CoreError> {
        self.shown.set(self.shown.get() + 1);
        Ok(())
    }
}

// ── Scripted presenter ───────────────────────────────────────────────

/// Answers with a fixed response and remembers what it was asked to show.
struct Scripted {
    response: DialogResponse,
    seen_state: RefCell<Option<LifecycleState>>,
}

impl DialogPresenter for Scripted {
    fn present(&self, request: &DialogRequest<'_>) -> Result<DialogResponse, CoreError> {
        debug!(
            title = request.title.unwrap_or("-"),
            options = ?request.labels,
            "scripted presenter answering"
        );
        *self.seen_state.borrow_mut() = Some(request.screen.state());
        Ok(self.response)
    }
}

// ── Report ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct DialogReport {
    title: Option<String>,
    options: Vec<String>,
    response: String,
    result: &'static str,
    choice: Option<StandardChoice>,
    state_while_shown: Option<LifecycleState>,
    state_after: LifecycleState,
    times_shown: u32,
}

#[derive(Tabled)]
struct OptionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Option")]
    label: String,
    #[tabled(rename = "Picked")]
    picked: String,
}

// ── Handler ──────────────────────────────────────────────────────────

pub fn handle(args: &DialogArgs, cfg: &Config, p: &Presentation) -> Result<(), CliError> {
    let response = parse_response(&args.respond)?;
    let options = match args.preset {
        Preset::OkCancel => OptionSet::ok_cancel(),
        Preset::YesNo => OptionSet::yes_no(),
        Preset::YesNoCancel => OptionSet::yes_no_cancel(),
    };
    let mut settings = DialogSettings::from(&cfg.runtime_settings());
    settings.dismiss_as_cancel |= args.dismiss_as_cancel;
    if let Some(title) = &args.title {
        settings = settings.titled(title.clone());
    }

    let screen = Rc::new(PromptScreen {
        core: ScreenCore::new("prompt"),
        shown: Cell::new(0),
    });
    let host = DialogHost::new(Scripted {
        response,
        seen_state: RefCell::new(None),
    });
    let result = host.show(Rc::clone(&screen), &options, &settings)?;

    let choice = match &result {
        DialogResult::Chosen(choice) => Some(*choice),
        DialogResult::Dismissed => None,
    };
    let report = DialogReport {
        title: settings.title.clone(),
        options: options.labels().into_iter().map(str::to_owned).collect(),
        response: args.respond.clone(),
        result: if choice.is_some() { "chosen" } else { "dismissed" },
        choice,
        state_while_shown: *host.presenter().seen_state.borrow(),
        state_after: screen.core().state(),
        times_shown: screen.shown.get(),
    };

    let rows: Vec<OptionRow> = options
        .options()
        .iter()
        .enumerate()
        .map(|(index, option)| OptionRow {
            index,
            label: option.label.clone(),
            picked: if choice == Some(option.value) { "*".into() } else { String::new() },
        })
        .collect();
    let summary = match choice {
        Some(choice) => format!("Result: {} {choice}", output::status("chosen", p.color)),
        None => format!("Result: {}", output::status("dismissed", p.color)),
    };
    let out = output::render_report(p, &report, &rows, &summary)?;
    output::print_output(&out, p.quiet);
    Ok(())
}

fn parse_response(raw: &str) -> Result<DialogResponse, CliError> {
    if raw.eq_ignore_ascii_case("dismiss") {
        return Ok(DialogResponse::Dismiss);
    }
    raw.parse::<usize>()
        .map(DialogResponse::Choose)
        .map_err(|_| CliError::Validation {
            field: "respond".into(),
            reason: format!("expected an option index or 'dismiss', got '{raw}'"),
        })
}
