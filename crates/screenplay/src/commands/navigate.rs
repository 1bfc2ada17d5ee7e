//! `navigate`: a one-active conductor over a small page registry.
//!
//! Pages are built on first visit and reused afterwards; `unknown` is
//! deliberately left out of the registry.

use std::cell::Cell;

use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use screenplay_config::Config;
use screenplay_core::{
    CoreError, KindRegistry, Lifecycle, LifecycleState, OneActive, Scope, Screen, ScreenCore,
    ScreenKind, ScreenRef, SwitchPolicy,
};

use crate::cli::{NavigateArgs, PageArg};
use crate::error::CliError;
use crate::output::{self, Presentation};

impl ScreenKind for PageArg {}

// ── Page screen ──────────────────────────────────────────────────────

struct PageScreen {
    core: ScreenCore,
    initializations: Cell<u32>,
}

impl PageScreen {
    fn build(name: &str) -> Result<ScreenRef, CoreError> {
        Ok(ScreenRef::new(Self {
            core: ScreenCore::new(name),
            initializations: Cell::new(0),
        }))
    }
}

impl Screen for PageScreen {
    fn core(&self) -> &ScreenCore {
        &self.core
    }

    fn on_initialize(&self, _scope: &Scope) -> Result<(), CoreError> {
        self.initializations.set(self.initializations.get() + 1);
        Ok(())
    }

    fn on_activate(&self, scope: &Scope) -> Result<(), CoreError> {
        let page = self.core.name().to_owned();
        debug!(page = %page, cycle = self.core.activations(), "page shown");
        scope.add(move || debug!(page = %page, "page hidden"));
        Ok(())
    }
}

// ── Report ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Visit {
    step: usize,
    action: String,
    active: Option<String>,
    members: Vec<MemberState>,
}

#[derive(Debug, Serialize)]
struct MemberState {
    page: String,
    state: LifecycleState,
}

#[derive(Debug, Serialize)]
struct Member {
    page: String,
    state: LifecycleState,
    initializations: u32,
}

#[derive(Debug, Serialize)]
struct NavigationReport {
    policy: SwitchPolicy,
    visits: Vec<Visit>,
    members: Vec<Member>,
}

#[derive(Tabled)]
struct VisitRow {
    #[tabled(rename = "#")]
    step: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Members")]
    members: String,
}

// ── Handler ──────────────────────────────────────────────────────────

pub fn handle(args: &NavigateArgs, cfg: &Config, p: &Presentation) -> Result<(), CliError> {
    let mut settings = cfg.runtime_settings();
    if let Some(policy) = args.policy {
        settings.switch_policy = policy;
    }

    let registry = KindRegistry::new("navigator")
        .with(PageArg::Dashboard, || PageScreen::build("dashboard"))
        .with(PageArg::Reports, || PageScreen::build("reports"))
        .with(PageArg::Settings, || PageScreen::build("settings"));
    let available = registry
        .kinds()
        .map(|k| format!("{k:?}").to_lowercase())
        .collect::<Vec<_>>()
        .join(", ");

    let nav = OneActive::with_settings("navigator", registry, &settings);
    let result = drive(&nav, args).map_err(|err| match err {
        CliError::UnknownKind { conductor, kind, .. } => CliError::UnknownKind {
            conductor,
            kind: kind.to_lowercase(),
            available: available.clone(),
        },
        other => other,
    });
    let report = result.map(|visits| NavigationReport {
        policy: settings.switch_policy,
        visits,
        members: nav.items().iter().map(member).collect(),
    });
    nav.dispose();
    let report = report?;

    let rows: Vec<VisitRow> = report
        .visits
        .iter()
        .map(|v| VisitRow {
            step: v.step,
            action: v.action.clone(),
            active: v.active.clone().unwrap_or_else(|| "-".into()),
            members: v
                .members
                .iter()
                .map(|m| format!("{}:{}", m.page, output::status(&m.state.to_string(), p.color)))
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();
    let summary = format!(
        "{} page(s) built under {}",
        report.members.len(),
        report.policy
    );
    let out = output::render_report(p, &report, &rows, &summary)?;
    output::print_output(&out, p.quiet);
    Ok(())
}

fn drive(nav: &OneActive<PageArg>, args: &NavigateArgs) -> Result<Vec<Visit>, CliError> {
    nav.activate()?;
    let mut visits = Vec::with_capacity(args.pages.len() + 1);

    for (i, page) in args.pages.iter().enumerate() {
        let shown = nav.activate_kind(*page)?;
        visits.push(snapshot(nav, i + 1, format!("visit {}", shown.name())));
    }

    if args.close_last {
        if let Some(active) = nav.active_item() {
            nav.close_item(&active)?;
            visits.push(snapshot(nav, visits.len() + 1, format!("close {}", active.name())));
        }
    }
    Ok(visits)
}

fn snapshot(nav: &OneActive<PageArg>, step: usize, action: String) -> Visit {
    Visit {
        step,
        action,
        active: nav.active_item().map(|s| s.name().to_owned()),
        members: nav
            .items()
            .iter()
            .map(|s| MemberState {
                page: s.name().to_owned(),
                state: s.state(),
            })
            .collect(),
    }
}

fn member(item: &ScreenRef) -> Member {
    Member {
        page: item.name().to_owned(),
        state: item.state(),
        initializations: item
            .downcast::<PageScreen>()
            .map_or(0, |page| page.initializations.get()),
    }
}
