// ── Dialog host ──
//
// Seats a screen as the sole child of a transient `Single` conductor,
// hands it to a presenter and resolves to one option of a fixed set, or
// to "dismissed". The transient conductor and the dialog screen are
// disposed as soon as the dialog resolves.
//
// Option order is a convention only: first = affirmative, last = cancel.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info};

use crate::conductor::Single;
use crate::error::CoreError;
use crate::lifecycle::{Lifecycle, ScreenRef};
use crate::settings::RuntimeSettings;

/// Choices offered by the preset option sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum StandardChoice {
    Ok,
    Cancel,
    Yes,
    No,
}

/// A labeled option carrying the value it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogOption<T> {
    pub label: String,
    pub value: T,
}

/// Ordered, fixed set of dialog options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet<T> {
    options: Vec<DialogOption<T>>,
}

impl<T: Clone> OptionSet<T> {
    pub fn new<L: Into<String>>(options: impl IntoIterator<Item = (L, T)>) -> Self {
        Self {
            options: options
                .into_iter()
                .map(|(label, value)| DialogOption {
                    label: label.into(),
                    value,
                })
                .collect(),
        }
    }

    pub fn options(&self) -> &[DialogOption<T>] {
        &self.options
    }

    pub fn labels(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// First option, by convention the confirming one.
    pub fn affirmative(&self) -> Option<&DialogOption<T>> {
        self.options.first()
    }

    /// Last option, by convention the cancelling one.
    pub fn cancel(&self) -> Option<&DialogOption<T>> {
        self.options.last()
    }
}

impl OptionSet<StandardChoice> {
    pub fn ok_cancel() -> Self {
        Self::new([("OK", StandardChoice::Ok), ("Cancel", StandardChoice::Cancel)])
    }

    pub fn yes_no() -> Self {
        Self::new([("Yes", StandardChoice::Yes), ("No", StandardChoice::No)])
    }

    pub fn yes_no_cancel() -> Self {
        Self::new([
            ("Yes", StandardChoice::Yes),
            ("No", StandardChoice::No),
            ("Cancel", StandardChoice::Cancel),
        ])
    }
}

/// Per-dialog presentation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogSettings {
    pub title: Option<String>,
    /// Resolve a dismissal to the last option instead of `Dismissed`.
    pub dismiss_as_cancel: bool,
}

impl DialogSettings {
    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl From<&RuntimeSettings> for DialogSettings {
    fn from(settings: &RuntimeSettings) -> Self {
        Self {
            title: None,
            dismiss_as_cancel: settings.dismiss_as_cancel,
        }
    }
}

/// How a dialog resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResult<T> {
    Chosen(T),
    Dismissed,
}

/// What the presenter reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResponse {
    /// Index into the option set.
    Choose(usize),
    /// Closed without a choice.
    Dismiss,
}

/// What the presenter is asked to show.
#[derive(Debug)]
pub struct DialogRequest<'a> {
    pub title: Option<&'a str>,
    pub screen: &'a ScreenRef,
    pub labels: Vec<&'a str>,
}

/// Modal presentation, supplied by the embedding application.
pub trait DialogPresenter {
    /// Show the dialog and block until the user responds. The dialog
    /// screen is active for the whole call.
    fn present(&self, request: &DialogRequest<'_>) -> Result<DialogResponse, CoreError>;
}

/// Shows screens as modal dialogs through a [`DialogPresenter`].
#[derive(Debug)]
pub struct DialogHost<P> {
    presenter: P,
}

impl<P: DialogPresenter> DialogHost<P> {
    pub fn new(presenter: P) -> Self {
        Self { presenter }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Present `screen` with `options` and wait for the outcome.
    pub fn show<T: Clone>(
        &self,
        screen: impl Into<ScreenRef>,
        options: &OptionSet<T>,
        settings: &DialogSettings,
    ) -> Result<DialogResult<T>, CoreError> {
        let screen = screen.into();
        let host = Single::new(format!("dialog:{}", screen.name()));

        let response = host
            .activate_item(screen.clone())
            .and_then(|()| host.activate())
            .and_then(|()| {
                debug!(dialog = %screen.name(), options = options.len(), "presenting");
                self.presenter.present(&DialogRequest {
                    title: settings.title.as_deref(),
                    screen: &screen,
                    labels: options.labels(),
                })
            });
        host.dispose();
        if !screen.state().is_terminal() {
            // Activation failed before the host seated it.
            screen.dispose();
        }

        let result = resolve(response?, options, settings)?;
        info!(
            dialog = %screen.name(),
            dismissed = matches!(result, DialogResult::Dismissed),
            "dialog resolved"
        );
        Ok(result)
    }
}

fn resolve<T: Clone>(
    response: DialogResponse,
    options: &OptionSet<T>,
    settings: &DialogSettings,
) -> Result<DialogResult<T>, CoreError> {
    match response {
        DialogResponse::Choose(index) => options
            .options
            .get(index)
            .map(|o| DialogResult::Chosen(o.value.clone()))
            .ok_or(CoreError::InvalidChoice {
                index,
                available: options.len(),
            }),
        DialogResponse::Dismiss => match options.cancel() {
            Some(cancel) if settings.dismiss_as_cancel => Ok(DialogResult::Chosen(cancel.value.clone())),
            _ => Ok(DialogResult::Dismissed),
        },
    }
}
