//! Shared helpers for command handlers.

use std::borrow::Cow;
use std::future::Future;
use std::time::Duration;

use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};

use despacho_core::{ListController, ListResource, PendingFetch, Resolution};

use crate::error::CliError;

/// Run `fut` behind a stderr spinner. Hidden with `--quiet` and when
/// stderr is not a terminal.
pub async fn with_spinner<F: Future>(
    message: impl Into<Cow<'static, str>>,
    quiet: bool,
    fut: F,
) -> F::Output {
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    };

    let output = fut.await;
    bar.finish_and_clear();
    output
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(CliError::prompt)
}

/// Prompt for free text; blank input is allowed.
pub fn ask(prompt: &str, initial: &str) -> Result<String, CliError> {
    Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()
        .map_err(CliError::prompt)
}

// ── Lists ───────────────────────────────────────────────────────────

/// Run one list fetch, turning a failed load into an error.
pub async fn run_fetch<R: ListResource>(
    controller: &ListController<R>,
    fetch: PendingFetch<R::Filters>,
    quiet: bool,
) -> Result<(), CliError> {
    let message = format!("Carregando {}...", R::NOUN);
    match with_spinner(message, quiet, controller.run(fetch)).await {
        Resolution::Failed => Err(CliError::OperationFailed {
            message: controller.snapshot().error.unwrap_or_else(R::load_error),
        }),
        Resolution::Applied | Resolution::Stale => Ok(()),
    }
}

/// Apply the draft filters, then move to `page`.
pub async fn fetch_page<R: ListResource>(
    controller: &ListController<R>,
    page: u32,
    quiet: bool,
) -> Result<(), CliError> {
    run_fetch(controller, controller.apply_filters(), quiet).await?;

    if page > 1 {
        let total = controller.snapshot().result.total_pages;
        let fetch = controller.set_page(page).ok_or_else(|| CliError::InvalidValue {
            field: "page".into(),
            reason: format!("must be between 1 and {}", total.max(1)),
        })?;
        run_fetch(controller, fetch, quiet).await?;
    }
    Ok(())
}
