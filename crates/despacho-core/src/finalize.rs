// ── Atendimento detail and finalization ──
//
// The detail screen loads one atendimento and offers a single action:
// finalize it. The server's finalize endpoint returns nothing useful, so
// success is confirmed by re-fetching the detail. A success toast shows
// for a fixed period; its timer is cancelled when the view goes away.

use std::sync::Arc;
use std::time::Duration;

use despacho_api::models::AtendimentoDetail;
use despacho_api::{Gateway, Probe};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

/// How long the "finalized" toast stays up.
pub const TOAST_DURATION: Duration = Duration::from_millis(3000);

pub const LOAD_ERROR: &str = "Não foi possível carregar os detalhes do atendimento.";
pub const FINALIZE_ERROR: &str = "Não foi possível finalizar o atendimento.";
pub const FINALIZED_TOAST: &str = "Atendimento finalizado com sucesso!";

/// Status labels after which finalizing makes no sense.
const TERMINAL_STATUSES: [&str; 3] = ["Finalizado", "Aguardando documentação", "Rejeitado"];

/// Whether the finalize action is offered for this atendimento.
pub fn can_finalize(detail: &AtendimentoDetail) -> bool {
    let label = detail.status_label().trim();
    !TERMINAL_STATUSES
        .iter()
        .any(|terminal| terminal.to_lowercase() == label.to_lowercase())
}

/// Finalize action state of one detail view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizeState {
    /// A request is in flight; the action is disabled.
    pub in_flight: bool,
    pub last_error: Option<String>,
    pub toast_visible: bool,
    toast_generation: u64,
}

/// Observable state of the detail screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailState {
    /// `None` before the first load, or when the server had no such id.
    pub entity: Option<AtendimentoDetail>,
    pub loading: bool,
    pub load_error: Option<String>,
    pub finalize: FinalizeState,
}

impl DetailState {
    /// The finalize button is shown and enabled.
    pub fn can_finalize(&self) -> bool {
        !self.finalize.in_flight && self.entity.as_ref().is_some_and(can_finalize)
    }
}

/// Result of [`AtendimentoView::finalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeOutcome {
    Finalized,
    /// Already in flight, not loaded, or status forbids it. No request sent.
    Skipped,
    Failed,
}

/// Controller for `/atendimentos/{id}`.
pub struct AtendimentoView {
    id: i64,
    gateway: Arc<Gateway>,
    state: Arc<watch::Sender<DetailState>>,
    cancel: CancellationToken,
    toast_duration: Duration,
}

impl AtendimentoView {
    pub fn new(gateway: Arc<Gateway>, id: i64) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self {
            id,
            gateway,
            state: Arc::new(state),
            cancel: CancellationToken::new(),
            toast_duration: TOAST_DURATION,
        }
    }

    pub fn with_toast_duration(mut self, duration: Duration) -> Self {
        self.toast_duration = duration;
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn snapshot(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    /// Fetch the atendimento. A missing entity is not an error: the
    /// screen shows "not found" when `entity` stays `None`.
    pub async fn load(&self) {
        self.state.send_modify(|s| {
            s.loading = true;
            s.load_error = None;
        });

        let result = self.gateway.atendimento(self.id).await;
        if let Err(e) = &result {
            error!(atendimento_id = self.id, error = %e, "atendimento detail fetch failed");
        }

        self.state.send_modify(|s| {
            s.loading = false;
            match result {
                Ok(Probe::Found(entity)) => s.entity = Some(entity),
                Ok(Probe::Empty) => {
                    debug!(atendimento_id = self.id, "atendimento not found");
                    s.entity = None;
                }
                Err(_) => s.load_error = Some(LOAD_ERROR.into()),
            }
        });
    }

    /// Finalize the atendimento.
    ///
    /// At most one request is in flight per view. Success requires the
    /// follow-up detail fetch to return the entity; the entity is replaced
    /// and the toast shown. On failure the entity is left untouched.
    pub async fn finalize(&self) -> FinalizeOutcome {
        let started = self.state.send_if_modified(|s| {
            if !s.can_finalize() {
                return false;
            }
            s.finalize.in_flight = true;
            s.finalize.last_error = None;
            true
        });
        if !started {
            debug!(atendimento_id = self.id, "finalize skipped");
            return FinalizeOutcome::Skipped;
        }

        let confirmed = match self.gateway.finalize_atendimento(self.id).await {
            Ok(()) => self.gateway.atendimento(self.id).await,
            Err(e) => Err(e),
        };

        match confirmed {
            Ok(Probe::Found(entity)) => {
                let mut generation = 0;
                self.state.send_modify(|s| {
                    s.entity = Some(entity);
                    s.finalize.in_flight = false;
                    s.finalize.toast_visible = true;
                    s.finalize.toast_generation += 1;
                    generation = s.finalize.toast_generation;
                });
                info!(atendimento_id = self.id, "atendimento finalized");
                self.schedule_toast_dismissal(generation);
                FinalizeOutcome::Finalized
            }
            Ok(Probe::Empty) => {
                error!(
                    atendimento_id = self.id,
                    "finalize not confirmed: detail re-fetch came back empty"
                );
                self.fail_finalize();
                FinalizeOutcome::Failed
            }
            Err(e) => {
                error!(atendimento_id = self.id, error = %e, "finalize failed");
                self.fail_finalize();
                FinalizeOutcome::Failed
            }
        }
    }

    /// Stop pending timers. Called on drop as well.
    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    fn fail_finalize(&self) {
        self.state.send_modify(|s| {
            s.finalize.in_flight = false;
            s.finalize.last_error = Some(FINALIZE_ERROR.into());
        });
    }

    fn schedule_toast_dismissal(&self, generation: u64) {
        if self.cancel.is_cancelled() {
            return;
        }
        let state = Arc::clone(&self.state);
        let cancel = self.cancel.clone();
        let duration = self.toast_duration;

        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => trace!("toast timer cancelled"),
                () = tokio::time::sleep(duration) => {
                    // A later toast owns the flag if the generation moved on.
                    state.send_if_modified(|s| {
                        let toast = &mut s.finalize;
                        if toast.toast_generation != generation || !toast.toast_visible {
                            return false;
                        }
                        toast.toast_visible = false;
                        true
                    });
                }
            }
        });
    }
}

impl Drop for AtendimentoView {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use despacho_api::models::Status;

    use super::*;

    fn with_status(label: &str) -> AtendimentoDetail {
        let mut detail: AtendimentoDetail =
            serde_json::from_value(serde_json::json!({ "id": 1 })).unwrap();
        detail.status = Some(Status {
            value: None,
            label: label.into(),
            kind: None,
        });
        detail
    }

    #[test]
    fn terminal_statuses_forbid_finalize() {
        assert!(!can_finalize(&with_status("Finalizado")));
        assert!(!can_finalize(&with_status("Rejeitado")));
        assert!(!can_finalize(&with_status("Aguardando Documentação")));
        assert!(can_finalize(&with_status("Em andamento")));
        assert!(can_finalize(&with_status("")));
    }

    #[test]
    fn in_flight_disables_action() {
        let state = DetailState {
            entity: Some(with_status("Em andamento")),
            finalize: FinalizeState {
                in_flight: true,
                ..FinalizeState::default()
            },
            ..DetailState::default()
        };
        assert!(!state.can_finalize());
        assert!(!DetailState::default().can_finalize());
    }
}
