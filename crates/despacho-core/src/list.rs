// ── Paginated list controller ──
//
// One controller drives both the chamados and the atendimentos tables.
// State lives in a `watch` channel. Transitions are synchronous and hand
// back a `PendingFetch` ticket; `run` performs the request and applies
// the result only if no newer fetch was issued in the meantime, so a
// slow response can never overwrite a faster, newer one.

use std::sync::Arc;

use despacho_api::models::{AtendimentoListItem, ChamadoListItem};
use despacho_api::resources::{ATENDIMENTO_LIST_PATH, CHAMADO_LIST_PATH};
use despacho_api::{Gateway, Page};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, error};

/// Rows per table page.
pub const PAGE_SIZE: u32 = 10;

// ── Resources ────────────────────────────────────────────────────────

/// A list endpoint plus the filters its table exposes.
pub trait ListResource: Send + Sync + 'static {
    type Item: DeserializeOwned + Clone + Send + Sync + 'static;
    type Filters: Clone + Default + PartialEq + Send + Sync + 'static;

    const PATH: &'static str;
    /// Plural noun used in the load-failure message.
    const NOUN: &'static str;

    /// Add filter fields to the list payload.
    fn extend_payload(filters: &Self::Filters, payload: &mut Map<String, Value>);

    fn load_error() -> String {
        format!("Não foi possível carregar a lista de {}.", Self::NOUN)
    }
}

/// Tri-state "atendido" filter of the chamados table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Atendido {
    #[default]
    Todos,
    Atendidos,
    Pendentes,
}

impl Atendido {
    fn as_flag(self) -> Option<bool> {
        match self {
            Self::Todos => None,
            Self::Atendidos => Some(true),
            Self::Pendentes => Some(false),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChamadoFilters {
    pub pesquisa: String,
    pub atendido: Atendido,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtendimentoFilters {
    pub pesquisa: String,
}

pub struct Chamados;

impl ListResource for Chamados {
    type Item = ChamadoListItem;
    type Filters = ChamadoFilters;

    const PATH: &'static str = CHAMADO_LIST_PATH;
    const NOUN: &'static str = "chamados";

    fn extend_payload(filters: &ChamadoFilters, payload: &mut Map<String, Value>) {
        insert_pesquisa(&filters.pesquisa, payload);
        if let Some(flag) = filters.atendido.as_flag() {
            payload.insert("atendido".into(), Value::Bool(flag));
        }
    }
}

pub struct Atendimentos;

impl ListResource for Atendimentos {
    type Item = AtendimentoListItem;
    type Filters = AtendimentoFilters;

    const PATH: &'static str = ATENDIMENTO_LIST_PATH;
    const NOUN: &'static str = "atendimentos";

    fn extend_payload(filters: &AtendimentoFilters, payload: &mut Map<String, Value>) {
        insert_pesquisa(&filters.pesquisa, payload);
        // Only active records are listed.
        payload.insert("ativo".into(), Value::Bool(true));
    }
}

fn insert_pesquisa(pesquisa: &str, payload: &mut Map<String, Value>) {
    let pesquisa = pesquisa.trim();
    if !pesquisa.is_empty() {
        payload.insert("pesquisa".into(), Value::String(pesquisa.to_owned()));
    }
}

// ── State ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Snapshot of a list screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<F, T> {
    /// Filters being edited, not yet applied.
    pub draft: F,
    /// Filters of the last issued fetch.
    pub active: F,
    /// 1-based page of the last issued fetch.
    pub page: u32,
    /// Rows and page count of the last applied response. A failed fetch
    /// empties the rows but keeps the page count.
    pub result: Page<T>,
    pub phase: Phase,
    pub error: Option<String>,
    generation: u64,
}

impl<F: Default, T> Default for ListState<F, T> {
    fn default() -> Self {
        Self {
            draft: F::default(),
            active: F::default(),
            page: 1,
            result: Page::default(),
            phase: Phase::Idle,
            error: None,
            generation: 0,
        }
    }
}

impl<F, T> ListState<F, T> {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            total_pages: self.result.total_pages,
        }
    }
}

/// Pager view model: "Página X de Y" with Anterior/Próximo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
}

impl Pagination {
    /// Pager is hidden for a single page.
    pub fn is_visible(self) -> bool {
        self.total_pages > 1
    }

    pub fn has_previous(self) -> bool {
        self.is_visible() && self.page > 1
    }

    pub fn has_next(self) -> bool {
        self.is_visible() && self.page < self.total_pages
    }

    pub fn label(self) -> String {
        format!("Página {} de {}", self.page, self.total_pages)
    }
}

/// Query sent by one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery<F> {
    pub page: u32,
    pub page_size: u32,
    pub filters: F,
}

/// Ticket for a fetch issued by a transition. Pass it to
/// [`ListController::run`].
#[derive(Debug, Clone)]
#[must_use = "a pending fetch does nothing until it is run"]
pub struct PendingFetch<F> {
    generation: u64,
    pub query: ListQuery<F>,
}

/// How a completed fetch was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Failed,
    /// A newer fetch was issued; this response was discarded.
    Stale,
}

// ── Controller ───────────────────────────────────────────────────────

pub type State<R> = ListState<<R as ListResource>::Filters, <R as ListResource>::Item>;

pub struct ListController<R: ListResource> {
    gateway: Arc<Gateway>,
    state: watch::Sender<State<R>>,
}

impl<R: ListResource> ListController<R> {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        let (state, _) = watch::channel(ListState::default());
        Self { gateway, state }
    }

    pub fn snapshot(&self) -> State<R> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<State<R>> {
        self.state.subscribe()
    }

    /// Build the JSON body for a query.
    pub fn payload(query: &ListQuery<R::Filters>) -> Value {
        let mut payload = Map::new();
        payload.insert("currentPage".into(), Value::from(query.page));
        payload.insert("pageSize".into(), Value::from(query.page_size));
        R::extend_payload(&query.filters, &mut payload);
        Value::Object(payload)
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// First load when the screen mounts.
    pub fn mount(&self) -> PendingFetch<R::Filters> {
        self.issue(|_| {})
    }

    /// Edit the draft filters. Never fetches.
    pub fn set_draft_filter(&self, patch: impl FnOnce(&mut R::Filters)) {
        self.state.send_modify(|s| patch(&mut s.draft));
    }

    /// Copy the draft into the active filters and reload from page 1.
    pub fn apply_filters(&self) -> PendingFetch<R::Filters> {
        self.issue(|s| {
            s.active = s.draft.clone();
            s.page = 1;
        })
    }

    /// Reset draft and active filters and reload from page 1.
    pub fn clear_filters(&self) -> PendingFetch<R::Filters> {
        self.issue(|s| {
            s.draft = R::Filters::default();
            s.active = R::Filters::default();
            s.page = 1;
        })
    }

    /// Move to page `n`. Out-of-range or same-page requests are ignored.
    pub fn set_page(&self, n: u32) -> Option<PendingFetch<R::Filters>> {
        let mut pending = None;
        self.state.send_if_modified(|s| {
            if n < 1 || n > s.result.total_pages || n == s.page {
                debug!(
                    requested = n,
                    page = s.page,
                    total = s.result.total_pages,
                    "page change ignored"
                );
                return false;
            }
            s.page = n;
            pending = Some(Self::begin(s));
            true
        });
        pending
    }

    pub fn next_page(&self) -> Option<PendingFetch<R::Filters>> {
        let page = self.state.borrow().page;
        self.set_page(page.saturating_add(1))
    }

    pub fn previous_page(&self) -> Option<PendingFetch<R::Filters>> {
        let page = self.state.borrow().page;
        self.set_page(page.saturating_sub(1))
    }

    /// Re-issue the active query unchanged.
    pub fn refresh(&self) -> PendingFetch<R::Filters> {
        self.issue(|_| {})
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Perform a fetch and apply its outcome if it is still the latest.
    pub async fn run(&self, fetch: PendingFetch<R::Filters>) -> Resolution {
        let payload = Self::payload(&fetch.query);
        let result = self.gateway.list_page::<R::Item>(R::PATH, &payload).await;

        if let Err(e) = &result {
            error!(endpoint = R::PATH, page = fetch.query.page, error = %e, "list fetch failed");
        }

        let mut resolution = Resolution::Stale;
        self.state.send_if_modified(|s| {
            if s.generation != fetch.generation {
                return false;
            }
            match result {
                Ok(page) => {
                    s.result = page;
                    s.phase = Phase::Ready;
                    s.error = None;
                    resolution = Resolution::Applied;
                }
                Err(_) => {
                    s.result.items.clear();
                    s.phase = Phase::Failed;
                    s.error = Some(R::load_error());
                    resolution = Resolution::Failed;
                }
            }
            true
        });

        if resolution == Resolution::Stale {
            debug!(endpoint = R::PATH, page = fetch.query.page, "discarding stale list response");
        }
        resolution
    }

    /// `mount` followed by `run`.
    pub async fn load(&self) -> Resolution {
        let fetch = self.mount();
        self.run(fetch).await
    }

    fn issue(&self, change: impl FnOnce(&mut State<R>)) -> PendingFetch<R::Filters> {
        let mut pending = None;
        self.state.send_modify(|s| {
            change(s);
            pending = Some(Self::begin(s));
        });
        pending.expect("send_modify always runs its closure")
    }

    fn begin(s: &mut State<R>) -> PendingFetch<R::Filters> {
        s.generation += 1;
        s.phase = Phase::Loading;
        PendingFetch {
            generation: s.generation,
            query: ListQuery {
                page: s.page,
                page_size: PAGE_SIZE,
                filters: s.active.clone(),
            },
        }
    }
}
