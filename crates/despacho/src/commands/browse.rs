//! Interactive list browser.
//!
//! A prompt loop over one `ListController`: edit the draft filters, apply
//! or clear them, page with Anterior/Próximo and open a row's detail.

use dialoguer::Select;

use despacho_core::{
    Atendido, Atendimentos, Chamados, ListController, ListResource, ListState, Phase,
    Route,
};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

use super::atendimentos::{self, AtendimentoRow};
use super::chamados::{self, ChamadoRow};
use super::{Ctx, util};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Search,
    Atendido,
    Apply,
    Clear,
    Previous,
    Next,
    Open,
    Refresh,
    Quit,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Self::Search => "Pesquisar",
            Self::Atendido => "Atendido",
            Self::Apply => "Filtrar",
            Self::Clear => "Limpar",
            Self::Previous => "Anterior",
            Self::Next => "Próximo",
            Self::Open => "Abrir",
            Self::Refresh => "Atualizar",
            Self::Quit => "Sair",
        }
    }
}

/// What differs between the chamados and atendimentos screens.
trait Screen: ListResource + Sized {
    const TITLE: &'static str;
    const FILTER_ACTIONS: &'static [Action];

    fn id(item: &Self::Item) -> i64;
    fn table(items: &[Self::Item], color: bool) -> String;
    fn describe(filters: &Self::Filters) -> String;
    fn edit(controller: &ListController<Self>, action: Action) -> Result<(), CliError>;
    async fn open(ctx: &mut Ctx<'_>, id: i64) -> Result<(), CliError>;
}

impl Screen for Chamados {
    const TITLE: &'static str = "Chamados";
    const FILTER_ACTIONS: &'static [Action] = &[Action::Search, Action::Atendido];

    fn id(item: &Self::Item) -> i64 {
        item.id
    }

    fn table(items: &[Self::Item], color: bool) -> String {
        output::render_list(
            OutputFormat::Table,
            items,
            |c| ChamadoRow::new(c, color),
            |c| c.id.to_string(),
        )
    }

    fn describe(filters: &Self::Filters) -> String {
        format!("pesquisa='{}' atendido={}", filters.pesquisa, filters.atendido)
    }

    fn edit(controller: &ListController<Self>, action: Action) -> Result<(), CliError> {
        match action {
            Action::Search => {
                let current = controller.snapshot().draft.pesquisa;
                let text = util::ask("Pesquisa", &current)?;
                controller.set_draft_filter(|f| f.pesquisa = text);
            }
            Action::Atendido => {
                const OPTIONS: [Atendido; 3] =
                    [Atendido::Todos, Atendido::Atendidos, Atendido::Pendentes];
                let current = controller.snapshot().draft.atendido;
                let labels: Vec<String> = OPTIONS.iter().map(ToString::to_string).collect();
                let index = Select::new()
                    .with_prompt("Atendido")
                    .items(&labels)
                    .default(OPTIONS.iter().position(|a| *a == current).unwrap_or(0))
                    .interact()
                    .map_err(CliError::prompt)?;
                if let Some(&choice) = OPTIONS.get(index) {
                    controller.set_draft_filter(|f| f.atendido = choice);
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn open(ctx: &mut Ctx<'_>, id: i64) -> Result<(), CliError> {
        ctx.enter(Route::Chamado(id))?;
        let chamado = ctx.console.chamado(id).await?.ok_or_else(|| CliError::NotFound {
            resource_type: "Chamado".into(),
            identifier: id.to_string(),
            list_command: "chamados list".into(),
        })?;
        ctx.print(&chamados::detail(&chamado, ctx.color));
        Ok(())
    }
}

impl Screen for Atendimentos {
    const TITLE: &'static str = "Atendimentos";
    const FILTER_ACTIONS: &'static [Action] = &[Action::Search];

    fn id(item: &Self::Item) -> i64 {
        item.id
    }

    fn table(items: &[Self::Item], color: bool) -> String {
        output::render_list(
            OutputFormat::Table,
            items,
            |a| AtendimentoRow::new(a, color),
            |a| a.id.to_string(),
        )
    }

    fn describe(filters: &Self::Filters) -> String {
        format!("pesquisa='{}'", filters.pesquisa)
    }

    fn edit(controller: &ListController<Self>, action: Action) -> Result<(), CliError> {
        if action == Action::Search {
            let current = controller.snapshot().draft.pesquisa;
            let text = util::ask("Pesquisa", &current)?;
            controller.set_draft_filter(|f| f.pesquisa = text);
        }
        Ok(())
    }

    async fn open(ctx: &mut Ctx<'_>, id: i64) -> Result<(), CliError> {
        ctx.enter(Route::Atendimento(id))?;
        let view = ctx.console.atendimento(id);
        let entity = atendimentos::load(ctx, &view).await?;
        ctx.print(&atendimentos::detail(&entity, ctx.color));
        if view.snapshot().can_finalize() {
            atendimentos::finalize(ctx, &view).await?;
        }
        Ok(())
    }
}

// ── Entry points ────────────────────────────────────────────────────

pub async fn chamados(ctx: &mut Ctx<'_>) -> Result<(), CliError> {
    let controller = ctx.console.chamados();
    browse(ctx, &controller).await
}

pub async fn atendimentos(ctx: &mut Ctx<'_>) -> Result<(), CliError> {
    let controller = ctx.console.atendimentos();
    browse(ctx, &controller).await
}

// ── Loop ────────────────────────────────────────────────────────────

async fn browse<R: Screen>(ctx: &mut Ctx<'_>, controller: &ListController<R>) -> Result<(), CliError> {
    let quiet = ctx.quiet();
    report(util::run_fetch(controller, controller.mount(), quiet).await);

    loop {
        let state = controller.snapshot();
        render::<R>(&state, ctx.color);

        let actions = available::<R>(&state);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let picked = Select::new()
            .with_prompt(R::TITLE)
            .items(&labels)
            .default(0)
            .interact_opt()
            .map_err(CliError::prompt)?;
        let Some(action) = picked.and_then(|i| actions.get(i).copied()) else {
            return Ok(());
        };

        let fetch = match action {
            Action::Quit => return Ok(()),
            Action::Apply => Some(controller.apply_filters()),
            Action::Clear => Some(controller.clear_filters()),
            Action::Previous => controller.previous_page(),
            Action::Next => controller.next_page(),
            Action::Refresh => Some(controller.refresh()),
            Action::Open => {
                if let Some(id) = pick_row::<R>(&state)? {
                    report(R::open(ctx, id).await);
                }
                None
            }
            Action::Search | Action::Atendido => {
                R::edit(controller, action)?;
                None
            }
        };

        if let Some(fetch) = fetch {
            report(util::run_fetch(controller, fetch, quiet).await);
        }
        ctx.flush_notices();
    }
}

fn available<R: Screen>(state: &ListState<R::Filters, R::Item>) -> Vec<Action> {
    let pager = state.pagination();
    let mut actions: Vec<Action> = R::FILTER_ACTIONS.to_vec();
    actions.extend([Action::Apply, Action::Clear]);
    if pager.has_previous() {
        actions.push(Action::Previous);
    }
    if pager.has_next() {
        actions.push(Action::Next);
    }
    if !state.result.items.is_empty() {
        actions.push(Action::Open);
    }
    actions.extend([Action::Refresh, Action::Quit]);
    actions
}

fn render<R: Screen>(state: &ListState<R::Filters, R::Item>, color: bool) {
    eprintln!();
    if state.phase == Phase::Failed {
        eprintln!("{}", state.error.as_deref().unwrap_or_default());
    } else {
        println!("{}", R::table(&state.result.items, color));
    }
    let pager = state.pagination();
    if pager.is_visible() {
        eprintln!("{}", pager.label());
    }
    eprintln!("Filtros: {}", R::describe(&state.active));
    if state.draft != state.active {
        eprintln!("Rascunho: {} (Filtrar para aplicar)", R::describe(&state.draft));
    }
}

fn pick_row<R: Screen>(state: &ListState<R::Filters, R::Item>) -> Result<Option<i64>, CliError> {
    let ids: Vec<i64> = state.result.items.iter().map(R::id).collect();
    let labels: Vec<String> = ids.iter().map(|id| format!("#{id}")).collect();
    let picked = Select::new()
        .with_prompt("Abrir")
        .items(&labels)
        .default(0)
        .interact_opt()
        .map_err(CliError::prompt)?;
    Ok(picked.and_then(|i| ids.get(i).copied()))
}

/// Show a failed step without leaving the loop.
fn report(result: Result<(), CliError>) {
    if let Err(err) = result {
        eprintln!("{:?}", miette::Report::new(err));
    }
}
