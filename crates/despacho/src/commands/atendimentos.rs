//! Atendimento command handlers.

use dialoguer::Select;
use tabled::Tabled;

use despacho_core::finalize::FINALIZED_TOAST;
use despacho_core::models::{AtendimentoCreate, AtendimentoDetail, AtendimentoListItem};
use despacho_core::{AtendimentoView, FinalizeOutcome, Route};

use crate::cli::{AtendimentoCreateArgs, AtendimentosArgs, AtendimentosCommand};
use crate::error::CliError;
use crate::output::{self, format_date, format_datetime, or_placeholder, paint_status};

use super::lookup::{Choice, choices};
use super::{Ctx, browse, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct AtendimentoRow {
    #[tabled(rename = "ID Atend.")]
    id: i64,
    #[tabled(rename = "Pessoa Assistida")]
    pessoa: String,
    #[tabled(rename = "ID Chamado")]
    chamado: String,
    #[tabled(rename = "Viatura")]
    viatura: String,
    #[tabled(rename = "Data Início")]
    inicio: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl AtendimentoRow {
    pub fn new(a: &AtendimentoListItem, color: bool) -> Self {
        Self {
            id: a.id,
            pessoa: or_placeholder(a.pessoa_assistida.as_ref().map(|p| p.nome.as_str()), "N/A"),
            chamado: a
                .chamado
                .as_ref()
                .map_or_else(|| "N/A".into(), |c| c.id.to_string()),
            viatura: or_placeholder(a.viatura.as_ref().and_then(|v| v.placa.as_deref()), "N/A"),
            inicio: a.data_inicio.as_deref().map_or_else(|| "-".into(), format_date),
            status: paint_status(a.status.as_ref().map_or("", |s| s.label.as_str()), color),
        }
    }
}

pub fn detail(a: &AtendimentoDetail, color: bool) -> String {
    let status = if a.status_label().is_empty() {
        "N/A".into()
    } else {
        paint_status(a.status_label(), color)
    };
    let viatura = a.viatura.as_ref().map_or_else(
        || "N/A".into(),
        |v| {
            format!(
                "{} ({})",
                or_placeholder(v.placa.as_deref(), "N/A"),
                v.identificador.as_deref().unwrap_or_default()
            )
        },
    );

    let mut lines = vec![
        format!("Detalhes do Atendimento #{}", a.id),
        String::new(),
        format!("Status:         {status}"),
        format!(
            "Responsável:    {}",
            or_placeholder(a.responsavel.as_ref().map(|r| r.nome.as_str()), "N/A")
        ),
        format!(
            "Data de Início: {}",
            a.data_inicio.as_deref().map_or_else(|| "-".into(), format_datetime)
        ),
        format!(
            "Data de Fim:    {}",
            a.data_fim
                .as_deref()
                .map_or_else(|| "Em andamento".into(), format_datetime)
        ),
        format!("Viatura:        {viatura}"),
        format!(
            "Observação:     {}",
            or_placeholder(a.observacao.as_deref(), "Nenhuma")
        ),
    ];

    if let Some(ref pessoa) = a.pessoa_assistida {
        lines.push(String::new());
        lines.push("Pessoa Assistida".into());
        lines.push(format!("  Nome:     {}", pessoa.nome));
        lines.push(format!("  CPF:      {}", or_placeholder(pessoa.cpf.as_deref(), "-")));
        lines.push(format!(
            "  Telefone: {}",
            or_placeholder(pessoa.telefone.as_deref(), "-")
        ));
    }

    if let Some(ref chamado) = a.chamado {
        lines.push(String::new());
        lines.push(format!("Chamado #{}", chamado.id));
        lines.push(format!(
            "  Endereço: {}, {}",
            or_placeholder(chamado.rua.as_deref(), "-"),
            or_placeholder(chamado.bairro.as_deref(), "-")
        ));
    }

    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &mut Ctx<'_>, args: AtendimentosArgs) -> Result<(), CliError> {
    match args.command {
        AtendimentosCommand::List { list } => {
            ctx.enter(Route::Atendimentos)?;
            let controller = ctx.console.atendimentos();
            controller.set_draft_filter(|f| f.pesquisa = list.pesquisa.clone().unwrap_or_default());
            util::fetch_page(&controller, list.page, ctx.quiet()).await?;

            let state = controller.snapshot();
            let color = ctx.color;
            let out = output::render_list(
                ctx.format(),
                &state.result.items,
                |a| AtendimentoRow::new(a, color),
                |a| a.id.to_string(),
            );
            ctx.print(&out);
            output::print_pager(ctx.format(), state.pagination(), ctx.quiet());
            Ok(())
        }

        AtendimentosCommand::Get { id } => {
            ctx.enter(Route::Atendimento(id))?;
            let view = ctx.console.atendimento(id);
            let entity = load(ctx, &view).await?;
            show(ctx, &entity);
            Ok(())
        }

        AtendimentosCommand::Create(args) => {
            ctx.enter(Route::AtendimentoNovo)?;
            let body = build_create(ctx, args).await?;
            ctx.console.create_atendimento(&body).await?;
            ctx.say("✓ Atendimento criado");
            Ok(())
        }

        AtendimentosCommand::Finalize { id } => {
            ctx.enter(Route::Atendimento(id))?;
            let view = ctx.console.atendimento(id);
            load(ctx, &view).await?;
            finalize(ctx, &view).await
        }

        AtendimentosCommand::Browse => {
            ctx.enter(Route::Atendimentos)?;
            browse::atendimentos(ctx).await
        }
    }
}

pub fn show(ctx: &Ctx<'_>, entity: &AtendimentoDetail) {
    let color = ctx.color;
    let out = output::render_single(
        ctx.format(),
        entity,
        |a| detail(a, color),
        |a| a.id.to_string(),
    );
    ctx.print(&out);
}

/// Load the detail view, failing when nothing could be shown.
pub async fn load(ctx: &Ctx<'_>, view: &AtendimentoView) -> Result<AtendimentoDetail, CliError> {
    util::with_spinner("Carregando detalhes...", ctx.quiet(), view.load()).await;
    let state = view.snapshot();
    match (state.entity, state.load_error) {
        (Some(entity), _) => Ok(entity),
        (None, Some(message)) => Err(CliError::OperationFailed { message }),
        (None, None) => Err(CliError::NotFound {
            resource_type: "Atendimento".into(),
            identifier: view.id().to_string(),
            list_command: "atendimentos list".into(),
        }),
    }
}

/// Confirm and finalize a loaded view.
pub async fn finalize(ctx: &Ctx<'_>, view: &AtendimentoView) -> Result<(), CliError> {
    let state = view.snapshot();
    if !state.can_finalize() {
        let label = state.entity.as_ref().map_or("", AtendimentoDetail::status_label);
        ctx.say(&format!(
            "Atendimento #{} já está '{label}'; nada a finalizar.",
            view.id()
        ));
        return Ok(());
    }

    let prompt = format!("Finalizar o atendimento #{}?", view.id());
    if !util::confirm(&prompt, ctx.global.yes)? {
        return Ok(());
    }

    let outcome = util::with_spinner("Finalizando...", ctx.quiet(), view.finalize()).await;
    match outcome {
        FinalizeOutcome::Finalized => {
            ctx.say(&format!("✓ {FINALIZED_TOAST}"));
            if let Some(entity) = view.snapshot().entity {
                show(ctx, &entity);
            }
            Ok(())
        }
        FinalizeOutcome::Skipped => Ok(()),
        FinalizeOutcome::Failed => Err(CliError::OperationFailed {
            message: view
                .snapshot()
                .finalize
                .last_error
                .unwrap_or_else(|| despacho_core::finalize::FINALIZE_ERROR.into()),
        }),
    }
}

// ── Creation ────────────────────────────────────────────────────────

/// Fill the ids not given as flags by prompting over the lookup lists.
async fn build_create(
    ctx: &Ctx<'_>,
    args: AtendimentoCreateArgs,
) -> Result<AtendimentoCreate, CliError> {
    if let (Some(pessoa), Some(chamado), Some(viatura), Some(responsavel), Some(tipo)) = (
        args.pessoa,
        args.chamado,
        args.viatura,
        args.responsavel,
        args.tipo,
    ) {
        return Ok(AtendimentoCreate {
            responsavel_id: responsavel,
            pessoa_assistida_id: pessoa,
            chamado_id: chamado,
            viatura_id: viatura,
            atendimento_tipo_id: tipo,
            observacao: args.observacao,
        });
    }

    let options = util::with_spinner(
        "Carregando opções...",
        ctx.quiet(),
        ctx.console.atendimento_options(),
    )
    .await;

    Ok(AtendimentoCreate {
        pessoa_assistida_id: pick(args.pessoa, "Pessoa assistida", &choices(options.pessoas))?,
        chamado_id: pick(args.chamado, "Chamado", &choices(options.chamados))?,
        viatura_id: pick(args.viatura, "Viatura", &choices(options.viaturas))?,
        responsavel_id: pick(args.responsavel, "Responsável", &choices(options.usuarios))?,
        atendimento_tipo_id: pick(args.tipo, "Tipo de atendimento", &choices(options.tipos))?,
        observacao: args.observacao,
    })
}

/// An empty list leaves the id unset so validation reports it.
fn pick(given: Option<i64>, prompt: &str, items: &[Choice]) -> Result<i64, CliError> {
    if let Some(id) = given {
        return Ok(id);
    }
    if items.is_empty() {
        return Ok(0);
    }

    let labels: Vec<&str> = items.iter().map(|c| c.descricao.as_str()).collect();
    let index = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()
        .map_err(CliError::prompt)?;
    Ok(items.get(index).map_or(0, |c| c.id))
}
