//! Chamado command handlers.

use tabled::Tabled;

use despacho_core::models::{ChamadoCreate, ChamadoDetail, ChamadoListItem};
use despacho_core::{Atendido, Route};

use crate::cli::{AtendidoArg, ChamadoCreateArgs, ChamadosArgs, ChamadosCommand};
use crate::error::CliError;
use crate::output::{self, format_date, format_datetime, or_placeholder, paint_status};

use super::{Ctx, browse, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct ChamadoRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Bairro")]
    bairro: String,
    #[tabled(rename = "Rua")]
    rua: String,
    #[tabled(rename = "Acionamento")]
    data: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl ChamadoRow {
    pub fn new(c: &ChamadoListItem, color: bool) -> Self {
        Self {
            id: c.id,
            bairro: or_placeholder(c.bairro.as_deref(), "-"),
            rua: or_placeholder(c.rua.as_deref(), "-"),
            data: c.data_cadastro.as_deref().map_or_else(|| "-".into(), format_date),
            status: paint_status(c.status.as_ref().map_or("", |s| s.label.as_str()), color),
        }
    }
}

impl From<AtendidoArg> for Atendido {
    fn from(arg: AtendidoArg) -> Self {
        match arg {
            AtendidoArg::Todos => Self::Todos,
            AtendidoArg::Atendidos => Self::Atendidos,
            AtendidoArg::Pendentes => Self::Pendentes,
        }
    }
}

pub fn detail(c: &ChamadoDetail, color: bool) -> String {
    let status = paint_status(c.status.as_ref().map_or("", |s| s.label.as_str()), color);
    let endereco = match (c.rua.as_deref(), c.numero.as_deref()) {
        (Some(rua), Some(numero)) if !rua.is_empty() => {
            format!("{rua}, {numero} - {}", or_placeholder(c.bairro.as_deref(), "Não informado"))
        }
        _ => or_placeholder(c.bairro.as_deref(), "Não informado"),
    };

    let mut lines = vec![
        format!("Chamado #{}", c.id),
        String::new(),
        format!("Status:              {status}"),
        format!("Endereço:            {endereco}"),
        format!(
            "Cidade/Estado:       {}/{}",
            or_placeholder(c.cidade.as_deref(), "-"),
            or_placeholder(c.estado.as_deref(), "-")
        ),
        format!(
            "Data do Acionamento: {}",
            c.data_cadastro.as_deref().map_or_else(|| "-".into(), format_datetime)
        ),
        format!(
            "Data da Resposta:    {}",
            c.data_respondido
                .as_deref()
                .map_or_else(|| "Aguardando resposta".into(), format_datetime)
        ),
    ];

    if let Some(ref pessoa) = c.pessoa_assistida {
        lines.push(String::new());
        lines.push("Pessoa Assistida".into());
        lines.push(format!("  Nome:     {}", pessoa.nome));
        lines.push(format!("  CPF:      {}", or_placeholder(pessoa.cpf.as_deref(), "-")));
        lines.push(format!(
            "  Telefone: {}",
            or_placeholder(pessoa.telefone.as_deref(), "-")
        ));
        lines.push(format!(
            "  Email:    {}",
            or_placeholder(pessoa.email.as_deref(), "Não informado")
        ));
    }

    if let Some(ref device) = c.dispositivo {
        lines.push(String::new());
        lines.push("Dispositivo".into());
        lines.push(format!(
            "  Marca/Modelo:  {} {}",
            or_placeholder(device.marca.as_deref(), "-"),
            device.modelo.as_deref().unwrap_or_default()
        ));
        lines.push(format!(
            "  Identificador: {}",
            or_placeholder(device.identificador.as_deref(), "-")
        ));
    }

    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &mut Ctx<'_>, args: ChamadosArgs) -> Result<(), CliError> {
    match args.command {
        ChamadosCommand::List { list, atendido } => {
            ctx.enter(Route::Chamados)?;
            let controller = ctx.console.chamados();
            controller.set_draft_filter(|f| {
                f.pesquisa = list.pesquisa.clone().unwrap_or_default();
                f.atendido = atendido.into();
            });
            util::fetch_page(&controller, list.page, ctx.quiet()).await?;

            let state = controller.snapshot();
            let color = ctx.color;
            let out = output::render_list(
                ctx.format(),
                &state.result.items,
                |c| ChamadoRow::new(c, color),
                |c| c.id.to_string(),
            );
            ctx.print(&out);
            output::print_pager(ctx.format(), state.pagination(), ctx.quiet());
            Ok(())
        }

        ChamadosCommand::Get { id } => {
            ctx.enter(Route::Chamado(id))?;
            let fetched =
                util::with_spinner("Carregando detalhes...", ctx.quiet(), ctx.console.chamado(id))
                    .await?;
            let chamado = fetched.ok_or_else(|| CliError::NotFound {
                resource_type: "Chamado".into(),
                identifier: id.to_string(),
                list_command: "chamados list".into(),
            })?;

            let color = ctx.color;
            let out = output::render_single(
                ctx.format(),
                &chamado,
                |c| detail(c, color),
                |c| c.id.to_string(),
            );
            ctx.print(&out);
            Ok(())
        }

        ChamadosCommand::Create(args) => {
            ctx.enter(Route::ChamadoNovo)?;
            let body = create_body(args);
            ctx.console.create_chamado(&body).await?;
            ctx.say("✓ Chamado criado");
            Ok(())
        }

        ChamadosCommand::Browse => {
            ctx.enter(Route::Chamados)?;
            browse::chamados(ctx).await
        }
    }
}

fn create_body(args: ChamadoCreateArgs) -> ChamadoCreate {
    ChamadoCreate {
        pessoa_assistida_id: args.pessoa,
        bairro: args.bairro,
        rua: args.rua,
        numero: args.numero,
        cep: args.cep,
        cidade: args.cidade,
        estado: args.estado,
    }
}
