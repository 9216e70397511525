//! Lookup lists behind the creation forms.

use serde::Serialize;
use tabled::Tabled;

use despacho_core::CoreError;
use despacho_core::models::{ChamadoOption, SelectOption, ViaturaOption};

use crate::cli::LookupCommand;
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

/// One selectable option, whatever endpoint it came from.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct Choice {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Descrição")]
    pub descricao: String,
}

impl From<SelectOption> for Choice {
    fn from(o: SelectOption) -> Self {
        Self {
            id: o.id,
            descricao: o.descricao,
        }
    }
}

impl From<ChamadoOption> for Choice {
    fn from(o: ChamadoOption) -> Self {
        let descricao = match (o.bairro, o.rua) {
            (Some(bairro), Some(rua)) => format!("#{} - {bairro}, {rua}", o.id),
            (Some(place), None) | (None, Some(place)) => format!("#{} - {place}", o.id),
            (None, None) => format!("#{}", o.id),
        };
        Self { id: o.id, descricao }
    }
}

impl From<ViaturaOption> for Choice {
    fn from(o: ViaturaOption) -> Self {
        let descricao = if o.identificador.is_empty() {
            o.placa
        } else {
            format!("{} ({})", o.placa, o.identificador)
        };
        Self { id: o.id, descricao }
    }
}

pub fn choices<T: Into<Choice>>(items: Vec<T>) -> Vec<Choice> {
    items.into_iter().map(Into::into).collect()
}

// ── Handler ─────────────────────────────────────────────────────────

const LOADING: &str = "Carregando opções...";

pub async fn handle(ctx: &Ctx<'_>, which: LookupCommand) -> Result<(), CliError> {
    ctx.enter(despacho_core::Route::AtendimentoNovo)?;

    let gateway = ctx.console.gateway();
    let quiet = ctx.quiet();
    let fetched = match which {
        LookupCommand::Pessoas => {
            util::with_spinner(LOADING, quiet, gateway.select_pessoas_assistidas())
                .await
                .map(choices)
        }
        LookupCommand::Chamados => {
            util::with_spinner(LOADING, quiet, gateway.select_chamados())
                .await
                .map(choices)
        }
        LookupCommand::Viaturas => {
            util::with_spinner(LOADING, quiet, gateway.select_viaturas())
                .await
                .map(choices)
        }
        LookupCommand::Usuarios => {
            util::with_spinner(LOADING, quiet, gateway.select_usuarios())
                .await
                .map(choices)
        }
        LookupCommand::Tipos => {
            util::with_spinner(LOADING, quiet, gateway.select_atendimento_tipos())
                .await
                .map(choices)
        }
    };
    let items = fetched.map_err(CoreError::from)?;

    let out = output::render_list(ctx.format(), &items, Clone::clone, |c| c.id.to_string());
    ctx.print(&out);
    Ok(())
}
