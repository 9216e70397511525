//! Pessoa assistida command handlers.

use despacho_core::{PessoaAssistidaForm, Route};

use crate::cli::{PessoaCreateArgs, PessoasArgs, PessoasCommand};
use crate::error::CliError;

use super::{Ctx, util};

pub async fn handle(ctx: &mut Ctx<'_>, args: PessoasArgs) -> Result<(), CliError> {
    match args.command {
        PessoasCommand::Create(fields) => {
            ctx.enter(Route::PessoaAssistidaNova)?;
            let form = form_from(fields);
            let created = util::with_spinner(
                "Salvando...",
                ctx.quiet(),
                ctx.console.create_pessoa_assistida(form),
            )
            .await;

            // The server's own message arrives as an alert; show it first.
            ctx.flush_notices();
            created.map_err(CliError::from)
        }
    }
}

fn form_from(args: PessoaCreateArgs) -> PessoaAssistidaForm {
    PessoaAssistidaForm {
        nome: args.nome,
        cpf: args.cpf,
        telefone: args.telefone,
        email: args.email,
        cep: args.cep,
        rua: args.rua,
        bairro: args.bairro,
        cidade: args.cidade,
        estado: args.estado,
    }
}
