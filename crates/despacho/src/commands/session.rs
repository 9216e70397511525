//! login / logout / status.

use serde::Serialize;

use despacho_core::session::{INCOMPLETE_MESSAGE, MISSING_TOKEN_MESSAGE, REJECTED_MESSAGE};
use despacho_core::{Credentials, Route, SignInOutcome};

use crate::cli::LoginArgs;
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

pub async fn login(ctx: &mut Ctx<'_>, args: LoginArgs) -> Result<(), CliError> {
    ctx.console.navigate(Route::Login);

    let email = match args.email {
        Some(email) => email,
        None => util::ask("Email", "")?,
    };
    let senha = match args.senha {
        Some(senha) => senha,
        None => rpassword::prompt_password("Senha: ").map_err(CliError::prompt)?,
    };

    let credentials = Credentials::new(email, senha);
    let outcome = util::with_spinner(
        "Entrando...",
        ctx.quiet(),
        ctx.console.session().sign_in(&credentials),
    )
    .await;

    let message = match outcome {
        SignInOutcome::SignedIn => {
            ctx.say(&format!("✓ Sessão iniciada (perfil '{}')", ctx.profile));
            return Ok(());
        }
        SignInOutcome::Incomplete => {
            ctx.discard_notices();
            return Err(CliError::Validation {
                message: INCOMPLETE_MESSAGE.into(),
            });
        }
        SignInOutcome::MissingToken => MISSING_TOKEN_MESSAGE,
        SignInOutcome::Rejected => REJECTED_MESSAGE,
    };

    ctx.discard_notices();
    Err(CliError::AuthFailed {
        message: message.into(),
    })
}

pub fn logout(ctx: &Ctx<'_>) {
    ctx.console.session().sign_out();
    ctx.say("✓ Sessão encerrada");
}

#[derive(Serialize)]
struct StatusView {
    profile: String,
    api_url: String,
    authenticated: bool,
}

pub fn status(ctx: &Ctx<'_>) {
    let view = StatusView {
        profile: ctx.profile.clone(),
        api_url: ctx.console.gateway().base_url().to_string(),
        authenticated: ctx.console.session().is_authenticated(),
    };

    let out = output::render_single(
        ctx.format(),
        &view,
        |v| {
            format!(
                "Perfil:   {}\nAPI:      {}\nSessão:   {}",
                v.profile,
                v.api_url,
                if v.authenticated { "ativa" } else { "nenhuma" }
            )
        },
        |v| v.authenticated.to_string(),
    );
    ctx.print(&out);
}
