//! Command dispatch: bridges CLI args -> console operations -> output formatting.

pub mod atendimentos;
pub mod browse;
pub mod chamados;
pub mod config_cmd;
pub mod lookup;
pub mod pessoas;
pub mod session;
pub mod util;

use despacho_core::{Console, CoreError, NoticeReceiver, Route};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

/// Per-invocation state shared by the handlers.
pub struct Ctx<'a> {
    pub console: Console,
    pub notices: NoticeReceiver,
    pub global: &'a GlobalOpts,
    pub profile: String,
    pub color: bool,
}

impl Ctx<'_> {
    pub fn format(&self) -> OutputFormat {
        self.global.output
    }

    pub fn quiet(&self) -> bool {
        self.global.quiet
    }

    /// Open a protected screen, or fail with a sign-in hint.
    pub fn enter(&self, route: Route) -> Result<(), CliError> {
        self.console.enter(route).map_err(|e| match e {
            CoreError::NotAuthenticated => CliError::NotSignedIn {
                profile: self.profile.clone(),
            },
            other => other.into(),
        })
    }

    pub fn print(&self, rendered: &str) {
        output::print_output(rendered, self.quiet());
    }

    /// Status line on stderr, suppressed by `--quiet`.
    pub fn say(&self, message: &str) {
        if !self.quiet() {
            eprintln!("{message}");
        }
    }

    pub fn flush_notices(&mut self) {
        let quiet = self.quiet();
        output::drain_notices(&mut self.notices, self.color, quiet);
    }

    /// Drop queued notices that an error is about to repeat.
    pub fn discard_notices(&mut self) {
        while self.notices.try_recv().is_ok() {}
    }
}

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    resolved: Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (console, notices) = Console::new(&resolved.api, resolved.tokens)?;
    console.restore();

    let mut ctx = Ctx {
        console,
        notices,
        global,
        profile: resolved.profile_name,
        color: output::should_color(global.color),
    };

    let result = match cmd {
        Command::Login(args) => session::login(&mut ctx, args).await,
        Command::Logout => {
            session::logout(&ctx);
            Ok(())
        }
        Command::Status => {
            session::status(&ctx);
            Ok(())
        }
        Command::Chamados(args) => chamados::handle(&mut ctx, args).await,
        Command::Atendimentos(args) => atendimentos::handle(&mut ctx, args).await,
        Command::Pessoas(args) => pessoas::handle(&mut ctx, args).await,
        Command::Lookup(args) => lookup::handle(&ctx, args.command).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    };

    ctx.flush_notices();
    result
}
