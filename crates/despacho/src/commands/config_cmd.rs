//! Config subcommand handlers.

use dialoguer::{Input, Select};

use despacho_config::TokenStorage;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, DEFAULT_PROFILE, Profile};
use crate::error::CliError;
use crate::output;

/// Read a URL and check it the same way profile resolution will.
fn prompt_api_url() -> Result<String, CliError> {
    let url: String = Input::new()
        .with_prompt("API URL")
        .default("http://localhost:5000/api".into())
        .interact_text()
        .map_err(CliError::prompt)?;

    let parsed = url::Url::parse(url.trim()).map_err(|e| CliError::InvalidValue {
        field: "api_url".into(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CliError::InvalidValue {
            field: "api_url".into(),
            reason: "must use http or https".into(),
        });
    }
    Ok(url.trim().to_owned())
}

fn prompt_token_storage() -> Result<TokenStorage, CliError> {
    let choices = &[
        "Arquivo no diretório de dados (padrão)",
        "Chaveiro do sistema",
    ];
    let selection = Select::new()
        .with_prompt("Onde guardar o token de sessão?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(CliError::prompt)?;

    Ok(if selection == 0 {
        TokenStorage::File
    } else {
        TokenStorage::Keyring
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("despacho: assistente de configuração");
            eprintln!("   Arquivo: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Nome do perfil")
                .default(DEFAULT_PROFILE.into())
                .interact_text()
                .map_err(CliError::prompt)?;

            let mut profile = Profile::new(prompt_api_url()?);
            profile.token_storage = prompt_token_storage()?;

            // Existing profiles are kept; the new one becomes the default.
            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuração gravada em {}", config_path.display());
            eprintln!("  Perfil ativo: {profile_name}");
            eprintln!("\n  Próximo passo: despacho login");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let text = toml::to_string_pretty(&cfg).map_err(|e| CliError::OperationFailed {
                message: format!("não foi possível serializar a configuração: {e}"),
            })?;
            let out = output::render_single(global.output, &cfg, |_| text.clone(), |_| {
                config::active_profile_name(global, &cfg)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or(DEFAULT_PROFILE);
            if cfg.profiles.is_empty() {
                eprintln!("Nenhum perfil configurado. Execute: despacho config init");
                return Ok(());
            }

            let mut names: Vec<_> = cfg.profiles.keys().collect();
            names.sort();
            for name in names {
                let marker = if name == default { " *" } else { "" };
                println!("{name}{marker}\t{}", cfg.profiles[name].api_url);
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(config::profile_not_found(&cfg, &name));
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Perfil padrão agora é '{name}'");
            Ok(())
        }
    }
}
