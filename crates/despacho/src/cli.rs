//! Clap derive structures for the `despacho` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// despacho -- operator console for the social-assistance dispatch API
#[derive(Debug, Parser)]
#[command(
    name = "despacho",
    version,
    about = "Operate the assistance dispatch console from the command line",
    long_about = "Sign in to a dispatch API deployment, browse chamados and \
        atendimentos, register pessoas assistidas and finalize atendimentos.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "DESPACHO_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 'u', env = "DESPACHO_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DESPACHO_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "DESPACHO_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "DESPACHO_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Keep the session token in memory only
    #[arg(long, global = true)]
    pub no_persist: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session token
    Login(LoginArgs),

    /// Sign out and forget the stored token
    Logout,

    /// Show whether a session is stored for the profile
    Status,

    /// Browse and register chamados
    #[command(alias = "ch")]
    Chamados(ChamadosArgs),

    /// Browse, register and finalize atendimentos
    #[command(alias = "at")]
    Atendimentos(AtendimentosArgs),

    /// Register pessoas assistidas
    Pessoas(PessoasArgs),

    /// List the options offered by the creation forms
    Lookup(LookupArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Session ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Operator email (prompted when omitted)
    #[arg(long, short = 'e', env = "DESPACHO_EMAIL")]
    pub email: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "DESPACHO_SENHA", hide_env_values = true)]
    pub senha: Option<String>,
}

// ── Shared list arguments ────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page to show (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Free-text search
    #[arg(long, short = 's')]
    pub pesquisa: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AtendidoArg {
    Todos,
    Atendidos,
    Pendentes,
}

// ── Chamados ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ChamadosArgs {
    #[command(subcommand)]
    pub command: ChamadosCommand,
}

#[derive(Debug, Subcommand)]
pub enum ChamadosCommand {
    /// List chamados, ten per page
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Filter by whether the chamado was answered
        #[arg(long, short = 'a', default_value = "todos")]
        atendido: AtendidoArg,
    },

    /// Show one chamado
    Get {
        /// Chamado id
        id: i64,
    },

    /// Register a chamado for a pessoa assistida
    Create(ChamadoCreateArgs),

    /// Page through chamados interactively
    Browse,
}

#[derive(Debug, Args)]
pub struct ChamadoCreateArgs {
    /// Pessoa assistida id
    #[arg(long)]
    pub pessoa: i64,

    #[arg(long)]
    pub rua: String,

    #[arg(long, default_value = "")]
    pub numero: String,

    #[arg(long, default_value = "")]
    pub bairro: String,

    #[arg(long, default_value = "")]
    pub cep: String,

    #[arg(long, default_value = "")]
    pub cidade: String,

    #[arg(long, default_value = "")]
    pub estado: String,
}

// ── Atendimentos ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AtendimentosArgs {
    #[command(subcommand)]
    pub command: AtendimentosCommand,
}

#[derive(Debug, Subcommand)]
pub enum AtendimentosCommand {
    /// List active atendimentos, ten per page
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Show one atendimento
    Get {
        /// Atendimento id
        id: i64,
    },

    /// Register an atendimento (prompts for missing ids)
    Create(AtendimentoCreateArgs),

    /// Finalize an atendimento
    Finalize {
        /// Atendimento id
        id: i64,
    },

    /// Page through atendimentos interactively
    Browse,
}

#[derive(Debug, Args)]
pub struct AtendimentoCreateArgs {
    /// Pessoa assistida id
    #[arg(long)]
    pub pessoa: Option<i64>,

    /// Chamado id
    #[arg(long)]
    pub chamado: Option<i64>,

    /// Viatura id
    #[arg(long)]
    pub viatura: Option<i64>,

    /// Responsible user id
    #[arg(long)]
    pub responsavel: Option<i64>,

    /// Atendimento type id
    #[arg(long)]
    pub tipo: Option<i64>,

    /// Free-text notes
    #[arg(long, default_value = "")]
    pub observacao: String,
}

// ── Pessoas ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PessoasArgs {
    #[command(subcommand)]
    pub command: PessoasCommand,
}

#[derive(Debug, Subcommand)]
pub enum PessoasCommand {
    /// Register a pessoa assistida
    Create(PessoaCreateArgs),
}

#[derive(Debug, Args)]
pub struct PessoaCreateArgs {
    #[arg(long)]
    pub nome: String,

    #[arg(long, default_value = "")]
    pub cpf: String,

    #[arg(long, default_value = "")]
    pub telefone: String,

    #[arg(long, default_value = "")]
    pub email: String,

    #[arg(long, default_value = "")]
    pub cep: String,

    #[arg(long, default_value = "")]
    pub rua: String,

    #[arg(long, default_value = "")]
    pub bairro: String,

    #[arg(long, default_value = "")]
    pub cidade: String,

    #[arg(long, default_value = "")]
    pub estado: String,
}

// ── Lookups ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LookupArgs {
    #[command(subcommand)]
    pub command: LookupCommand,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum LookupCommand {
    /// Pessoas assistidas
    Pessoas,
    /// Active chamados
    Chamados,
    /// Available viaturas
    Viaturas,
    /// Users who can be responsible for an atendimento
    Usuarios,
    /// Atendimento types
    Tipos,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
