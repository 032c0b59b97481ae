use crate::commands::{
    run_account, run_dashboard, run_export, run_payment, run_rooms, run_tenant, run_vacancy,
    AccountCommand, DashboardArgs, ExportArgs, OwnerArgs, PaymentCommand, RoomsCommand,
    TenantCommand,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hostel_desk::config::AppConfig;
use hostel_desk::error::AppError;
use hostel_desk::telemetry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Hostel Desk",
    about = "Manage hostel rooms, tenants and rent from the command line or over HTTP",
    version
)]
struct Cli {
    /// SQLite database file (overrides HOSTEL_DB_PATH; ":memory:" for a throwaway store)
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Create an owner account or check credentials
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
    /// Configure room capacity and rent
    Rooms {
        #[command(subcommand)]
        command: RoomsCommand,
    },
    /// Show occupied and vacant beds per room type
    Vacancy(OwnerArgs),
    /// Show tenant counts, bed totals and rent totals
    Dashboard(DashboardArgs),
    /// Onboard, list, check out and inspect tenants
    Tenant {
        #[command(subcommand)]
        command: TenantCommand,
    },
    /// Record and list rent payments
    Payment {
        #[command(subcommand)]
        command: PaymentCommand,
    },
    /// Write every tenant with balance figures as CSV
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(path) = cli.database {
        config.store.database_path = path;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args, config).await,
        Command::Account { command } => run_account(&config, command),
        Command::Rooms { command } => run_rooms(&config, command),
        Command::Vacancy(args) => run_vacancy(&config, args),
        Command::Dashboard(args) => run_dashboard(&config, args),
        Command::Tenant { command } => run_tenant(&config, command),
        Command::Payment { command } => run_payment(&config, command),
        Command::Export(args) => run_export(&config, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["hostel-desk"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_nested_tenant_command_with_global_database() {
        let cli = Cli::try_parse_from([
            "hostel-desk",
            "tenant",
            "balance",
            "--owner",
            "1",
            "--tenant",
            "2",
            "--today",
            "2025-03-20",
            "--database",
            ":memory:",
        ])
        .expect("parses");
        assert_eq!(cli.database, Some(PathBuf::from(":memory:")));
        assert!(matches!(
            cli.command,
            Some(Command::Tenant {
                command: TenantCommand::Balance(_)
            })
        ));
    }

    #[test]
    fn rejects_unknown_room_type() {
        let result = Cli::try_parse_from([
            "hostel-desk",
            "rooms",
            "configure",
            "--owner",
            "1",
            "--room-type",
            "Penthouse",
            "--capacity",
            "1",
            "--rent",
            "1",
        ]);
        assert!(result.is_err());
    }
}
