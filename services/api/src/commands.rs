use crate::infra::{
    build_service, parse_date, parse_month, parse_room_type, parse_status, today_or,
    SharedService,
};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use hostel_desk::config::AppConfig;
use hostel_desk::error::AppError;
use hostel_desk::hostel::{
    export_tenants_csv, BalanceStatement, Credentials, Month, NewTenantRequest, PaymentRequest,
    RoomSetup, RoomType, SettlementStatement, Tenant, TenantId, TenantStatus, UserId,
};
use hostel_desk::ledger::format_amount;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub(crate) enum AccountCommand {
    /// Create an owner account
    Signup(CredentialArgs),
    /// Check an owner's credentials and print their id
    Login(CredentialArgs),
}

#[derive(Args, Debug)]
pub(crate) struct CredentialArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[derive(Subcommand, Debug)]
pub(crate) enum RoomsCommand {
    /// Set capacity and monthly rent for one room type
    Configure {
        #[arg(long)]
        owner: i64,
        #[arg(long, value_parser = parse_room_type)]
        room_type: RoomType,
        #[arg(long)]
        capacity: i64,
        #[arg(long)]
        rent: i64,
    },
    /// List configured room types
    List(OwnerArgs),
}

#[derive(Args, Debug)]
pub(crate) struct OwnerArgs {
    #[arg(long)]
    pub(crate) owner: i64,
}

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    #[arg(long)]
    owner: i64,
    /// Evaluation date (YYYY-MM-DD); defaults to the local date
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum TenantCommand {
    /// Onboard a tenant into a configured room type
    Add {
        #[arg(long)]
        owner: i64,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        contact: String,
        #[arg(long, value_parser = parse_room_type)]
        room_type: RoomType,
        #[arg(long)]
        building: Option<String>,
        /// Defaults to the local date
        #[arg(long, value_parser = parse_date)]
        join_date: Option<NaiveDate>,
        #[arg(long, default_value_t = 0)]
        deposit: i64,
    },
    /// List tenants by status
    List {
        #[arg(long)]
        owner: i64,
        #[arg(long, value_parser = parse_status, default_value = "active")]
        status: TenantStatus,
    },
    /// Check a tenant out and print the final settlement
    Checkout {
        #[arg(long)]
        owner: i64,
        #[arg(long)]
        tenant: i64,
        /// Defaults to the local date
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Show months, accrued rent, payments and remaining balance
    Balance(TenantArgs),
    /// Show the settlement a checkout would produce
    Settlement(TenantArgs),
}

#[derive(Args, Debug)]
pub(crate) struct TenantArgs {
    #[arg(long)]
    owner: i64,
    #[arg(long)]
    tenant: i64,
    /// Evaluation date (YYYY-MM-DD); defaults to the local date
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum PaymentCommand {
    /// Record a rent payment for an active tenant
    Record {
        #[arg(long)]
        owner: i64,
        #[arg(long)]
        tenant: i64,
        #[arg(long)]
        amount: i64,
        #[arg(long, value_parser = parse_month)]
        month: Month,
        /// Defaults to the local date
        #[arg(long, value_parser = parse_date)]
        paid_on: Option<NaiveDate>,
    },
    /// List a tenant's payments
    List {
        #[arg(long)]
        owner: i64,
        #[arg(long)]
        tenant: i64,
    },
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    #[arg(long)]
    owner: i64,
    /// Destination file; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

pub(crate) fn run_account(config: &AppConfig, command: AccountCommand) -> Result<(), AppError> {
    let service = build_service(config)?;
    match command {
        AccountCommand::Signup(args) => {
            let user = service.signup(Credentials::new(args.email, args.password))?;
            println!(
                "Created account {} for {} ({})",
                user.id, user.email, user.subscription
            );
        }
        AccountCommand::Login(args) => {
            let user = service.login(Credentials::new(args.email, args.password))?;
            println!("Signed in as {} (owner id {})", user.email, user.id);
        }
    }
    Ok(())
}

pub(crate) fn run_rooms(config: &AppConfig, command: RoomsCommand) -> Result<(), AppError> {
    let service = build_service(config)?;
    let currency = service.currency().to_string();
    match command {
        RoomsCommand::Configure {
            owner,
            room_type,
            capacity,
            rent,
        } => {
            let room = service.configure_room(
                UserId(owner),
                RoomSetup {
                    room_type,
                    capacity,
                    rent,
                },
            )?;
            println!(
                "Configured {}: {} beds at {} per month",
                room.room_type,
                room.capacity,
                format_amount(&currency, room.rent)
            );
        }
        RoomsCommand::List(args) => {
            let rooms = service.room_configs(UserId(args.owner))?;
            if rooms.is_empty() {
                println!("No room types configured");
            }
            for room in rooms {
                println!(
                    "- {}: {} beds | {} per month",
                    room.room_type,
                    room.capacity,
                    format_amount(&currency, room.rent)
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn run_vacancy(config: &AppConfig, args: OwnerArgs) -> Result<(), AppError> {
    let service = build_service(config)?;
    let entries = service.vacancy(UserId(args.owner))?;
    if entries.is_empty() {
        println!("No room types configured");
    }
    for entry in entries {
        let flag = if entry.vacant < 0 { " (overbooked)" } else { "" };
        println!(
            "- {}: {} occupied / {} beds | {} vacant{}",
            entry.room_type, entry.occupied, entry.capacity, entry.vacant, flag
        );
    }
    Ok(())
}

pub(crate) fn run_dashboard(config: &AppConfig, args: DashboardArgs) -> Result<(), AppError> {
    let service = build_service(config)?;
    let currency = service.currency().to_string();
    let today = today_or(args.today);
    let summary = service.dashboard(UserId(args.owner), today)?;

    println!("Hostel dashboard as of {}", today);
    println!(
        "- Tenants: {} active | {} checked out",
        summary.active_tenants, summary.checked_out_tenants
    );
    println!(
        "- Beds: {} total | {} occupied | {} vacant",
        summary.capacity, summary.occupied, summary.vacant
    );
    println!(
        "- Rent: {} accrued | {} paid | {} outstanding",
        format_amount(&currency, summary.accrued),
        format_amount(&currency, summary.paid),
        format_amount(&currency, summary.outstanding)
    );
    Ok(())
}

pub(crate) fn run_tenant(config: &AppConfig, command: TenantCommand) -> Result<(), AppError> {
    let service = build_service(config)?;
    match command {
        TenantCommand::Add {
            owner,
            name,
            contact,
            room_type,
            building,
            join_date,
            deposit,
        } => {
            let request = NewTenantRequest {
                name,
                contact,
                room_type,
                building,
                join_date,
                security_deposit: deposit,
            };
            let tenant = service.onboard(UserId(owner), request, today_or(None))?;
            println!(
                "Onboarded {} (tenant {}) into {} from {}",
                tenant.name, tenant.id, tenant.room_type, tenant.join_date
            );
            println!(
                "  Monthly rent {} | deposit {}",
                format_amount(service.currency(), tenant.monthly_rent),
                format_amount(service.currency(), tenant.security_deposit)
            );
        }
        TenantCommand::List { owner, status } => {
            let tenants = service.tenants(UserId(owner), status)?;
            println!("{} tenants: {}", status.label(), tenants.len());
            for tenant in &tenants {
                render_tenant_line(&service, tenant);
            }
        }
        TenantCommand::Checkout {
            owner,
            tenant,
            date,
        } => {
            let receipt = service.checkout(UserId(owner), TenantId(tenant), today_or(date))?;
            println!(
                "Checked out {} (tenant {})",
                receipt.tenant.name, receipt.tenant.id
            );
            render_settlement(&service, &receipt.settlement);
        }
        TenantCommand::Balance(args) => {
            let statement = service.balance(
                UserId(args.owner),
                TenantId(args.tenant),
                today_or(args.today),
            )?;
            render_balance(&service, &statement);
        }
        TenantCommand::Settlement(args) => {
            let statement = service.settlement(
                UserId(args.owner),
                TenantId(args.tenant),
                today_or(args.today),
            )?;
            render_settlement(&service, &statement);
        }
    }
    Ok(())
}

pub(crate) fn run_payment(config: &AppConfig, command: PaymentCommand) -> Result<(), AppError> {
    let service = build_service(config)?;
    match command {
        PaymentCommand::Record {
            owner,
            tenant,
            amount,
            month,
            paid_on,
        } => {
            let request = PaymentRequest {
                amount,
                month,
                paid_on,
            };
            let payment =
                service.record_payment(UserId(owner), TenantId(tenant), request, today_or(None))?;
            println!(
                "Recorded {} for {} on {}",
                format_amount(service.currency(), payment.amount),
                payment.paid_for_month,
                payment.paid_on
            );
        }
        PaymentCommand::List { owner, tenant } => {
            let payments = service.payments(UserId(owner), TenantId(tenant))?;
            if payments.is_empty() {
                println!("No payments recorded");
            }
            for payment in payments {
                println!(
                    "- {} | {} for {}",
                    payment.paid_on,
                    format_amount(service.currency(), payment.amount),
                    payment.paid_for_month
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn run_export(config: &AppConfig, args: ExportArgs) -> Result<(), AppError> {
    let service = build_service(config)?;
    let today = today_or(args.today);
    let owner = UserId(args.owner);

    match args.output {
        Some(path) => {
            let writer = BufWriter::new(File::create(&path)?);
            let rows = export_tenants_csv(&*service, owner, writer, today)?;
            println!("Exported {} tenants to {}", rows, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            export_tenants_csv(&*service, owner, &mut handle, today)?;
            handle.flush()?;
        }
    }
    Ok(())
}

fn render_tenant_line(service: &SharedService, tenant: &Tenant) {
    let building = tenant.building.as_deref().unwrap_or("-");
    println!(
        "- [{}] {} | {} | {} | joined {} | rent {}",
        tenant.id,
        tenant.name,
        tenant.room_type,
        building,
        tenant.join_date,
        format_amount(service.currency(), tenant.monthly_rent)
    );
}

fn render_balance(service: &SharedService, statement: &BalanceStatement) {
    let currency = service.currency();
    println!(
        "Balance for {} (tenant {}, {}) as of {}",
        statement.name,
        statement.tenant_id,
        statement.status.label(),
        statement.evaluated_on
    );
    println!("- Months: {}", statement.balance.months);
    println!(
        "- Accrued: {}",
        format_amount(currency, statement.balance.accrued)
    );
    println!("- Paid: {}", format_amount(currency, statement.balance.paid));
    println!(
        "- Remaining: {}",
        format_amount(currency, statement.balance.remaining)
    );
}

fn render_settlement(service: &SharedService, statement: &SettlementStatement) {
    let currency = service.currency();
    let settlement = &statement.settlement;
    println!(
        "Settlement for {} as of {}",
        statement.name, statement.evaluated_on
    );
    println!(
        "- {} months | accrued {} | paid {}",
        settlement.months,
        format_amount(currency, settlement.accrued),
        format_amount(currency, settlement.paid)
    );
    println!(
        "- Remaining {} | deposit {}",
        format_amount(currency, settlement.remaining),
        format_amount(currency, settlement.deposit)
    );
    println!("{}", statement.summary);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(subcommand)]
        command: TenantCommand,
    }

    #[test]
    fn tenant_add_defaults_contact_and_deposit() {
        let harness = Harness::try_parse_from([
            "harness",
            "add",
            "--owner",
            "1",
            "--name",
            "Ravi",
            "--room-type",
            "3 Sharing",
        ])
        .expect("parses");
        match harness.command {
            TenantCommand::Add {
                contact,
                deposit,
                join_date,
                room_type,
                ..
            } => {
                assert_eq!(contact, "");
                assert_eq!(deposit, 0);
                assert_eq!(join_date, None);
                assert_eq!(room_type, RoomType::ThreeSharing);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn tenant_list_defaults_to_active() {
        let harness =
            Harness::try_parse_from(["harness", "list", "--owner", "1"]).expect("parses");
        assert!(matches!(
            harness.command,
            TenantCommand::List {
                status: TenantStatus::Active,
                ..
            }
        ));
    }
}
