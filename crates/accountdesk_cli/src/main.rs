//! `accountdesk` command-line entry point.
//!
//! # Responsibility
//! - Drive account, group and validator use-cases against a SQLite file.
//! - Print every result as JSON on stdout.

use accountdesk_core::validation::UploadedFile;
use accountdesk_core::{
    init_logging, open_db, AccountListQuery, AccountService, ActorContext, CoreSettings, Group,
    GroupRepository, NewAccount, RepoError, SqliteAccountRepository, SqliteGroupRepository,
    SystemClock, ValidationError,
};
use accountdesk_core::{Clock, RepoResult};
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "accountdesk")]
#[command(about = "Account lifecycle and validation toolkit", version)]
struct Cli {
    /// JSON settings file; defaults and ACCOUNTDESK_* variables apply otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database path, overriding settings
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account; the username is derived from the names when omitted
    CreateAccount(AccountArgs),
    /// Create an account with staff and superuser rights
    CreateSuperuser(AccountArgs),
    /// List accounts
    List(ListArgs),
    /// Soft-delete an account
    Delete {
        id: Uuid,
        #[arg(long)]
        actor: Option<Uuid>,
    },
    /// Restore a soft-deleted account
    Restore {
        id: Uuid,
        #[arg(long)]
        actor: Option<Uuid>,
    },
    /// Check an upload against the configured size ceiling and MIME allow-list
    CheckUpload {
        #[arg(long)]
        size_bytes: u64,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Check a birthdate (YYYY-MM-DD) against the configured minimum age
    CheckAge { birthdate: NaiveDate },
    /// Create an account group
    CreateGroup {
        name: String,
        #[arg(long, default_value_t = 0)]
        sort_order: u32,
    },
    /// List account groups
    ListGroups,
}

#[derive(Args)]
struct AccountArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    username: Option<String>,
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long, default_value = "")]
    job_title: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    staff: bool,
    /// Acting account id; the system acts when omitted
    #[arg(long)]
    actor: Option<Uuid>,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    include_deleted: bool,
    /// Case-insensitive match on email, username or names
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    active: Option<bool>,
    #[arg(long)]
    staff: Option<bool>,
    #[arg(long)]
    superuser: Option<bool>,
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long, default_value_t = 0)]
    offset: u32,
}

impl From<ListArgs> for AccountListQuery {
    fn from(args: ListArgs) -> Self {
        Self {
            include_deleted: args.include_deleted,
            is_active: args.active,
            is_staff: args.staff,
            is_superuser: args.superuser,
            search: args.search,
            limit: args.limit,
            offset: args.offset,
        }
    }
}

impl AccountArgs {
    fn into_parts(self) -> (NewAccount, ActorContext) {
        let actor = actor_context(self.actor);
        let new = NewAccount {
            email: self.email,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            job_title: self.job_title,
            phone: self.phone,
            is_staff: self.staff,
            is_superuser: false,
        };
        (new, actor)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings =
        CoreSettings::load(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(db) = cli.db {
        settings.database.path = db;
    }
    if let Some(dir) = &settings.logging.dir {
        init_logging(&settings.logging.level, dir)
            .context("failed to initialise logging")?;
    }

    let output = match cli.command {
        Commands::CheckUpload {
            size_bytes,
            content_type,
        } => {
            let file = UploadedFile::new(size_bytes, content_type);
            let outcome = settings
                .uploads
                .size_limit()
                .validate(&file)
                .and_then(|()| settings.uploads.content_types().validate(&file));
            validation_report(outcome)
        }
        Commands::CheckAge { birthdate } => {
            let today = SystemClock.today();
            validation_report(settings.accounts.minimum_age().validate(birthdate, today))
        }
        command => run_storage_command(&settings.database.path, command)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_storage_command(db_path: &Path, command: Commands) -> anyhow::Result<serde_json::Value> {
    let conn = open_db(db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    let accounts = AccountService::new(SqliteAccountRepository::try_new(&conn)?, SystemClock);

    let output = match command {
        Commands::CreateAccount(args) => {
            let (new, actor) = args.into_parts();
            outcome_json(accounts.create_account(new, &actor))?
        }
        Commands::CreateSuperuser(args) => {
            let (new, actor) = args.into_parts();
            outcome_json(accounts.create_superuser(new, &actor))?
        }
        Commands::List(args) => {
            serde_json::to_value(accounts.list(&AccountListQuery::from(args))?)?
        }
        Commands::Delete { id, actor } => {
            outcome_json(accounts.soft_delete(id, &actor_context(actor)))?
        }
        Commands::Restore { id, actor } => {
            outcome_json(accounts.restore(id, &actor_context(actor)))?
        }
        Commands::CreateGroup { name, sort_order } => {
            let groups = SqliteGroupRepository::try_new(&conn)?;
            let group = Group::new(name).with_sort_order(sort_order);
            let created = groups
                .create_group(&group)
                .and_then(|id| groups.get_group(id)?.ok_or(RepoError::NotFound(id)));
            outcome_json(created)?
        }
        Commands::ListGroups => {
            serde_json::to_value(SqliteGroupRepository::try_new(&conn)?.list_groups()?)?
        }
        Commands::CheckUpload { .. } | Commands::CheckAge { .. } => {
            anyhow::bail!("validator commands do not use storage")
        }
    };

    info!("event=cli_command module=cli status=ok");
    Ok(output)
}

fn actor_context(actor: Option<Uuid>) -> ActorContext {
    actor.map_or_else(ActorContext::system, ActorContext::account)
}

/// Validation failures are reported as JSON; anything else aborts the command.
fn outcome_json<T: Serialize>(result: RepoResult<T>) -> anyhow::Result<serde_json::Value> {
    match result {
        Ok(value) => Ok(json!({ "ok": true, "result": serde_json::to_value(value)? })),
        Err(RepoError::Validation(err)) => Ok(json!({ "ok": false, "error": err })),
        Err(err) => Err(err.into()),
    }
}

fn validation_report(outcome: Result<(), ValidationError>) -> serde_json::Value {
    match outcome {
        Ok(()) => json!({ "ok": true }),
        Err(err) => json!({ "ok": false, "error": err }),
    }
}
