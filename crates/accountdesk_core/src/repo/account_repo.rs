//! Account repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and soft-delete lifecycle APIs over `accounts` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Account::validate()` before SQL mutations.
//! - Default reads exclude soft-deleted rows; `include_deleted` is the only
//!   way to see them.
//! - Updates never touch `created_at`/`created_by` or tombstone fields.
//! - Soft delete and restore persist only the three tombstone fields.

use super::{
    bool_to_int, ensure_connection_ready, map_write_error, parse_bool, parse_optional_uuid,
    parse_uuid, RepoError, RepoResult,
};
use crate::model::account::{Account, AccountId};
use crate::model::lifecycle::{AuditStamp, SoftDeleteState};
use crate::validation::UniqueLookup;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const ACCOUNT_SELECT_SQL: &str = "SELECT
    uuid,
    email,
    username,
    first_name,
    last_name,
    job_title,
    phone,
    is_active,
    is_staff,
    is_superuser,
    created_at,
    created_by,
    updated_at,
    updated_by,
    is_deleted,
    deleted_at,
    deleted_by
FROM accounts";

const REQUIRED_COLUMNS: &[&str] = &[
    "uuid",
    "email",
    "username",
    "first_name",
    "last_name",
    "job_title",
    "phone",
    "is_active",
    "is_staff",
    "is_superuser",
    "created_at",
    "created_by",
    "updated_at",
    "updated_by",
    "is_deleted",
    "deleted_at",
    "deleted_by",
];

/// Columns that may be probed through [`UniqueLookup`].
const UNIQUE_COLUMNS: &[&str] = &["email", "username"];

/// Query options for listing accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountListQuery {
    pub include_deleted: bool,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    /// Case-insensitive substring match on username, email and names.
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for account persistence.
pub trait AccountRepository: UniqueLookup<Id = AccountId> {
    fn create_account(&self, account: &Account) -> RepoResult<AccountId>;
    /// Persists profile/permission fields and the `updated_*` stamp of a live account.
    fn update_account(&self, account: &Account) -> RepoResult<()>;
    fn get_account(&self, id: AccountId, include_deleted: bool) -> RepoResult<Option<Account>>;
    fn find_by_email(&self, email: &str, include_deleted: bool) -> RepoResult<Option<Account>>;
    fn list_accounts(&self, query: &AccountListQuery) -> RepoResult<Vec<Account>>;
    /// Writes `tombstone` onto a live account; already-deleted accounts keep
    /// their first stamp.
    fn soft_delete_account(&self, id: AccountId, tombstone: &SoftDeleteState) -> RepoResult<()>;
    /// Clears the tombstone; live accounts are left untouched.
    fn restore_account(&self, id: AccountId) -> RepoResult<()>;
}

/// SQLite-backed account repository.
pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "accounts", REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }

    fn account_exists(&self, id: AccountId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE uuid = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl UniqueLookup for SqliteAccountRepository<'_> {
    type Id = AccountId;

    fn entity_label(&self) -> &'static str {
        "Account"
    }

    fn value_taken(
        &self,
        field: &str,
        value: &str,
        exclude: Option<AccountId>,
    ) -> RepoResult<bool> {
        let Some(column) = UNIQUE_COLUMNS.iter().find(|column| **column == field) else {
            return Err(RepoError::InvalidData(format!(
                "unsupported unique field `{field}` for accounts"
            )));
        };

        let taken: i64 = self.conn.query_row(
            &format!(
                "SELECT EXISTS(
                    SELECT 1
                    FROM accounts
                    WHERE {column} = ?1
                      AND is_deleted = 0
                      AND (?2 IS NULL OR uuid <> ?2)
                );"
            ),
            params![value, exclude.map(|id| id.to_string())],
            |row| row.get(0),
        )?;
        Ok(taken == 1)
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn create_account(&self, account: &Account) -> RepoResult<AccountId> {
        account.validate()?;

        self.conn
            .execute(
                "INSERT INTO accounts (
                    uuid,
                    email,
                    username,
                    first_name,
                    last_name,
                    job_title,
                    phone,
                    is_active,
                    is_staff,
                    is_superuser,
                    created_at,
                    created_by,
                    updated_at,
                    updated_by,
                    is_deleted,
                    deleted_at,
                    deleted_by
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17);",
                params![
                    account.id.to_string(),
                    account.email.as_str(),
                    account.username.as_str(),
                    account.first_name.as_str(),
                    account.last_name.as_str(),
                    account.job_title.as_str(),
                    account.phone.as_deref(),
                    bool_to_int(account.is_active),
                    bool_to_int(account.is_staff),
                    bool_to_int(account.is_superuser),
                    account.audit.created_at,
                    account.audit.created_by.map(|id| id.to_string()),
                    account.audit.updated_at,
                    account.audit.updated_by.map(|id| id.to_string()),
                    bool_to_int(account.deletion.is_deleted),
                    account.deletion.deleted_at,
                    account.deletion.deleted_by.map(|id| id.to_string()),
                ],
            )
            .map_err(|err| map_write_error(err, duplicate_message))?;

        Ok(account.id)
    }

    fn update_account(&self, account: &Account) -> RepoResult<()> {
        account.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE accounts
                 SET
                    email = ?2,
                    username = ?3,
                    first_name = ?4,
                    last_name = ?5,
                    job_title = ?6,
                    phone = ?7,
                    is_active = ?8,
                    is_staff = ?9,
                    is_superuser = ?10,
                    updated_at = MAX(?11, updated_at + 1),
                    updated_by = ?12
                 WHERE uuid = ?1
                   AND is_deleted = 0;",
                params![
                    account.id.to_string(),
                    account.email.as_str(),
                    account.username.as_str(),
                    account.first_name.as_str(),
                    account.last_name.as_str(),
                    account.job_title.as_str(),
                    account.phone.as_deref(),
                    bool_to_int(account.is_active),
                    bool_to_int(account.is_staff),
                    bool_to_int(account.is_superuser),
                    account.audit.updated_at,
                    account.audit.updated_by.map(|id| id.to_string()),
                ],
            )
            .map_err(|err| map_write_error(err, duplicate_message))?;

        if changed == 0 {
            return Err(RepoError::NotFound(account.id));
        }

        Ok(())
    }

    fn get_account(&self, id: AccountId, include_deleted: bool) -> RepoResult<Option<Account>> {
        self.conn
            .query_row(
                &format!(
                    "{ACCOUNT_SELECT_SQL}
                     WHERE uuid = ?1
                       AND (?2 = 1 OR is_deleted = 0);"
                ),
                params![id.to_string(), bool_to_int(include_deleted)],
                |row| Ok(parse_account_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn find_by_email(&self, email: &str, include_deleted: bool) -> RepoResult<Option<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ACCOUNT_SELECT_SQL}
             WHERE email = ?1
               AND (?2 = 1 OR is_deleted = 0)
             ORDER BY is_deleted ASC, created_at DESC
             LIMIT 1;"
        ))?;

        let mut rows = stmt.query(params![email, bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_account_row(row)?));
        }

        Ok(None)
    }

    fn list_accounts(&self, query: &AccountListQuery) -> RepoResult<Vec<Account>> {
        let mut sql = format!("{ACCOUNT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }

        for (column, filter) in [
            ("is_active", query.is_active),
            ("is_staff", query.is_staff),
            ("is_superuser", query.is_superuser),
        ] {
            if let Some(flag) = filter {
                sql.push_str(&format!(" AND {column} = ?"));
                bind_values.push(Value::Integer(bool_to_int(flag)));
            }
        }

        if let Some(search) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
        {
            sql.push_str(
                " AND (username LIKE ? ESCAPE '\\'
                   OR email LIKE ? ESCAPE '\\'
                   OR first_name LIKE ? ESCAPE '\\'
                   OR last_name LIKE ? ESCAPE '\\')",
            );
            let pattern = format!("%{}%", escape_like(search));
            for _ in 0..4 {
                bind_values.push(Value::Text(pattern.clone()));
            }
        }

        sql.push_str(" ORDER BY created_at DESC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut accounts = Vec::new();

        while let Some(row) = rows.next()? {
            accounts.push(parse_account_row(row)?);
        }

        Ok(accounts)
    }

    fn soft_delete_account(&self, id: AccountId, tombstone: &SoftDeleteState) -> RepoResult<()> {
        let deleted_at = match tombstone {
            SoftDeleteState {
                is_deleted: true,
                deleted_at: Some(deleted_at),
                ..
            } => *deleted_at,
            _ => {
                return Err(RepoError::InvalidData(format!(
                    "account {id}: soft delete needs a tombstone with is_deleted and deleted_at"
                )))
            }
        };

        let changed = self.conn.execute(
            "UPDATE accounts
             SET
                is_deleted = 1,
                deleted_at = ?2,
                deleted_by = ?3
             WHERE uuid = ?1
               AND is_deleted = 0;",
            params![
                id.to_string(),
                deleted_at,
                tombstone.deleted_by.map(|actor| actor.to_string()),
            ],
        )?;

        if changed == 0 && !self.account_exists(id)? {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn restore_account(&self, id: AccountId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE accounts
                 SET
                    is_deleted = 0,
                    deleted_at = NULL,
                    deleted_by = NULL
                 WHERE uuid = ?1
                   AND is_deleted = 1;",
                [id.to_string()],
            )
            .map_err(|err| map_write_error(err, duplicate_message))?;

        if changed == 0 && !self.account_exists(id)? {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn duplicate_message(column: &str) -> String {
    match column {
        "email" => "This email address is already registered.".to_string(),
        "username" => "A user with this username already exists.".to_string(),
        other => format!("An Account with this {other} already exists."),
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn parse_account_row(row: &Row<'_>) -> RepoResult<Account> {
    let uuid_text: String = row.get("uuid")?;

    let account = Account {
        id: parse_uuid(&uuid_text, "accounts.uuid")?,
        email: row.get("email")?,
        username: row.get("username")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        job_title: row.get("job_title")?,
        phone: row.get("phone")?,
        is_active: parse_bool(row.get("is_active")?, "accounts.is_active")?,
        is_staff: parse_bool(row.get("is_staff")?, "accounts.is_staff")?,
        is_superuser: parse_bool(row.get("is_superuser")?, "accounts.is_superuser")?,
        audit: AuditStamp {
            created_at: row.get("created_at")?,
            created_by: parse_optional_uuid(row.get("created_by")?, "accounts.created_by")?,
            updated_at: row.get("updated_at")?,
            updated_by: parse_optional_uuid(row.get("updated_by")?, "accounts.updated_by")?,
        },
        deletion: SoftDeleteState {
            is_deleted: parse_bool(row.get("is_deleted")?, "accounts.is_deleted")?,
            deleted_at: row.get("deleted_at")?,
            deleted_by: parse_optional_uuid(row.get("deleted_by")?, "accounts.deleted_by")?,
        },
    };

    if account.deletion.is_deleted != account.deletion.deleted_at.is_some() {
        return Err(RepoError::InvalidData(format!(
            "inconsistent tombstone for account {}",
            account.id
        )));
    }

    Ok(account)
}
