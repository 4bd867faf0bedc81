//! Group repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Group names are unique; violations surface as `DuplicateValue`.
//! - Listings are ordered by `(sort_order, name)`.

use super::{ensure_connection_ready, map_write_error, parse_uuid, RepoError, RepoResult};
use crate::model::group::{Group, GroupId};
use crate::validation::ValidationError;
use rusqlite::{params, Connection, OptionalExtension, Row};

const GROUP_SELECT_SQL: &str = "SELECT uuid, name, sort_order FROM groups";
const REQUIRED_COLUMNS: &[&str] = &["uuid", "name", "sort_order"];
const GROUP_NAME_MAX_CHARS: usize = 150;

/// Repository interface for account groups.
pub trait GroupRepository {
    fn create_group(&self, group: &Group) -> RepoResult<GroupId>;
    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>>;
    fn list_groups(&self) -> RepoResult<Vec<Group>>;
}

/// SQLite-backed group repository.
pub struct SqliteGroupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGroupRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "groups", REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl GroupRepository for SqliteGroupRepository<'_> {
    fn create_group(&self, group: &Group) -> RepoResult<GroupId> {
        let name = group.name.trim();
        if name.is_empty() {
            return Err(ValidationError::missing("name").into());
        }
        if name.chars().count() > GROUP_NAME_MAX_CHARS {
            return Err(ValidationError::out_of_range(
                "max_length_name",
                format!("Group names are limited to {GROUP_NAME_MAX_CHARS} characters."),
            )
            .into());
        }

        self.conn
            .execute(
                "INSERT INTO groups (uuid, name, sort_order) VALUES (?1, ?2, ?3);",
                params![group.id.to_string(), name, group.sort_order],
            )
            .map_err(|err| {
                map_write_error(err, |column| {
                    format!("A Group with this {column} already exists.")
                })
            })?;

        Ok(group.id)
    }

    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>> {
        self.conn
            .query_row(
                &format!("{GROUP_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                |row| Ok(parse_group_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_groups(&self) -> RepoResult<Vec<Group>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GROUP_SELECT_SQL} ORDER BY sort_order ASC, name ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            groups.push(parse_group_row(row)?);
        }
        Ok(groups)
    }
}

fn parse_group_row(row: &Row<'_>) -> RepoResult<Group> {
    let uuid_text: String = row.get("uuid")?;
    let sort_order: i64 = row.get("sort_order")?;
    let sort_order = u32::try_from(sort_order).map_err(|_| {
        RepoError::InvalidData(format!("invalid sort order `{sort_order}` in groups.sort_order"))
    })?;

    Ok(Group {
        id: parse_uuid(&uuid_text, "groups.uuid")?,
        name: row.get("name")?,
        sort_order,
    })
}
