//! Record lifecycle metadata: audit stamps, soft-delete tombstones and the
//! acting identity behind each mutation.
//!
//! # Invariants
//! - `created_at`/`created_by` are written once and never changed.
//! - `updated_at` strictly increases on every `touch`.
//! - `restore` is the exact inverse of `soft_delete` for the tombstone fields.
//! - Actor references are weak ids; nothing here owns or cascades to accounts.

use super::account::AccountId;
use serde::{Deserialize, Serialize};

/// Identity performing a mutation, passed explicitly into every write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActorContext {
    actor: Option<AccountId>,
}

impl ActorContext {
    /// Mutation performed by the system itself (migrations, CLI bootstrap).
    pub fn system() -> Self {
        Self { actor: None }
    }

    /// Mutation performed on behalf of a signed-in account.
    pub fn account(id: AccountId) -> Self {
        Self { actor: Some(id) }
    }

    pub fn actor_id(&self) -> Option<AccountId> {
        self.actor
    }
}

/// Who/when created and last modified a record. Timestamps are epoch ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub created_at: i64,
    pub created_by: Option<AccountId>,
    pub updated_at: i64,
    pub updated_by: Option<AccountId>,
}

impl AuditStamp {
    /// Stamp for a record first written at `now`.
    pub fn created(now_ms: i64, actor: &ActorContext) -> Self {
        Self {
            created_at: now_ms,
            created_by: actor.actor_id(),
            updated_at: now_ms,
            updated_by: actor.actor_id(),
        }
    }

    /// Records a modification; `updated_at` advances even if the clock did not.
    pub fn touch(&mut self, now_ms: i64, actor: &ActorContext) {
        self.updated_at = next_update_stamp(self.updated_at, now_ms);
        self.updated_by = actor.actor_id();
    }
}

/// Strictly increasing successor of `previous`, preferring `now_ms`.
pub fn next_update_stamp(previous: i64, now_ms: i64) -> i64 {
    now_ms.max(previous.saturating_add(1))
}

/// Soft-delete tombstone fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SoftDeleteState {
    pub is_deleted: bool,
    pub deleted_at: Option<i64>,
    pub deleted_by: Option<AccountId>,
}

/// Records that are hidden instead of physically removed.
pub trait SoftDeletable {
    fn deletion(&self) -> &SoftDeleteState;
    fn deletion_mut(&mut self) -> &mut SoftDeleteState;

    /// Marks the record deleted at `now_ms` by `actor`.
    fn soft_delete(&mut self, now_ms: i64, actor: &ActorContext) {
        *self.deletion_mut() = SoftDeleteState {
            is_deleted: true,
            deleted_at: Some(now_ms),
            deleted_by: actor.actor_id(),
        };
    }

    /// Clears all tombstone fields. No-op for live records.
    fn restore(&mut self) {
        *self.deletion_mut() = SoftDeleteState::default();
    }

    fn is_live(&self) -> bool {
        !self.deletion().is_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::{next_update_stamp, ActorContext, AuditStamp};
    use uuid::Uuid;

    #[test]
    fn touch_keeps_creation_fields() {
        let creator = ActorContext::account(Uuid::new_v4());
        let editor = ActorContext::account(Uuid::new_v4());
        let mut stamp = AuditStamp::created(1_000, &creator);

        stamp.touch(5_000, &editor);

        assert_eq!(stamp.created_at, 1_000);
        assert_eq!(stamp.created_by, creator.actor_id());
        assert_eq!(stamp.updated_at, 5_000);
        assert_eq!(stamp.updated_by, editor.actor_id());
    }

    #[test]
    fn update_stamp_advances_when_clock_stalls_or_goes_back() {
        assert_eq!(next_update_stamp(1_000, 1_000), 1_001);
        assert_eq!(next_update_stamp(1_000, 900), 1_001);
        assert_eq!(next_update_stamp(1_000, 2_000), 2_000);
    }
}
