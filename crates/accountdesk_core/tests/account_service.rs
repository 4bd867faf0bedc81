use accountdesk_core::db::open_db_in_memory;
use accountdesk_core::{
    AccountListQuery, AccountService, ActorContext, CompleteProfile, FixedClock, NewAccount,
    ProfileUpdate, RepoError, SqliteAccountRepository, ValidationErrorKind,
};
use rusqlite::Connection;
use uuid::Uuid;

const NOW_MS: i64 = 1_760_000_000_000;

fn service(conn: &Connection) -> AccountService<SqliteAccountRepository<'_>, FixedClock> {
    AccountService::new(
        SqliteAccountRepository::try_new(conn).unwrap(),
        FixedClock::new(NOW_MS),
    )
}

fn jane(email: &str) -> NewAccount {
    NewAccount {
        email: email.to_string(),
        first_name: "Jane".to_string(),
        last_name: "Smith".to_string(),
        ..NewAccount::default()
    }
}

#[test]
fn same_names_get_sequential_usernames() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);
    let actor = ActorContext::system();

    let usernames: Vec<_> = ["a@example.com", "b@example.com", "c@example.com"]
        .into_iter()
        .map(|email| accounts.create_account(jane(email), &actor).unwrap().username)
        .collect();

    assert_eq!(usernames, vec!["jane.smith", "jane.smith1", "jane.smith2"]);
}

#[test]
fn long_identical_names_both_get_valid_usernames() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);
    let actor = ActorContext::system();
    let long_name = |email: &str| NewAccount {
        email: email.to_string(),
        first_name: "Maximiliana".repeat(3),
        last_name: "Vandenberghe".repeat(2),
        ..NewAccount::default()
    };

    let first = accounts
        .create_account(long_name("max1@example.com"), &actor)
        .unwrap();
    let second = accounts
        .create_account(long_name("max2@example.com"), &actor)
        .unwrap();

    assert_eq!(
        first.username,
        "maximilianamaximilianamaximiliana.vandenberghevand"
    );
    assert_eq!(
        second.username,
        "maximilianamaximilianamaximiliana.vandenberghevan1"
    );
    assert_eq!(second.username.chars().count(), 50);

    // The generated name survives later profile edits.
    accounts
        .update_profile(
            second.id,
            ProfileUpdate {
                job_title: Some("Director".to_string()),
                ..ProfileUpdate::default()
            },
            &actor,
        )
        .unwrap();
}

#[test]
fn accented_names_without_username_ask_for_one() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);
    let new = NewAccount {
        email: "jose@example.com".to_string(),
        first_name: "José".to_string(),
        last_name: "García".to_string(),
        ..NewAccount::default()
    };

    let err = accounts
        .create_account(new.clone(), &ActorContext::system())
        .unwrap_err();
    let validation = err.validation().unwrap();
    assert_eq!(validation.kind, ValidationErrorKind::MissingRequiredInput);
    assert_eq!(validation.code, "required_username");

    let created = accounts
        .create_account(
            NewAccount {
                username: Some("jose.garcia".to_string()),
                ..new
            },
            &ActorContext::system(),
        )
        .unwrap();
    assert_eq!(created.first_name, "José");
}

#[test]
fn explicit_username_is_kept_and_email_domain_normalized() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);
    let creator = Uuid::new_v4();

    let created = accounts
        .create_account(
            NewAccount {
                username: Some(" jsmith ".to_string()),
                ..jane(" Jane@Example.COM ")
            },
            &ActorContext::account(creator),
        )
        .unwrap();

    assert_eq!(created.username, "jsmith");
    assert_eq!(created.email, "Jane@example.com");
    assert_eq!(created.audit.created_at, NOW_MS);
    assert_eq!(created.audit.created_by, Some(creator));
    assert_eq!(created.audit.updated_by, Some(creator));
    assert_eq!(
        accounts.find_by_email("Jane@EXAMPLE.com").unwrap().unwrap().id,
        created.id
    );
}

#[test]
fn missing_names_without_username_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);

    let err = accounts
        .create_account(
            NewAccount {
                email: "anon@example.com".to_string(),
                ..NewAccount::default()
            },
            &ActorContext::system(),
        )
        .unwrap_err();
    let err = err.validation().unwrap();
    assert_eq!(err.kind, ValidationErrorKind::MissingRequiredInput);
    assert_eq!(err.code, "required_username");

    let err = accounts
        .create_account(jane("  "), &ActorContext::system())
        .unwrap_err();
    assert_eq!(err.validation().unwrap().code, "required_email");
}

#[test]
fn duplicate_email_is_reported_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);
    accounts
        .create_account(jane("jane@example.com"), &ActorContext::system())
        .unwrap();

    let err = accounts
        .create_account(jane("jane@example.com"), &ActorContext::system())
        .unwrap_err();
    let err = err.validation().unwrap();
    assert_eq!(err.kind, ValidationErrorKind::DuplicateValue);
    assert_eq!(err.code, "unique_email");
}

#[test]
fn create_superuser_sets_both_flags() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);

    let admin = accounts
        .create_superuser(jane("admin@example.com"), &ActorContext::system())
        .unwrap();
    assert!(admin.is_staff);
    assert!(admin.is_superuser);
}

#[test]
fn keeping_own_email_passes_but_taking_another_fails() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);
    let first = accounts
        .create_account(jane("first@example.com"), &ActorContext::system())
        .unwrap();
    accounts
        .create_account(jane("second@example.com"), &ActorContext::system())
        .unwrap();
    let editor = ActorContext::account(first.id);

    let unchanged = accounts
        .update_profile(
            first.id,
            ProfileUpdate {
                email: Some("first@example.com".to_string()),
                ..ProfileUpdate::default()
            },
            &editor,
        )
        .unwrap();
    assert_eq!(unchanged.email, "first@example.com");
    assert!(unchanged.audit.updated_at > first.audit.updated_at);
    assert_eq!(unchanged.audit.updated_by, Some(first.id));
    assert_eq!(unchanged.audit.created_by, None);

    let err = accounts
        .update_profile(
            first.id,
            ProfileUpdate {
                email: Some("second@example.com".to_string()),
                ..ProfileUpdate::default()
            },
            &editor,
        )
        .unwrap_err();
    assert!(err.validation().unwrap().is_duplicate());
}

#[test]
fn profile_completion_gate() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);
    let created = accounts
        .create_account(jane("jane@example.com"), &ActorContext::system())
        .unwrap();
    assert!(accounts.needs_profile_completion(created.id).unwrap());

    let err = accounts
        .complete_profile(
            created.id,
            CompleteProfile {
                first_name: "Jane".to_string(),
                last_name: "Smith".to_string(),
                job_title: " ".to_string(),
                phone: None,
            },
            &ActorContext::account(created.id),
        )
        .unwrap_err();
    assert_eq!(err.validation().unwrap().code, "required_job_title");

    let completed = accounts
        .complete_profile(
            created.id,
            CompleteProfile {
                first_name: "Jane".to_string(),
                last_name: "Smith".to_string(),
                job_title: "Analyst".to_string(),
                phone: Some("555-123-4567".to_string()),
            },
            &ActorContext::account(created.id),
        )
        .unwrap();
    assert!(completed.is_profile_complete());
    assert_eq!(completed.phone.as_deref(), Some("555-123-4567"));
    assert!(!accounts.needs_profile_completion(created.id).unwrap());
}

#[test]
fn soft_delete_hides_account_and_restore_brings_it_back() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);
    let admin = Uuid::new_v4();
    let created = accounts
        .create_account(jane("jane@example.com"), &ActorContext::system())
        .unwrap();

    let tombstoned = accounts
        .soft_delete(created.id, &ActorContext::account(admin))
        .unwrap();
    assert!(tombstoned.deletion.is_deleted);
    assert!(accounts.get(created.id, false).unwrap().is_none());
    assert!(accounts
        .list(&AccountListQuery::default())
        .unwrap()
        .is_empty());

    let deleted = accounts.get(created.id, true).unwrap().unwrap();
    assert_eq!(deleted.deletion.deleted_at, Some(NOW_MS));
    assert_eq!(deleted.deletion.deleted_by, Some(admin));
    assert_eq!(deleted, tombstoned);

    // The username is free again while the original is deleted.
    assert_eq!(
        accounts.suggest_username("Jane", "Smith").unwrap().as_deref(),
        Some("jane.smith")
    );

    let restored = accounts
        .restore(created.id, &ActorContext::account(admin))
        .unwrap();
    assert_eq!(restored, created);
    assert_eq!(accounts.get(created.id, false).unwrap().unwrap(), created);
}

#[test]
fn restoring_a_live_account_leaves_it_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);
    let created = accounts
        .create_account(jane("jane@example.com"), &ActorContext::system())
        .unwrap();

    let restored = accounts
        .restore(created.id, &ActorContext::account(Uuid::new_v4()))
        .unwrap();

    let stored = accounts.get(created.id, true).unwrap().unwrap();
    assert_eq!(restored, created);
    assert_eq!(stored, created);
    assert_eq!(stored.audit.updated_at, created.audit.updated_at);
    assert_eq!(stored.deletion, created.deletion);
}

#[test]
fn deleting_twice_keeps_the_first_tombstone() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);
    let first_admin = Uuid::new_v4();
    let created = accounts
        .create_account(jane("jane@example.com"), &ActorContext::system())
        .unwrap();

    let first = accounts
        .soft_delete(created.id, &ActorContext::account(first_admin))
        .unwrap();
    let second = accounts
        .soft_delete(created.id, &ActorContext::account(Uuid::new_v4()))
        .unwrap();

    assert_eq!(second, first);
    assert_eq!(second.deletion.deleted_by, Some(first_admin));
}

#[test]
fn lifecycle_on_unknown_account_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);
    let missing = Uuid::new_v4();

    assert!(matches!(
        accounts.soft_delete(missing, &ActorContext::system()),
        Err(RepoError::NotFound(id)) if id == missing
    ));
    assert!(matches!(
        accounts.restore(missing, &ActorContext::system()),
        Err(RepoError::NotFound(id)) if id == missing
    ));
}

#[test]
fn editing_deleted_account_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);
    let created = accounts
        .create_account(jane("jane@example.com"), &ActorContext::system())
        .unwrap();
    accounts
        .soft_delete(created.id, &ActorContext::system())
        .unwrap();

    let err = accounts
        .update_profile(
            created.id,
            ProfileUpdate {
                job_title: Some("Analyst".to_string()),
                ..ProfileUpdate::default()
            },
            &ActorContext::system(),
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == created.id));
}

#[test]
fn clearing_phone_with_empty_string() {
    let conn = open_db_in_memory().unwrap();
    let accounts = service(&conn);
    let created = accounts
        .create_account(
            NewAccount {
                phone: Some("+1 555 123 4567".to_string()),
                ..jane("jane@example.com")
            },
            &ActorContext::system(),
        )
        .unwrap();
    assert!(created.phone.is_some());

    let updated = accounts
        .update_profile(
            created.id,
            ProfileUpdate {
                phone: Some(String::new()),
                ..ProfileUpdate::default()
            },
            &ActorContext::system(),
        )
        .unwrap();
    assert_eq!(updated.phone, None);
}
