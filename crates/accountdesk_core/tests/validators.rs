use accountdesk_core::db::open_db_in_memory;
use accountdesk_core::validation::{
    validate_alphanumeric, validate_date_not_in_future, validate_date_not_in_past, validate_email,
    validate_hex_color, validate_human_name, validate_numeric, validate_phone, validate_sku_code,
    validate_slug, validate_unique_field, validate_username, validate_uuid, ContentTypeAllowList,
    FileSizeLimit, MinimumAge, UploadedFile,
};
use accountdesk_core::{
    AccountService, ActorContext, Clock, FixedClock, NewAccount, SqliteAccountRepository,
    ValidationErrorKind, ValidationResult,
};
use chrono::{Days, NaiveDate};

const MB: u64 = 1024 * 1024;

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn assert_code(result: ValidationResult, code: &str) {
    let err = result.unwrap_err();
    assert_eq!(err.code, code);
    assert!(!err.message.is_empty());
}

#[test]
fn accepted_format_inputs_revalidate() {
    let cases: [(fn(&str) -> ValidationResult, &str); 10] = [
        (validate_numeric, "0123456789"),
        (validate_alphanumeric, "abcXYZ123"),
        (validate_slug, "my-first-post"),
        (validate_human_name, "Zoë O'Brien-Núñez"),
        (validate_username, "jane.smith_01"),
        (validate_hex_color, "#A1b2C3"),
        (validate_uuid, "123e4567-e89b-42d3-a456-426614174000"),
        (validate_sku_code, "SKU_2024-01"),
        (validate_email, "jane.doe+tag@mail.example.org"),
        (validate_phone, "+63 912 345 6789"),
    ];

    for (validate, input) in cases {
        validate(input).unwrap();
        validate(input).unwrap();
    }
}

#[test]
fn hex_color_accepts_three_or_six_digits_only() {
    validate_hex_color("#fff").unwrap();
    validate_hex_color("#ffffff").unwrap();
    assert_code(validate_hex_color("#fffff"), "invalid_hex_color");
    assert_code(validate_hex_color("fff"), "invalid_hex_color");
}

#[test]
fn format_rejections_carry_their_codes() {
    assert_code(validate_numeric("12a"), "invalid_numeric");
    assert_code(validate_alphanumeric("abc-1"), "invalid_alphanumeric");
    assert_code(validate_slug("double--hyphen"), "invalid_slug");
    assert_code(validate_human_name("R2-D2"), "invalid_name");
    assert_code(validate_username("ab"), "invalid_username");
    assert_code(validate_username(&"a".repeat(51)), "invalid_username");
    assert_code(validate_uuid("123e4567-e89b-02d3-a456-426614174000"), "invalid_uuid");
    assert_code(validate_sku_code("sku-lower"), "invalid_sku_code");
    assert_code(validate_sku_code(&"A".repeat(33)), "invalid_sku_code");
    assert_code(validate_email("jane@localhost"), "invalid_email");
    assert_code(validate_phone("12345"), "invalid_phone");

    let err = validate_slug("Upper").unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::InvalidFormat);
}

#[test]
fn minimum_age_boundary() {
    let today = day(2026, 10, 16);
    let adult = MinimumAge::new(18);

    adult.validate(day(2008, 10, 16), today).unwrap();
    let one_day_short = day(2008, 10, 16).checked_add_days(Days::new(1)).unwrap();
    let err = adult.validate(one_day_short, today).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::OutOfRange);
    assert_eq!(err.code, "min_age");
    assert_eq!(err.message, "Must be at least 18 years old.");
}

#[test]
fn minimum_age_uses_the_injected_clock() {
    let clock = FixedClock::at_date(day(2026, 3, 1));
    MinimumAge::new(18)
        .validate(day(2008, 2, 29), clock.today())
        .unwrap();
}

#[test]
fn date_bounds_accept_today() {
    let today = day(2026, 10, 16);
    validate_date_not_in_past(today, today).unwrap();
    validate_date_not_in_future(today, today).unwrap();

    assert_code(
        validate_date_not_in_past(day(2026, 10, 15), today),
        "date_in_past",
    );
    assert_code(
        validate_date_not_in_future(day(2026, 10, 17), today),
        "date_in_future",
    );
}

#[test]
fn file_size_limit_is_inclusive() {
    let limit = FileSizeLimit::new(5);
    limit
        .validate(&UploadedFile::new(5 * MB, Some("image/png")))
        .unwrap();

    let err = limit
        .validate(&UploadedFile::new(5 * MB + 1, Some("image/png")))
        .unwrap_err();
    assert_eq!(err.code, "file_too_large");
    assert_eq!(err.message, "File too large. Maximum allowed is 5 MB.");

    assert!(limit
        .validate(&UploadedFile::new(6 * MB, Some("image/png")))
        .is_err());
}

#[test]
fn content_type_must_be_listed_exactly() {
    let allowed = ContentTypeAllowList::new(["image/png", "image/jpeg"]);
    allowed
        .validate(&UploadedFile::new(10, Some("image/jpeg")))
        .unwrap();

    let err = allowed
        .validate(&UploadedFile::new(10, Some("application/pdf")))
        .unwrap_err();
    assert_eq!(err.code, "invalid_content_type");
    assert_eq!(err.message, "Invalid file type. Allowed: image/png, image/jpeg");

    assert_code(
        allowed.validate(&UploadedFile::new(10, None::<String>)),
        "invalid_content_type",
    );
}

#[test]
fn unique_field_validator_against_storage() {
    let conn = open_db_in_memory().unwrap();
    let accounts = AccountService::new(
        SqliteAccountRepository::try_new(&conn).unwrap(),
        FixedClock::new(1_000),
    );
    let created = accounts
        .create_account(
            NewAccount {
                email: "jane@example.com".to_string(),
                username: Some("jane".to_string()),
                ..NewAccount::default()
            },
            &ActorContext::system(),
        )
        .unwrap();
    let repo = accounts.repository();

    let err = validate_unique_field(repo, "username", Some("jane"), None, None).unwrap_err();
    let err = err.validation().unwrap();
    assert_eq!(err.code, "unique_username");
    assert_eq!(err.message, "A Account with this username already exists.");

    validate_unique_field(repo, "username", Some("jane"), Some(created.id), None).unwrap();
    validate_unique_field(repo, "username", Some(""), None, None).unwrap();
    validate_unique_field(repo, "username", None, None, None).unwrap();

    let err = validate_unique_field(
        repo,
        "email",
        Some("jane@example.com"),
        None,
        Some("Pick another email."),
    )
    .unwrap_err();
    assert_eq!(err.validation().unwrap().message, "Pick another email.");
}
