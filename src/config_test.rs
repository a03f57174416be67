use super::*;

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: u16 = env_parse("__LOGBOARD_TEST_MISSING__", 3000);
    assert_eq!(val, 3000);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__LOGBOARD_TEST_VALID__", " 8080 ") };
    let val: u16 = env_parse("__LOGBOARD_TEST_VALID__", 0);
    assert_eq!(val, 8080);
    unsafe { std::env::remove_var("__LOGBOARD_TEST_VALID__") };
}

#[test]
fn env_parse_invalid_returns_default() {
    unsafe { std::env::set_var("__LOGBOARD_TEST_INVALID__", "lots") };
    let val: u32 = env_parse("__LOGBOARD_TEST_INVALID__", 5);
    assert_eq!(val, 5);
    unsafe { std::env::remove_var("__LOGBOARD_TEST_INVALID__") };
}

// =============================================================================
// StoreKind / names
// =============================================================================

#[test]
fn store_kind_defaults_to_postgres() {
    assert_eq!(StoreKind::parse("memory"), StoreKind::Memory);
    assert_eq!(StoreKind::parse(" MEMORY "), StoreKind::Memory);
    assert_eq!(StoreKind::parse("postgres"), StoreKind::Postgres);
    assert_eq!(StoreKind::parse("sqlite"), StoreKind::Postgres);
}

#[test]
fn names_are_trimmed_and_blank_entries_dropped() {
    assert_eq!(parse_names(" Ada, ,Grace ,"), vec!["Ada".to_owned(), "Grace".to_owned()]);
}

#[test]
fn empty_name_list_uses_default_roster() {
    assert_eq!(parse_names(" , "), vec!["Alice".to_owned(), "Bob".to_owned(), "Carol".to_owned()]);
}
