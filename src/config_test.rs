use super::*;

/// # Safety
/// Callers must hold `ENV_LOCK` so `from_env_*` tests do not race.
unsafe fn clear_app_env() {
    unsafe {
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("PORT");
        std::env::remove_var("WEBHOOK_URLS");
        std::env::remove_var("WEBHOOK_TIMEOUT_SECS");
        std::env::remove_var("CHAT_WEBHOOK_URL");
        std::env::remove_var("CHAT_TIMEOUT_SECS");
        std::env::remove_var("POLL_INTERVAL_SECS");
        std::env::remove_var("POLL_MAX_WAIT_SECS");
        std::env::remove_var("POLL_STABLE_POLLS");
        std::env::remove_var("POLL_RETENTION_SECS");
    }
}

static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: u64 = env_parse("__TEST_DILIGENCE_MISSING__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__TEST_DILIGENCE_VALID__", " 99 ") };
    let val: u64 = env_parse("__TEST_DILIGENCE_VALID__", 0);
    assert_eq!(val, 99);
    unsafe { std::env::remove_var("__TEST_DILIGENCE_VALID__") };
}

#[test]
fn env_parse_present_invalid_returns_default() {
    unsafe { std::env::set_var("__TEST_DILIGENCE_INVALID__", "ten") };
    let val: u32 = env_parse("__TEST_DILIGENCE_INVALID__", 7);
    assert_eq!(val, 7);
    unsafe { std::env::remove_var("__TEST_DILIGENCE_INVALID__") };
}

// =============================================================================
// parse_url_list
// =============================================================================

#[test]
fn parse_url_list_none_is_empty() {
    assert!(parse_url_list(None).is_empty());
}

#[test]
fn parse_url_list_trims_and_skips_blanks() {
    let urls = parse_url_list(Some(" https://a.test/hook , ,https://b.test/hook,"));
    assert_eq!(urls, vec!["https://a.test/hook".to_string(), "https://b.test/hook".to_string()]);
}

// =============================================================================
// AppConfig::from_env
// =============================================================================

#[test]
fn from_env_requires_database_url() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_app_env() };

    let err = AppConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("DATABASE_URL"));
}

#[test]
fn from_env_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_app_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/diligence");
    }

    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert!(cfg.webhook_urls.is_empty());
    assert!(cfg.chat_webhook_url.is_none());
    assert_eq!(cfg.poll.interval, Duration::from_secs(10));
    assert_eq!(cfg.poll.max_wait, Duration::from_secs(600));
    assert_eq!(cfg.poll.stable_polls, 3);
    assert_eq!(cfg.poll_retention, Duration::from_secs(DEFAULT_POLL_RETENTION_SECS));

    unsafe { clear_app_env() };
}

#[test]
fn from_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_app_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/diligence");
        std::env::set_var("PORT", "8080");
        std::env::set_var("WEBHOOK_URLS", "https://a.test/x,https://b.test/y");
        std::env::set_var("CHAT_WEBHOOK_URL", "https://chat.test/hook");
        std::env::set_var("POLL_INTERVAL_SECS", "2");
        std::env::set_var("POLL_MAX_WAIT_SECS", "60");
        std::env::set_var("POLL_STABLE_POLLS", "0");
        std::env::set_var("POLL_RETENTION_SECS", "45");
    }

    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.webhook_urls.len(), 2);
    assert_eq!(cfg.chat_webhook_url.as_deref(), Some("https://chat.test/hook"));
    assert_eq!(cfg.poll.interval, Duration::from_secs(2));
    assert_eq!(cfg.poll.max_wait, Duration::from_secs(60));
    // Zero would complete without observing anything.
    assert_eq!(cfg.poll.stable_polls, 1);
    assert_eq!(cfg.poll_retention, Duration::from_secs(45));

    unsafe { clear_app_env() };
}

#[test]
fn from_env_blank_chat_url_is_none() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_app_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/diligence");
        std::env::set_var("CHAT_WEBHOOK_URL", "   ");
    }

    let cfg = AppConfig::from_env().unwrap();
    assert!(cfg.chat_webhook_url.is_none());

    unsafe { clear_app_env() };
}
