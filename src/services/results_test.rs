use super::*;

fn row(criterion: &str, passed: Option<bool>) -> AiOutput {
    AiOutput {
        id: 1,
        session_id: "Ab3dEf7hIj".into(),
        criterion: criterion.into(),
        performance: Some(0.4),
        threshold: Some(0.5),
        passed,
        context: None,
    }
}

// =============================================================================
// summarize
// =============================================================================

#[test]
fn summarize_empty() {
    assert_eq!(summarize(&[]), ResultSummary { total: 0, passed: 0, failed: 0 });
}

#[test]
fn summarize_counts_outcomes() {
    let rows = vec![
        row("carbon_intensity", Some(true)),
        row("water_usage", Some(false)),
        row("board_diversity", Some(true)),
    ];
    assert_eq!(summarize(&rows), ResultSummary { total: 3, passed: 2, failed: 1 });
}

#[test]
fn summarize_pending_rows_only_in_total() {
    let rows = vec![row("carbon_intensity", None), row("water_usage", Some(false))];
    assert_eq!(summarize(&rows), ResultSummary { total: 2, passed: 0, failed: 1 });
}

#[test]
fn ai_output_serializes_fields() {
    let json = serde_json::to_value(row("water_usage", Some(false))).unwrap();
    assert_eq!(json["criterion"], "water_usage");
    assert_eq!(json["passed"], false);
    assert!(json["context"].is_null());
}

// =============================================================================
// live database
// =============================================================================

#[cfg(feature = "live-db-tests")]
#[tokio::test]
async fn count_and_list_results_live() {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL required for live-db-tests");
    let pool = crate::db::init_pool(&url).await.unwrap();
    let session_id = crate::services::ident::generate_id();

    assert_eq!(count_results(&pool, &session_id).await.unwrap(), 0);

    for (criterion, passed) in [("b_criterion", true), ("a_criterion", false)] {
        sqlx::query("INSERT INTO ai_output (session_id, criterion, passed) VALUES ($1, $2, $3)")
            .bind(&session_id)
            .bind(criterion)
            .bind(passed)
            .execute(&pool)
            .await
            .unwrap();
    }

    assert_eq!(ResultCounter::count_results(&pool, &session_id).await.unwrap(), 2);
    let rows = list_results(&pool, &session_id).await.unwrap();
    assert_eq!(rows[0].criterion, "a_criterion");
    assert_eq!(summarize(&rows), ResultSummary { total: 2, passed: 1, failed: 1 });
}
