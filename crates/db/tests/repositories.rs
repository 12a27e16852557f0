use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use sysguard_core::autofix::{ActionOutcome, TriggeredAction};
use sysguard_db::models::alert::CreateAlert;
use sysguard_db::models::metric_sample::CreateMetricSample;
use sysguard_db::repositories::{AlertRepo, MetricSampleRepo};

fn sample(cpu: f64) -> CreateMetricSample {
    CreateMetricSample {
        cpu_percent: cpu,
        memory_percent: 50.0,
        disk_percent: 70.0,
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn migrations_create_both_tables(pool: SqlitePool) {
    sysguard_db::health_check(&pool).await.unwrap();

    for table in ["alerts", "metric_samples"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

fn triggered(rule: &str, action: &str, outcome: ActionOutcome) -> TriggeredAction {
    TriggeredAction {
        rule_name: rule.to_string(),
        action: action.to_string(),
        outcome,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn triggered_rules_become_typed_alerts(pool: SqlitePool) {
    let cycle = [
        triggered("HighCPU", "clear_cache", ActionOutcome::Succeeded),
        triggered("Web", "restart_nginx", ActionOutcome::Failed),
    ];

    assert_eq!(AlertRepo::record_triggered(&pool, &cycle).await, 2);

    let alerts = AlertRepo::list_recent(&pool, 10).await.unwrap();
    assert_eq!(alerts[0].alert_type, "action_failed");
    assert_eq!(alerts[0].message, "Rule 'Web' triggered: restart_nginx");
    assert_eq!(alerts[1].alert_type, "autofix");
}

#[sqlx::test(migrations = "./migrations")]
async fn unwritable_alert_log_does_not_abort_recording(pool: SqlitePool) {
    sqlx::query("DROP TABLE alerts").execute(&pool).await.unwrap();
    let cycle = [
        triggered("A", "clear_cache", ActionOutcome::Succeeded),
        triggered("B", "clear_cache", ActionOutcome::Succeeded),
    ];

    assert_eq!(AlertRepo::record_triggered(&pool, &cycle).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn alert_insert_returns_row(pool: SqlitePool) {
    let alert = AlertRepo::insert(
        &pool,
        &CreateAlert {
            alert_type: "autofix".to_string(),
            message: "Rule 'HighCPU' triggered: clear_cache".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(alert.id > 0);
    assert_eq!(alert.alert_type, "autofix");
    assert_eq!(alert.message, "Rule 'HighCPU' triggered: clear_cache");
    assert!(Utc::now() - alert.recorded_at < Duration::minutes(1));
}

#[sqlx::test(migrations = "./migrations")]
async fn alerts_list_newest_first_with_limit(pool: SqlitePool) {
    for i in 0..5 {
        AlertRepo::insert(
            &pool,
            &CreateAlert {
                alert_type: "autofix".to_string(),
                message: format!("alert {i}"),
            },
        )
        .await
        .unwrap();
    }

    let recent = AlertRepo::list_recent(&pool, 3).await.unwrap();
    let messages: Vec<&str> = recent.iter().map(|a| a.message.as_str()).collect();
    assert_eq!(messages, vec!["alert 4", "alert 3", "alert 2"]);

    let all = AlertRepo::list_recent(&pool, 100).await.unwrap();
    assert_eq!(all.len(), 5);
}

// ---------------------------------------------------------------------------
// Metric samples
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn samples_list_newest_first(pool: SqlitePool) {
    MetricSampleRepo::insert(&pool, &sample(10.0)).await.unwrap();
    MetricSampleRepo::insert(&pool, &sample(20.0)).await.unwrap();

    let recent = MetricSampleRepo::list_recent(&pool, 10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].cpu_percent, 20.0);
    assert_eq!(recent[1].cpu_percent, 10.0);
    assert_eq!(recent[0].disk_percent, 70.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn retention_deletes_only_old_samples(pool: SqlitePool) {
    let now = Utc::now();
    MetricSampleRepo::insert_at(&pool, &sample(1.0), now - Duration::hours(48))
        .await
        .unwrap();
    MetricSampleRepo::insert_at(&pool, &sample(2.0), now - Duration::hours(25))
        .await
        .unwrap();
    MetricSampleRepo::insert_at(&pool, &sample(3.0), now - Duration::minutes(5))
        .await
        .unwrap();

    let deleted = MetricSampleRepo::delete_older_than(&pool, now - Duration::hours(24))
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    let remaining = MetricSampleRepo::list_recent(&pool, 10).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].cpu_percent, 3.0);
}
