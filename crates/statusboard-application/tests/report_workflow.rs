use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tempfile::TempDir;

use statusboard_application::{AppContext, ReportForm};
use statusboard_core::config::AppConfig;
use statusboard_core::identity::{ExternalUser, IdentityMode, Role, Session};
use statusboard_core::notification::NullNotifier;
use statusboard_infrastructure::StatusboardPaths;

async fn open(temp_dir: &TempDir, config: AppConfig) -> AppContext {
    let paths = StatusboardPaths::new(Some(temp_dir.path())).unwrap();
    AppContext::open(&paths, config, Arc::new(NullNotifier))
        .await
        .unwrap()
}

#[tokio::test]
async fn reports_survive_a_restart() {
    let temp_dir = TempDir::new().unwrap();

    let first = open(&temp_dir, AppConfig::default()).await;
    assert_eq!(first.reports().list().await.len(), 2);
    let created = first
        .reports()
        .create_report(ReportForm {
            title: Some("Sprint Review".to_string()),
            team: Some("Platform".to_string()),
            accomplishments: Some("One\nTwo\nThree".to_string()),
            blockers: Some("Waiting on review".to_string()),
            plans: Some("Ship\nDemo".to_string()),
            ..ReportForm::default()
        })
        .await
        .unwrap();
    first.shutdown();
    drop(first);

    let second = open(&temp_dir, AppConfig::default()).await;
    let reports = second.reports().list().await;
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0], created);
}

#[tokio::test]
async fn disabled_persistence_leaves_stored_data_alone() {
    let temp_dir = TempDir::new().unwrap();

    let first = open(&temp_dir, AppConfig::default()).await;
    first.reports().set_persistence(false).await;
    first
        .reports()
        .create_report(ReportForm::default())
        .await
        .unwrap();
    assert_eq!(first.reports().list().await.len(), 3);
    drop(first);

    let second = open(&temp_dir, AppConfig::default()).await;
    assert_eq!(second.reports().list().await.len(), 2);
}

#[tokio::test]
async fn mock_role_and_user_survive_a_restart() {
    let temp_dir = TempDir::new().unwrap();

    let first = open(&temp_dir, AppConfig::default()).await;
    first.accounts().set_role(Role::Admin);
    first
        .accounts()
        .sign_in(Some("Kim Lee"), Some("kim@example.com"))
        .unwrap();
    drop(first);

    let second = open(&temp_dir, AppConfig::default()).await;
    let identity = second.accounts().current();
    assert_eq!(identity.mode, IdentityMode::Mock);
    assert_eq!(identity.primary_role, Role::Admin);
    assert_eq!(identity.email(), Some("kim@example.com"));

    // Summary generation is open to privileged mock users
    let id = second.reports().list().await[0].id.clone();
    let summary = second.reports().generate_summary(&id).await.unwrap();
    assert!(summary.is_some());
}

#[tokio::test]
async fn external_mode_reads_cached_session() {
    let temp_dir = TempDir::new().unwrap();
    let paths = StatusboardPaths::new(Some(temp_dir.path())).unwrap();
    std::fs::create_dir_all(paths.root()).unwrap();
    let session = Session {
        access_token: "token".to_string(),
        expires_at: Some(Utc::now() + Duration::hours(1)),
        user: ExternalUser {
            id: "u-42".to_string(),
            email: "dana@example.com".to_string(),
            user_metadata: json!({ "full_name": "Dana Park", "roles": ["employee", "admin"] }),
        },
    };
    std::fs::write(paths.session_file(), serde_json::to_string(&session).unwrap()).unwrap();

    let config = AppConfig {
        service_endpoint: Some("https://auth.example.com".to_string()),
        service_credential: Some("anon".to_string()),
        ..AppConfig::default()
    };
    let context = AppContext::open(&paths, config, Arc::new(NullNotifier))
        .await
        .unwrap();

    let identity = context.accounts().current();
    assert_eq!(identity.mode, IdentityMode::External);
    assert!(identity.is_authenticated());
    assert_eq!(identity.primary_role, Role::Admin);
    assert_eq!(identity.user.unwrap().name, "Dana Park");

    // Admin may delete, but summary generation stays off in external mode
    let id = context.reports().list().await[0].id.clone();
    assert!(context.reports().generate_summary(&id).await.is_err());
    assert!(context.reports().delete_report(&id).await.unwrap());

    context.accounts().sign_out().await.unwrap();
    assert!(!context.accounts().current().is_authenticated());
    assert!(!paths.session_file().exists());

    // Role metadata is gone with the session; writes are refused
    let err = context.reports().create_report(ReportForm::default()).await.unwrap_err();
    assert!(err.is_permission_denied());
    context.shutdown();
}
