//! Test harness: the real router on an ephemeral port, backed by a
//! throwaway SQLite file and a manual clock.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use gustanto_db::{Database, DbConfig};
use gustanto_server::notify::NotifyResult;
use gustanto_server::{
    router, AppState, ManualClock, Notifier, SchedulerHandle, SchedulerSettings, SummaryScheduler,
};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Collects every message instead of sending it.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> NotifyResult<()> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub clock: Arc<ManualClock>,
    pub db: Database,
    pub scheduler: SummaryScheduler<RecordingNotifier>,
    pub scheduler_handle: SchedulerHandle,
    pub notifier: RecordingNotifier,
    _dir: TempDir,
}

/// 2024-05-01 at the given time.
pub fn may_first(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

impl TestServer {
    /// Starts a server whose clock reads 2024-05-01T12:00:00.
    pub async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("gustanto_test.db")))
            .await
            .unwrap();

        let clock = Arc::new(ManualClock::new(may_first(12, 0)));
        let notifier = RecordingNotifier::default();
        let (scheduler, scheduler_handle) = SummaryScheduler::new(
            db.clone(),
            clock.clone(),
            notifier.clone(),
            SchedulerSettings::default(),
        );

        let state = AppState::new(db.clone(), clock.clone(), scheduler_handle.clone());
        let app = router(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            clock,
            db,
            scheduler,
            scheduler_handle,
            notifier,
            _dir: dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn get_json(&self, path: &str) -> serde_json::Value {
        let response = self.get(path).await;
        assert!(response.status().is_success(), "GET {} -> {}", path, response.status());
        response.json().await.unwrap()
    }

    pub async fn post(&self, path: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn post_empty(&self, path: &str) -> reqwest::Response {
        self.client.post(self.url(path)).send().await.unwrap()
    }
}
