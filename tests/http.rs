use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct DayReport {
    date: String,
    target: u32,
    pushup_total: u32,
    squat_total: u32,
    complete: bool,
    pushup_sets: Vec<SetEntry>,
    total_minutes: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SetEntry {
    set_index: u32,
    reps: u32,
}

#[derive(Debug, Deserialize)]
struct AddSetResponse {
    set_index: u32,
    reps: u32,
    today: DayReport,
}

#[derive(Debug, Deserialize)]
struct DurationResponse {
    minutes: f64,
    outcome: String,
}

#[derive(Debug, Deserialize)]
struct TimerSession {
    started_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TimerStopResponse {
    minutes: u32,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("workout_log_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/today")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_workout_log"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("APP_DURATION_POLICY", "upsert")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn today(client: &Client, server: &TestServer) -> DayReport {
    client
        .get(format!("{}/api/today", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_add_set_numbers_sets_and_updates_totals() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = today(&client, &server).await;
    assert_eq!(before.target, 100);

    let first: AddSetResponse = client
        .post(format!("{}/api/sets", server.base_url))
        .json(&serde_json::json!({ "exercise": "Pushup", "reps": 60 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: AddSetResponse = client
        .post(format!("{}/api/sets", server.base_url))
        .json(&serde_json::json!({ "exercise": "Pushup", "reps": 45 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(second.set_index, first.set_index + 1);
    assert_eq!(second.reps, 45);
    assert_eq!(second.today.pushup_total, before.pushup_total + 105);
    assert_eq!(second.today.squat_total, before.squat_total);
    assert!(!second.today.complete || before.squat_total >= 100);

    let after = today(&client, &server).await;
    let last = after.pushup_sets.last().expect("logged set");
    assert_eq!(last.set_index, second.set_index);
    assert_eq!(last.reps, 45);

    let day: DayReport = client
        .get(format!("{}/api/days/{}", server.base_url, after.date))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(day.pushup_total, after.pushup_total);
}

#[tokio::test]
async fn http_rejects_invalid_input() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    for reps in [0, -5] {
        let response = client
            .post(format!("{}/api/sets", server.base_url))
            .json(&serde_json::json!({ "exercise": "Squat", "reps": reps }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = client
        .post(format!("{}/api/duration", server.base_url))
        .json(&serde_json::json!({ "minutes": -1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{}/api/days/27-04-2025", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/api/timer/stop", server.base_url))
        .json(&serde_json::json!({ "started_at": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_duration_first_write_wins() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = today(&client, &server).await;

    let first: DurationResponse = client
        .post(format!("{}/api/duration", server.base_url))
        .json(&serde_json::json!({ "minutes": 25 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: DurationResponse = client
        .post(format!("{}/api/duration", server.base_url))
        .json(&serde_json::json!({ "minutes": 40 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(second.outcome, "already_recorded");
    assert_eq!(second.minutes, 40.0);

    let after = today(&client, &server).await;
    match before.total_minutes {
        Some(existing) => {
            assert_eq!(first.outcome, "already_recorded");
            assert_eq!(after.total_minutes, Some(existing));
        }
        None => {
            assert_eq!(first.outcome, "recorded");
            assert_eq!(after.total_minutes, Some(25.0));
        }
    }
}

#[tokio::test]
async fn http_timer_round_trip_commits_duration() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let session: TimerSession = client
        .post(format!("{}/api/timer/start", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(session.started_at.is_some());

    let stopped: TimerStopResponse = client
        .post(format!("{}/api/timer/stop", server.base_url))
        .json(&serde_json::json!({ "started_at": session.started_at }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stopped.minutes, 0);

    let after = today(&client, &server).await;
    assert!(after.total_minutes.is_some());
}

#[tokio::test]
async fn http_dashboard_renders_tabs_and_notices() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/?tab=today&notice=set_added&exercise=Squat&set=3&reps=20",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let html = response.text().await.unwrap();
    assert!(html.contains("100 Challenge"));
    assert!(html.contains("Set 3 added: 20 Squat"));
    assert!(html.contains(r#"action="/sets""#));

    let html = client
        .get(format!("{}/?tab=progress", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Your progress"));
}
