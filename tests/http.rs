use habit_tracker::models::{ActionResponse, BoardResponse, GoalId, GoalView, StatsResponse};
use once_cell::sync::Lazy;
use reqwest::{header, redirect, Client, StatusCode};
use serde_json::json;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

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

fn unique_data_path(tag: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("habit_http_{tag}_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/goals")).send().await {
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

async fn spawn_server(data_path: &str) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_habit_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = spawn_server(&unique_data_path("shared")).await;
    #[cfg(unix)]
    cleanup::register(server.child.id());
    let server = Arc::new(server);
    *guard = Some(Arc::clone(&server));
    server
}

async fn post(client: &Client, url: String, body: serde_json::Value) -> ActionResponse {
    let response = client.post(url).json(&body).send().await.unwrap();
    assert!(response.status().is_success(), "status {}", response.status());
    response.json().await.unwrap()
}

async fn create(client: &Client, base_url: &str, name: &str, days: serde_json::Value) -> GoalView {
    let res = post(
        client,
        format!("{base_url}/api/goals"),
        json!({ "name": name, "target_days": days }),
    )
    .await;
    assert!(res.clear_inputs);
    res.board.goals.last().cloned().expect("created goal")
}

async fn complete(client: &Client, base_url: &str, id: GoalId) -> ActionResponse {
    post(client, format!("{base_url}/api/goals/{id}/complete"), json!({})).await
}

fn find(board: &BoardResponse, id: GoalId) -> Option<&GoalView> {
    board.goals.iter().find(|goal| goal.id == id)
}

/// Submits an urlencoded form the way the page does without script and
/// checks for the redirect back to the board.
async fn submit(client: &Client, url: String, body: &'static str) {
    let response = client
        .post(url)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
        "/"
    );
}

fn form_client() -> Client {
    Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

async fn board(client: &Client, base_url: &str) -> BoardResponse {
    client
        .get(format!("{base_url}/api/goals"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_completion_reaches_target_and_stops() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let goal = create(&client, base, "Read", json!(5)).await;
    assert_eq!(goal.completed_days, 0);
    assert_eq!(goal.target_days, 5);

    for _ in 0..4 {
        let res = complete(&client, base, goal.id).await;
        assert!(res.motivation.is_some());
        assert!(res.flow.is_none());
    }
    let current = board(&client, base).await;
    let view = find(&current, goal.id).unwrap();
    assert_eq!(view.completed_days, 4);
    assert_eq!(view.percentage, 80);
    assert_eq!(view.angle, 288.0);
    assert_eq!(view.streak, "🔥 Into day 5 streak!");

    let res = complete(&client, base, goal.id).await;
    let flow = res.flow.expect("threshold flow");
    assert_eq!(flow.state, "awaiting_extend_decision");
    assert_eq!(flow.goal_id, goal.id);
    assert_eq!(find(&res.board, goal.id).unwrap().completed_days, 5);

    let res = post(
        &client,
        format!("{base}/api/goals/{}/decision", goal.id),
        json!({ "keep_going": false }),
    )
    .await;
    assert!(res.flow.is_none());
    assert_eq!(res.message.as_deref(), Some("Amazing work — feel proud! 🎉"));
    assert_eq!(find(&res.board, goal.id).unwrap().target_days, 5);
}

#[tokio::test]
async fn http_extension_adds_days() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let goal = create(&client, base, "Stretch", json!("2")).await;
    complete(&client, base, goal.id).await;
    let res = complete(&client, base, goal.id).await;
    assert!(res.flow.is_some());

    let res = post(
        &client,
        format!("{base}/api/goals/{}/decision", goal.id),
        json!({ "keep_going": true }),
    )
    .await;
    let flow = res.flow.expect("amount prompt");
    assert_eq!(flow.state, "awaiting_extend_amount");
    assert_eq!(flow.default_amount.as_deref(), Some("7"));

    let res = post(
        &client,
        format!("{base}/api/goals/{}/extend", goal.id),
        json!({ "days": "10" }),
    )
    .await;
    assert_eq!(
        res.message.as_deref(),
        Some("Added 10 more day(s). New target: 12 days.")
    );
    assert_eq!(find(&res.board, goal.id).unwrap().target_days, 12);

    let response = client
        .post(format!("{base}/api/goals/{}/extend", goal.id))
        .json(&json!({ "days": "3" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn http_invalid_goal_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let before = board(&client, base).await;
    for body in [
        json!({ "name": "   ", "target_days": 5 }),
        json!({ "name": "Read", "target_days": 0 }),
        json!({ "name": "Read", "target_days": "soon" }),
        json!({ "name": "Read" }),
    ] {
        let response = client
            .post(format!("{base}/api/goals"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.text().await.unwrap(),
            "Please enter a habit name and a positive number of days."
        );
    }
    let after = board(&client, base).await;
    assert_eq!(after.goals.len(), before.goals.len());
    assert_eq!(after.revision, before.revision);
}

#[tokio::test]
async fn http_remove_requires_confirmation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let goal = create(&client, base, "Meditate", json!(3)).await;

    let res = post(
        &client,
        format!("{base}/api/goals/{}/remove", goal.id),
        json!({ "confirmed": false }),
    )
    .await;
    assert!(find(&res.board, goal.id).is_some());

    let res = post(
        &client,
        format!("{base}/api/goals/{}/remove", goal.id),
        json!({ "confirmed": true }),
    )
    .await;
    assert!(find(&res.board, goal.id).is_none());
    for (index, view) in res.board.goals.iter().enumerate() {
        assert_eq!(view.index, index);
    }
}

#[tokio::test]
async fn http_unknown_goal_is_ignored() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let before = board(&client, base).await;
    let stranger = GoalId::new_v4();
    let res = complete(&client, base, stranger).await;
    assert!(res.motivation.is_none());
    assert_eq!(res.board.revision, before.revision);
    assert_eq!(res.board.goals.len(), before.goals.len());

    let stats: StatsResponse = client
        .get(format!("{base}/api/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats.goal_count, before.goals.len());
}

#[tokio::test]
async fn http_goals_survive_restart() {
    let data_path = unique_data_path("restart");
    let client = Client::new();

    let goal = {
        let server = spawn_server(&data_path).await;
        let goal = create(&client, &server.base_url, "Journal", json!(10)).await;
        complete(&client, &server.base_url, goal.id).await;
        goal
    };

    let server = spawn_server(&data_path).await;
    let reloaded = board(&client, &server.base_url).await;
    let view = find(&reloaded, goal.id).expect("goal after restart");
    assert_eq!(view.name, "Journal");
    assert_eq!(view.target_days, 10);
    assert_eq!(view.completed_days, 1);
    drop(server);
    let _ = std::fs::remove_file(&data_path);
}

#[tokio::test]
async fn http_malformed_storage_starts_empty() {
    let data_path = unique_data_path("malformed");
    std::fs::write(&data_path, "definitely not goals").unwrap();

    let server = spawn_server(&data_path).await;
    let client = Client::new();
    let current = board(&client, &server.base_url).await;
    assert!(current.goals.is_empty());

    let page = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Habit Tracker"));
    drop(server);
    let _ = std::fs::remove_file(&data_path);
}

#[tokio::test]
async fn http_day_counts_read_leading_integer() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    for (days, target) in [(json!(5.5), 5), (json!("5.5"), 5), (json!("10 days"), 10)] {
        let goal = create(&client, base, "Walk", days).await;
        assert_eq!(goal.target_days, target);
    }

    let response = client
        .post(format!("{base}/api/goals"))
        .json(&json!({ "name": "Walk", "target_days": -3.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_board_carries_open_flow() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;

    let goal = create(&client, base, "Floss", json!(1)).await;
    assert!(complete(&client, base, goal.id).await.flow.is_some());

    let current = board(&client, base).await;
    let flow = find(&current, goal.id)
        .and_then(|view| view.flow.clone())
        .expect("open flow on board");
    assert_eq!(flow.state, "awaiting_extend_decision");
    assert_eq!(flow.goal_id, goal.id);

    post(
        &client,
        format!("{base}/api/goals/{}/decision", goal.id),
        json!({ "keep_going": true }),
    )
    .await;
    let current = board(&client, base).await;
    let flow = find(&current, goal.id).unwrap().flow.clone().unwrap();
    assert_eq!(flow.state, "awaiting_extend_amount");
    assert_eq!(flow.default_amount.as_deref(), Some("7"));

    post(
        &client,
        format!("{base}/api/goals/{}/extend", goal.id),
        json!({ "days": null }),
    )
    .await;
    let current = board(&client, base).await;
    assert!(find(&current, goal.id).unwrap().flow.is_none());
}

#[tokio::test]
async fn http_form_adds_goal() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = form_client();
    let base = &server.base_url;

    let before = board(&client, base).await;
    submit(&client, format!("{base}/goals"), "name=Cold+shower&target_days=4").await;

    let after = board(&client, base).await;
    assert_eq!(after.goals.len(), before.goals.len() + 1);
    let goal = after.goals.last().unwrap();
    assert_eq!(goal.name, "Cold shower");
    assert_eq!(goal.target_days, 4);

    let response = client
        .post(format!("{base}/goals"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("name=&target_days=4")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_form_completes_by_position() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = form_client();
    let base = &server.base_url;

    let goal = create(&client, base, "Sketch", json!(3)).await;
    submit(&client, format!("{base}/goals/{}/complete", goal.index), "").await;

    let current = board(&client, base).await;
    assert_eq!(find(&current, goal.id).unwrap().completed_days, 1);

    let page = client.get(format!("{base}/")).send().await.unwrap().text().await.unwrap();
    assert!(page.contains(&format!("action=\"/goals/{}/complete\"", goal.index)));

    let stale = current.goals.len() + 5;
    submit(&client, format!("{base}/goals/{stale}/complete"), "").await;
    assert_eq!(board(&client, base).await.revision, current.revision);
}

#[tokio::test]
async fn http_form_walks_threshold_flow() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = form_client();
    let base = &server.base_url;

    let goal = create(&client, base, "Piano", json!(1)).await;
    submit(&client, format!("{base}/goals/{}/complete", goal.index), "").await;
    submit(
        &client,
        format!("{base}/goals/{}/decision", goal.index),
        "keep_going=true",
    )
    .await;

    let page = client.get(format!("{base}/")).send().await.unwrap().text().await.unwrap();
    assert!(page.contains(&format!("action=\"/goals/{}/extend\"", goal.index)));

    submit(&client, format!("{base}/goals/{}/extend", goal.index), "days=3").await;
    let view = find(&board(&client, base).await, goal.id).cloned().unwrap();
    assert_eq!(view.target_days, 4);
    assert!(view.flow.is_none());
}

#[tokio::test]
async fn http_form_remove_needs_checkbox() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = form_client();
    let base = &server.base_url;

    let goal = create(&client, base, "Yoga", json!(3)).await;
    submit(&client, format!("{base}/goals/{}/remove", goal.index), "").await;
    assert!(find(&board(&client, base).await, goal.id).is_some());

    submit(
        &client,
        format!("{base}/goals/{}/remove", goal.index),
        "confirmed=true",
    )
    .await;
    assert!(find(&board(&client, base).await, goal.id).is_none());
}
