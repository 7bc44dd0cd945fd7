use fitplan_engine::protocol::{PlanKind, UserLogin};
use fitplan_engine::session::Session;
use fitplan_engine::source::{HttpSource, SourceError, SuggestionSource};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const WORKOUT: &str = r#"{"id": "w1", "type": "workout", "content": "TREINO A\n1. Supino: 3x10", "created_at": "2024-05-01T10:00:00.123456"}"#;

const HISTORY: &str = r#"{
    "workouts": [{"id": "w1", "type": "workout", "content": "TREINO A", "created_at": "2024-05-01T10:00:00.123456"}],
    "nutrition": [{"id": "n1", "type": "nutrition", "content": "Almoço:", "created_at": "2024-05-02T08:30:00"}]
}"#;

type Requests = Arc<Mutex<Vec<String>>>;

/// Answers by request line, the way the suggestion service would.
fn route(request_line: &str) -> (u16, String) {
    match request_line {
        "POST /api/suggestions/workout" => (200, WORKOUT.to_string()),
        "GET /api/suggestions/history" => (200, HISTORY.to_string()),
        "GET /api/profile" => (401, r#"{"detail": "Could not validate credentials"}"#.into()),
        "DELETE /api/suggestions/missing" => (404, r#"{"detail": "Suggestion not found"}"#.into()),
        "POST /api/auth/login" => (200, r#"{"access_token": "fresh", "token_type": "bearer"}"#.into()),
        _ => (404, r#"{"detail": "Not Found"}"#.into()),
    }
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(head_end) = text.find("\r\n\r\n") {
            let length = text[..head_end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().unwrap_or(0))
                })
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + length {
                return text;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

async fn serve() -> (String, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let request = read_request(&mut stream).await;
            let request_line = request
                .lines()
                .next()
                .unwrap_or_default()
                .rsplit_once(' ')
                .map(|(line, _version)| line.to_string())
                .unwrap_or_default();
            seen.lock().unwrap().push(request.clone());

            let (status, body) = route(&request_line);
            let reason = match status {
                200 => "OK",
                401 => "Unauthorized",
                _ => "Not Found",
            };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        }
    });

    (format!("http://{}", addr), requests)
}

fn source(base: &str, session: Session) -> HttpSource {
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    HttpSource::with_client(base, session, client).unwrap()
}

fn has_bearer(request: &str, token: &str) -> bool {
    request
        .to_lowercase()
        .contains(&format!("authorization: bearer {}", token))
}

#[tokio::test]
async fn test_generate_decodes_service_payload() {
    let (base, requests) = serve().await;
    let mut http = source(&base, Session::with_token("abc"));

    let suggestion = http.generate(PlanKind::Workout).await.unwrap();
    assert_eq!(suggestion.id, "w1");
    assert_eq!(suggestion.kind, PlanKind::Workout);
    assert_eq!(suggestion.content, "TREINO A\n1. Supino: 3x10");
    assert_eq!(
        suggestion.created_at.to_rfc3339(),
        "2024-05-01T10:00:00.123456+00:00"
    );

    let seen = requests.lock().unwrap();
    assert!(seen[0].starts_with("POST /api/suggestions/workout "));
    assert!(has_bearer(&seen[0], "abc"));
}

#[tokio::test]
async fn test_history_and_fetch() {
    let (base, _requests) = serve().await;
    let mut http = source(&base, Session::with_token("abc"));

    let history = http.history().await.unwrap();
    assert_eq!(history.workouts.len(), 1);
    assert_eq!(history.nutrition.len(), 1);
    assert_eq!(history.nutrition[0].kind, PlanKind::Nutrition);

    let found = http.fetch("n1").await.unwrap();
    assert_eq!(found.content, "Almoço:");
    assert!(http.session().is_authenticated());
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let (base, requests) = serve().await;
    let mut http = source(&base, Session::with_token("stale"));

    let err = http.profile().await.unwrap_err();
    assert!(matches!(err, SourceError::Unauthorized));
    assert!(!http.session().is_authenticated());

    // Later requests go out without credentials.
    http.history().await.unwrap();
    let seen = requests.lock().unwrap();
    assert!(has_bearer(&seen[0], "stale"));
    assert!(!seen[1].to_lowercase().contains("authorization:"));
}

#[tokio::test]
async fn test_not_found_reports_detail() {
    let (base, _requests) = serve().await;
    let mut http = source(&base, Session::with_token("abc"));

    match http.delete("missing").await.unwrap_err() {
        SourceError::Status { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Suggestion not found");
        }
        other => panic!("Expected Status, got {:?}", other),
    }
    assert!(http.session().is_authenticated());
}

#[tokio::test]
async fn test_login_switches_session() {
    let (base, requests) = serve().await;
    let mut http = source(&base, Session::anonymous());

    let token = http
        .login(&UserLogin {
            email: "ana@example.com".into(),
            password: "segredo".into(),
        })
        .await
        .unwrap();
    assert_eq!(token.access_token, "fresh");
    assert_eq!(http.session().bearer().as_deref(), Some("Bearer fresh"));

    http.generate(PlanKind::Workout).await.unwrap();
    let seen = requests.lock().unwrap();
    assert!(seen[0].contains(r#""email":"ana@example.com""#));
    assert!(has_bearer(&seen[1], "fresh"));
}

#[tokio::test]
async fn test_login_rejected() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_request(&mut stream).await;
        let body = r#"{"detail": "Incorrect email or password"}"#;
        let response = format!(
            "HTTP/1.1 401 Unauthorized\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
    });

    let mut http = source(&format!("http://{}", addr), Session::anonymous());
    let err = http
        .login(&UserLogin {
            email: "ana@example.com".into(),
            password: "errada".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::InvalidCredentials));
    assert!(!http.session().is_authenticated());
}
