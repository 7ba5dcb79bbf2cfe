use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread;

// Answers every request with 401 until `requests` have been served.
fn serve_unauthorized(requests: usize) -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..requests {
            let (mut socket, _) = listener.accept().expect("accept");
            seen.push(read_request(&mut socket));
            let body = r#"{"error":"token expired"}"#;
            let response = format!(
                "HTTP/1.1 401 Unauthorized\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).expect("write response");
        }
        seen
    });
    (base_url, handle)
}

fn read_request(socket: &mut std::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).expect("read request");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        let Some(head_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let content_length = text[..head_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= head_end + 4 + content_length {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn run_inbox(args: &[&str], base_url: &str, secrets: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_inbox"))
        .args(args)
        .env_remove("HOMEBIT_TOKEN")
        .env("HOMEBIT_NOTIFICATIONS_API_BASE_URL", base_url)
        .env("HOMEBIT_SECRETS_PATH", secrets)
        .output()
        .expect("failed to execute inbox binary")
}

fn scratch_secrets(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("homebit-expiry-{}-{name}", std::process::id()))
        .join("secrets.json")
}

#[test]
fn rejected_start_clears_saved_token() {
    // list (swallowed) then start, both refused
    let (base_url, server) = serve_unauthorized(2);
    let secrets = scratch_secrets("start");

    let login = run_inbox(&["auth", "login", "--token", "stale-token"], &base_url, &secrets);
    assert!(login.status.success(), "{}", String::from_utf8_lossy(&login.stderr));
    assert!(secrets.exists());

    let output = run_inbox(
        &[
            "conversations",
            "start",
            "--household-user-id",
            "household-123",
            "--househelp-user-id",
            "househelp-456",
        ],
        &base_url,
        &secrets,
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Session expired"));
    assert!(!secrets.exists(), "token should have been cleared");

    let requests = server.join().expect("server thread");
    assert!(requests[0].starts_with("GET /api/v1/inbox/conversations?offset=0&limit=100"));
    assert!(requests[1].starts_with("POST /api/v1/inbox/conversations"));
    let _ = std::fs::remove_dir_all(secrets.parent().expect("parent"));
}

#[test]
fn rejected_list_clears_saved_token() {
    let (base_url, server) = serve_unauthorized(1);
    let secrets = scratch_secrets("list");

    let login = run_inbox(&["auth", "login", "--token", "stale-token"], &base_url, &secrets);
    assert!(login.status.success(), "{}", String::from_utf8_lossy(&login.stderr));

    let output = run_inbox(&["conversations", "list", "--limit", "5"], &base_url, &secrets);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Session expired"));
    assert!(!secrets.exists());

    let requests = server.join().expect("server thread");
    assert!(requests[0].starts_with("GET /api/v1/inbox/conversations?offset=0&limit=5"));
    let _ = std::fs::remove_dir_all(secrets.parent().expect("parent"));
}
