//! 要約生成の統合テスト
//!
//! ローカルに立てたHTTPサーバーに対して ReqwestTransport + generate を実行する

use narrato::library::LibraryFile;
use narrato::transport::ReqwestTransport;
use narrato_common::{
    find_sample, generate, ApiConfig, Error, Narrator, Playback, Session, SummaryStore,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// 1リクエストだけ応答するモックサーバー
///
/// 受信したリクエスト（ヘッダー＋ボディ）を返す
async fn serve_once(status: &str, content_type: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (base_url, handle)
}

/// ヘッダー終端とContent-Length分のボディまで読む
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// プロキシ設定の影響を受けないクライアント
fn local_transport() -> ReqwestTransport {
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .unwrap();
    ReqwestTransport::with_client(client)
}

fn sample_session() -> Session {
    let mut session = Session::new();
    session.select_sample(find_sample(101).unwrap());
    session
}

#[tokio::test]
async fn test_generate_success() {
    let body = r#"{"title":"A Study in Scarlet","summaryText":"Holmes and Watson meet.","themes":["deduction"],"sentimentScores":[0.4,0.6],"confidence":0.9}"#;
    let (base_url, server) = serve_once("200 OK", "application/json", body).await;

    let transport = local_transport();
    let mut session = sample_session();
    let record = generate(&mut session, &transport, &ApiConfig::new(&base_url), None)
        .await
        .unwrap();

    assert_eq!(record.summary_text, "Holmes and Watson meet.");
    assert_eq!(record.confidence_percent(), 90);
    assert!(!session.is_loading);
    assert!(session.error.is_none());
    assert_eq!(session.summary.as_ref().unwrap().themes, vec!["deduction"]);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/generate"));
    assert!(request.contains("\"style\""));
    assert!(!request.contains("\"language\""));
}

#[tokio::test]
async fn test_generate_sends_language_for_translation() {
    let body = r#"{"summaryText":"s","translatedSummaryText":"t"}"#;
    let (base_url, server) = serve_once("200 OK", "application/json", body).await;

    let transport = local_transport();
    let mut session = sample_session();
    session.target_language = "Spanish".to_string();
    let record = generate(&mut session, &transport, &ApiConfig::new(&base_url), None)
        .await
        .unwrap();

    assert!(record.has_translation());
    let request = server.await.unwrap();
    assert!(request.contains("\"language\":\"Spanish\""));
}

#[tokio::test]
async fn test_generate_server_error_message() {
    let (base_url, server) =
        serve_once("500 Internal Server Error", "application/json", r#"{"error":"overloaded"}"#).await;

    let transport = local_transport();
    let mut session = sample_session();
    let err = generate(&mut session, &transport, &ApiConfig::new(&base_url), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::GenerationFailed { .. }));
    assert_eq!(err.to_string(), "overloaded");
    assert_eq!(session.error.as_deref(), Some("Error: overloaded"));
    assert!(session.summary.is_none());
    assert!(!session.is_loading);
    server.await.unwrap();
}

#[tokio::test]
async fn test_generate_html_error_page() {
    let html = "<!DOCTYPE html><html><body><h1>502 Bad Gateway</h1></body></html>";
    let (base_url, server) = serve_once("502 Bad Gateway", "text/html", html).await;

    let transport = local_transport();
    let mut session = sample_session();
    let err = generate(&mut session, &transport, &ApiConfig::new(&base_url), None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Summary generation failed");
    assert!(session.summary.is_none());
    server.await.unwrap();
}

#[tokio::test]
async fn test_generate_unreachable_server() {
    // 一度bindして閉じたポートには誰もいない
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = local_transport();
    let mut session = sample_session();
    let err = generate(&mut session, &transport, &ApiConfig::new(&format!("http://{}", addr)), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network(_)));
    assert!(session.error.as_deref().unwrap().starts_with("Error: "));
}

#[tokio::test]
async fn test_speak_falls_back_when_tts_fails() {
    let (base_url, server) =
        serve_once("503 Service Unavailable", "application/json", r#"{"error":"quota"}"#).await;

    let dir = tempfile::tempdir().unwrap();
    let sink = narrato::speaker::FileAudioSink::new(&dir.path().join("out.wav"), false);
    let mut narrator = Narrator::new(sink);
    let transport = local_transport();

    let playback = narrator.speak(&transport, &ApiConfig::new(&base_url), "Hello").await;

    assert_eq!(playback, Playback::Silent);
    assert!(narrator.sink().written().is_none());
    assert!(!narrator.is_playing());
    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/tts"));
}

#[tokio::test]
async fn test_saved_summary_survives_reload() {
    let body = r#"{"title":"Meditations","summaryText":"On virtue."}"#;
    let (base_url, server) = serve_once("200 OK", "application/json", body).await;

    let transport = local_transport();
    let mut session = sample_session();
    let record = generate(&mut session, &transport, &ApiConfig::new(&base_url), None)
        .await
        .unwrap();
    server.await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");

    let mut store = LibraryFile::load(&path).unwrap();
    let id = store.add_summary("reader-1", record).unwrap();
    LibraryFile::save(store, &path).unwrap();

    let reloaded = LibraryFile::load(&path).unwrap();
    let saved = reloaded.get_summary(&id).unwrap();
    assert_eq!(saved.summary_text, "On virtue.");
    assert_eq!(saved.user_id.as_deref(), Some("reader-1"));
    assert_eq!(reloaded.list_summaries("reader-1").len(), 1);
    assert!(reloaded.list_summaries("someone-else").is_empty());
}
