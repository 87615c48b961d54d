use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use vapix_rs::digest::{DigestChallenge, DigestRequest, compute_response};
use vapix_rs::{CameraConfig, Parameters, Ptz, VapixCam, VapixError};

const CHALLENGE: &str =
    "Digest realm=\"AXIS_ACCC8E000000\", nonce=\"0004a5b3Y4d0bc0e4\", algorithm=MD5, qop=\"auth\"";

struct Reply {
    status: &'static str,
    headers: Vec<String>,
    body: String,
}

fn unauthorized() -> Reply {
    Reply {
        status: "401 Unauthorized",
        headers: vec![format!("WWW-Authenticate: {}", CHALLENGE)],
        body: "Unauthorized".to_string(),
    }
}

fn reply(status: &'static str, body: &str) -> Reply {
    Reply {
        status,
        headers: vec![],
        body: body.to_string(),
    }
}

/// Serves the scripted replies, one connection each, and records the raw requests.
async fn fake_device(replies: Vec<Reply>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    tokio::spawn(async move {
        for reply in replies {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            log.lock()
                .unwrap()
                .push(String::from_utf8_lossy(&request).into_owned());

            let mut response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n",
                reply.status,
                reply.body.len()
            );
            for header in &reply.headers {
                response.push_str(header);
                response.push_str("\r\n");
            }
            response.push_str("\r\n");
            response.push_str(&reply.body);

            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });

    (addr.to_string(), seen)
}

fn header_param<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    let start = header.find(&format!("{}=\"", name))? + name.len() + 2;
    let end = header[start..].find('"')? + start;
    Some(&header[start..end])
}

#[tokio::test]
async fn digest_handshake_then_value() {
    let (host, seen) = fake_device(vec![
        unauthorized(),
        reply("200 OK", "root.Brand.Brand=AXIS\r\n"),
    ])
    .await;

    let cam = VapixCam::new(CameraConfig::new(host, "root", "pass")).unwrap();
    let brand = cam.get_parameters(Some("Brand.Brand"), true).await.unwrap();
    assert_eq!(brand, "AXIS");

    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert!(
        requests[0]
            .starts_with("GET /axis-cgi/param.cgi?action=list&group=Brand.Brand HTTP/1.1")
    );
    assert!(!requests[0].to_ascii_lowercase().contains("authorization:"));

    let authorization = requests[1]
        .lines()
        .find(|l| l.to_ascii_lowercase().starts_with("authorization:"))
        .expect("second request carries credentials");
    assert!(authorization.contains("Digest "));
    assert_eq!(header_param(authorization, "username"), Some("root"));
    assert_eq!(
        header_param(authorization, "uri"),
        Some("/axis-cgi/param.cgi?action=list&group=Brand.Brand")
    );

    let cnonce = header_param(authorization, "cnonce").unwrap();
    let expected = compute_response(
        &DigestChallenge::parse(CHALLENGE).unwrap(),
        &DigestRequest {
            method: "GET",
            uri: "/axis-cgi/param.cgi?action=list&group=Brand.Brand",
            username: "root",
            password: "pass",
            cnonce,
            nonce_count: 1,
        },
    );
    assert_eq!(header_param(authorization, "response"), Some(expected.as_str()));
}

#[tokio::test]
async fn rejected_credentials_are_typed() {
    let (host, _) = fake_device(vec![unauthorized(), unauthorized()]).await;

    let cam = VapixCam::new(CameraConfig::new(host, "root", "wrong")).unwrap();
    let err = cam.get_parameters(None, false).await.unwrap_err();
    assert!(matches!(err, VapixError::AuthenticationFailed(_)));
}

#[tokio::test]
async fn html_error_text_is_extracted() {
    let (host, _) = fake_device(vec![
        unauthorized(),
        reply("500 Internal Server Error", "<html><body>Bad param</body></html>"),
    ])
    .await;

    let cam = VapixCam::new(CameraConfig::new(host, "root", "pass")).unwrap();
    match cam.get_status().await.unwrap_err() {
        VapixError::DeviceError { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("Bad param"));
            assert!(!message.contains('<'));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_device_is_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    drop(listener);

    let cam = VapixCam::new(CameraConfig::new(host, "root", "pass")).unwrap();
    let err = cam.get_parameters(None, false).await.unwrap_err();
    assert!(matches!(err, VapixError::ConnectionError(_)));
}

/// Answers every request with 200 on a kept-alive connection and counts accepted connections.
async fn keep_alive_device() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&connections);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);

            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    let n = match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => n,
                    };
                    request.extend_from_slice(&buf[..n]);
                    if !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        continue;
                    }
                    request.clear();

                    let body = "root.Brand.Brand=AXIS\r\n";
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: keep-alive\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    if socket.write_all(response.as_bytes()).await.is_err() {
                        return;
                    }
                }
            });
        }
    });

    (addr.to_string(), connections)
}

#[tokio::test]
async fn each_call_opens_its_own_connection() {
    let (host, connections) = keep_alive_device().await;

    let cam = VapixCam::new(CameraConfig::new(host, "root", "pass")).unwrap();
    for _ in 0..3 {
        let brand = cam.get_parameters(Some("Brand.Brand"), true).await.unwrap();
        assert_eq!(brand, "AXIS");
    }

    assert_eq!(connections.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn silent_device_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let config = CameraConfig::new(host, "root", "pass").with_timeout(Duration::from_millis(300));
    let cam = VapixCam::new(config).unwrap();

    let started = Instant::now();
    let err = cam.get_parameters(None, false).await.unwrap_err();
    assert!(matches!(err, VapixError::ConnectionError(_)), "{:?}", err);
    assert!(started.elapsed() < Duration::from_secs(5));
}
