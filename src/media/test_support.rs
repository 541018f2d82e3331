use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Minimal HTTP/1.1 responder on a loopback port that answers every
/// request with the same canned response.
pub struct StubServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<String> {
        self.requests.lock().unwrap().last().cloned()
    }
}

pub async fn serve(status: u16, content_type: &str, body: &str) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let response = format!(
        "HTTP/1.1 {} STUB\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    );

    let task_hits = hits.clone();
    let task_requests = requests.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            task_hits.fetch_add(1, Ordering::SeqCst);

            let request = read_request(&mut socket).await;
            task_requests.lock().unwrap().push(request);

            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    StubServer {
        base_url: format!("http://{}", addr),
        hits,
        requests,
    }
}

/// Sends the headers and `head`, waits `pause`, then sends `tail`.
pub async fn serve_slow(head: &str, pause: Duration, tail: &str) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let headers = format!(
        "HTTP/1.1 200 STUB\r\nContent-Type: video/mp4\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        head.len() + tail.len()
    );
    let head = head.to_string();
    let tail = tail.to_string();

    let task_hits = hits.clone();
    let task_requests = requests.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            task_hits.fetch_add(1, Ordering::SeqCst);

            let request = read_request(&mut socket).await;
            task_requests.lock().unwrap().push(request);

            let _ = socket.write_all(headers.as_bytes()).await;
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.flush().await;
            tokio::time::sleep(pause).await;
            let _ = socket.write_all(tail.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    StubServer {
        base_url: format!("http://{}", addr),
        hits,
        requests,
    }
}

pub async fn serve_json(status: u16, body: &str) -> StubServer {
    serve(status, "application/json", body).await
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
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

    String::from_utf8_lossy(&buf).to_string()
}

/// Client without system proxies so loopback requests stay local.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Every string of up to `max_len` characters over a small alphabet, behind
/// prefixes that put it where a link pattern would look.
pub fn generated_inputs(max_len: usize) -> Vec<String> {
    const PREFIXES: [&str; 6] = [
        "",
        "https://www.tiktok.com/",
        "https://vm.tiktok.com/",
        "m.tiktok.com/v/",
        "https://example.com/video/",
        "?video_id=",
    ];
    const ALPHABET: [char; 10] = ['/', '@', 'v', '0', '7', '=', '_', 'a', '\u{663}', '\u{1F389}'];

    let mut tails = vec![String::new()];
    let mut layer = vec![String::new()];
    for _ in 0..max_len {
        layer = layer
            .iter()
            .flat_map(|tail| {
                ALPHABET.iter().map(move |c| {
                    let mut next = tail.clone();
                    next.push(*c);
                    next
                })
            })
            .collect();
        tails.extend(layer.iter().cloned());
    }

    PREFIXES
        .iter()
        .flat_map(|prefix| tails.iter().map(move |tail| format!("{}{}", prefix, tail)))
        .collect()
}
