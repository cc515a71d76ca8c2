//! Minimal HTTP server for tests: answers every connection with one canned response.

use std::{
    io::{Read, Write},
    net::TcpListener,
    sync::mpsc::{self, Receiver},
    thread,
    time::Duration,
};

/// Starts a server on a random local port. Returns its base URL and a receiver
/// yielding the raw head of each request it served.
pub fn serve(status: u16, content_type: &str, body: Vec<u8>) -> (String, Receiver<String>) {
    let length = body.len();
    serve_with_length(status, content_type, body, length)
}

/// Like `serve`, but advertises `content_length` whatever the body size, then closes.
pub fn serve_with_length(
    status: u16,
    content_type: &str,
    body: Vec<u8>,
    content_length: usize,
) -> (String, Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();
    let content_type = content_type.to_string();
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
            let mut buf = [0u8; 8192];
            let n = match stream.read(&mut buf) {
                Ok(n) => n,
                Err(_) => continue,
            };
            let _ = tx.send(String::from_utf8_lossy(&buf[..n]).into_owned());
            let head = format!(
                "HTTP/1.1 {} X\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                content_type,
                content_length
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
        }
    });
    (format!("http://127.0.0.1:{}", port), rx)
}

pub fn serve_json(status: u16, body: &serde_json::Value) -> (String, Receiver<String>) {
    serve(status, "application/json", body.to_string().into_bytes())
}

/// A URL on a port nothing is listening on.
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

pub fn sample_result() -> serde_json::Value {
    serde_json::json!({
        "id": "abc123",
        "title": "Sample clip",
        "videos": {
            "items": [
                { "quality": "360p", "sizeText": "4 MB", "url": "https://cdn.example/v360" },
                { "quality": "720p", "sizeText": "12 MB", "url": "https://cdn.example/v720-a" },
                { "quality": "720p", "sizeText": "13 MB", "url": "https://cdn.example/v720-b" }
            ]
        },
        "audios": {
            "items": [
                { "sizeText": "3 MB", "url": "https://cdn.example/a-low" },
                { "sizeText": "3 MB", "url": "https://cdn.example/a-dup" },
                { "sizeText": "6 MB", "url": "https://cdn.example/a-high" }
            ]
        }
    })
}
