//! Scripted HTTP server for transport tests.
//!
//! Answers one scripted [`Reply`] per incoming request, in order, and
//! records what it received. A `"{id}"` string anywhere in a reply body is
//! replaced by the JSON-RPC id of the request being answered.

use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, oneshot};

pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }
}

pub enum Reply {
    Json {
        body: Value,
        headers: Vec<(String, String)>,
    },
    Status {
        code: u16,
        reason: String,
    },
    /// 202 Accepted; optionally pushes a message onto the held event stream
    Accepted { push: Option<Value> },
    /// Event stream that closes after the given messages
    EventStream { messages: Vec<Value> },
    /// Event stream held open until the server shuts down
    HoldStream { events: Vec<(String, String)> },
}

impl Reply {
    pub fn json(body: Value) -> Self {
        Reply::Json {
            body,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let Reply::Json { headers, .. } = &mut self {
            headers.push((name.to_string(), value.to_string()));
        }
        self
    }

    pub fn status(code: u16, reason: &str) -> Self {
        Reply::Status {
            code,
            reason: reason.to_string(),
        }
    }

    pub fn accepted() -> Self {
        Reply::Accepted { push: None }
    }

    pub fn accepted_then_push(message: Value) -> Self {
        Reply::Accepted {
            push: Some(message),
        }
    }

    pub fn event_stream(messages: Vec<Value>) -> Self {
        Reply::EventStream { messages }
    }

    pub fn hold_stream(events: Vec<(&str, &str)>) -> Self {
        Reply::HoldStream {
            events: events
                .into_iter()
                .map(|(e, d)| (e.to_string(), d.to_string()))
                .collect(),
        }
    }
}

pub struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            let mut held: Option<TcpStream> = None;

            for reply in replies {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                let id = request.body.get("id").cloned().unwrap_or(Value::Null);
                recorded.lock().await.push(request);

                match reply {
                    Reply::Json { body, headers } => {
                        let body = with_id(&body, &id);
                        let mut head = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
                            body.len()
                        );
                        for (name, value) in headers {
                            head.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        head.push_str("\r\n");
                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(body.as_bytes()).await;
                    }
                    Reply::Status { code, reason } => {
                        let head = format!(
                            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            code,
                            reason,
                            reason.len(),
                            reason
                        );
                        let _ = socket.write_all(head.as_bytes()).await;
                    }
                    Reply::Accepted { push } => {
                        let _ = socket
                            .write_all(
                                b"HTTP/1.1 202 Accepted\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                            )
                            .await;
                        if let (Some(message), Some(stream)) = (push, held.as_mut()) {
                            let frame =
                                format!("event: message\ndata: {}\n\n", with_id(&message, &id));
                            let _ = stream.write_all(frame.as_bytes()).await;
                        }
                    }
                    Reply::EventStream { messages } => {
                        let _ = socket.write_all(stream_head().as_bytes()).await;
                        for message in messages {
                            let frame = format!("data: {}\n\n", with_id(&message, &id));
                            let _ = socket.write_all(frame.as_bytes()).await;
                        }
                    }
                    Reply::HoldStream { events } => {
                        let _ = socket.write_all(stream_head().as_bytes()).await;
                        for (event, data) in events {
                            let frame = format!("event: {}\ndata: {}\n\n", event, data);
                            let _ = socket.write_all(frame.as_bytes()).await;
                        }
                        held = Some(socket);
                        continue;
                    }
                }
                let _ = socket.shutdown().await;
            }

            let _ = shutdown_rx.await;
            drop(held);
        });

        Self {
            addr,
            requests,
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn requests(&self) -> tokio::sync::MutexGuard<'_, Vec<RecordedRequest>> {
        self.requests.lock().await
    }

    /// Close any held event stream.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

fn stream_head() -> &'static str {
    "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n"
}

fn with_id(body: &Value, id: &Value) -> String {
    body.to_string().replace("\"{id}\"", &id.to_string())
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buffer[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        method,
        path,
        headers,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    })
}
