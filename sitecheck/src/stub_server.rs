use crate::{error::Error, util};
use hyper::{
    body,
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server,
};
use serde_json::Value;
use std::{
    collections::HashMap,
    convert::Infallible,
    fmt,
    net::SocketAddr,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio::{sync::oneshot, task::JoinHandle};
use tracing::{debug, error, info};

/// One request as the stub server received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    /// Path without the query string.
    pub path: String,
    pub query: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.as_deref()?.split('&').find_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if key == name => Some(value),
                _ => None,
            }
        })
    }

    /// Last path segment, e.g. `2` for `/api/users/2`.
    pub fn last_segment(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }

    pub fn json(&self) -> Result<Value, Error> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StubResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub delay: Option<Duration>,
}

impl StubResponse {
    pub fn json(status_code: u16, body: Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".into(), "application/json".into());

        Self {
            status_code,
            headers,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn empty(status_code: u16) -> Self {
        Self {
            status_code,
            headers: HashMap::new(),
            body: String::new(),
            delay: None,
        }
    }

    /// Hold the answer back, e.g. to trip a client timeout.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Responder = dyn Fn(&RecordedRequest) -> StubResponse + Send + Sync;

/// Answers requests whose method and path match.
///
/// Path segments written as `{name}` match any single segment; the query string is ignored
/// when matching.
#[derive(Clone)]
pub struct StubRoute {
    method: String,
    path: String,
    responder: Arc<Responder>,
}

impl StubRoute {
    pub fn new<F>(method: &str, path: &str, responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> StubResponse + Send + Sync + 'static,
    {
        Self {
            method: method.to_uppercase(),
            path: path.into(),
            responder: Arc::new(responder),
        }
    }

    pub fn get<F>(path: &str, responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> StubResponse + Send + Sync + 'static,
    {
        Self::new("GET", path, responder)
    }

    pub fn post<F>(path: &str, responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> StubResponse + Send + Sync + 'static,
    {
        Self::new("POST", path, responder)
    }

    fn matches(&self, request: &RecordedRequest) -> bool {
        if self.method != request.method {
            return false;
        }

        let expected = self.path.trim_end_matches('/').split('/');
        let actual = request.path.trim_end_matches('/').split('/');

        expected.clone().count() == actual.clone().count()
            && expected.zip(actual).all(|(expected, actual)| {
                (expected.starts_with('{') && expected.ends_with('}') && !actual.is_empty())
                    || expected == actual
            })
    }
}

impl fmt::Debug for StubRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubRoute")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish()
    }
}

/// A local HTTP server for offline API scenarios.
///
/// Every request is recorded before it is answered; unmatched requests get `404 {}`. The
/// server stops when the value is dropped.
#[derive(Debug)]
pub struct StubServer {
    address: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Bind an ephemeral port on the loopback interface and start serving on the current
    /// runtime.
    pub async fn start(routes: Vec<StubRoute>) -> Result<Self, Error> {
        let routes = Arc::new(routes);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let service_routes = routes.clone();
        let service_requests = requests.clone();
        let make_service = make_service_fn(move |_| {
            let routes = service_routes.clone();
            let requests = service_requests.clone();

            async move {
                Ok::<_, Infallible>(service_fn(move |request| {
                    handle_request(request, routes.clone(), requests.clone())
                }))
            }
        });

        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let server = Server::try_bind(&addr)?.serve(make_service);
        let address = server.local_addr();

        let (shutdown, shutdown_signal) = oneshot::channel::<()>();
        let server = server.with_graceful_shutdown(async move {
            shutdown_signal.await.ok();
        });

        let join_handle = tokio::spawn(async move {
            if let Err(e) = server.await {
                error!("Stub server error: {}", e);
            }
        });

        info!(%address, routes = routes.len(), "stub server listening");

        Ok(Self {
            address,
            requests,
            shutdown: Some(shutdown),
            join_handle: Some(join_handle),
        })
    }

    /// `http://127.0.0.1:<port>`, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.address)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
        if let Some(join_handle) = self.join_handle.take() {
            join_handle.await.ok();
        }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
    }
}

async fn handle_request(
    mut request: Request<Body>,
    routes: Arc<Vec<StubRoute>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) -> Result<Response<Body>, Infallible> {
    let recorded = match read_request(&mut request).await {
        Ok(recorded) => recorded,
        Err(e) => {
            error!("Unreadable request: {}", e);
            return Ok(fallback_response(400));
        }
    };
    debug!(method = %recorded.method, path = %recorded.path, "stub request");

    let stub_response = routes
        .iter()
        .find(|route| route.matches(&recorded))
        .map(|route| (route.responder)(&recorded))
        .unwrap_or_else(|| StubResponse::json(404, Value::Object(Default::default())));

    requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(recorded);

    if let Some(delay) = stub_response.delay {
        tokio::time::sleep(delay).await;
    }

    match build_response(stub_response) {
        Ok(response) => Ok(response),
        Err(e) => {
            error!("Invalid stub response: {}", e);
            Ok(fallback_response(500))
        }
    }
}

async fn read_request(request: &mut Request<Body>) -> Result<RecordedRequest, Error> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(String::from);
    let headers = util::extract_headers(request.headers());

    let body = body::to_bytes(request.body_mut()).await?;

    Ok(RecordedRequest {
        method,
        path,
        query,
        headers,
        body: String::from_utf8_lossy(&body).into(),
    })
}

fn build_response(stub_response: StubResponse) -> Result<Response<Body>, Error> {
    let mut response = Response::builder()
        .status(stub_response.status_code)
        .body(Body::from(stub_response.body))?;

    util::put_headers(response.headers_mut(), &stub_response.headers)?;

    Ok(response)
}

fn fallback_response(status_code: u16) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    if let Ok(status) = hyper::StatusCode::from_u16(status_code) {
        *response.status_mut() = status;
    }
    response
}
