use std::{collections::HashSet, sync::Mutex, time::Duration};

use actix_web::{
    http::{header, StatusCode},
    web, App, HttpRequest, HttpResponse, HttpServer,
};

use crate::{
    checker::SiteChecker,
    client::ControlClient,
    structures::model::{Credentials, Site},
};

/// Nothing listens here; connections are refused.
pub const CLOSED_ADDR: &str = "http://127.0.0.1:1";
/// `Basic base64("probe@example.com:hunter2")`
pub const BASIC_AUTH: &str = "Basic cHJvYmVAZXhhbXBsZS5jb206aHVudGVyMg==";

pub fn credentials() -> Credentials {
    Credentials {
        email: "probe@example.com".to_string(),
        secret: "hunter2".to_string(),
    }
}

pub fn checker() -> SiteChecker {
    SiteChecker::new(Duration::from_secs(5)).unwrap()
}

pub struct ControlState {
    sites_status: Mutex<u16>,
    sites_body: Mutex<String>,
    failing_reports: Mutex<HashSet<String>>,
    reports: Mutex<Vec<serde_json::Value>>,
    control_auth: Mutex<Vec<Option<String>>>,
    probe_hits: Mutex<Vec<(String, Option<String>)>>,
}

impl Default for ControlState {
    fn default() -> Self {
        ControlState {
            sites_status: Mutex::new(200),
            sites_body: Mutex::new(r#"{"sites":[]}"#.to_string()),
            failing_reports: Mutex::default(),
            reports: Mutex::default(),
            control_auth: Mutex::default(),
            probe_hits: Mutex::default(),
        }
    }
}

impl ControlState {
    pub fn set_sites_body(&self, body: impl Into<String>) {
        *self.sites_body.lock().unwrap() = body.into();
    }

    pub fn set_sites_status(&self, status: u16) {
        *self.sites_status.lock().unwrap() = status;
    }

    pub fn fail_reports_for(&self, site_id: &str) {
        self.failing_reports
            .lock()
            .unwrap()
            .insert(site_id.to_string());
    }

    /// Every report body received, including rejected ones.
    pub fn reports(&self) -> Vec<serde_json::Value> {
        self.reports.lock().unwrap().clone()
    }

    pub fn reported_ids(&self) -> Vec<String> {
        self.reports()
            .iter()
            .map(|r| r["siteID"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn control_auth(&self) -> Vec<Option<String>> {
        self.control_auth.lock().unwrap().clone()
    }

    pub fn probe_hits(&self) -> Vec<(String, Option<String>)> {
        self.probe_hits.lock().unwrap().clone()
    }
}

fn auth_header(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn sites(req: HttpRequest, state: web::Data<ControlState>) -> HttpResponse {
    state.control_auth.lock().unwrap().push(auth_header(&req));
    let status = *state.sites_status.lock().unwrap();
    let body = state.sites_body.lock().unwrap().clone();
    HttpResponse::build(StatusCode::from_u16(status).unwrap())
        .content_type("application/json")
        .body(body)
}

async fn responses(
    req: HttpRequest,
    state: web::Data<ControlState>,
    body: web::Json<serde_json::Value>,
) -> HttpResponse {
    state.control_auth.lock().unwrap().push(auth_header(&req));
    let body = body.into_inner();
    let rejected = body["siteID"]
        .as_str()
        .map(|id| state.failing_reports.lock().unwrap().contains(id))
        .unwrap_or(false);
    state.reports.lock().unwrap().push(body);
    if rejected {
        HttpResponse::InternalServerError().finish()
    } else {
        HttpResponse::Ok().finish()
    }
}

async fn status(
    req: HttpRequest,
    state: web::Data<ControlState>,
    code: web::Path<u16>,
) -> HttpResponse {
    state
        .probe_hits
        .lock()
        .unwrap()
        .push((req.path().to_string(), auth_header(&req)));
    HttpResponse::build(StatusCode::from_u16(code.into_inner()).unwrap()).finish()
}

async fn slow(req: HttpRequest, state: web::Data<ControlState>) -> HttpResponse {
    state
        .probe_hits
        .lock()
        .unwrap()
        .push((req.path().to_string(), auth_header(&req)));
    actix_web::rt::time::sleep(Duration::from_millis(50)).await;
    HttpResponse::Ok().finish()
}

async fn echo(code: web::Path<u16>) -> HttpResponse {
    HttpResponse::build(StatusCode::from_u16(code.into_inner()).unwrap()).finish()
}

pub struct MockControl {
    pub base: String,
    pub state: web::Data<ControlState>,
}

impl MockControl {
    pub async fn start() -> Self {
        let state = web::Data::new(ControlState::default());
        let app_state = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_state.clone())
                .route("/api/sites", web::get().to(sites))
                .route("/api/responses", web::post().to(responses))
                .route("/status/{code}", web::get().to(status))
                .route("/slow", web::get().to(slow))
                .route("/echo/{code}", web::post().to(echo))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        MockControl {
            base: format!("http://{}", addr),
            state,
        }
    }

    pub fn client(&self) -> ControlClient {
        ControlClient::new(&self.base, credentials(), "test", Duration::from_secs(5)).unwrap()
    }

    /// A site whose URL points at `path` on this server.
    pub fn site(&self, id: &str, path: &str) -> Site {
        Site {
            id: id.to_string(),
            name: format!("site-{id}"),
            url: format!("{}{}", self.base, path),
            ..Site::default()
        }
    }
}

/// A site nobody answers for.
pub fn unreachable_site(id: &str) -> Site {
    Site {
        id: id.to_string(),
        name: format!("site-{id}"),
        url: format!("{}/", CLOSED_ADDR),
        ..Site::default()
    }
}
