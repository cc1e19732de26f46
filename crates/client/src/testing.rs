//! Scripted transport shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::fetch::{ApiRequest, ApiResponse, FetchError, RetryPolicy, Transport};
use eduform_core::InstitutionRecord;

#[derive(Clone)]
pub(crate) enum Reply {
    Json(u16, serde_json::Value),
    Fail(FetchError),
    /// Answer with the inner reply after an extra pause.
    After(Duration, Box<Reply>),
}

/// Answers by request path; the last queued reply for a path repeats.
#[derive(Default)]
pub(crate) struct StubTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    seen: Mutex<Vec<ApiRequest>>,
    latency: Duration,
}

impl StubTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self { latency, ..Default::default() })
    }

    pub(crate) fn reply(&self, path: &str, reply: Reply) {
        self.routes.lock().unwrap().entry(path.to_string()).or_default().push_back(reply);
    }

    pub(crate) fn ok(&self, path: &str, body: serde_json::Value) {
        self.reply(path, Reply::Json(200, body));
    }

    pub(crate) fn calls_to(&self, path: &str) -> usize {
        self.seen.lock().unwrap().iter().filter(|r| r.path == path).count()
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        self.seen.lock().unwrap().push(request.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut reply = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&request.path) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        let reply = loop {
            match reply {
                Some(Reply::After(pause, inner)) => {
                    tokio::time::sleep(pause).await;
                    reply = Some(*inner);
                }
                other => break other,
            }
        };

        match reply {
            Some(Reply::Json(status, body)) => {
                Ok(ApiResponse::new(StatusCode::from_u16(status).unwrap(), serde_json::to_vec(&body).unwrap()))
            }
            Some(Reply::Fail(e)) => Err(e),
            Some(Reply::After(..)) | None => Ok(ApiResponse::new(StatusCode::NOT_FOUND, "")),
        }
    }
}

/// One attempt, no pause.
pub(crate) fn single_attempt() -> RetryPolicy {
    RetryPolicy { max_attempts: 1, delay: Duration::ZERO, jitter: Duration::ZERO }
}

/// Wire object as the directory endpoint sends it.
pub(crate) fn wire_institution(id: u32, name: &str, locality: &str, program: &str) -> serde_json::Value {
    serde_json::json!({
        "_id": format!("id-{id}"),
        "Skola": name,
        "Mjesto": locality,
        "Zupanija": "Grad Zagreb",
        "Adresa": "Ulica 1",
        "BrojTelefona": "01 111 222; 01 333 444",
        "EMail": "ured@skola.hr",
        "Web": "www.skola.hr",
        "Program": program,
        "SkolaProgramRokId": id,
        "VrstaOsnivaca": "Javni",
        "Trajanje": 4,
    })
}

pub(crate) fn record(id: u32, name: &str, locality: &str, program: &str) -> InstitutionRecord {
    InstitutionRecord {
        id: format!("id-{id}"),
        name: name.to_string(),
        locality: locality.to_string(),
        region: "Grad Zagreb".to_string(),
        address: String::new(),
        phones: Vec::new(),
        emails: Vec::new(),
        website: None,
        program_name: program.to_string(),
        program_offering_id: id.to_string(),
        founder_type: Some("Javni".to_string()),
        duration_years: Some(4),
    }
}
