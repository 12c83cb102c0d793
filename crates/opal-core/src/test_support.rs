//! In-memory transport that replays canned responses and records requests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header;
use reqwest::{Method, StatusCode};
use url::Url;

use crate::api::transport::{RawResponse, RequestBody, RequestDescriptor, Transport};
use crate::api::TransportError;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub body: RequestBody,
    pub cookie: Option<String>,
}

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<RawResponse, TransportError>>,
    requests: Vec<RecordedRequest>,
}

/// Clones share the same script, so a test can keep a handle for inspection.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                responses: responses.into(),
                requests: Vec::new(),
            })),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        cookie_header: Option<&str>,
    ) -> Result<RawResponse, TransportError> {
        let mut script = self.script.lock().unwrap();
        script.requests.push(RecordedRequest {
            method: request.method.clone(),
            url: request.url.clone(),
            body: request.body.clone(),
            cookie: cookie_header.map(str::to_string),
        });
        script
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no scripted response left".into())))
    }
}

/// A 302 to `location`.
pub fn redirect(location: &str) -> RawResponse {
    RawResponse::new(StatusCode::FOUND).with_header(header::LOCATION, location)
}

/// A login form page carrying `token`.
pub fn login_page(token: &str) -> RawResponse {
    RawResponse::new(StatusCode::OK).with_body(format!(
        r#"<html><body><form action="/login/registeredUserUsernameAndPasswordLogin" method="post">
<input type="text" name="h_username"/>
<input type="password" name="h_password"/>
<input type="hidden" name="CSRFToken" value="{token}"/>
</form></body></html>"#
    ))
}
