//! Credential exchange: fetch the login form, pull out its anti-forgery
//! token, post the credentials back.
//!
//! The flow works on a copy of the session's jar and hands back the cookies
//! the server issued, including those set before a failing step. Success is
//! inferred from the status alone; the site puts no success marker in the
//! response body, so a 200 with fresh cookies is taken as a valid session.

use reqwest::StatusCode;
use tracing::debug;

use super::cookies::IssuedCookie;
use super::session::{fetch_once, response_cookies, site_url, FetchOutcome};
use super::{AuthRecord, CookieJar};
use crate::api::transport::{RequestDescriptor, Transport};
use crate::api::{LoginError, TransportError};
use crate::parse::parse_login;

/// Login form page
pub const LOGIN_FORM_PATH: &str = "/login/index";

/// Credential submission endpoint
pub const LOGIN_SUBMIT_PATH: &str = "/login/registeredUserUsernameAndPasswordLogin";

pub const USERNAME_FIELD: &str = "h_username";
pub const PASSWORD_FIELD: &str = "h_password";
pub const TOKEN_FIELD: &str = "CSRFToken";

/// What a login run produced.
#[derive(Debug)]
pub struct LoginAttempt {
    /// Every cookie the server set, in order, up to the point the flow stopped.
    pub cookies: Vec<IssuedCookie>,
    pub result: Result<(), LoginError>,
}

/// Log in with `record`'s credentials, starting from the cookies in `jar`.
///
/// The caller applies the returned cookies whatever the result; `jar` is not
/// modified.
pub async fn login<T: Transport + ?Sized>(
    transport: &T,
    jar: &CookieJar,
    record: &AuthRecord,
) -> LoginAttempt {
    let mut cookies = Vec::new();
    let result = exchange(transport, jar, record, &mut cookies).await;
    LoginAttempt { cookies, result }
}

async fn exchange<T: Transport + ?Sized>(
    transport: &T,
    jar: &CookieJar,
    record: &AuthRecord,
    issued: &mut Vec<IssuedCookie>,
) -> Result<(), LoginError> {
    let base = jar.base_url();
    let form_url =
        site_url(base, LOGIN_FORM_PATH).map_err(|e| LoginError::FetchForm(Box::new(e)))?;
    let submit_url =
        site_url(base, LOGIN_SUBMIT_PATH).map_err(|e| LoginError::FetchForm(Box::new(e)))?;

    let mut working = jar.clone();

    // Step 1: the form. A single attempt; this must never trigger another login.
    debug!(url = %form_url, "Fetching login form");
    let (outcome, cookies) = fetch_once(transport, &working, &RequestDescriptor::get(form_url)).await;
    working.apply(cookies.iter().cloned());
    issued.extend(cookies);

    let page = match outcome {
        FetchOutcome::ExpiredSession => return Err(LoginError::RedirectLoop),
        other => other.into_body().map_err(|e| LoginError::FetchForm(Box::new(e)))?,
    };

    // Step 2: anti-forgery token
    let token = parse_login(&page).map_err(LoginError::Token)?;

    // Step 3: submit
    let fields = vec![
        (USERNAME_FIELD.to_string(), record.username.clone()),
        (PASSWORD_FIELD.to_string(), record.password.clone()),
        (TOKEN_FIELD.to_string(), token),
    ];
    let request = RequestDescriptor::post_form(submit_url, fields);
    let cookie_header = working.header_for(&request.url);
    debug!(url = %request.url, username = %record.username, "Submitting login form");

    let response = transport
        .send(&request, cookie_header.as_deref())
        .await
        .map_err(|e| match e {
            TransportError::Body(_) => LoginError::ReadResponse(e),
            other => LoginError::Submit(other),
        })?;

    // A rejection may still rotate cookies
    issued.extend(response_cookies(&response, &request.url));

    // Step 4: body discarded, status decides
    if response.status != StatusCode::OK {
        return Err(LoginError::Rejected {
            status: response.status,
        });
    }

    debug!(cookies = issued.len(), "Login form accepted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::{RawResponse, RequestBody};
    use crate::api::SessionError;
    use crate::test_support::{login_page, redirect, ScriptedTransport};
    use reqwest::header;
    use url::Url;

    fn jar() -> CookieJar {
        CookieJar::new(Url::parse("https://www.opal.com.au").unwrap())
    }

    fn record() -> AuthRecord {
        AuthRecord::new("alice", "hunter2")
    }

    fn ok_with_cookie(cookie: &str) -> RawResponse {
        RawResponse::new(StatusCode::OK)
            .with_header(header::SET_COOKIE, cookie)
            .with_body("<html>welcome</html>")
    }

    #[tokio::test]
    async fn test_login_submits_credentials_and_token() {
        let transport = ScriptedTransport::new(vec![
            Ok(login_page("tok-42").with_header(header::SET_COOKIE, "pre=1; Path=/")),
            Ok(ok_with_cookie("JSESSIONID=new; Path=/")),
        ]);
        let jar = jar();

        let attempt = login(&transport, &jar, &record()).await;
        assert!(attempt.result.is_ok());
        let names: Vec<&str> = attempt.cookies.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["pre", "JSESSIONID"]);
        assert!(jar.is_empty(), "login must not touch the caller's jar");

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url.path(), LOGIN_FORM_PATH);
        assert_eq!(requests[1].url.path(), LOGIN_SUBMIT_PATH);
        // Cookie from the form page is carried to the submission
        assert_eq!(requests[1].cookie.as_deref(), Some("pre=1"));
        assert_eq!(
            requests[1].body,
            RequestBody::Form(vec![
                ("h_username".to_string(), "alice".to_string()),
                ("h_password".to_string(), "hunter2".to_string()),
                ("CSRFToken".to_string(), "tok-42".to_string()),
            ])
        );
    }

    #[tokio::test]
    async fn test_login_token_failure() {
        let transport = ScriptedTransport::new(vec![Ok(
            RawResponse::new(StatusCode::OK).with_body("<html>maintenance</html>")
        )]);

        let err = login(&transport, &jar(), &record()).await.result.unwrap_err();
        assert!(matches!(err, LoginError::Token(_)));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_login_form_fetch_failure() {
        let transport =
            ScriptedTransport::new(vec![Ok(RawResponse::new(StatusCode::SERVICE_UNAVAILABLE))]);

        let err = login(&transport, &jar(), &record()).await.result.unwrap_err();
        match err {
            LoginError::FetchForm(inner) => {
                assert!(matches!(*inner, SessionError::HttpStatus { .. }))
            }
            other => panic!("expected form fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_page_redirecting_to_login_is_a_loop() {
        let transport = ScriptedTransport::new(vec![Ok(redirect("/login/index"))]);
        let err = login(&transport, &jar(), &record()).await.result.unwrap_err();
        assert!(matches!(err, LoginError::RedirectLoop));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_login_submit_errors() {
        let transport = ScriptedTransport::new(vec![
            Ok(login_page("t")),
            Err(TransportError::Other("connection refused".into())),
        ]);
        let err = login(&transport, &jar(), &record()).await.result.unwrap_err();
        assert!(matches!(err, LoginError::Submit(_)));
        assert!(err.to_string().starts_with("POSTing login form"));

        let transport =
            ScriptedTransport::new(vec![Ok(login_page("t")), Ok(redirect("/registered/index"))]);
        let err = login(&transport, &jar(), &record()).await.result.unwrap_err();
        assert!(matches!(err, LoginError::Rejected { status } if status == StatusCode::FOUND));
    }

    #[tokio::test]
    async fn test_login_form_transport_failure() {
        let transport =
            ScriptedTransport::new(vec![Err(TransportError::Other("connection reset".into()))]);

        let attempt = login(&transport, &jar(), &record()).await;
        assert!(attempt.cookies.is_empty());
        let err = attempt.result.unwrap_err();
        match err {
            LoginError::FetchForm(ref inner) => {
                assert!(matches!(**inner, SessionError::Transport(TransportError::Other(_))))
            }
            ref other => panic!("expected form fetch error, got {:?}", other),
        }
        assert!(err.to_string().starts_with("GETting login form"));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_login_response_body_failure() {
        let transport = ScriptedTransport::new(vec![
            Ok(login_page("t")),
            Err(TransportError::Body("stream closed mid-body".into())),
        ]);

        let err = login(&transport, &jar(), &record()).await.result.unwrap_err();
        assert!(matches!(err, LoginError::ReadResponse(TransportError::Body(_))));
        assert_eq!(
            err.to_string(),
            "reading login form response: failed to read response body: stream closed mid-body"
        );
    }

    #[tokio::test]
    async fn test_failed_login_still_returns_issued_cookies() {
        // Token missing from the page, but the page set a cookie
        let transport = ScriptedTransport::new(vec![Ok(RawResponse::new(StatusCode::OK)
            .with_header(header::SET_COOKIE, "pre=1; Path=/")
            .with_body("<html>maintenance</html>"))]);
        let attempt = login(&transport, &jar(), &record()).await;
        assert!(matches!(attempt.result, Err(LoginError::Token(_))));
        let names: Vec<&str> = attempt.cookies.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["pre"]);

        // Rejected submission that rotates a cookie
        let transport = ScriptedTransport::new(vec![
            Ok(login_page("t").with_header(header::SET_COOKIE, "pre=1; Path=/")),
            Ok(RawResponse::new(StatusCode::FORBIDDEN)
                .with_header(header::SET_COOKIE, "JSESSIONID=anon; Path=/")),
        ]);
        let attempt = login(&transport, &jar(), &record()).await;
        assert!(matches!(attempt.result, Err(LoginError::Rejected { .. })));
        let names: Vec<&str> = attempt.cookies.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["pre", "JSESSIONID"]);
    }
}
