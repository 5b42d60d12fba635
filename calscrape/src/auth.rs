//! Interactive OAuth flow for the Calendar API.
//!
//! Opens the consent page in a browser, receives the redirect on a
//! one-shot loopback listener, exchanges the code and stores the session.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::config::Credentials;
use crate::google::CalendarClient;
use crate::session::{Session, SessionData, TOKEN_URL, TokenResponse};

/// The scraper only ever reads the calendar.
pub const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar.readonly"];

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

const REDIRECT_PORT: u16 = 8085;

fn redirect_uri() -> String {
    format!("http://localhost:{}/callback", REDIRECT_PORT)
}

fn redirect_address() -> String {
    format!("127.0.0.1:{}", REDIRECT_PORT)
}

/// Consent URL with offline access, so the exchange yields a refresh
/// token we can keep using between runs.
pub fn consent_url(creds: &Credentials, state: &str) -> String {
    let scopes = SCOPES.join(" ");

    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type=offline&prompt=consent",
        AUTH_URL,
        urlencoding::encode(&creds.client_id),
        urlencoding::encode(&redirect_uri()),
        urlencoding::encode(&scopes),
        urlencoding::encode(state),
    )
}

pub async fn run(creds: &Credentials) -> Result<Session> {
    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = consent_url(creds, &state);

    eprintln!("\nOpen this URL in your browser to authenticate:\n");
    eprintln!("{}\n", auth_url);

    // Try to open the browser automatically
    if open::that(&auth_url).is_err() {
        eprintln!("(Could not open browser automatically, please copy the URL above)");
    }

    let (code, returned_state) = wait_for_callback().await?;

    if returned_state != state {
        anyhow::bail!("OAuth state mismatch, aborting");
    }

    eprintln!("\nReceived authorization code, exchanging for tokens...");

    let tokens = exchange_code(creds, &code).await?;
    let session = Session::new(SessionData::from_response(tokens, None)?);
    session.save()?;

    // Confirm the session works and show which account this is.
    let client = CalendarClient::new(session.access_token());
    let calendars = client.list_calendars().await?;

    match calendars.iter().find(|cal| cal.primary) {
        Some(primary) => eprintln!("Authenticated (primary calendar: {})", primary.summary),
        None => eprintln!("Authenticated"),
    }

    Ok(session)
}

async fn exchange_code(creds: &Credentials, code: &str) -> Result<TokenResponse> {
    let redirect = redirect_uri();
    let client = reqwest::Client::new();

    let response = client
        .post(TOKEN_URL)
        .form(&[
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect.as_str()),
        ])
        .send()
        .await
        .context("Failed to send token request")?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        anyhow::bail!("Token exchange failed: {}", error_text);
    }

    response
        .json()
        .await
        .context("Failed to parse token response")
}

async fn wait_for_callback() -> Result<(String, String)> {
    let listener = TcpListener::bind(redirect_address())
        .await
        .context("Failed to bind OAuth callback listener")?;

    let (stream, _) = listener
        .accept()
        .await
        .context("Failed to accept OAuth callback")?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read OAuth callback request line")?;

    // Parse the request line to get the code and state
    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Invalid HTTP request"))?;

    let url = url::Url::parse(&format!("http://localhost{}", url_part))?;

    let code = url
        .query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.to_string())
        .ok_or_else(|| anyhow::anyhow!("No code in callback"))?;

    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.to_string())
        .ok_or_else(|| anyhow::anyhow!("No state in callback"))?;

    // Send a response to the browser
    let response = "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>\
        <h1>calscrape is authenticated.</h1>\
        <p>You can close this tab and return to the terminal.</p>\
        </body></html>";

    let mut stream = reader.into_inner();
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write OAuth callback response")?;
    stream.flush().await?;

    Ok((code, state))
}
