// API client module: a small blocking HTTP client for services that speak
// the Google Reader subscription API. Every call is sequential and the
// response bodies of subscription calls are never inspected.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use tracing::debug;

const CLIENT_LOGIN_PATH: &str = "/accounts/ClientLogin";
const QUICKADD_PATH: &str = "/reader/api/0/subscription/quickadd";
const EDIT_PATH: &str = "/reader/api/0/subscription/edit";

/// Length of the `Auth=` prefix on the token line of a ClientLogin reply.
const AUTH_PREFIX_LEN: usize = 5;

/// The two subscription calls the importer drives.
pub trait ReaderApi {
    /// Subscribe to `feed_url`.
    fn quick_add(&self, feed_url: &str) -> Result<()>;

    /// Label the subscription for `feed_url` with `folder`, optionally
    /// renaming it to `title`.
    fn edit_subscription(&self, feed_url: &str, folder: &str, title: Option<&str>) -> Result<()>;
}

/// Blocking client holding the reqwest client, the server base URL and an
/// optional `Authorization` value for authenticated calls.
#[derive(Clone)]
pub struct ReaderClient {
    client: Client,
    base_url: String,
    auth: Option<HeaderValue>,
}

/// ClientLogin form payload.
#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub passwd: &'a str,
}

/// Subscription edit form payload. `t` is only sent when a title is known.
#[derive(Serialize, Debug)]
pub struct EditRequest<'a> {
    pub ac: &'a str,
    pub s: String,
    pub a: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<&'a str>,
}

impl ReaderClient {
    /// Create a client for the service at `server`.
    pub fn new(server: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, server))
    }

    /// Wrap an already configured reqwest client.
    pub fn with_client(client: Client, server: &str) -> Self {
        ReaderClient {
            client,
            base_url: server.trim_end_matches('/').to_string(),
            auth: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store the `Authorization` value sent with every subscription call.
    pub fn set_auth(&mut self, value: &str) -> Result<()> {
        let mut header =
            HeaderValue::from_str(value).context("Login produced an invalid authorization header")?;
        header.set_sensitive(true);
        self.auth = Some(header);
        Ok(())
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = &self.auth {
            headers.insert(AUTHORIZATION, value.clone());
        }
        headers
    }

    /// Exchange credentials for an authorization header value. The reply
    /// is read blindly: the status is not checked and the token line is
    /// not validated, so a rejected login yields a useless header.
    pub fn client_login(&self, email: &str, passwd: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, CLIENT_LOGIN_PATH);
        let res = self
            .client
            .post(&url)
            .form(&LoginRequest { email, passwd })
            .send()
            .context("Failed to send login request")?;
        debug!(status = %res.status(), "client login");
        let body = res.text().context("Failed to read login response body")?;
        Ok(auth_header_from_login_body(&body))
    }
}

impl ReaderApi for ReaderClient {
    /// The feed URL is appended to the query string as-is.
    fn quick_add(&self, feed_url: &str) -> Result<()> {
        let url = format!("{}{}?quickadd={}", self.base_url, QUICKADD_PATH, feed_url);
        let res = self
            .client
            .post(&url)
            .headers(self.auth_headers())
            .send()
            .with_context(|| format!("Failed to send quickadd request for {}", feed_url))?;
        debug!(feed = feed_url, status = %res.status(), "quickadd");
        Ok(())
    }

    fn edit_subscription(&self, feed_url: &str, folder: &str, title: Option<&str>) -> Result<()> {
        let url = format!("{}{}", self.base_url, EDIT_PATH);
        let form = EditRequest {
            ac: "edit",
            s: format!("feed/{}", feed_url),
            a: format!("user/-/label/{}", folder),
            t: title,
        };
        let res = self
            .client
            .post(&url)
            .headers(self.auth_headers())
            .form(&form)
            .send()
            .with_context(|| format!("Failed to send edit request for {}", feed_url))?;
        debug!(feed = feed_url, folder, status = %res.status(), "edit");
        Ok(())
    }
}

/// Build `GoogleLogin auth=<token>` from a ClientLogin reply: the token is
/// the last line of the body minus its first five characters.
pub fn auth_header_from_login_body(body: &str) -> String {
    let last_line = body.split('\n').last().unwrap_or_default();
    let token: String = last_line.chars().skip(AUTH_PREFIX_LEN).collect();
    format!("GoogleLogin auth={}", token)
}
