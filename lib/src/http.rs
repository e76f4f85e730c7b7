use std::time::Duration;

use crate::{Error, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const AGENT: &str = concat!("restdays/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok::<_, Error>(client)
    })
}

/// GETs `url` and returns the body, treating any non-2xx status as an error.
pub fn get_text(url: &str) -> Result<String> {
    let resp = http_client()?.get(url).header(USER_AGENT, AGENT).send()?;
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        return Err(Error::UnexpectedResponse {
            url: url.to_string(),
            reason: format!("http {}", status),
        });
    }
    Ok(body)
}
