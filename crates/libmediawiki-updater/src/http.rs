// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{
    io::{Read, Write},
    time::Duration,
};

use crate::{Error, Result};

pub const USER_AGENT: &str = concat!("mediawiki-updater/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT_SECS: u64 = 10;
const DOWNLOAD_BUFFER_SIZE: usize = 8192;

/// the two requests the pipeline makes: fetch a listing page, stream an
/// archive.
pub trait Transport {
    fn get_text(&self, url: &str) -> Result<String>;

    /// streams the response body into `sink`, returning the byte count.
    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64>;
}

/// blocking http client; every request carries the updater's user agent.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        // whole-request timeout is left unset: core tarballs are large
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(None)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }
}

impl Transport for HttpClient {
    fn get_text(&self, url: &str) -> Result<String> {
        log::debug!("**http:** GET {url}");
        Ok(self.get(url)?.text()?)
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        log::debug!("**http:** downloading {url}");
        let mut reader = self.get(url)?;
        let mut buffer = [0u8; DOWNLOAD_BUFFER_SIZE];
        let mut total = 0u64;

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .map_err(|e| Error::download(format!("read error from {url}: {e}")))?;

            if bytes_read == 0 {
                break;
            }

            sink.write_all(&buffer[..bytes_read])?;
            total += bytes_read as u64;
        }

        sink.flush()?;
        Ok(total)
    }
}
