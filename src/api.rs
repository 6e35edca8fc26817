// API client module: a small blocking HTTP client for the two endpoints the
// downloader needs, the Discord REST user lookup and the CDN image fetch.

use crate::config::Config;
use crate::error::{DownloadFailure, Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const CHUNK_SIZE: usize = 8192;
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// The subset of a Discord user object the downloader reads. Unknown fields
/// are ignored; `avatar` is `null` for users without a custom avatar.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    pub discriminator: Option<String>,
    pub avatar: Option<String>,
}

/// The network side of the pipeline. `Runner` only talks to this trait so
/// the orchestration can be exercised without a server.
pub trait AvatarApi {
    /// Look up a user by id.
    fn fetch_user(&self, user_id: &str) -> Result<User>;

    /// Stream `url` into `dest`, replacing it if it exists. Returns the
    /// number of bytes written.
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

impl<A: AvatarApi + ?Sized> AvatarApi for &A {
    fn fetch_user(&self, user_id: &str) -> Result<User> {
        (**self).fetch_user(user_id)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        (**self).download(url, dest)
    }
}

/// Blocking client holding the bot token and the endpoints from `Config`.
#[derive(Clone)]
pub struct DiscordClient {
    client: Client,
    api_base: String,
    token: String,
    fetch_timeout: Duration,
    download_timeout: Duration,
}

impl DiscordClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(DiscordClient {
            client,
            api_base: config.api_base.clone(),
            token: config.token.clone(),
            fetch_timeout: config.fetch_timeout,
            download_timeout: config.download_timeout,
        })
    }
}

impl AvatarApi for DiscordClient {
    /// GET `/users/{id}` with the bot token. Any non-2xx status, transport
    /// error, timeout or undecodable body is a `Error::Fetch`.
    fn fetch_user(&self, user_id: &str) -> Result<User> {
        let fetch_err = |source: reqwest::Error| Error::Fetch {
            user_id: user_id.to_string(),
            source,
        };

        let url = format!("{}/users/{}", self.api_base, user_id);
        debug!(%url, "fetching user");
        let res = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bot {}", self.token))
            .timeout(self.fetch_timeout)
            .send()
            .map_err(fetch_err)?;
        debug!(status = %res.status(), "user lookup answered");

        res.error_for_status()
            .map_err(fetch_err)?
            .json::<User>()
            .map_err(fetch_err)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let download_err = |source: DownloadFailure| Error::Download {
            url: url.to_string(),
            source,
        };

        debug!(%url, dest = %dest.display(), "downloading");
        let mut res = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .and_then(|res| res.error_for_status())
            .map_err(|e| download_err(e.into()))?;

        let mut file = File::create(dest).map_err(|e| download_err(e.into()))?;
        let bar = progress_bar(res.content_length());

        match copy_chunked(&mut res, &mut file, &bar) {
            Ok(written) => {
                bar.finish_and_clear();
                debug!(bytes = written, "download finished");
                Ok(written)
            }
            Err(e) => {
                bar.abandon();
                drop(file);
                // Don't leave a truncated image behind.
                let _ = fs::remove_file(dest);
                Err(download_err(e.into()))
            }
        }
    }
}

/// Copy `reader` into `writer` in `CHUNK_SIZE` pieces, ticking `bar`.
fn copy_chunked(
    reader: &mut impl Read,
    writer: &mut impl Write,
    bar: &ProgressBar,
) -> std::io::Result<u64> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut written = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        written += n as u64;
        bar.inc(n as u64);
    }
    writer.flush()?;
    Ok(written)
}

/// Byte progress when the length is known, a spinner otherwise. indicatif
/// draws to stderr and stays hidden when that isn't a terminal.
fn progress_bar(len: Option<u64>) -> ProgressBar {
    match len {
        Some(len) => {
            let bar = ProgressBar::new(len);
            if let Ok(style) =
                ProgressStyle::with_template("{bar:30} {bytes}/{total_bytes} {bytes_per_sec}")
            {
                bar.set_style(style);
            }
            bar
        }
        None => {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner} {bytes}") {
                spinner.set_style(style);
            }
            spinner
        }
    }
}
