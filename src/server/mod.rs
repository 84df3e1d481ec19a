use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

use crate::battle::Locale;
use crate::config::AnalyzerConfig;
use crate::names::{
    CachedNameResolver, CharacterCatalog, FileNameResolver, NameCache, NameResolver,
    DEFAULT_NAME_CACHE_TTL_SECS,
};

pub mod api;
pub mod routes;

const MAX_HEAD_BYTES: usize = 16 * 1024;
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;
const READ_TIMEOUT: Duration = Duration::from_secs(10);
const NAME_CACHE_KEY: &str = "characters";

/// Shared, read-mostly state for request handling.
pub struct AppState {
    runtime: Runtime,
    resolver: Box<dyn NameResolver>,
    name_cache: Arc<Mutex<NameCache>>,
    catalog: CharacterCatalog,
    locale: Locale,
}

impl AppState {
    /// Wire the file-backed dictionary behind a cache owned by this state.
    pub fn from_config(config: &AnalyzerConfig) -> std::io::Result<Self> {
        let ttl = chrono::Duration::try_seconds(config.name_cache_ttl_secs)
            .unwrap_or_else(|| chrono::Duration::seconds(DEFAULT_NAME_CACHE_TTL_SECS));
        let name_cache = Arc::new(Mutex::new(NameCache::new(ttl)));
        let resolver = CachedNameResolver::new(
            FileNameResolver::new(&config.names_path),
            Arc::clone(&name_cache),
            NAME_CACHE_KEY,
        );
        let catalog = CharacterCatalog::load_or_empty(&config.catalog_path);
        Self::with_cache(Box::new(resolver), name_cache, catalog, config.locale)
    }

    pub fn with_parts(
        resolver: Box<dyn NameResolver>,
        catalog: CharacterCatalog,
        locale: Locale,
    ) -> std::io::Result<Self> {
        Self::with_cache(
            resolver,
            Arc::new(Mutex::new(NameCache::default())),
            catalog,
            locale,
        )
    }

    fn with_cache(
        resolver: Box<dyn NameResolver>,
        name_cache: Arc<Mutex<NameCache>>,
        catalog: CharacterCatalog,
        locale: Locale,
    ) -> std::io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            runtime,
            resolver,
            name_cache,
            catalog,
            locale,
        })
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn resolver(&self) -> &dyn NameResolver {
        self.resolver.as_ref()
    }

    pub fn catalog(&self) -> &CharacterCatalog {
        &self.catalog
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Drop expired cached names; returns how many entries went.
    pub fn purge_expired_names(&self) -> usize {
        match self.name_cache.lock() {
            Ok(mut cache) => cache.cleanup(),
            Err(_) => 0,
        }
    }
}

pub fn run_server(config: &AnalyzerConfig) -> std::io::Result<()> {
    let state = AppState::from_config(config)?;
    let listener = TcpListener::bind(&config.bind_addr)?;
    tracing::info!("combat_digest server listening on http://{}", config.bind_addr);

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream, &state) {
                    tracing::warn!("request error: {err}");
                }
            }
            Err(err) => tracing::warn!("connection failed: {err}"),
        }
    }

    Ok(())
}

fn header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Read the request head, then exactly `Content-Length` body bytes.
fn read_request<R: Read>(stream: &mut R) -> std::io::Result<Option<(String, String)>> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut chunk = [0_u8; 16_384];

    let body_start = loop {
        let bytes_read = stream.read(&mut chunk)?;
        if bytes_read == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            break buffer.len();
        }
        buffer.extend_from_slice(&chunk[..bytes_read]);
        if let Some(end) = header_end(&buffer) {
            break end;
        }
        if buffer.len() > MAX_HEAD_BYTES {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("request head exceeds {MAX_HEAD_BYTES} bytes"),
            ));
        }
    };

    let head = String::from_utf8_lossy(&buffer[..body_start]).to_string();
    let wanted = content_length(&head).min(MAX_BODY_BYTES);
    while buffer.len() - body_start < wanted {
        let bytes_read = stream.read(&mut chunk)?;
        if bytes_read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..bytes_read]);
    }
    let body_end = buffer.len().min(body_start + wanted);
    let body = String::from_utf8_lossy(&buffer[body_start..body_end]).to_string();
    Ok(Some((head, body)))
}

fn handle_connection(stream: &mut TcpStream, state: &AppState) -> std::io::Result<()> {
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    let Some((head, body)) = read_request(stream)? else {
        return Ok(());
    };

    let request_line = head.lines().next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or("GET");
    let path = request_parts.next().unwrap_or("/");

    let response = routes::route_request(method, path, &body, state);
    tracing::debug!(method, path, status = response.status_code, "handled request");
    stream.write_all(response.to_http_string().as_bytes())?;
    stream.flush()?;
    Ok(())
}
