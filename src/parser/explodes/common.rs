use log::debug;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

use super::{
    hysteria2::Hysteria2Parser, mieru::MieruParser, ss::ShadowsocksParser,
    trojan::TrojanParser, vless::VlessParser, vmess::VmessParser,
};
use crate::models::Proxy;
use crate::parser::{ParseError, ParseSettings};

/// Below this many records the pool is not worth spinning up.
const PARALLEL_THRESHOLD: usize = 64;

/// A share-link decoder for one proxy protocol.
///
/// `parse` receives the record body, everything after `scheme://`.
pub trait SchemeParser: Send + Sync {
    /// Canonical lower-case scheme tag.
    fn scheme(&self) -> &'static str;

    /// Additional scheme tags routed to this parser.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn parse(&self, body: &str) -> Result<Proxy, ParseError>;
}

/// Lookup table from scheme tag to parser.
pub struct ExplodeTable {
    parsers: HashMap<&'static str, Arc<dyn SchemeParser>>,
}

impl ExplodeTable {
    pub fn new() -> Self {
        ExplodeTable {
            parsers: HashMap::new(),
        }
    }

    /// Table with every parser shipped in this crate.
    pub fn with_builtin() -> Self {
        let mut table = ExplodeTable::new();
        table.register(MieruParser);
        table.register(VmessParser);
        table.register(VlessParser);
        table.register(TrojanParser);
        table.register(ShadowsocksParser);
        table.register(Hysteria2Parser);
        table
    }

    /// Registers a parser under its scheme and aliases, replacing any
    /// parser previously registered under the same tags.
    pub fn register<P: SchemeParser + 'static>(&mut self, parser: P) {
        let parser: Arc<dyn SchemeParser> = Arc::new(parser);
        self.parsers.insert(parser.scheme(), Arc::clone(&parser));
        for alias in parser.aliases() {
            self.parsers.insert(*alias, Arc::clone(&parser));
        }
    }

    pub fn get(&self, scheme: &str) -> Option<&dyn SchemeParser> {
        self.parsers.get(scheme).map(|parser| parser.as_ref())
    }

    /// Registered tags, sorted.
    pub fn schemes(&self) -> Vec<&'static str> {
        let mut schemes: Vec<_> = self.parsers.keys().copied().collect();
        schemes.sort_unstable();
        schemes
    }
}

impl Default for ExplodeTable {
    fn default() -> Self {
        ExplodeTable::with_builtin()
    }
}

/// Worker pools by thread count, built on first use.
static WORKER_POOLS: Lazy<Mutex<HashMap<usize, Arc<ThreadPool>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn worker_pool(threads: usize) -> Option<Arc<ThreadPool>> {
    let mut pools = WORKER_POOLS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(pool) = pools.get(&threads) {
        return Some(Arc::clone(pool));
    }
    match ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => {
            let pool = Arc::new(pool);
            pools.insert(threads, Arc::clone(&pool));
            Some(pool)
        }
        Err(err) => {
            debug!("Failed to build worker pool, falling back to the global pool: {}", err);
            None
        }
    }
}

/// Whether a batch of `jobs` items goes to the worker pool.
pub(crate) fn wants_pool(settings: &ParseSettings, jobs: usize) -> bool {
    settings.parallel && jobs >= PARALLEL_THRESHOLD
}

/// Runs `op` inside the pool sized by `settings.max_concur_threads`; `0`
/// means rayon's global pool.
pub(crate) fn install<T, F>(settings: &ParseSettings, op: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    if settings.max_concur_threads == 0 {
        return op();
    }
    match worker_pool(settings.max_concur_threads) {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

/// Process-wide table of the built-in parsers.
pub static BUILTIN_PARSERS: Lazy<ExplodeTable> = Lazy::new(ExplodeTable::with_builtin);

/// Splits a record at the first `://` and lower-cases the scheme.
pub fn split_scheme(record: &str) -> Result<(String, &str), ParseError> {
    let (scheme, body) = record
        .split_once("://")
        .ok_or(ParseError::MissingSeparator)?;
    Ok((scheme.trim().to_lowercase(), body))
}

/// Explode a single share link into a Proxy object
///
/// Selects the parser registered for the link's scheme. Schemes missing from
/// the table, or disabled in `settings`, are reported as unknown.
pub fn explode(
    link: &str,
    table: &ExplodeTable,
    settings: &ParseSettings,
) -> Result<Proxy, ParseError> {
    let (scheme, body) = split_scheme(link)?;
    let parser = table
        .get(&scheme)
        .filter(|parser| settings.scheme_enabled(parser.scheme()))
        .ok_or_else(|| ParseError::UnknownScheme(scheme.clone()))?;

    let proxy = parser.parse(body)?;
    match proxy.missing_required() {
        Some(field) => Err(ParseError::MissingField(field)),
        None => Ok(proxy),
    }
}

/// Non-empty records of a decoded subscription, trailing blanks removed.
pub fn records(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.trim_end_matches([' ', '\r']))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Explode every record of a decoded subscription.
///
/// The result has one entry per record, in record order, whether or not
/// the pool was used.
pub fn explode_records(
    records: &[&str],
    table: &ExplodeTable,
    settings: &ParseSettings,
) -> Vec<Result<Proxy, ParseError>> {
    if !wants_pool(settings, records.len()) {
        return records
            .iter()
            .map(|record| explode(record, table, settings))
            .collect();
    }

    install(settings, || {
        records
            .par_iter()
            .map(|record| explode(record, table, settings))
            .collect()
    })
}

/// Parses `scheme://body` with the shared URL rules every parser uses.
pub(crate) fn parse_share_url(scheme: &str, body: &str) -> Result<Url, ParseError> {
    Ok(Url::parse(&format!("{}://{}", scheme, body))?)
}

/// Explicit port, else the scheme's default, else an error.
pub(crate) fn port_or(url: &Url, default: Option<u16>) -> Result<u16, ParseError> {
    match url.port().or(default) {
        Some(0) => Err(ParseError::invalid("port", "0")),
        Some(port) => Ok(port),
        None => Err(ParseError::MissingField("port")),
    }
}

/// Display name when the link carries none.
pub(crate) fn fallback_name(host: &str, port: &str) -> String {
    format!("{}:{}", host, port)
}

/// Option from a string that may be blank.
pub(crate) fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
