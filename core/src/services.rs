//! Port to service name database.
//!
//! The database is a delimited text file with one mapping per line:
//! `port,name[,protocol]`. Lines that do not parse are skipped and logged, so
//! a header row or a stray comment never makes the whole load fail.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use aridi_common::log::EventLog;

const DELIMITER: char = ',';
const COMMENT: char = '#';

#[derive(Debug, Clone)]
struct ServiceEntry {
    name: String,
    tcp: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PortNameResolver {
    names: HashMap<u16, ServiceEntry>,
}

impl PortNameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads mappings from `path`.
    ///
    /// Returns `false` when the file cannot be read or holds no valid mapping.
    /// The resolver stays usable either way and answers `None` for unknown ports.
    pub fn load(&mut self, path: impl AsRef<Path>, log: &EventLog) -> bool {
        let path: &Path = path.as_ref();
        let contents: String = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                log.debug(format!("Cannot read port database {}: {e}", path.display()));
                return false;
            }
        };

        let loaded: usize = self.parse(&contents, log);
        if loaded == 0 {
            log.debug(format!("Port database {} has no valid mapping", path.display()));
        }
        loaded > 0
    }

    /// Parses database contents, returning how many lines produced a mapping.
    pub fn parse(&mut self, contents: &str, log: &EventLog) -> usize {
        let mut loaded: usize = 0;
        for (idx, line) in contents.lines().enumerate() {
            let line: &str = line.trim();
            if line.is_empty() || line.starts_with(COMMENT) {
                continue;
            }
            match parse_line(line) {
                Ok((port, name, protocol)) => {
                    self.insert_entry(port, name, protocol);
                    loaded += 1;
                }
                Err(e) => {
                    log.debug(format!("Skipping port database line {}: {e:#}", idx + 1));
                }
            }
        }
        loaded
    }

    pub fn insert(&mut self, port: u16, name: impl Into<String>) {
        self.insert_entry(port, &name.into(), None);
    }

    pub fn resolve(&self, port: u16) -> Option<&str> {
        self.names.get(&port).map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    // First mapping wins, except that a tcp mapping replaces a non-tcp one.
    fn insert_entry(&mut self, port: u16, name: &str, protocol: Option<&str>) {
        let tcp: bool = protocol.is_none_or(|p| p.eq_ignore_ascii_case("tcp"));
        let replace: bool = match self.names.get(&port) {
            None => true,
            Some(existing) => !existing.tcp && tcp,
        };
        if replace {
            let name: String = name.to_string();
            self.names.insert(port, ServiceEntry { name, tcp });
        }
    }
}

fn parse_line(line: &str) -> anyhow::Result<(u16, &str, Option<&str>)> {
    let mut fields = line.split(DELIMITER).map(str::trim);

    let port_field: &str = fields.next().unwrap_or_default();
    let port: u16 = port_field
        .parse()
        .with_context(|| format!("'{port_field}' is not a port number"))?;
    if port == 0 {
        bail!("port 0 cannot be mapped");
    }

    let name: &str = match fields.next() {
        Some(name) if !name.is_empty() => name,
        _ => bail!("missing service name for port {port}"),
    };

    let protocol: Option<&str> = fields.next().filter(|p| !p.is_empty());
    Ok((port, name, protocol))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use aridi_common::log::Severity;

    const DATABASE: &str = "\
port,name,protocol
# well-known
22,ssh,tcp
53,domain,udp
53,dns,tcp
80,http
not-a-port,nothing
443,
";

    #[test]
    fn parse_skips_malformed_lines_and_logs_them() {
        let log = EventLog::new();
        let mut resolver = PortNameResolver::new();

        let loaded = resolver.parse(DATABASE, &log);

        assert_eq!(loaded, 4);
        assert_eq!(resolver.len(), 3);
        assert_eq!(resolver.resolve(22), Some("ssh"));
        assert_eq!(resolver.resolve(80), Some("http"));
        assert_eq!(resolver.resolve(443), None);
        assert_eq!(log.view(Severity::Debug).len(), 3);
    }

    #[test]
    fn tcp_mapping_replaces_other_protocols() {
        let log = EventLog::new();
        let mut resolver = PortNameResolver::new();
        resolver.parse(DATABASE, &log);
        assert_eq!(resolver.resolve(53), Some("dns"));
    }

    #[test]
    fn first_tcp_mapping_wins() {
        let log = EventLog::new();
        let mut resolver = PortNameResolver::new();
        resolver.parse("8080,http-alt,tcp\n8080,webcache,tcp\n", &log);
        assert_eq!(resolver.resolve(8080), Some("http-alt"));
    }

    #[test]
    fn missing_file_fails_but_resolver_stays_usable() {
        let log = EventLog::new();
        let mut resolver = PortNameResolver::new();

        assert!(!resolver.load("nonexistent.csv", &log));
        assert!(resolver.is_empty());
        assert_eq!(resolver.resolve(22), None);
    }

    #[test]
    fn file_without_valid_mappings_fails() {
        let path = std::env::temp_dir().join(format!("aridi-empty-{}.csv", std::process::id()));
        fs::write(&path, "port,name\n# nothing here\n").unwrap();

        let log = EventLog::new();
        let mut resolver = PortNameResolver::new();
        let loaded = resolver.load(&path, &log);
        let _ = fs::remove_file(&path);

        assert!(!loaded);
    }

    #[test]
    fn load_reads_the_shipped_database() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../services.csv");
        let log = EventLog::new();
        let mut resolver = PortNameResolver::new();

        assert!(resolver.load(&path, &log));
        assert_eq!(resolver.resolve(22), Some("ssh"));
        assert_eq!(resolver.resolve(443), Some("https"));
    }
}
