//! Host registry.
//!
//! Persists known nodes to a CSV file with a fixed four-column header. The
//! whole file is read and rewritten on every mutation; writes go to a
//! sibling temp file that is renamed over the registry, so a reader sees
//! either the old or the new contents.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::types::{unix_now, Node};

/// Registry file header, in column order.
pub const CSV_HEADERS: [&str; 4] = ["ip_address", "hostname", "description", "last_seen_timestamp"];

/// Suffix appended to the registry path for the corrupt-file backup
pub const BACKUP_SUFFIX: &str = ".bak";

const TEMP_SUFFIX: &str = ".tmp";

/// Persistent store of known nodes.
///
/// Takes the registry file path in the constructor so each consumer can
/// decide where hosts live. All operations serialize on an internal lock,
/// which makes `upsert` safe to call from concurrent discovery tasks.
pub struct HostRegistry {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HostRegistry {
    /// Create a registry backed by `path`. The file is not touched until
    /// the first read or write.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path the corrupt-file backup is copied to.
    pub fn backup_path(&self) -> PathBuf {
        sibling_path(&self.path, BACKUP_SUFFIX)
    }

    /// All known nodes in file order.
    pub async fn list(&self) -> Result<Vec<Node>, StorageError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Insert a node, or refresh the existing node with the same address.
    ///
    /// An empty `display_name` or empty/absent `description` never
    /// overwrites a stored value. Returns the stored record.
    pub async fn upsert(
        &self,
        address: &str,
        display_name: &str,
        description: Option<&str>,
    ) -> Result<Node, StorageError> {
        let _guard = self.lock.lock().await;

        let mut hosts = self.load().await?;
        let now = unix_now();
        let description = description.filter(|d| !d.is_empty());

        let stored = match hosts.iter_mut().find(|h| h.address == address) {
            Some(host) => {
                if !display_name.is_empty() {
                    host.display_name = display_name.to_string();
                }
                if let Some(description) = description {
                    host.description = description.to_string();
                }
                host.last_seen = now;
                host.clone()
            }
            None => {
                let node = Node::new(address, display_name, description.unwrap_or(""), now);
                hosts.push(node.clone());
                node
            }
        };

        self.save(&hosts).await?;
        debug!(address, name = %stored.display_name, "Upserted host");

        Ok(stored)
    }

    /// Insert a node only if its address is unknown.
    ///
    /// An existing record is returned as stored, neither renamed nor
    /// refreshed; the file is only rewritten on insert.
    pub async fn insert_if_absent(
        &self,
        address: &str,
        display_name: &str,
        description: Option<&str>,
    ) -> Result<Node, StorageError> {
        let _guard = self.lock.lock().await;

        let mut hosts = self.load().await?;
        if let Some(existing) = hosts.iter().find(|h| h.address == address) {
            return Ok(existing.clone());
        }

        let node = Node::new(address, display_name, description.unwrap_or(""), unix_now());
        hosts.push(node.clone());
        self.save(&hosts).await?;
        debug!(address, name = %node.display_name, "Inserted unconfirmed host");

        Ok(node)
    }

    /// Resolve a query to a node.
    ///
    /// With no query the first node is the default. Otherwise the tiers are
    /// tried in order, first match wins: exact address, exact name, exact
    /// non-empty description, then case-insensitive substring of name and
    /// of description.
    pub async fn resolve(&self, query: Option<&str>) -> Result<Node, StorageError> {
        let hosts = self.list().await?;
        resolve_in(&hosts, query).ok_or_else(|| match query {
            None => StorageError::Empty(self.path.display().to_string()),
            Some(q) if hosts.is_empty() => StorageError::NotFound {
                query: q.to_string(),
                registry: format!("{} (registry is empty)", self.path.display()),
            },
            Some(q) => StorageError::NotFound {
                query: q.to_string(),
                registry: self.path.display().to_string(),
            },
        })
    }

    async fn load(&self) -> Result<Vec<Node>, StorageError> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        match parse_hosts(&content) {
            Ok(hosts) => Ok(hosts),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Invalid registry file, starting empty");
                self.backup_corrupt_file().await;
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, hosts: &[Node]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::DirectoryAccess(format!("{}: {}", parent.display(), e)))?;
        }

        let content = render_hosts(hosts)?;
        let temp_path = sibling_path(&self.path, TEMP_SUFFIX);

        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, &self.path).await?;

        Ok(())
    }

    async fn backup_corrupt_file(&self) {
        let backup_path = self.backup_path();

        if let Err(e) = fs::copy(&self.path, &backup_path).await {
            let err = StorageError::BackupFailed(format!("{}: {}", backup_path.display(), e));
            warn!("{}", err);
            return;
        }

        warn!(backup = %backup_path.display(), "Backed up corrupt registry");
    }
}

/// Parse registry file contents.
///
/// Empty input is a valid, empty registry. A header that is not exactly
/// [`CSV_HEADERS`] is reported as [`StorageError::Corrupt`].
pub fn parse_hosts(content: &[u8]) -> Result<Vec<Node>, StorageError> {
    if content.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let headers = reader.headers()?.clone();
    if headers.iter().ne(CSV_HEADERS.iter().copied()) {
        let found: Vec<&str> = headers.iter().collect();
        return Err(StorageError::Corrupt(format!(
            "Unexpected headers: {:?}",
            found
        )));
    }

    let mut hosts = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or("");

        let last_seen = field(3).trim().parse::<i64>().unwrap_or_else(|_| {
            debug!(address = field(0), value = field(3), "Unparsable last_seen, using 0");
            0
        });

        hosts.push(Node {
            address: field(0).to_string(),
            display_name: field(1).to_string(),
            description: field(2).to_string(),
            last_seen,
        });
    }

    Ok(hosts)
}

/// Render the full registry file: header followed by one row per node.
pub fn render_hosts(hosts: &[Node]) -> Result<Vec<u8>, StorageError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for host in hosts {
        let last_seen = host.last_seen.to_string();
        writer.write_record([
            host.address.as_str(),
            host.display_name.as_str(),
            host.description.as_str(),
            last_seen.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| StorageError::Io(e.into_error()))
}

/// Tiered lookup over an in-memory host list.
pub fn resolve_in(hosts: &[Node], query: Option<&str>) -> Option<Node> {
    let query = match query {
        None => return hosts.first().cloned(),
        Some(q) => q,
    };
    let lowered = query.to_lowercase();

    let tiers: [&dyn Fn(&Node) -> bool; 5] = [
        &|h| h.address == query,
        &|h| h.display_name == query,
        &|h| !h.description.is_empty() && h.description == query,
        &|h| h.display_name.to_lowercase().contains(&lowered),
        &|h| h.description.to_lowercase().contains(&lowered),
    ];

    tiers
        .iter()
        .find_map(|matches| hosts.iter().find(|h| matches(h)))
        .cloned()
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const SAMPLE: &str = "ip_address,hostname,description,last_seen_timestamp\r\n\
                          10.0.0.2,lamp,living room,1700000000\r\n";

    fn create_test_registry() -> (HostRegistry, tempfile::TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = HostRegistry::new(temp_dir.path().join("known_hosts.csv"));
        (registry, temp_dir)
    }

    fn node(address: &str, name: &str, description: &str) -> Node {
        Node::new(address, name, description, 1_700_000_000)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let (registry, _tmp) = create_test_registry();

        assert!(registry.list().await.unwrap().is_empty());
        assert!(!registry.path().exists());
    }

    #[tokio::test]
    async fn test_empty_file_is_empty_without_backup() {
        let (registry, _tmp) = create_test_registry();
        std::fs::write(registry.path(), b"").unwrap();

        assert!(registry.list().await.unwrap().is_empty());
        assert!(!registry.backup_path().exists());
    }

    #[tokio::test]
    async fn test_upsert_same_address_updates_in_place() {
        let (registry, _tmp) = create_test_registry();

        let first = registry.upsert("10.0.0.5", "old-name", None).await.unwrap();
        let second = registry.upsert("10.0.0.5", "new-name", None).await.unwrap();

        let hosts = registry.list().await.unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].display_name, "new-name");
        assert!(second.last_seen >= first.last_seen);
        assert_eq!(hosts[0].last_seen, second.last_seen);
    }

    #[tokio::test]
    async fn test_upsert_keeps_values_when_new_ones_empty() {
        let (registry, _tmp) = create_test_registry();

        registry.upsert("10.0.0.5", "eye", Some("roof")).await.unwrap();
        let updated = registry.upsert("10.0.0.5", "", Some("")).await.unwrap();

        assert_eq!(updated.display_name, "eye");
        assert_eq!(updated.description, "roof");
    }

    #[tokio::test]
    async fn test_insert_if_absent_leaves_known_node_untouched() {
        let (registry, _tmp) = create_test_registry();
        std::fs::write(
            registry.path(),
            "ip_address,hostname,description,last_seen_timestamp\r\n10.0.0.9,sensor9,greenhouse,1000\r\n",
        )
        .unwrap();
        let before = std::fs::read(registry.path()).unwrap();

        let node = registry.insert_if_absent("10.0.0.9", "10.0.0.9", None).await.unwrap();

        assert_eq!(node.display_name, "sensor9");
        assert_eq!(node.description, "greenhouse");
        assert_eq!(node.last_seen, 1000);
        assert_eq!(std::fs::read(registry.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_insert_if_absent_adds_unknown_node() {
        let (registry, _tmp) = create_test_registry();
        registry.upsert("10.0.0.2", "lamp", None).await.unwrap();

        let node = registry.insert_if_absent("10.0.0.10", "", None).await.unwrap();

        assert_eq!(node.display_name, "10.0.0.10");
        let hosts = registry.list().await.unwrap();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[1].address, "10.0.0.10");
    }

    #[tokio::test]
    async fn test_upsert_new_node_with_empty_name_uses_address() {
        let (registry, _tmp) = create_test_registry();

        let stored = registry.upsert("10.0.0.7", "", None).await.unwrap();
        assert_eq!(stored.display_name, "10.0.0.7");
        assert_eq!(stored.description, "");
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let (registry, _tmp) = create_test_registry();

        for addr in ["10.0.0.9", "10.0.0.1", "10.0.0.5"] {
            registry.upsert(addr, "", None).await.unwrap();
        }
        registry.upsert("10.0.0.1", "renamed", None).await.unwrap();

        let addrs: Vec<String> = registry
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.address)
            .collect();
        assert_eq!(addrs, vec!["10.0.0.9", "10.0.0.1", "10.0.0.5"]);
    }

    #[tokio::test]
    async fn test_resolve_default_on_empty_registry_fails() {
        let (registry, _tmp) = create_test_registry();

        let err = registry.resolve(None).await.unwrap_err();
        assert!(err.is_not_found());

        let err = registry.resolve(Some("anything")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_resolve_default_is_first_inserted() {
        let (registry, _tmp) = create_test_registry();

        registry.upsert("10.0.0.3", "first", None).await.unwrap();
        registry.upsert("10.0.0.4", "second", None).await.unwrap();

        let host = registry.resolve(None).await.unwrap();
        assert_eq!(host.address, "10.0.0.3");
    }

    #[tokio::test]
    async fn test_resolve_not_found_names_query() {
        let (registry, _tmp) = create_test_registry();
        registry.upsert("10.0.0.3", "first", None).await.unwrap();

        let err = registry.resolve(Some("garage")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { ref query, .. } if query == "garage"));
        assert!(err.to_string().contains("'garage'"));
    }

    #[test]
    fn test_resolve_address_beats_description() {
        let hosts = vec![
            node("10.0.0.1", "decoy", "192.168.1.5"),
            node("192.168.1.5", "target", ""),
        ];

        let host = resolve_in(&hosts, Some("192.168.1.5")).unwrap();
        assert_eq!(host.display_name, "target");
    }

    #[test]
    fn test_resolve_tiers() {
        let hosts = vec![
            node("10.0.0.1", "Garden-Eye", "north cluster"),
            node("10.0.0.2", "roof", "Garden"),
            node("10.0.0.3", "garden", "south cluster"),
        ];

        // exact name before exact description
        assert_eq!(resolve_in(&hosts, Some("garden")).unwrap().address, "10.0.0.3");
        // exact description before substring of name
        assert_eq!(resolve_in(&hosts, Some("Garden")).unwrap().address, "10.0.0.2");
        // case-insensitive substring of name
        assert_eq!(resolve_in(&hosts, Some("EYE")).unwrap().address, "10.0.0.1");
        // case-insensitive substring of description
        assert_eq!(resolve_in(&hosts, Some("SOUTH")).unwrap().address, "10.0.0.3");
        assert!(resolve_in(&hosts, Some("basement")).is_none());
    }

    #[test]
    fn test_resolve_empty_description_never_matches_exactly() {
        let hosts = vec![node("10.0.0.1", "eye", "")];
        // the empty query still substring-matches the name tier
        assert_eq!(resolve_in(&hosts, Some("")).unwrap().address, "10.0.0.1");
    }

    #[test]
    fn test_parse_sample_row() {
        let hosts = parse_hosts(SAMPLE.as_bytes()).unwrap();

        assert_eq!(hosts, vec![node("10.0.0.2", "lamp", "living room")]);
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let hosts = parse_hosts(SAMPLE.as_bytes()).unwrap();
        let rendered = render_hosts(&hosts).unwrap();

        assert_eq!(rendered, SAMPLE.as_bytes());
    }

    #[test]
    fn test_render_quotes_fields_with_commas() {
        let hosts = vec![node("10.0.0.8", "eye, the second", "a \"quoted\" cluster")];
        let rendered = render_hosts(&hosts).unwrap();

        assert_eq!(parse_hosts(&rendered).unwrap(), hosts);
    }

    #[test]
    fn test_parse_wrong_header_is_corrupt() {
        let err = parse_hosts(b"a,b\r\n1,2\r\n").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_backed_up_and_treated_as_empty() {
        let (registry, _tmp) = create_test_registry();
        let original = b"a,b\r\nx,y\r\n";
        std::fs::write(registry.path(), original).unwrap();

        let hosts = registry.list().await.unwrap();
        assert!(hosts.is_empty());

        let backup = std::fs::read(registry.backup_path()).unwrap();
        assert_eq!(backup, original);
        assert!(registry
            .backup_path()
            .to_string_lossy()
            .ends_with("known_hosts.csv.bak"));
    }

    #[tokio::test]
    async fn test_failed_backup_still_starts_empty() {
        let (registry, _tmp) = create_test_registry();
        // a directory where the backup file should go makes the copy fail
        std::fs::create_dir(registry.backup_path()).unwrap();
        std::fs::write(registry.path(), b"a,b\r\n").unwrap();

        let hosts = registry.list().await.unwrap();

        assert!(hosts.is_empty());
        assert!(registry.backup_path().is_dir());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_not_merged_on_upsert() {
        let (registry, _tmp) = create_test_registry();
        std::fs::write(registry.backup_path(), b"stale backup").unwrap();
        std::fs::write(registry.path(), b"a,b\r\nx,y\r\n").unwrap();

        registry.upsert("10.0.0.2", "lamp", None).await.unwrap();

        let hosts = registry.list().await.unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].address, "10.0.0.2");
        // previous backup overwritten
        assert_eq!(std::fs::read(registry.backup_path()).unwrap(), b"a,b\r\nx,y\r\n");
    }

    #[tokio::test]
    async fn test_save_creates_parent_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = HostRegistry::new(temp_dir.path().join("nested").join("known_hosts.csv"));

        registry.upsert("10.0.0.2", "lamp", None).await.unwrap();
        assert!(registry.path().exists());
    }

    #[tokio::test]
    async fn test_concurrent_upserts_do_not_lose_writes() {
        let (registry, _tmp) = create_test_registry();
        let registry = Arc::new(registry);

        let mut handles = Vec::new();
        for i in 1..=24 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry
                    .upsert(&format!("10.0.1.{}", i), &format!("node-{}", i), None)
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.list().await.unwrap().len(), 24);
    }
}
