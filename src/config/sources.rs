use std::path::PathBuf;

/// Credential files tried before anything given on the command line.
///
/// `~/.my.cnf` is taken literally; no home directory expansion happens.
pub const DEFAULT_SOURCES: [&str; 3] = ["~/.my.cnf", "/etc/mysql/root.cnf", "/etc/mysql/debian.cnf"];

/// Built-in defaults (unless `with_defaults` is false) followed by `extra`, in command line order.
pub fn source_list(extra: &[PathBuf], with_defaults: bool) -> Vec<PathBuf> {
    let defaults: &[&str] = if with_defaults { &DEFAULT_SOURCES } else { &[] };
    defaults
        .iter()
        .map(PathBuf::from)
        .chain(extra.iter().cloned())
        .collect()
}
