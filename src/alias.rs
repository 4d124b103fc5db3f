//! User-defined command aliases and their on-disk persistence.
//!
//! The table is a bounded, insertion-ordered list. Alias resolution happens
//! before builtin lookup in the dispatcher, so an alias can shadow a builtin
//! name. Every successful mutation is written back through the attached
//! [`AliasStore`]; a failed save is reported and never interrupts the shell.

use anyhow::{Context, Result, bail};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Maximum number of aliases the table holds.
pub const MAX_ALIASES: usize = 100;

/// One `name -> value` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub name: String,
    pub value: String,
}

/// Persistence collaborator for the alias table.
///
/// Implementations own the on-disk grammar; the table only calls `load` once
/// at startup and `save` after each mutation.
pub trait AliasStore {
    /// Reads all persisted aliases, in file order.
    fn load(&self) -> Result<Vec<(String, String)>>;

    /// Rewrites the persisted set from the current table contents.
    fn save(&self, entries: &[AliasEntry]) -> Result<()>;
}

/// Bounded, insertion-ordered alias table.
pub struct AliasTable {
    entries: Vec<AliasEntry>,
    store: Option<Box<dyn AliasStore>>,
}

impl AliasTable {
    /// Creates an empty table with no persistence attached.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            store: None,
        }
    }

    /// Loads persisted aliases into the table and keeps the store for later
    /// saves.
    ///
    /// Entries already present (e.g. built-in defaults) are overwritten in
    /// place by what the store holds. Load problems are reported to stderr
    /// and leave the table as it was.
    pub fn attach_store(&mut self, store: Box<dyn AliasStore>) {
        match store.load() {
            Ok(pairs) => {
                for (name, value) in pairs {
                    if let Err(e) = self.define(name, value) {
                        eprintln!("myshell: {e}");
                    }
                }
            }
            Err(e) => eprintln!("myshell: can't load aliases: {e}"),
        }
        self.store = Some(store);
    }

    /// Defines or redefines an alias.
    ///
    /// Redefinition replaces the value in place and keeps the entry's
    /// position. A new name is appended; when the table is full the call is
    /// a no-op and returns an error.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let (name, value) = (name.into(), value.into());
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.value = value;
        } else if self.entries.len() >= MAX_ALIASES {
            bail!("maximum aliases reached ({MAX_ALIASES})");
        } else {
            self.entries.push(AliasEntry { name, value });
        }
        self.persist();
        Ok(())
    }

    /// Removes an alias, compacting the list and preserving the relative
    /// order of the remaining entries. Returns `false` when the name is
    /// absent (and does not touch the store).
    pub fn undefine(&mut self, name: &str) -> bool {
        match self.entries.iter().position(|e| e.name == name) {
            Some(idx) => {
                self.entries.remove(idx);
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Looks up the replacement string for a name.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.as_str())
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fire-and-forget save hook; failure is reported, never propagated.
    fn persist(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.entries) {
                eprintln!("myshell: can't save aliases: {e}");
            }
        }
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Line-oriented `name=value` alias file, conventionally `~/.myshell_config`.
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AliasStore for ConfigFile {
    /// A missing file loads as an empty set. Blank lines, `#` comments and
    /// lines without a `=` or with an empty name are skipped.
    fn load(&self) -> Result<Vec<(String, String)>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("{}", self.path.display()));
            }
        };
        let mut pairs = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((name, value)) = line.split_once('=') {
                if !name.is_empty() {
                    pairs.push((name.to_string(), value.to_string()));
                }
            }
        }
        Ok(pairs)
    }

    fn save(&self, entries: &[AliasEntry]) -> Result<()> {
        let mut text = String::new();
        for entry in entries {
            let _ = writeln!(text, "{}={}", entry.name, entry.value);
        }
        fs::write(&self.path, text).with_context(|| format!("{}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_file(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("myshell_{}_{}_{}", tag, std::process::id(), nanos))
    }

    #[test]
    fn test_define_and_lookup() {
        let mut table = AliasTable::new();
        table.define("ll", "ls -la").unwrap();
        assert_eq!(table.lookup("ll"), Some("ls -la"));
        assert_eq!(table.lookup("missing"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_redefine_replaces_value_in_place() {
        let mut table = AliasTable::new();
        table.define("a", "1").unwrap();
        table.define("b", "2").unwrap();
        table.define("a", "3").unwrap();

        let names: Vec<&str> = table.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(table.lookup("a"), Some("3"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_redefine_with_same_value_is_idempotent() {
        let mut table = AliasTable::new();
        table.define("ll", "ls -la").unwrap();
        table.define("g", "git status").unwrap();
        let before: Vec<AliasEntry> = table.entries().to_vec();

        table.define("ll", "ls -la").unwrap();

        assert_eq!(table.entries(), before.as_slice());
    }

    #[test]
    fn test_undefine_compacts_and_preserves_order() {
        let mut table = AliasTable::new();
        table.define("a", "1").unwrap();
        table.define("b", "2").unwrap();
        table.define("c", "3").unwrap();

        assert!(table.undefine("b"));
        let names: Vec<&str> = table.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_undefine_missing_reports_and_keeps_count() {
        let mut table = AliasTable::new();
        table.define("a", "1").unwrap();
        assert!(!table.undefine("nope"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_capacity_rejects_one_past_the_limit() {
        let mut table = AliasTable::new();
        for i in 0..MAX_ALIASES {
            table.define(format!("a{i}"), "v").unwrap();
        }
        let err = table.define("overflow", "v").unwrap_err();
        assert!(err.to_string().contains("maximum aliases"));
        assert_eq!(table.len(), MAX_ALIASES);
        assert_eq!(table.lookup("overflow"), None);
    }

    #[test]
    fn test_redefinition_still_works_at_capacity() {
        let mut table = AliasTable::new();
        for i in 0..MAX_ALIASES {
            table.define(format!("a{i}"), "v").unwrap();
        }
        table.define("a0", "changed").unwrap();
        assert_eq!(table.lookup("a0"), Some("changed"));
        assert_eq!(table.len(), MAX_ALIASES);
    }

    #[test]
    fn test_config_file_round_trip() {
        let path = unique_temp_file("config_rt");
        let store = ConfigFile::new(&path);
        store
            .save(&[
                AliasEntry {
                    name: "ll".into(),
                    value: "ls -la".into(),
                },
                AliasEntry {
                    name: "g".into(),
                    value: "git status".into(),
                },
            ])
            .unwrap();

        let pairs = store.load().unwrap();
        assert_eq!(
            pairs,
            vec![
                ("ll".to_string(), "ls -la".to_string()),
                ("g".to_string(), "git status".to_string()),
            ]
        );

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_config_file_missing_loads_empty() {
        let store = ConfigFile::new(unique_temp_file("config_missing"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_config_file_skips_malformed_lines() {
        let path = unique_temp_file("config_bad");
        fs::write(&path, "# comment\n\nnot-an-alias\n=novalue\nok=yes\n").unwrap();

        let store = ConfigFile::new(&path);
        assert_eq!(store.load().unwrap(), vec![("ok".to_string(), "yes".to_string())]);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_define_persists_through_attached_store() {
        let path = unique_temp_file("config_persist");
        let mut table = AliasTable::new();
        table.attach_store(Box::new(ConfigFile::new(&path)));

        table.define("ll", "ls -la").unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "ll=ls -la\n");

        table.undefine("ll");
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_attach_store_seeds_table_and_overrides_defaults() {
        let path = unique_temp_file("config_seed");
        fs::write(&path, "ls=ls -F\nup=cd ..\n").unwrap();

        let mut table = AliasTable::new();
        table.define("ls", "ls --color=auto").unwrap();
        table.attach_store(Box::new(ConfigFile::new(&path)));

        assert_eq!(table.lookup("ls"), Some("ls -F"));
        assert_eq!(table.lookup("up"), Some("cd .."));

        let _ = fs::remove_file(path);
    }
}
