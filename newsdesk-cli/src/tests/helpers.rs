//! Test helpers for composing CLI workspaces on disk.

use super::*;
use camino::Utf8PathBuf;
use newsdesk_core::test_support::sample_articles;
use newsdesk_data::SqliteNewsStore;
use tempfile::TempDir;

/// Temporary directory holding a database and a data file.
pub(super) struct Workspace {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) db: Utf8PathBuf,
    pub(super) data_file: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self {
            db: root.join("newsdesk.db"),
            data_file: root.join("news_data.json"),
            root,
            _dir: dir,
        }
    }

    /// Write the sample articles as a JSON data file.
    pub(super) fn write_sample_data(&self) {
        let records: Vec<ArticleView> = sample_articles().iter().map(ArticleView::from).collect();
        let payload = serde_json::to_string_pretty(&records).expect("serialize records");
        std::fs::write(&self.data_file, payload).expect("write data file");
    }

    /// Store the sample articles directly in the database.
    pub(super) fn seed_database(&self) {
        let store = SqliteNewsStore::open(&self.db).expect("open store");
        for article in sample_articles() {
            store.insert_article(&article).expect("insert article");
        }
    }
}

/// Decode JSON written by a command.
pub(super) fn decode<T: serde::de::DeserializeOwned>(output: &[u8]) -> T {
    serde_json::from_slice(output).expect("command output should be JSON")
}
