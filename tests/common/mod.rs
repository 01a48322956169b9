//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;

use git2::{Oid, Repository, Signature, Time};

/// Base timestamp for commits created with [`TestRepo::commit_at`]
/// (2024-03-01T12:00:00Z).
pub const BASE_TIME: i64 = 1_709_294_400;

/// One day in seconds.
pub const DAY: i64 = 86_400;

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");

        // Lets the git binary commit inside the repo.
        let mut config = repo.config().expect("Failed to open repo config");
        config.set_str("user.name", "Test User").expect("Failed to set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Failed to set user.email");

        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a commit by "Test User" at `BASE_TIME + offset` seconds.
    pub fn commit_at(&self, message: &str, offset: i64) -> Oid {
        self.commit_by("Test User", message, offset)
    }

    /// Create a commit by `author` at `BASE_TIME + offset` seconds.
    pub fn commit_by(&self, author: &str, message: &str, offset: i64) -> Oid {
        let time = Time::new(BASE_TIME + offset, 0);
        let sig = Signature::new(author, "test@example.com", &time)
            .expect("Failed to create signature");

        // Create or update a file to have something to commit
        let file_path = self.dir.path().join("test.txt");
        std::fs::write(&file_path, format!("{}\n{}", message, offset))
            .expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new("test.txt")).expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag_lightweight(name, &obj, false)
            .expect("Failed to create lightweight tag");
    }

    /// Create an annotated tag pointing to the given OID.
    pub fn tag_annotated(&self, name: &str, oid: Oid) {
        let sig = Signature::now("Test User", "test@example.com")
            .expect("Failed to create signature");
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag(name, &obj, &sig, &format!("Version {}", name), false)
            .expect("Failed to create annotated tag");
    }

    /// Write a file relative to the repository root, creating parent dirs.
    pub fn write_file(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Short hash the way the changelog prints it.
    pub fn short(&self, oid: Oid) -> String {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        obj.short_id()
            .expect("Failed to abbreviate id")
            .as_str()
            .expect("Short id is not UTF-8")
            .to_string()
    }
}
