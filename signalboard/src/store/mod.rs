use crate::auth;
use crate::error::{Result, StoreError};
use crate::model::{Signal, Site, User};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// The four collections, each one JSON array file under the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Signals,
    Sites,
    Submissions,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Signals,
        Collection::Sites,
        Collection::Submissions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Signals => "signals",
            Collection::Sites => "sites",
            Collection::Submissions => "submissions",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Users => "users.json",
            Collection::Signals => "signals.json",
            Collection::Sites => "sites.json",
            Collection::Submissions => "submissions.json",
        }
    }
}

/// The main entry point for Signalboard data.
/// Owns a data directory of JSON collection files and provides the
/// whole-collection read/modify/write services the board is built on.
///
/// Every mutation holds a per-collection mutex across its full
/// load-mutate-save cycle, so in-process writers never lose updates.
/// Cross-process writers are out of scope.
pub struct Store {
    root: PathBuf,
    locks: [Mutex<()>; 4],
}

impl Store {
    /// Open a store at the given data directory, creating it if absent.
    pub fn open(path: &str) -> Result<Self> {
        let root = PathBuf::from(path);
        std::fs::create_dir_all(&root)?;

        Ok(Store {
            root,
            locks: [Mutex::new(()), Mutex::new(()), Mutex::new(()), Mutex::new(())],
        })
    }

    /// Get the root data directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.file_name())
    }

    fn lock(&self, collection: Collection) -> MutexGuard<'_, ()> {
        // A poisoned lock only means another thread panicked mid-write;
        // the file on disk is still either the old or the new array.
        self.locks[collection as usize]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ── File layer ─────────────────────────────────────────────────

    /// Load a collection. An absent or empty file is an empty collection;
    /// malformed JSON is a hard `Corrupt` error so that the next save
    /// cannot silently clobber existing records.
    pub fn load<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let raw = std::fs::read_to_string(&path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            path: path.display().to_string(),
            source,
        })
    }

    /// Save a collection wholesale: serialize as pretty UTF-8 JSON into a
    /// temp file in the same directory, then rename over the target so a
    /// crash mid-write never leaves a truncated file.
    pub fn save<T: Serialize>(&self, collection: Collection, records: &[T]) -> Result<()> {
        let path = self.collection_path(collection);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        serde_json::to_writer_pretty(&mut tmp, records)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    // ── User services ──────────────────────────────────────────────

    /// Register a new account. Rejects empty fields and duplicate
    /// usernames (linear scan, no change to the stored collection on
    /// rejection). Returns the appended record.
    pub fn register_user(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        let password = password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(StoreError::Validation(
                "username and password are required".into(),
            ));
        }

        let _guard = self.lock(Collection::Users);
        let mut users: Vec<User> = self.load(Collection::Users)?;

        if users.iter().any(|u| u.username == username) {
            return Err(StoreError::DuplicateUsername(username.to_string()));
        }

        let salt = auth::new_salt();
        let user = User {
            username: username.to_string(),
            password_hash: auth::hash_password(password, &salt),
            salt,
            verification_code: auth::verification_code(),
            verified: false,
            registered_at: Utc::now(),
        };

        users.push(user.clone());
        self.save(Collection::Users, &users)?;
        log::info!("registered user '{username}'");
        Ok(user)
    }

    /// Delete every record with this username, preserving the relative
    /// order of the rest. Returns whether anything was removed.
    pub fn delete_user(&self, username: &str) -> Result<bool> {
        let username = username.trim();
        let _guard = self.lock(Collection::Users);
        let mut users: Vec<User> = self.load(Collection::Users)?;

        let before = users.len();
        users.retain(|u| u.username != username);
        if users.len() == before {
            return Ok(false);
        }

        self.save(Collection::Users, &users)?;
        log::info!("deleted user '{username}'");
        Ok(true)
    }

    /// Mark the user verified when the submitted code matches.
    /// Returns whether verification succeeded; unknown users are an error.
    pub fn verify_user(&self, username: &str, code: &str) -> Result<bool> {
        let _guard = self.lock(Collection::Users);
        let mut users: Vec<User> = self.load(Collection::Users)?;

        let user = users
            .iter_mut()
            .find(|u| u.username == username)
            .ok_or_else(|| StoreError::NotFound {
                collection: "users".into(),
                key: username.to_string(),
            })?;

        if user.verification_code != code.trim() {
            return Ok(false);
        }

        user.verified = true;
        self.save(Collection::Users, &users)?;
        Ok(true)
    }

    /// Check a password against the stored salted digest.
    pub fn check_password(&self, username: &str, password: &str) -> Result<bool> {
        let users: Vec<User> = self.load(Collection::Users)?;
        let user = users
            .iter()
            .find(|u| u.username == username)
            .ok_or_else(|| StoreError::NotFound {
                collection: "users".into(),
                key: username.to_string(),
            })?;

        Ok(auth::verify_password(password, &user.salt, &user.password_hash))
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.load(Collection::Users)
    }

    // ── Site services ──────────────────────────────────────────────

    /// Submit a new site. Appends one record to the sites collection and
    /// an identical copy to the append-only submissions log. The copy is
    /// never reconciled with later like-counts. The two saves are not a
    /// transaction: if the submissions save fails after the sites save
    /// succeeded, the site stays in the directory with no log copy and
    /// the error is returned.
    pub fn submit_site(&self, name: &str, url: &str, description: &str) -> Result<Site> {
        let name = name.trim();
        let url = url.trim();
        let description = description.trim();
        if name.is_empty() || url.is_empty() || description.is_empty() {
            return Err(StoreError::Validation("all fields are required".into()));
        }

        let site = {
            let _guard = self.lock(Collection::Sites);
            let mut sites: Vec<Site> = self.load(Collection::Sites)?;

            let site = Site {
                id: sites.len() as u64 + 1,
                name: name.to_string(),
                url: url.to_string(),
                description: description.to_string(),
                likes: 0,
                submitted_at: Utc::now(),
            };

            sites.push(site.clone());
            self.save(Collection::Sites, &sites)?;
            site
        };

        let _guard = self.lock(Collection::Submissions);
        let mut submissions: Vec<Site> = self.load(Collection::Submissions)?;
        submissions.push(site.clone());
        self.save(Collection::Submissions, &submissions)?;

        log::info!("site '{}' submitted (id {})", site.name, site.id);
        Ok(site)
    }

    /// Increment a site's like counter and return the new count.
    pub fn like_site(&self, id: u64) -> Result<u64> {
        let _guard = self.lock(Collection::Sites);
        let mut sites: Vec<Site> = self.load(Collection::Sites)?;

        let site = sites
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: "sites".into(),
                key: id.to_string(),
            })?;

        site.likes += 1;
        let likes = site.likes;
        self.save(Collection::Sites, &sites)?;
        Ok(likes)
    }

    pub fn list_sites(&self) -> Result<Vec<Site>> {
        self.load(Collection::Sites)
    }

    pub fn list_submissions(&self) -> Result<Vec<Site>> {
        self.load(Collection::Submissions)
    }

    // ── Signal services ────────────────────────────────────────────

    pub fn list_signals(&self) -> Result<Vec<Signal>> {
        self.load(Collection::Signals)
    }

    // ── Introspection ──────────────────────────────────────────────

    /// Record counts per collection, for the CLI status command.
    pub fn status(&self) -> Result<serde_json::Value> {
        let mut collections = serde_json::Map::new();

        for collection in Collection::ALL {
            let records: Vec<serde_json::Value> = self.load(collection)?;
            collections.insert(
                collection.name().to_string(),
                serde_json::json!({ "count": records.len() }),
            );
        }

        Ok(serde_json::json!({
            "data_dir": self.root.display().to_string(),
            "collections": collections,
        }))
    }
}
