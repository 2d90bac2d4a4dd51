//! In-memory `UserStore` for tests.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use anyhow::anyhow;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::{
    repo::{StoreError, StoreResult, UserStore},
    repo_types::{NewUser, UserChanges, UserRecord},
};

#[derive(Default)]
pub struct MemoryUserStore {
    // insertion order
    rows: Mutex<Vec<UserRecord>>,
    mutations: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of update/delete calls that reached the store.
    pub fn mutation_calls(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Every later call fails as if the database connection dropped.
    pub fn go_offline(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Other(anyhow!("connection refused")));
        }
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<UserRecord> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> StoreResult<UserRecord> {
        self.check_online()?;
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| r.email == user.email || r.id == user.id) {
            return Err(StoreError::UniqueViolation);
        }
        let now = OffsetDateTime::now_utc();
        let record = UserRecord {
            id: user.id,
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            created_at: now,
            updated_at: now,
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
        self.check_online()?;
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        self.check_online()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.email == email).cloned())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<UserRecord>> {
        self.check_online()?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.name = Some(name);
        }
        if let Some(hash) = changes.password_hash {
            row.password_hash = hash;
        }
        row.updated_at = OffsetDateTime::now_utc();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
        self.check_online()?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let pos = rows.iter().position(|r| r.id == id);
        Ok(pos.map(|i| rows.remove(i)))
    }

    async fn list_all(&self) -> StoreResult<Vec<UserRecord>> {
        self.check_online()?;
        let rows = self.rows.lock().unwrap();
        // stable sort over reversed insertion order keeps later inserts first on ties
        let mut out: Vec<UserRecord> = rows.iter().rev().cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}
