use std::{
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use anyhow::Result;
use chrono::Utc;
use log::info;
use lru_time_cache::LruCache;

use crate::{
    db::collection::Collection,
    error::AppError,
    models::{RecordId, Role, User},
    utils::time_sortable_uid,
};

const MIN_PASSWORD_LEN: usize = 8;

/// Account storage with a time-bounded cache in front of the `users` tree.
/// A second tree maps normalized emails to user ids.
pub struct UserStorage {
    users: Collection<User>,
    by_email: sled::Tree,
    cache: Arc<RwLock<LruCache<String, User>>>,
}

impl UserStorage {
    pub fn open(db: &sled::Db, cache_ttl: Duration) -> Result<Self> {
        Ok(Self {
            users: Collection::open(db)?,
            by_email: db.open_tree("users_by_email")?,
            cache: Arc::new(RwLock::new(LruCache::with_expiry_duration(cache_ttl))),
        })
    }

    /// Hash `password` and store a new account. Emails are unique, compared
    /// case-insensitively.
    pub fn create_user(
        &self,
        email: &str,
        password: &str,
        role: Role,
        profile_id: Option<RecordId>,
    ) -> Result<User, AppError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = User {
            id: time_sortable_uid(),
            email: email.clone(),
            password_hash: bcrypt::hash(password, bcrypt::DEFAULT_COST)?,
            role,
            profile_id,
            created_at: Utc::now(),
        };

        let claimed = self.by_email.compare_and_swap(
            email.as_bytes(),
            None as Option<&[u8]>,
            Some(user.id.as_bytes()),
        )?;
        if claimed.is_err() {
            return Err(AppError::Conflict(format!("email already registered: {email}")));
        }
        if let Err(err) = self.users.insert(&user) {
            self.by_email.remove(email.as_bytes())?;
            return Err(err);
        }

        self.write_cache().insert(user.id.clone(), user.clone());
        info!("Created {:?} account {}", user.role, user.id);
        Ok(user)
    }

    /// Cached lookup by id. Storage and decode failures are errors, not `None`.
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        if let Some(user) = self.write_cache().get(id) {
            return Ok(Some(user.clone()));
        }

        let Some(user) = self.users.get(id)? else {
            return Ok(None);
        };
        self.write_cache().insert(id.to_string(), user.clone());
        Ok(Some(user))
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let Ok(email) = normalize_email(email) else {
            return Ok(None);
        };
        match self.by_email.get(email.as_bytes())? {
            Some(id) => self.get_user(&String::from_utf8(id.to_vec())?),
            None => Ok(None),
        }
    }

    /// Returns the account when `password` matches. Unknown emails and wrong
    /// passwords produce the same error.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AppError> {
        let mk_auth_err = || AppError::authentication("Incorrect credentials");
        let user = self.find_by_email(email)?.ok_or_else(mk_auth_err)?;
        if !bcrypt::verify(password, &user.password_hash)? {
            return Err(mk_auth_err());
        }
        Ok(user)
    }

    /// Creates the bootstrap admin unless it exists. An existing non-admin
    /// account with that email is a conflict.
    pub fn ensure_admin(&self, email: &str, password: &str) -> Result<User, AppError> {
        if let Some(existing) = self.find_by_email(email)? {
            if !existing.is_admin() {
                return Err(AppError::conflict(format!(
                    "{} belongs to a {:?} account",
                    existing.email, existing.role
                )));
            }
            return Ok(existing);
        }
        self.create_user(email, password, Role::Admin, None)
    }

    pub fn count(&self) -> usize {
        self.users.count()
    }

    pub fn cached_count(&self) -> usize {
        self.read_cache().len()
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, LruCache<String, User>> {
        self.cache.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, LruCache<String, User>> {
        self.cache.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let normalized = email.trim().to_lowercase();
    let valid = normalized
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::Validation(format!("invalid email: {email}")));
    }
    Ok(normalized)
}
