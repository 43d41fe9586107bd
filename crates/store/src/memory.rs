use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use chrono::Utc;

use userdir_auth::{NewUser, StoreError, StoreStats, User, UserChanges, UserStore};
use userdir_core::UserId;

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<i64, User>,
    email_index: HashMap<String, i64>,
    /// Every code ever assigned. Entries survive deletion so a code is
    /// never reused.
    issued_codes: HashSet<i64>,
}

/// In-memory user store. Cheap to construct, one per process.
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

impl UserStore for InMemoryUserStore {
    fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let mut inner = self.write()?;

        if inner.email_index.contains_key(&new.email) {
            return Err(StoreError::DuplicateEmail);
        }
        if inner.issued_codes.contains(&new.code.as_i64()) {
            return Err(StoreError::DuplicateCode);
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();

        let user = User {
            id: UserId::from_i64(id),
            code: new.code,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            enabled: new.enabled,
            doc_number: new.doc_number,
            date_birth: new.date_birth,
            gender: new.gender,
            receive_email_notifications: new.receive_email_notifications,
            terms: new.terms,
            date_agree_terms: new.date_agree_terms,
            created_at: now,
            updated_at: now,
        };

        inner.email_index.insert(user.email.clone(), id);
        inner.issued_codes.insert(user.code.as_i64());
        inner.users.insert(id, user.clone());

        tracing::debug!(user_id = id, "user record created");
        Ok(user)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .email_index
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id.as_i64()).cloned())
    }

    fn update(&self, id: UserId, changes: UserChanges) -> Result<User, StoreError> {
        let mut inner = self.write()?;

        let old_email = match inner.users.get(&id.as_i64()) {
            Some(user) => user.email.clone(),
            None => return Err(StoreError::NotFound),
        };

        if let Some(email) = &changes.email {
            match inner.email_index.get(email) {
                Some(owner) if *owner != id.as_i64() => return Err(StoreError::DuplicateEmail),
                _ => {}
            }
        }

        let user = inner
            .users
            .get_mut(&id.as_i64())
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email.clone() {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(doc_number) = changes.doc_number {
            user.doc_number = Some(doc_number);
        }
        if let Some(date_birth) = changes.date_birth {
            user.date_birth = Some(date_birth);
        }
        if let Some(gender) = changes.gender {
            user.gender = Some(gender);
        }
        if let Some(flag) = changes.receive_email_notifications {
            user.receive_email_notifications = flag;
        }
        if let Some(ts) = changes.date_agree_terms {
            user.date_agree_terms = Some(ts);
        }
        user.updated_at = Utc::now();

        let updated = user.clone();

        if let Some(email) = changes.email {
            if email != old_email {
                inner.email_index.remove(&old_email);
                inner.email_index.insert(email, id.as_i64());
            }
        }

        Ok(updated)
    }

    fn delete(&self, id: UserId) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let user = inner.users.remove(&id.as_i64()).ok_or(StoreError::NotFound)?;
        inner.email_index.remove(&user.email);
        // issued_codes keeps the code: never reused.
        Ok(())
    }

    fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        let inner = self.read()?;
        let heap: usize = inner
            .users
            .values()
            .map(|u| {
                u.name.len()
                    + u.email.len()
                    + u.password_hash.len()
                    + u.terms.as_deref().map_or(0, str::len)
            })
            .sum();
        let approx_bytes =
            (inner.users.len() * std::mem::size_of::<User>() + heap) as u64;
        Ok(StoreStats {
            driver: "memory",
            users: inner.users.len() as u64,
            approx_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use userdir_auth::Role;
    use userdir_core::UserCode;

    use super::*;

    fn new_user(email: &str, code: i64) -> NewUser {
        NewUser {
            code: UserCode::from_i64(code).unwrap(),
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$fakefakefakefakefakefake".to_string(),
            role: Role::User,
            enabled: true,
            doc_number: None,
            date_birth: None,
            gender: None,
            receive_email_notifications: true,
            terms: Some("v1".to_string()),
            date_agree_terms: None,
        }
    }

    #[test]
    fn ids_are_sequential_and_lookups_work() {
        let store = InMemoryUserStore::new();
        let a = store.create(new_user("a@x.com", 100_000_000_001)).unwrap();
        let b = store.create(new_user("b@x.com", 100_000_000_002)).unwrap();

        assert_eq!(a.id.as_i64(), 1);
        assert_eq!(b.id.as_i64(), 2);
        assert_eq!(store.find_by_email("a@x.com").unwrap().unwrap().id, a.id);
        assert_eq!(store.find_by_id(b.id).unwrap().unwrap().email, "b@x.com");
        assert!(store.find_by_email("missing@x.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_rejected_and_first_record_is_unaffected() {
        let store = InMemoryUserStore::new();
        let first = store.create(new_user("a@x.com", 100_000_000_001)).unwrap();

        let err = store
            .create(new_user("a@x.com", 100_000_000_002))
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateEmail);

        let survivor = store.find_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(survivor.id, first.id);
        assert_eq!(survivor.code, first.code);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_code_is_rejected() {
        let store = InMemoryUserStore::new();
        store.create(new_user("a@x.com", 100_000_000_001)).unwrap();
        let err = store
            .create(new_user("b@x.com", 100_000_000_001))
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateCode);
    }

    #[test]
    fn codes_are_not_reused_after_delete() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("a@x.com", 100_000_000_001)).unwrap();
        store.delete(user.id).unwrap();

        let err = store
            .create(new_user("b@x.com", 100_000_000_001))
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateCode);
        // The email itself is free again.
        assert!(store
            .create(new_user("a@x.com", 100_000_000_002))
            .is_ok());
    }

    #[test]
    fn partial_update_touches_only_given_fields() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("a@x.com", 100_000_000_001)).unwrap();

        let updated = store
            .update(
                user.id,
                UserChanges {
                    name: Some("Grace".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Grace");
        assert_eq!(updated.email, "a@x.com");
        assert_eq!(updated.password_hash, user.password_hash);
        assert!(updated.updated_at >= user.updated_at);
    }

    #[test]
    fn email_update_rechecks_uniqueness_excluding_self() {
        let store = InMemoryUserStore::new();
        let a = store.create(new_user("a@x.com", 100_000_000_001)).unwrap();
        store.create(new_user("b@x.com", 100_000_000_002)).unwrap();

        // Taking another record's email fails.
        let err = store
            .update(
                a.id,
                UserChanges {
                    email: Some("b@x.com".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateEmail);

        // Re-submitting your own email is a no-op, not a conflict.
        assert!(store
            .update(
                a.id,
                UserChanges {
                    email: Some("a@x.com".to_string()),
                    ..Default::default()
                },
            )
            .is_ok());

        // A genuine change moves the index entry.
        store
            .update(
                a.id,
                UserChanges {
                    email: Some("a2@x.com".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(store.find_by_email("a@x.com").unwrap().is_none());
        assert_eq!(store.find_by_email("a2@x.com").unwrap().unwrap().id, a.id);
    }

    #[test]
    fn delete_removes_the_record() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("a@x.com", 100_000_000_001)).unwrap();

        store.delete(user.id).unwrap();
        assert!(store.find_by_id(user.id).unwrap().is_none());
        assert!(store.find_by_email("a@x.com").unwrap().is_none());
        assert_eq!(store.delete(user.id).unwrap_err(), StoreError::NotFound);
    }

    #[test]
    fn racing_registrations_on_one_email_produce_one_winner() {
        let store = Arc::new(InMemoryUserStore::new());
        let mut handles = Vec::new();

        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.create(new_user("race@x.com", 100_000_000_010 + i))
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        let losers = results
            .iter()
            .filter(|r| matches!(r, Err(StoreError::DuplicateEmail)))
            .count();

        assert_eq!(winners, 1);
        assert_eq!(losers, 7);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn stats_report_driver_and_count() {
        let store = InMemoryUserStore::new();
        store.create(new_user("a@x.com", 100_000_000_001)).unwrap();
        store.create(new_user("b@x.com", 100_000_000_002)).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.driver, "memory");
        assert_eq!(stats.users, 2);
        assert!(stats.approx_bytes > 0);
    }
}
