// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-account cache of the last known record/reward ids.
//!
//! The ledger stays authoritative: every read/write here is best effort and a
//! failure just means "no id known".

use pho_app_core::config::{ConfigService, ConfigStore};
use pho_ledger_client::{Address, ObjectId};
use tracing::warn;

/// Which id a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionSlot {
    /// Recipe record ("pho box").
    Record,
    /// Reward token ("flag").
    Reward,
}

impl SessionSlot {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Record => "record_id",
            Self::Reward => "reward_id",
        }
    }
}

/// Storage key for one slot of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey<'a> {
    /// Slot.
    pub slot: SessionSlot,
    /// Owning account.
    pub account: &'a Address,
}

impl SessionKey<'_> {
    /// `record_id_<account>` / `reward_id_<account>`. Addresses are
    /// normalized full-width hex, so keys of different accounts never collide.
    pub fn storage_key(&self) -> String {
        format!("{}_{}", self.slot.prefix(), self.account)
    }
}

/// Ids remembered for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionIds {
    /// Last recipe record created by the account.
    pub record: Option<ObjectId>,
    /// Last reward token created by the account.
    pub reward: Option<ObjectId>,
}

/// Account → ids mapping persisted through a [`ConfigStore`].
pub struct SessionCache<S> {
    config: ConfigService<S>,
}

impl<S: ConfigStore> SessionCache<S> {
    /// Cache over `store`.
    pub const fn new(store: S) -> Self {
        Self {
            config: ConfigService::new(store),
        }
    }

    /// Everything remembered for `account`.
    pub fn load(&self, account: &Address) -> SessionIds {
        SessionIds {
            record: self.get(SessionKey {
                slot: SessionSlot::Record,
                account,
            }),
            reward: self.get(SessionKey {
                slot: SessionSlot::Reward,
                account,
            }),
        }
    }

    /// Overwrite one slot for `account`.
    pub fn remember(&self, slot: SessionSlot, account: &Address, id: &ObjectId) {
        let key = SessionKey { slot, account }.storage_key();
        if let Err(err) = self.config.save(&key, id) {
            warn!(%key, %err, "failed to persist session id");
        }
    }

    /// Drop both slots for `account`.
    pub fn forget(&self, account: &Address) {
        for slot in [SessionSlot::Record, SessionSlot::Reward] {
            let key = SessionKey { slot, account }.storage_key();
            if let Err(err) = self.config.remove(&key) {
                warn!(%key, %err, "failed to remove session id");
            }
        }
    }

    fn get(&self, key: SessionKey<'_>) -> Option<ObjectId> {
        let key = key.storage_key();
        match self.config.load::<ObjectId>(&key) {
            Ok(id) => id,
            Err(err) => {
                warn!(%key, %err, "ignoring unreadable session id");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pho_app_core::config::MemoryConfigStore;
    use std::sync::Arc;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    #[test]
    fn keys_are_per_slot_and_account() {
        let a = addr("0xa");
        let key = SessionKey {
            slot: SessionSlot::Record,
            account: &a,
        };
        assert_eq!(key.storage_key(), format!("record_id_{a}"));
        let reward = SessionKey {
            slot: SessionSlot::Reward,
            account: &a,
        };
        assert_ne!(key.storage_key(), reward.storage_key());
    }

    #[test]
    fn accounts_do_not_share_entries() {
        let cache = SessionCache::new(MemoryConfigStore::new());
        let (a, b) = (addr("0xa"), addr("0xb"));
        let rec = ObjectId::parse("0x100").unwrap();
        cache.remember(SessionSlot::Record, &a, &rec);

        assert_eq!(cache.load(&a).record, Some(rec));
        assert_eq!(cache.load(&b), SessionIds::default());
    }

    #[test]
    fn forget_is_idempotent() {
        let store = Arc::new(MemoryConfigStore::new());
        let cache = SessionCache::new(Arc::clone(&store));
        let a = addr("0xa");
        cache.remember(SessionSlot::Record, &a, &ObjectId::parse("0x1").unwrap());
        cache.remember(SessionSlot::Reward, &a, &ObjectId::parse("0x2").unwrap());

        cache.forget(&a);
        cache.forget(&a);
        assert_eq!(cache.load(&a), SessionIds::default());
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_entry_reads_as_unknown() {
        let store = Arc::new(MemoryConfigStore::new());
        let a = addr("0xa");
        let key = SessionKey {
            slot: SessionSlot::Record,
            account: &a,
        }
        .storage_key();
        store.save_raw(&key, b"\"not-an-id\"").unwrap();
        let cache = SessionCache::new(store);
        assert_eq!(cache.load(&a).record, None);
    }
}
