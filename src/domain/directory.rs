use super::account::{Account, AccountId};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Maps account identifiers to shared account handles.
///
/// Built once before any transaction runs and only read afterwards; share it
/// behind an `Arc` so no insertion can race with a lookup.
#[derive(Debug, Default)]
pub struct AccountDirectory {
    accounts: HashMap<AccountId, Arc<Account>>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from owned accounts, rejecting duplicate ids.
    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Result<Self> {
        let mut directory = Self::new();
        for account in accounts {
            directory.insert(account)?;
        }
        Ok(directory)
    }

    /// Registers an account and returns the handle held by the directory.
    pub fn insert(&mut self, account: Account) -> Result<Arc<Account>> {
        let account = Arc::new(account);
        self.insert_shared(Arc::clone(&account))?;
        Ok(account)
    }

    /// Registers a handle the caller keeps using directly.
    pub fn insert_shared(&mut self, account: Arc<Account>) -> Result<()> {
        match self.accounts.entry(account.id().clone()) {
            Entry::Occupied(entry) => Err(LedgerError::DuplicateAccount(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(account);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Account>> {
        self.accounts.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.accounts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// All accounts ordered by id.
    pub fn accounts(&self) -> Vec<Arc<Account>> {
        let mut accounts: Vec<_> = self.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.id().cmp(b.id()));
        accounts
    }

    /// Sum of every balance in the ledger.
    ///
    /// Balances are read one account at a time, so the sum is only exact once
    /// no transaction is in flight. `None` when the sum exceeds `Decimal`.
    pub fn total_balance(&self) -> Option<Decimal> {
        self.accounts
            .values()
            .try_fold(Decimal::ZERO, |total, account| total.checked_add(account.balance()))
    }
}
