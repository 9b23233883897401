//! Coordinator transfer records and history.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

use paybridge_core::{AccountNumber, Amount, BankName, LegId, TransferId, TransferStatus};

/// One coordinator transfer: the PSP-local record correlating the two legs.
///
/// The leg ids are a runtime correlation threaded through the banks' prepare
/// responses; there is no foreign key anywhere, so losing them would orphan
/// the legs.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRecord {
    /// The PSP-local transfer id.
    pub id: TransferId,

    /// The caller that initiated the transfer.
    pub caller: String,

    /// Account money leaves.
    pub source_account: AccountNumber,
    /// The bank owning the source account.
    pub source_bank: BankName,

    /// Account money enters.
    pub destination_account: AccountNumber,
    /// The bank owning the destination account.
    pub destination_bank: BankName,

    /// Transfer amount in minor units.
    pub amount: Amount,

    /// Current state-machine position.
    pub status: TransferStatus,

    /// The source bank's leg id, once its prepare response arrived.
    pub source_leg: Option<LegId>,
    /// The destination bank's leg id, once its prepare response arrived.
    pub destination_leg: Option<LegId>,

    /// Outcome description for terminal states.
    pub message: Option<String>,

    /// When the transfer was created.
    pub created_at: DateTime<Utc>,
    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
}

impl TransferRecord {
    /// Create a record in `Initiated`.
    #[must_use]
    pub fn new(
        caller: String,
        source_account: AccountNumber,
        source_bank: BankName,
        destination_account: AccountNumber,
        destination_bank: BankName,
        amount: Amount,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransferId::generate(),
            caller,
            source_account,
            source_bank,
            destination_account,
            destination_bank,
            amount,
            status: TransferStatus::Initiated,
            source_leg: None,
            destination_leg: None,
            message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// In-memory store of coordinator transfers.
///
/// A transfer is only ever advanced by the worker driving it, so a plain
/// map behind a `RwLock` is enough; there is no row contention to manage.
#[derive(Default)]
pub struct TransferStore {
    inner: RwLock<HashMap<TransferId, TransferRecord>>,
}

impl TransferStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn insert(&self, record: TransferRecord) -> TransferId {
        let id = record.id;
        self.inner
            .write()
            .expect("transfers lock poisoned")
            .insert(id, record);
        id
    }

    /// Fetch a record by id.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn get(&self, id: TransferId) -> Option<TransferRecord> {
        self.inner
            .read()
            .expect("transfers lock poisoned")
            .get(&id)
            .cloned()
    }

    /// Advance a transfer's status, recording an optional message.
    ///
    /// An illegal transition is a coordinator bug; it is logged and the
    /// record is left untouched rather than corrupted.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_status(&self, id: TransferId, status: TransferStatus, message: Option<String>) {
        let mut inner = self.inner.write().expect("transfers lock poisoned");
        let Some(record) = inner.get_mut(&id) else {
            tracing::error!(transfer_id = %id, "Status update for unknown transfer");
            return;
        };

        if !record.status.can_transition_to(status) {
            tracing::error!(
                transfer_id = %id,
                from = %record.status,
                to = %status,
                "Illegal transfer transition ignored"
            );
            return;
        }

        record.status = status;
        if message.is_some() {
            record.message = message;
        }
        record.updated_at = Utc::now();
    }

    /// Record the leg ids returned by the banks' prepare responses.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_legs(
        &self,
        id: TransferId,
        source_leg: Option<LegId>,
        destination_leg: Option<LegId>,
    ) {
        let mut inner = self.inner.write().expect("transfers lock poisoned");
        if let Some(record) = inner.get_mut(&id) {
            record.source_leg = source_leg;
            record.destination_leg = destination_leg;
            record.updated_at = Utc::now();
        }
    }

    /// All transfers touching any of the given accounts, newest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn history_for(&self, accounts: &[AccountNumber]) -> Vec<TransferRecord> {
        let inner = self.inner.read().expect("transfers lock poisoned");
        let mut out: Vec<TransferRecord> = inner
            .values()
            .filter(|r| {
                accounts.contains(&r.source_account) || accounts.contains(&r.destination_account)
            })
            .cloned()
            .collect();
        // TransferIds are ULIDs, so descending id order is newest-first.
        out.sort_by(|a, b| b.id.cmp(&a.id));
        out
    }
}
