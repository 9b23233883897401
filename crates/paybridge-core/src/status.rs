//! The two state machines of the transfer protocol.
//!
//! A bank tracks each leg (one withdrawal or deposit) through [`LegStatus`];
//! the PSP tracks the whole transfer through [`TransferStatus`]. Both enums
//! encode which transitions are legal so that an illegal transition is a bug
//! caught at the call site, not a row silently skipping a state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The direction of a participant leg, from the owning account's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Money leaves the account.
    Withdrawal,
    /// Money enters the account.
    Deposit,
}

impl Direction {
    /// The compensating direction: undoing a withdrawal is a deposit and
    /// vice versa.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Withdrawal => Self::Deposit,
            Self::Deposit => Self::Withdrawal,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Withdrawal => write!(f, "WITHDRAWAL"),
            Self::Deposit => write!(f, "DEPOSIT"),
        }
    }
}

/// Status of a participant transaction (one leg, bank-local).
///
/// The happy path is `Initiated → Prepared → Committing → Committed`. A
/// committed leg can still be reversed through `RollingBack → RolledBack`
/// when the coordinator compensates; that is the only transition out of an
/// otherwise terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegStatus {
    /// Record created, not yet reserved.
    Initiated,
    /// Feasibility validated and the leg reserved; no balance touched.
    Prepared,
    /// Balance delta being applied.
    Committing,
    /// Balance delta applied.
    Committed,
    /// Inverse delta being applied after a committed leg is compensated.
    RollingBack,
    /// The leg was undone (or never applied) and is finished.
    RolledBack,
    /// Commit failed; the balance was left unmodified.
    Aborted,
    /// An unrecoverable error; manual reconciliation may be required.
    Failed,
}

impl LegStatus {
    /// Whether this status ends the leg's lifecycle.
    ///
    /// `Committed` counts as terminal: nothing further happens unless the
    /// coordinator explicitly compensates, which is modelled by the
    /// `Committed → RollingBack` edge in [`Self::can_transition_to`].
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Committed | Self::RolledBack | Self::Aborted | Self::Failed
        )
    }

    /// Whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Initiated, Self::Prepared)
                | (Self::Initiated, Self::RolledBack)
                | (Self::Initiated, Self::Failed)
                | (Self::Prepared, Self::Committing)
                | (Self::Prepared, Self::RolledBack)
                | (Self::Prepared, Self::Aborted)
                | (Self::Prepared, Self::Failed)
                | (Self::Committing, Self::Committed)
                | (Self::Committing, Self::Aborted)
                | (Self::Committing, Self::Failed)
                | (Self::Committed, Self::RollingBack)
                | (Self::RollingBack, Self::RolledBack)
                | (Self::RollingBack, Self::Failed)
        )
    }
}

impl fmt::Display for LegStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Initiated => "INITIATED",
            Self::Prepared => "PREPARED",
            Self::Committing => "COMMITTING",
            Self::Committed => "COMMITTED",
            Self::RollingBack => "ROLLING_BACK",
            Self::RolledBack => "ROLLED_BACK",
            Self::Aborted => "ABORTED",
            Self::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}

/// Status of a coordinator transfer (PSP-local).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    /// Validated locally; no bank contacted yet.
    Initiated,
    /// Both banks answered `PREPARED`.
    Prepared,
    /// Both banks answered `COMMITTED`.
    Committed,
    /// Balances refreshed; the transfer is complete.
    Success,
    /// Compensation ran to completion; both ledgers are back to their
    /// pre-transfer state.
    RolledBack,
    /// The transfer could not be completed *or* compensated cleanly.
    /// Requires operator attention.
    Failed,
}

impl TransferStatus {
    /// Whether this status ends the transfer's lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::RolledBack | Self::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// `Failed` is reachable from every non-terminal state: a failure that
    /// cannot be compensated must still land somewhere terminal.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if matches!(next, Self::Failed) {
            return true;
        }
        matches!(
            (self, next),
            (Self::Initiated, Self::Prepared)
                | (Self::Initiated, Self::RolledBack)
                | (Self::Prepared, Self::Committed)
                | (Self::Prepared, Self::RolledBack)
                | (Self::Committed, Self::Success)
                | (Self::Committed, Self::RolledBack)
        )
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Initiated => "INITIATED",
            Self::Prepared => "PREPARED",
            Self::Committed => "COMMITTED",
            Self::Success => "SUCCESS",
            Self::RolledBack => "ROLLED_BACK",
            Self::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}
