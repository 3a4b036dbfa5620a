//! # Event Cursor
//!
//! Position of one event: `(ledger, tx, op, event)`, ordered lexicographically.
//!
//! ## String form
//!
//! ```text
//! 0000000528281018373-0000000001    (ledger 123, tx 10, op 5, event 1)
//! └──── toid ───────┘ └ event ─┘
//! toid = ledger << 32 | tx << 12 | op
//! ```
//!
//! `tx` occupies 20 bits and `op` 12 bits of the toid, so only cursors with
//! `tx < 2^20` and `op < 2^12` survive a round trip. Every cursor the store
//! produces satisfies that.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::errors::CursorError;

const TX_BITS: u32 = 20;
const OP_BITS: u32 = 12;
const TX_MASK: u64 = (1 << TX_BITS) - 1;
const OP_MASK: u64 = (1 << OP_BITS) - 1;

/// Totally ordered event position. Field order is the comparison order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cursor {
    /// Sequence of the ledger that emitted the event.
    pub ledger: u32,
    /// 1-based application index of the transaction within the ledger.
    pub tx: u32,
    /// Index of the operation within the transaction.
    pub op: u32,
    /// Index of the event within the operation.
    pub event: u32,
}

impl Cursor {
    pub const MIN: Cursor = Cursor {
        ledger: 0,
        tx: 0,
        op: 0,
        event: 0,
    };

    pub const MAX: Cursor = Cursor {
        ledger: u32::MAX,
        tx: u32::MAX,
        op: u32::MAX,
        event: u32::MAX,
    };

    pub fn new(ledger: u32, tx: u32, op: u32, event: u32) -> Self {
        Self {
            ledger,
            tx,
            op,
            event,
        }
    }

    /// First possible position inside `ledger`.
    pub fn ledger_start(ledger: u32) -> Self {
        Self {
            ledger,
            ..Self::MIN
        }
    }

    /// Smallest cursor strictly greater than `self`, saturating at [`Cursor::MAX`].
    pub fn successor(self) -> Self {
        if let Some(event) = self.event.checked_add(1) {
            return Self { event, ..self };
        }
        if let Some(op) = self.op.checked_add(1) {
            return Self {
                op,
                event: 0,
                ..self
            };
        }
        if let Some(tx) = self.tx.checked_add(1) {
            return Self {
                tx,
                op: 0,
                event: 0,
                ..self
            };
        }
        match self.ledger.checked_add(1) {
            Some(ledger) => Self::ledger_start(ledger),
            None => Self::MAX,
        }
    }

    fn toid(&self) -> u64 {
        ((self.ledger as u64) << 32)
            | ((self.tx as u64 & TX_MASK) << OP_BITS)
            | (self.op as u64 & OP_MASK)
    }

    fn from_toid(toid: u64, event: u32) -> Self {
        Self {
            ledger: (toid >> 32) as u32,
            tx: ((toid >> OP_BITS) & TX_MASK) as u32,
            op: (toid & OP_MASK) as u32,
            event,
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:019}-{:010}", self.toid(), self.event)
    }
}

impl FromStr for Cursor {
    type Err = CursorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CursorError::InvalidFormat(s.to_string());
        let (toid, event) = s.split_once('-').ok_or_else(invalid)?;
        let toid = toid.parse::<u64>().map_err(|_| invalid())?;
        let event = event.parse::<u32>().map_err(|_| invalid())?;
        Ok(Self::from_toid(toid, event))
    }
}

impl Serialize for Cursor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cursor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
