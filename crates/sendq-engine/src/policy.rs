//! Collision and resume policy

use sendq_types::{Behavior, RemoteStat};

/// What to do with a file whose remote counterpart may already exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPlan {
    /// Upload the whole file, replacing any remote content
    Full,
    /// Continue the remote object from `offset`
    Resume {
        /// Byte offset to restart at
        offset: u64,
    },
    /// Issue no transfer; the item counts as complete
    Satisfied,
}

impl TransferPlan {
    /// Resume offset passed to the client
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Resume { offset } => Some(*offset),
            Self::Full | Self::Satisfied => None,
        }
    }
}

/// Whether `behavior` needs the remote object's size to decide
pub fn requires_remote_stat(behavior: Behavior) -> bool {
    behavior == Behavior::Verify
}

/// Decide how to transfer a file of `local_size` bytes
///
/// `Cover` and `Skip` ignore both sizes. `Verify` compares sizes only: equal or smaller
/// local files are considered already uploaded, without any content check.
pub fn plan_transfer(behavior: Behavior, local_size: u64, remote: Option<RemoteStat>) -> TransferPlan {
    match behavior {
        Behavior::Cover => TransferPlan::Full,
        Behavior::Skip => TransferPlan::Satisfied,
        Behavior::Verify => match remote {
            None => TransferPlan::Full,
            Some(stat) if local_size > stat.size => TransferPlan::Resume { offset: stat.size },
            Some(_) => TransferPlan::Satisfied,
        },
    }
}
