//! Capability gating for the unified operation set.
//!
//! Every unified operation is named by an [`Operation`] variant. Each backend
//! module declares a `const UNSUPPORTED: &[Operation]` table, and every façade
//! method passes through [`gate`] before doing anything else. The split
//! between "supported with encoding" and "categorically unsupported" is
//! therefore exhaustive, data-driven, and checked without any network I/O.

use std::fmt;

use crate::error::Error;

/// One unified operation, named independently of any backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // Account
    VerifyAccountCredentials,
    GetAccount,
    GetAccountStatuses,
    FollowAccount,
    UnfollowAccount,
    BlockAccount,
    UnblockAccount,
    MuteAccount,
    UnmuteAccount,
    GetRelationships,
    // Status
    PostStatus,
    GetStatus,
    DeleteStatus,
    ReblogStatus,
    UnreblogStatus,
    FavouriteStatus,
    UnfavouriteStatus,
    BookmarkStatus,
    UnbookmarkStatus,
    // Timeline
    GetHomeTimeline,
    GetPublicTimeline,
    GetTagTimeline,
    GetListTimeline,
    GetConversationTimeline,
    // Notification
    GetNotifications,
    DismissNotifications,
    // List
    GetLists,
    GetList,
    CreateList,
    DeleteList,
    GetAccountsInList,
    AddAccountsToList,
    DeleteAccountsFromList,
    // Media
    UploadMedia,
    UpdateMedia,
    // Poll
    GetPoll,
    VotePoll,
    // Moderation & bookkeeping
    Report,
    GetFilters,
    GetMarkers,
    SaveMarkers,
    GetScheduledStatuses,
    GetBookmarks,
    GetDomainBlocks,
    BlockDomain,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Variant names double as the public operation names.
        write!(f, "{self:?}")
    }
}

/// Reject `op` with [`Error::NotSupported`] if it appears in the backend's
/// unsupported table.
pub(crate) fn gate(unsupported: &[Operation], op: Operation) -> Result<(), Error> {
    if unsupported.contains(&op) {
        Err(Error::NotSupported(op))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_passes_operations_not_in_table() {
        assert!(gate(&[], Operation::GetStatus).is_ok());
        assert!(gate(&[Operation::GetFilters], Operation::GetStatus).is_ok());
    }

    #[test]
    fn gate_rejects_listed_operations() {
        let result = gate(&[Operation::BookmarkStatus], Operation::BookmarkStatus);
        assert!(matches!(
            result,
            Err(Error::NotSupported(Operation::BookmarkStatus))
        ));
    }

    #[test]
    fn operation_display_uses_variant_name() {
        assert_eq!(Operation::VotePoll.to_string(), "VotePoll");
    }
}
