//! Authorities - moderation capabilities granted by a user's role

use bitflags::bitflags;
use serde::{Serialize, Serializer};

bitflags! {
    /// Capabilities checked by moderation and administration endpoints.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Authorities: u32 {
        /// Delete any post without its deletion code
        const DELETE_POST          = 1 << 0;
        /// Pin or unpin a thread to the top of its board
        const TOGGLE_STICKY_THREAD = 1 << 1;
        /// Lock or unlock a thread
        const TOGGLE_LOCK_THREAD   = 1 << 2;
        /// See poster IP addresses
        const VIEW_IP              = 1 << 3;
        /// Issue, edit and lift IP bans
        const MANAGE_BANS          = 1 << 4;
        /// Create, edit and delete boards
        const MANAGE_BOARDS        = 1 << 5;
        /// List, edit and delete user accounts
        const MANAGE_USERS         = 1 << 6;
    }
}

impl Authorities {
    #[inline]
    pub fn has(&self, authority: Authorities) -> bool {
        self.contains(authority)
    }

    /// Names of all set authorities, in declaration order
    pub fn list(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl Serialize for Authorities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.list().serialize(serializer)
    }
}
