//! Request sequencing for fire-and-forget fetches
//!
//! Every UI slot hands out increasing request ids. A response may only be
//! applied while its id is still the newest one issued for the slot, so a
//! slow response for an older request never overwrites newer data.

/// Identifier of one issued request within a slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestId(u64);

#[derive(Clone, Debug, Default)]
pub struct RequestSlot {
    latest: u64,
}

impl RequestSlot {
    /// Issue a new request id, superseding all earlier ones.
    pub fn begin(&mut self) -> RequestId {
        self.latest += 1;
        RequestId(self.latest)
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        id.0 == self.latest
    }

    /// Supersede outstanding requests without issuing a new one.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}

/// One slot per independently refreshed piece of UI
#[derive(Clone, Debug, Default)]
pub struct RequestSlots {
    pub profile: RequestSlot,
    pub playlists: RequestSlot,
    pub playlist_tracks: RequestSlot,
    pub search: RequestSlot,
}
