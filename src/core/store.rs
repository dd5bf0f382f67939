use crate::models::{LikeRecord, MatchRecord, Profile, SessionSnapshot, MATCH_CAPACITY};

/// Candidate captured when a decision starts
///
/// The decision acts on `profile_id` no matter where the cursor is by the
/// time the remote call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presented {
    pub epoch: u64,
    pub turn: u64,
    pub index: usize,
    pub profile_id: String,
}

/// Snapshot lists replaced wholesale by reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Matches,
    Liked,
}

/// Issued before a snapshot fetch; checked when its response lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub epoch: u64,
    pub kind: SnapshotKind,
    seq: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Versions {
    issued: u64,
    applied: u64,
}

/// In-memory state of one authenticated session
///
/// Matches and likes are only ever replaced as whole snapshots from the
/// matching service. Nothing here talks to the network.
#[derive(Debug, Clone)]
pub struct SessionStore {
    queue: Vec<Profile>,
    cursor: usize,
    matches: Vec<MatchRecord>,
    liked: Vec<LikeRecord>,
    error: Option<String>,
    loading: bool,
    match_capacity: usize,
    epoch: u64,
    turn: u64,
    matches_version: Versions,
    liked_version: Versions,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(MATCH_CAPACITY)
    }
}

impl SessionStore {
    pub fn new(match_capacity: usize) -> Self {
        Self {
            queue: Vec::new(),
            cursor: 0,
            matches: Vec::new(),
            liked: Vec::new(),
            error: None,
            loading: false,
            match_capacity,
            epoch: 0,
            turn: 0,
            matches_version: Versions::default(),
            liked_version: Versions::default(),
        }
    }

    pub fn queue(&self) -> &[Profile] {
        &self.queue
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    pub fn liked(&self) -> &[LikeRecord] {
        &self.liked
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn current(&self) -> Option<&Profile> {
        self.queue.get(self.cursor)
    }

    pub fn match_capacity(&self) -> usize {
        self.match_capacity
    }

    pub fn at_capacity(&self) -> bool {
        self.matches.len() >= self.match_capacity
    }

    /// Capture the presented candidate, or `None` when the queue is empty
    pub fn presented(&self) -> Option<Presented> {
        self.current().map(|profile| Presented {
            epoch: self.epoch,
            turn: self.turn,
            index: self.cursor,
            profile_id: profile.id.clone(),
        })
    }

    pub fn replace_queue(&mut self, profiles: Vec<Profile>) {
        self.queue = profiles;
        self.cursor = 0;
        self.turn += 1;
    }

    pub fn replace_matches(&mut self, matches: Vec<MatchRecord>) {
        self.matches = matches;
    }

    pub fn replace_liked(&mut self, liked: Vec<LikeRecord>) {
        self.liked = liked;
    }

    /// Move to the next candidate, wrapping to the start
    pub fn advance_cursor(&mut self) {
        if self.queue.is_empty() {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor + 1) % self.queue.len();
        self.turn += 1;
    }

    /// Advance only if `presented` is still the candidate on screen
    ///
    /// Returns false when another decision already moved the cursor or the
    /// session was torn down in the meantime.
    pub fn advance_from(&mut self, presented: &Presented) -> bool {
        if presented.epoch != self.epoch || presented.turn != self.turn {
            return false;
        }
        self.advance_cursor();
        true
    }

    /// Tear down everything and start a new epoch
    pub fn reset(&mut self) {
        *self = Self {
            epoch: self.epoch + 1,
            ..Self::new(self.match_capacity)
        };
    }

    /// Tear down after the credential was revoked, leaving `message` behind
    ///
    /// The new epoch starts empty apart from the error slot, so the reason
    /// the session ended is still readable.
    pub fn expire(&mut self, message: impl Into<String>) {
        self.reset();
        self.error = Some(message.into());
    }

    /// Replace the queue unless the session changed since `epoch`
    pub fn replace_queue_in(&mut self, epoch: u64, profiles: Vec<Profile>) -> bool {
        if epoch != self.epoch {
            return false;
        }
        self.replace_queue(profiles);
        true
    }

    /// Issue a ticket for a fetch started on behalf of `epoch`
    ///
    /// Returns `None` if that session has already been torn down.
    pub fn begin_refresh(&mut self, epoch: u64, kind: SnapshotKind) -> Option<RefreshTicket> {
        if epoch != self.epoch {
            return None;
        }
        let version = self.version_mut(kind);
        version.issued += 1;
        let seq = version.issued;
        Some(RefreshTicket { epoch, kind, seq })
    }

    /// Apply a fetched match list if no newer one landed first
    pub fn apply_matches(&mut self, ticket: RefreshTicket, matches: Vec<MatchRecord>) -> bool {
        if !self.accept(ticket) {
            return false;
        }
        self.replace_matches(matches);
        true
    }

    /// Apply a fetched liked list if no newer one landed first
    pub fn apply_liked(&mut self, ticket: RefreshTicket, liked: Vec<LikeRecord>) -> bool {
        if !self.accept(ticket) {
            return false;
        }
        self.replace_liked(liked);
        true
    }

    fn accept(&mut self, ticket: RefreshTicket) -> bool {
        if ticket.epoch != self.epoch {
            return false;
        }
        let version = self.version_mut(ticket.kind);
        if ticket.seq <= version.applied {
            return false;
        }
        version.applied = ticket.seq;
        true
    }

    fn version_mut(&mut self, kind: SnapshotKind) -> &mut Versions {
        match kind {
            SnapshotKind::Matches => &mut self.matches_version,
            SnapshotKind::Liked => &mut self.liked_version,
        }
    }

    /// Last error wins
    pub fn report(&mut self, epoch: u64, message: impl Into<String>) {
        if epoch == self.epoch {
            self.error = Some(message.into());
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_loading(&mut self, epoch: u64, loading: bool) {
        if epoch == self.epoch {
            self.loading = loading;
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            candidate: self.current().cloned(),
            cursor: self.cursor,
            queue_length: self.queue.len(),
            matches: self.matches.clone(),
            liked: self.liked.clone(),
            match_count: self.matches.len(),
            match_capacity: self.match_capacity,
            at_capacity: self.at_capacity(),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}
