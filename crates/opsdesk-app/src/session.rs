use opsdesk_core::UserId;

/// The authenticated session scoping every store call.
///
/// The identity is explicit and travels with each manager rather than
/// living in ambient auth state, so no store operation can run
/// unscoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// The user owning every record read or written.
    pub user: UserId,
}

impl Session {
    /// A session for the given user.
    #[must_use]
    pub const fn new(user: UserId) -> Self {
        Self { user }
    }
}
