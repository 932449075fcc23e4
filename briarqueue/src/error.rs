//! Types d'erreurs pour briarqueue

use briarsource::UserId;

/// Erreurs de gestion de file et de votes
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("User {0} already voted to skip the current track")]
    AlreadyVoted(UserId),
}

/// Type Result spécialisé pour briarqueue
pub type Result<T> = std::result::Result<T, Error>;
