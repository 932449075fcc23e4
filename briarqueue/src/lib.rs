//! # briarqueue - File de lecture FIFO et consensus de vote-skip
//!
//! Cette crate fournit les deux structures d'état pur d'une session :
//!
//! - **PlaybackQueue** : file FIFO stricte des morceaux en attente, plus le
//!   slot "morceau courant". Pas de réordonnancement, pas de priorités.
//! - **SkipVotes** : ensemble des votants pour passer le morceau courant,
//!   avec calcul du quorum (division entière, seuil strictement supérieur).
//!
//! Aucune synchronisation ici : ces structures vivent derrière le verrou de
//! session (voir `briarsession`) qui sérialise toutes les mutations.
//!
//! # Exemple
//!
//! ```
//! use briarqueue::{PlaybackQueue, SkipVotes, Tally};
//! use briarsource::{Track, UserId};
//!
//! let mut queue = PlaybackQueue::new();
//! assert!(queue.is_idle());
//! queue.begin(Track::new("A", "uri-a"));
//! queue.enqueue(Track::new("B", "uri-b"));
//!
//! let mut votes = SkipVotes::new(85);
//! votes.cast(UserId(1)).unwrap();
//! assert_eq!(votes.tally(1), Tally::Pass); // 100 > 85
//! ```

mod error;
mod queue;
mod votes;

// Réexports publics
pub use error::{Error, Result};
pub use queue::PlaybackQueue;
pub use votes::{SkipVotes, Tally, DEFAULT_QUORUM_PERCENT};
