//! PlaybackQueue : slot courant + file FIFO stricte

use briarsource::Track;
use std::collections::VecDeque;

/// File de lecture d'une session.
///
/// Le morceau courant vit dans un slot séparé de la file : le premier
/// morceau d'une session inactive devient courant immédiatement, sans
/// transiter par la file. L'ordre d'insertion est strictement préservé.
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    current: Option<Track>,
    pending: VecDeque<Track>,
}

impl PlaybackQueue {
    /// Crée une file vide
    pub fn new() -> Self {
        Self::default()
    }

    /// Vrai si rien ne joue et que la file est vide
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }

    /// Morceau courant
    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    /// Nombre de morceaux en attente (le courant n'est pas compté)
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Vrai si la file d'attente est vide
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Installe un morceau comme courant, en remplaçant l'éventuel ancien.
    ///
    /// Retourne le morceau remplacé. La file d'attente n'est pas touchée.
    pub fn begin(&mut self, track: Track) -> Option<Track> {
        self.current.replace(track)
    }

    /// Ajoute un morceau en fin de file
    pub fn enqueue(&mut self, track: Track) {
        self.pending.push_back(track);
    }

    /// Retire le morceau courant sans avancer la file.
    ///
    /// Utilisé par Stop : la file est volontairement laissée intacte et ne
    /// redémarre pas d'elle-même. Un nouveau Play est nécessaire.
    pub fn take_current(&mut self) -> Option<Track> {
        self.current.take()
    }

    /// Retire le morceau courant et promeut la tête de file.
    ///
    /// Retourne `(retiré, nouveau courant)`.
    pub fn pop_current_and_advance(&mut self) -> (Option<Track>, Option<&Track>) {
        let retired = self.current.take();
        self.current = self.pending.pop_front();
        (retired, self.current.as_ref())
    }

    /// Vide le courant et la file (utilisé par Leave)
    pub fn clear(&mut self) {
        self.current = None;
        self.pending.clear();
    }

    /// Copie des titres en attente, dans l'ordre
    pub fn snapshot(&self) -> Vec<Track> {
        self.pending.iter().cloned().collect()
    }
}
