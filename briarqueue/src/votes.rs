//! SkipVotes : consensus de vote pour passer le morceau courant

use crate::error::{Error, Result};
use briarsource::UserId;
use std::collections::HashSet;

/// Seuil de quorum par défaut (pourcentage, comparaison strictement
/// supérieure)
pub const DEFAULT_QUORUM_PERCENT: u64 = 85;

/// Résultat d'un décompte de votes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tally {
    /// Le quorum est atteint, le skip s'applique
    Pass,
    /// Pas encore assez de votes
    Pending,
}

/// Ensemble des votants pour le morceau courant d'une session.
///
/// Remis à zéro sans condition à chaque changement de morceau (skip réussi,
/// fin de morceau, stop). Le décompte utilise la division entière : avec 5
/// présents, 4 votes donnent 80 et ne passent pas le seuil de 85.
#[derive(Debug)]
pub struct SkipVotes {
    voters: HashSet<UserId>,
    quorum_percent: u64,
}

impl SkipVotes {
    /// Crée un ensemble vide avec le seuil donné
    pub fn new(quorum_percent: u64) -> Self {
        Self {
            voters: HashSet::new(),
            quorum_percent,
        }
    }

    /// Enregistre un vote ; refuse les doublons
    pub fn cast(&mut self, user: UserId) -> Result<usize> {
        if !self.voters.insert(user) {
            return Err(Error::AlreadyVoted(user));
        }
        Ok(self.voters.len())
    }

    /// Nombre de votes enregistrés
    pub fn len(&self) -> usize {
        self.voters.len()
    }

    /// Vrai si aucun vote n'est enregistré
    pub fn is_empty(&self) -> bool {
        self.voters.is_empty()
    }

    /// Ne conserve que les votants encore présents dans le salon vocal.
    ///
    /// Maintient l'invariant : l'ensemble des votants est un sous-ensemble
    /// des utilisateurs présents.
    pub fn retain_present(&mut self, present: &[UserId]) {
        self.voters.retain(|v| present.contains(v));
    }

    /// Calcule le décompte pour un nombre de présents non-automatisés.
    ///
    /// `votes * 100 / present` en arithmétique entière, tronquée avant la
    /// comparaison au seuil. Zéro présent ne divise jamais : Pending.
    pub fn tally(&self, present_non_bot: usize) -> Tally {
        if present_non_bot == 0 {
            return Tally::Pending;
        }

        let percent = self.voters.len() as u64 * 100 / present_non_bot as u64;
        if percent > self.quorum_percent {
            Tally::Pass
        } else {
            Tally::Pending
        }
    }

    /// Oublie tous les votes (changement de morceau)
    pub fn clear(&mut self) {
        self.voters.clear();
    }
}

impl Default for SkipVotes {
    fn default() -> Self {
        Self::new(DEFAULT_QUORUM_PERCENT)
    }
}
