use log::debug;

use std::collections::HashMap;

use crate::config::VotingErrors;

/// An opaque handle on a registered candidate.
///
/// Handles are handed out in registration order, so the derived ordering is
/// the order of the registry.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CandidateId(u32);

/// The closed, ordered set of candidates of an election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CandidateRegistry {
    names: Vec<String>,
    by_name: HashMap<String, CandidateId>,
}

impl CandidateRegistry {
    pub fn new(names: &[String]) -> Result<CandidateRegistry, VotingErrors> {
        if names.len() < 2 {
            return Err(VotingErrors::NotEnoughCandidates(names.len()));
        }
        let mut by_name: HashMap<String, CandidateId> = HashMap::new();
        for (idx, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(VotingErrors::EmptyCandidateName);
            }
            if by_name.insert(name.clone(), CandidateId(idx as u32)).is_some() {
                return Err(VotingErrors::DuplicateCandidate(name.clone()));
            }
        }
        debug!("CandidateRegistry::new: {:?}", names);
        Ok(CandidateRegistry {
            names: names.to_vec(),
            by_name,
        })
    }

    /// Exact match on the identifier.
    pub fn lookup(&self, name: &str) -> Option<CandidateId> {
        self.by_name.get(name).cloned()
    }

    pub fn name(&self, cid: CandidateId) -> &str {
        self.names[cid.0 as usize].as_str()
    }

    /// All the candidates, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = CandidateId> + '_ {
        (0..self.names.len()).map(|idx| CandidateId(idx as u32))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
