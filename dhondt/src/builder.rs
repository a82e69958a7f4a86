use log::debug;

use std::collections::{HashMap, HashSet};

pub use crate::config::*;
use crate::{check_rules, run_allocation_stats};

/// A builder that aggregates vote submissions before running the allocation.
///
/// Every submission carries the votes of one list. Submissions for the same list
/// are summed.
///
/// ```
/// pub use dhondt::builder::Builder;
/// pub use dhondt::AllocationRules;
/// # use dhondt::AllocationErrors;
///
/// let mut builder = Builder::new(&AllocationRules::new(3))?
///     .lists(&["Lista A".to_string(), "Lista B".to_string()])?;
///
/// builder.add_submission("Lista A", 120)?;
/// builder.add_submission("Lista B", 40)?;
/// builder.add_submission("Lista A", 30)?;
///
/// let summary = builder.run()?;
/// assert_eq!(summary.results[0].votes, 150);
/// assert_eq!(summary.results[0].seats, 3);
///
/// # Ok::<(), AllocationErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: AllocationRules,
    pub(crate) _lists: Option<Vec<String>>,
    // Aggregated votes, in the order of first appearance.
    pub(crate) _tallies: Vec<(String, i64)>,
    pub(crate) _positions: HashMap<String, usize>,
    pub(crate) _num_submissions: usize,
}

impl Builder {
    pub fn new(rules: &AllocationRules) -> Result<Builder, AllocationErrors> {
        check_rules(rules)?;
        Ok(Builder {
            _rules: *rules,
            _lists: None,
            _tallies: Vec::new(),
            _positions: HashMap::new(),
            _num_submissions: 0,
        })
    }

    /// Registers the lists taking part in the election.
    ///
    /// Once registered, submissions for any other name are rejected, and every registered
    /// list is reported, even without any vote. The order of registration is the candidate
    /// order used to break full ties.
    ///
    /// Submissions added before the registration are kept. They must all name a
    /// registered list.
    pub fn lists(self, names: &[String]) -> Result<Builder, AllocationErrors> {
        let mut registered: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for n in names.iter() {
            let name = clean_name(n)?;
            if !seen.insert(name.clone()) {
                return Err(InvalidInput::DuplicateName { name }.into());
            }
            registered.push(name);
        }
        let positions: HashMap<String, usize> = registered
            .iter()
            .enumerate()
            .map(|(idx, n)| (n.clone(), idx))
            .collect();
        let mut tallies: Vec<(String, i64)> =
            registered.iter().map(|n| (n.clone(), 0)).collect();
        for (name, votes) in self._tallies.into_iter() {
            match positions.get(&name) {
                Some(idx) => tallies[*idx].1 = votes,
                None => return Err(InvalidInput::UnregisteredList { name }.into()),
            }
        }
        Ok(Builder {
            _rules: self._rules,
            _tallies: tallies,
            _lists: Some(registered),
            _positions: positions,
            _num_submissions: self._num_submissions,
        })
    }

    /// Adds the votes of one submission.
    ///
    /// The name is trimmed. Negative votes are rejected.
    pub fn add_submission(&mut self, name: &str, votes: i64) -> Result<(), AllocationErrors> {
        let name = clean_name(name)?;
        if votes < 0 {
            return Err(InvalidInput::NegativeVotes { name, votes }.into());
        }
        let idx = match self._positions.get(&name) {
            Some(idx) => *idx,
            None if self._lists.is_some() => {
                return Err(InvalidInput::UnregisteredList { name }.into());
            }
            None => {
                self._tallies.push((name.clone(), 0));
                self._positions.insert(name, self._tallies.len() - 1);
                self._tallies.len() - 1
            }
        };
        let tally = &mut self._tallies[idx];
        tally.1 = tally
            .1
            .checked_add(votes)
            .ok_or(InvalidInput::VoteOverflow)?;
        self._num_submissions += 1;
        debug!(
            "add_submission: {} +{} -> {}",
            self._tallies[idx].0, votes, self._tallies[idx].1
        );
        Ok(())
    }

    pub fn num_submissions(&self) -> usize {
        self._num_submissions
    }

    pub fn total_votes(&self) -> i64 {
        self._tallies
            .iter()
            .fold(0i64, |acc, (_, v)| acc.saturating_add(*v))
    }

    /// The aggregated votes, one candidate per distinct list.
    pub fn candidates(&self) -> Vec<Candidate> {
        self._tallies
            .iter()
            .map(|(name, votes)| Candidate::new(name, *votes))
            .collect()
    }

    /// Runs the allocation on the aggregated votes.
    pub fn run(&self) -> Result<AllocationSummary, AllocationErrors> {
        run_allocation_stats(&self.candidates(), &self._rules)
    }
}

fn clean_name(name: &str) -> Result<String, AllocationErrors> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InvalidInput::EmptyName.into());
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_in_first_seen_order() {
        let mut b = Builder::new(&AllocationRules::new(5)).unwrap();
        b.add_submission("B", 10).unwrap();
        b.add_submission(" A ", 20).unwrap();
        b.add_submission("B", 5).unwrap();
        assert_eq!(b.num_submissions(), 3);
        assert_eq!(b.total_votes(), 35);
        assert_eq!(
            b.candidates(),
            vec![Candidate::new("B", 15), Candidate::new("A", 20)]
        );
    }

    #[test]
    fn registered_lists() {
        let mut b = Builder::new(&AllocationRules::new(2))
            .unwrap()
            .lists(&["A".to_string(), "B".to_string(), "C".to_string()])
            .unwrap();
        b.add_submission("C", 10).unwrap();
        assert_eq!(
            b.add_submission("Z", 10),
            Err(AllocationErrors::InvalidInput(InvalidInput::UnregisteredList {
                name: "Z".to_string()
            }))
        );
        assert_eq!(
            b.candidates(),
            vec![
                Candidate::new("A", 0),
                Candidate::new("B", 0),
                Candidate::new("C", 10)
            ]
        );
        let summary = b.run().unwrap();
        assert_eq!(summary.results[2].seats, 2);
    }

    #[test]
    fn registration_keeps_earlier_submissions() {
        let mut b = Builder::new(&AllocationRules::new(2)).unwrap();
        b.add_submission("B", 4).unwrap();
        b.add_submission("A", 10).unwrap();
        b.add_submission("A", 2).unwrap();
        let b = b.lists(&["A".to_string(), "B".to_string(), "C".to_string()]).unwrap();
        assert_eq!(b.num_submissions(), 3);
        assert_eq!(b.total_votes(), 16);
        assert_eq!(
            b.candidates(),
            vec![
                Candidate::new("A", 12),
                Candidate::new("B", 4),
                Candidate::new("C", 0)
            ]
        );

        let mut b = Builder::new(&AllocationRules::new(2)).unwrap();
        b.add_submission("Z", 1).unwrap();
        assert_eq!(
            b.lists(&["A".to_string()]).err(),
            Some(AllocationErrors::InvalidInput(InvalidInput::UnregisteredList {
                name: "Z".to_string()
            }))
        );
    }

    #[test]
    fn rejects_bad_submissions() {
        let mut b = Builder::new(&AllocationRules::new(2)).unwrap();
        assert_eq!(
            b.add_submission("A", -3),
            Err(AllocationErrors::InvalidInput(InvalidInput::NegativeVotes {
                name: "A".to_string(),
                votes: -3
            }))
        );
        assert_eq!(
            b.add_submission("  ", 3),
            Err(AllocationErrors::InvalidInput(InvalidInput::EmptyName))
        );
        b.add_submission("A", i64::MAX).unwrap();
        assert_eq!(
            b.add_submission("A", 1),
            Err(AllocationErrors::InvalidInput(InvalidInput::VoteOverflow))
        );
        assert_eq!(b.num_submissions(), 1);
    }

    #[test]
    fn rejects_bad_rules() {
        assert!(Builder::new(&AllocationRules::new(0)).is_err());
        assert!(Builder::new(&AllocationRules::new(3).with_threshold(-1.0)).is_err());
        let dup = Builder::new(&AllocationRules::new(3))
            .unwrap()
            .lists(&["A".to_string(), "A ".to_string()]);
        assert!(dup.is_err());
    }
}
