/*!

Seat allocation with the D'Hondt method (highest averages) and a minimum
vote share threshold.

```
use dhondt::{allocate, Candidate};

let lists = vec![
    Candidate::new("A", 100_000),
    Candidate::new("B", 80_000),
    Candidate::new("C", 30_000),
    Candidate::new("D", 20_000),
];
let results = allocate(&lists, 8, 3.0)?;
let seats: Vec<u32> = results.iter().map(|r| r.seats).collect();
assert_eq!(seats, vec![4, 3, 1, 0]);
# Ok::<(), dhondt::AllocationErrors>(())
```

See the [manual] for the exact rules, in particular for ties.
*/
mod config;
use log::{debug, info};

use std::collections::HashSet;

pub use crate::config::*;

pub mod builder;
pub mod manual;

// **** Private structures ****

type RoundId = u32;

// Position of a list in the input. All the per-list state (seat counters)
// is addressed by this index.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct ListId(usize);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);

    fn checked_add(self, rhs: VoteCount) -> Option<VoteCount> {
        self.0.checked_add(rhs.0).map(VoteCount)
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct CheckedList {
    name: String,
    votes: VoteCount,
}

struct CheckResult {
    lists: Vec<CheckedList>,
    total_seats: u32,
    total_votes: VoteCount,
    threshold_percent: f64,
}

// Flag to indicate if a tiebreak happened.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
enum TiebreakSituation {
    Clean,           // Did not happen
    TiebreakOccured, // Happened and had to be resolved.
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct RoundWinner {
    elected: ListId,
    quotient: Quotient,
    tiebreak: TiebreakSituation,
    // All the lists sharing the winning quotient, in candidate order.
    tied: Vec<ListId>,
}

/// Allocates `total_seats` seats among the candidates.
///
/// Returns one result per candidate, in the order of the input. This is a shortcut
/// for [run_allocation_stats] that drops the statistics.
///
/// Arguments:
/// * `candidates` the lists with their aggregated votes. Names must be unique.
/// * `total_seats` the number of seats to distribute. Must be positive.
/// * `threshold_percent` the minimum share of the votes, in percent, to receive seats.
///   [AllocationRules::DEFAULT_THRESHOLD_PERCENT] is the usual value.
pub fn allocate(
    candidates: &[Candidate],
    total_seats: i64,
    threshold_percent: f64,
) -> Result<Vec<AllocationResult>, AllocationErrors> {
    let rules = AllocationRules {
        total_seats,
        threshold_percent,
    };
    run_allocation(candidates, &rules, false).map(|summary| summary.results)
}

/// Runs the allocation with the given rules and returns the results along with
/// the statistics of every round.
///
/// All the input is validated before any seat is handed out: on error, no partial
/// result is produced.
pub fn run_allocation_stats(
    candidates: &[Candidate],
    rules: &AllocationRules,
) -> Result<AllocationSummary, AllocationErrors> {
    run_allocation(candidates, rules, true)
}

// With record_rounds off, the summary has no round statistics.
fn run_allocation(
    candidates: &[Candidate],
    rules: &AllocationRules,
    record_rounds: bool,
) -> Result<AllocationSummary, AllocationErrors> {
    info!(
        "Processing {:?} lists, rules: {:?}",
        candidates.len(),
        rules
    );

    let cr = checks(candidates, rules)?;
    let mut seats: Vec<u32> = vec![0; cr.lists.len()];

    if cr.total_votes == VoteCount::EMPTY {
        info!("No votes cast: no seat is distributed");
        return Ok(build_summary(
            &cr,
            &seats,
            0.0,
            AllocationOutcome::NoVotes,
            Vec::new(),
        ));
    }

    let threshold_votes = cr.total_votes.0 as f64 * cr.threshold_percent / 100.0;
    info!(
        "Total votes: {}, threshold: {}% ({:.2} votes)",
        cr.total_votes.0, cr.threshold_percent, threshold_votes
    );

    let eligible: Vec<ListId> = cr
        .lists
        .iter()
        .enumerate()
        .filter_map(|(idx, l)| {
            if is_eligible(l.votes, cr.total_votes, cr.threshold_percent) {
                Some(ListId(idx))
            } else {
                debug!(
                    "run_allocation: {} is below the threshold with {} votes",
                    l.name, l.votes.0
                );
                None
            }
        })
        .collect();

    if eligible.is_empty() {
        info!("No list reached the threshold: no seat is distributed");
        return Ok(build_summary(
            &cr,
            &seats,
            threshold_votes,
            AllocationOutcome::NoEligibleCandidates,
            Vec::new(),
        ));
    }
    debug!("run_allocation: eligible lists: {:?}", eligible);

    let mut round_stats: Vec<RoundStats> = Vec::new();
    for round_id in 1..=cr.total_seats {
        let winner = match find_round_winner(&cr.lists, &eligible, &seats) {
            Some(w) => w,
            // eligible is never empty here
            None => break,
        };
        seats[winner.elected.0] += 1;
        if record_rounds {
            round_stats.push(round_winner_to_stat(&cr.lists, &winner, round_id));
        } else {
            debug!(
                "Round {}: {} elected with quotient {}",
                round_id, cr.lists[winner.elected.0].name, winner.quotient
            );
        }
    }

    for (l, s) in cr.lists.iter().zip(seats.iter()) {
        info!("{:>10} {} -> {} seats", l.votes.0, l.name, s);
    }

    Ok(build_summary(
        &cr,
        &seats,
        threshold_votes,
        AllocationOutcome::Allocated,
        round_stats,
    ))
}

/// Sorts the results for presentation: most seats first, then most votes.
///
/// The sort is stable: lists that are equal on both counts keep their relative order.
/// The allocation itself does not depend on this order.
pub fn sort_for_presentation(results: &mut [AllocationResult]) {
    results.sort_by(|a, b| b.seats.cmp(&a.seats).then(b.votes.cmp(&a.votes)));
}

// A list is eligible when votes >= total_votes * threshold_percent / 100.
// Both sides are scaled by 100 so that whole percentages compare exactly.
fn is_eligible(votes: VoteCount, total_votes: VoteCount, threshold_percent: f64) -> bool {
    votes.0 as f64 * 100.0 >= total_votes.0 as f64 * threshold_percent
}

fn quotient(lists: &[CheckedList], seats: &[u32], lid: ListId) -> Quotient {
    Quotient {
        votes: lists[lid.0].votes.0,
        divisor: seats[lid.0] + 1,
    }
}

/// Finds the list that receives the next seat.
///
/// The largest quotient wins. On an exact tie, the list with strictly more votes wins,
/// and if the votes are also equal, the first list in candidate order wins.
fn find_round_winner(
    lists: &[CheckedList],
    eligible: &[ListId],
    seats: &[u32],
) -> Option<RoundWinner> {
    let quotients: Vec<(ListId, Quotient)> = eligible
        .iter()
        .map(|lid| (*lid, quotient(lists, seats, *lid)))
        .collect();

    let max_quotient: Quotient = quotients.iter().map(|(_, q)| *q).max()?;

    let all_largest: Vec<ListId> = quotients
        .iter()
        .filter_map(|(lid, q)| if *q == max_quotient { Some(*lid) } else { None })
        .collect();

    let (first, rest) = all_largest.split_first()?;

    // No tiebreak, the logic below is not relevant.
    if rest.is_empty() {
        return Some(RoundWinner {
            elected: *first,
            quotient: max_quotient,
            tiebreak: TiebreakSituation::Clean,
            tied: Vec::new(),
        });
    }

    let mut elected = *first;
    for lid in rest.iter() {
        // Strictly greater: on equal votes, the earlier list keeps the seat.
        if lists[lid.0].votes > lists[elected.0].votes {
            elected = *lid;
        }
    }
    debug!(
        "find_round_winner: tie between {:?} at {}, resolved in favor of {:?}",
        all_largest, max_quotient, elected
    );
    Some(RoundWinner {
        elected,
        quotient: max_quotient,
        tiebreak: TiebreakSituation::TiebreakOccured,
        tied: all_largest,
    })
}

fn round_winner_to_stat(
    lists: &[CheckedList],
    winner: &RoundWinner,
    round_id: RoundId,
) -> RoundStats {
    let name = lists[winner.elected.0].name.clone();
    debug!(
        "Round {}: {} elected with quotient {} ({:.2}) {:?}",
        round_id,
        name,
        winner.quotient,
        winner.quotient.as_f64(),
        winner.tiebreak
    );
    RoundStats {
        round: round_id,
        elected: name,
        quotient: winner.quotient,
        tied: winner
            .tied
            .iter()
            .map(|lid| lists[lid.0].name.clone())
            .collect(),
    }
}

fn build_summary(
    cr: &CheckResult,
    seats: &[u32],
    threshold_votes: f64,
    outcome: AllocationOutcome,
    round_stats: Vec<RoundStats>,
) -> AllocationSummary {
    let results = cr
        .lists
        .iter()
        .zip(seats.iter())
        .map(|(l, s)| AllocationResult {
            name: l.name.clone(),
            votes: l.votes.0,
            seats: *s,
        })
        .collect();
    AllocationSummary {
        total_seats: cr.total_seats,
        total_votes: cr.total_votes.0,
        threshold_percent: cr.threshold_percent,
        threshold_votes,
        outcome,
        results,
        round_stats,
    }
}

/// Validates the rules and returns the number of seats and the threshold.
pub(crate) fn check_rules(rules: &AllocationRules) -> Result<(u32, f64), AllocationErrors> {
    if rules.total_seats <= 0 {
        return Err(InvalidInput::NonPositiveSeats {
            total_seats: rules.total_seats,
        }
        .into());
    }
    let total_seats = u32::try_from(rules.total_seats).map_err(|_| InvalidInput::TooManySeats {
        total_seats: rules.total_seats,
    })?;
    if !rules.threshold_percent.is_finite() || rules.threshold_percent < 0.0 {
        return Err(InvalidInput::InvalidThreshold {
            threshold_percent: rules.threshold_percent,
        }
        .into());
    }
    Ok((total_seats, rules.threshold_percent))
}

// Lists are returned in the same order.
fn checks(
    candidates: &[Candidate],
    rules: &AllocationRules,
) -> Result<CheckResult, AllocationErrors> {
    let (total_seats, threshold_percent) = check_rules(rules)?;

    let mut seen_names: HashSet<&str> = HashSet::new();
    let mut lists: Vec<CheckedList> = Vec::with_capacity(candidates.len());
    let mut total_votes = VoteCount::EMPTY;
    for c in candidates.iter() {
        if c.name.trim().is_empty() {
            return Err(InvalidInput::EmptyName.into());
        }
        if !seen_names.insert(c.name.as_str()) {
            return Err(InvalidInput::DuplicateName {
                name: c.name.clone(),
            }
            .into());
        }
        if c.votes < 0 {
            return Err(InvalidInput::NegativeVotes {
                name: c.name.clone(),
                votes: c.votes,
            }
            .into());
        }
        let votes = VoteCount(c.votes as u64);
        total_votes = total_votes
            .checked_add(votes)
            .ok_or(InvalidInput::VoteOverflow)?;
        lists.push(CheckedList {
            name: c.name.clone(),
            votes,
        });
    }
    debug!("checks: {} lists, {} votes", lists.len(), total_votes.0);

    Ok(CheckResult {
        lists,
        total_seats,
        total_votes,
        threshold_percent,
    })
}
