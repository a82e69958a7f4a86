// ********* Input data structures ***********

use std::cmp::Ordering;
use std::error::Error;
use std::fmt::Display;

/// A list competing for seats, with its aggregated number of votes.
///
/// The vote count is signed so that a bad tally coming from upstream can be
/// reported instead of silently clamped. Negative counts are rejected by
/// the allocation.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Candidate {
    pub name: String,
    pub votes: i64,
}

impl Candidate {
    pub fn new(name: &str, votes: i64) -> Candidate {
        Candidate {
            name: name.to_string(),
            votes,
        }
    }
}

// ******** Output data structures *********

/// The seats won by one list.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct AllocationResult {
    pub name: String,
    pub votes: u64,
    pub seats: u32,
}

/// The exact value `votes / divisor` compared in a round.
///
/// Two quotients are equal when they represent the same rational number:
/// `50 / 1` and `100 / 2` compare as equal.
#[derive(Debug, Clone, Copy)]
pub struct Quotient {
    pub votes: u64,
    pub divisor: u32,
}

impl Quotient {
    /// Approximate value, for display only.
    pub fn as_f64(&self) -> f64 {
        self.votes as f64 / self.divisor as f64
    }
}

impl Ord for Quotient {
    fn cmp(&self, other: &Self) -> Ordering {
        // a/b <=> c/d  iff  a*d <=> c*b, all terms positive.
        let lhs = self.votes as u128 * other.divisor as u128;
        let rhs = other.votes as u128 * self.divisor as u128;
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Quotient {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Quotient {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Quotient {}

impl Display for Quotient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.votes, self.divisor)
    }
}

/// Statistics for one round: a single seat handed to one list.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    pub elected: String,
    pub quotient: Quotient,
    /// All the lists that reached the winning quotient, in candidate order.
    /// Empty when the round was won outright.
    pub tied: Vec<String>,
}

/// How the allocation ended. None of these is an error.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum AllocationOutcome {
    /// Nobody received a vote. All the seat counts are zero.
    NoVotes,
    /// The threshold excluded every list. All the seat counts are zero.
    NoEligibleCandidates,
    /// All the seats have been distributed.
    Allocated,
}

impl AllocationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationOutcome::NoVotes => "noVotes",
            AllocationOutcome::NoEligibleCandidates => "noEligibleCandidates",
            AllocationOutcome::Allocated => "allocated",
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct AllocationSummary {
    pub total_seats: u32,
    pub total_votes: u64,
    pub threshold_percent: f64,
    /// The minimum number of votes to be eligible, `total_votes * threshold_percent / 100`.
    pub threshold_votes: f64,
    pub outcome: AllocationOutcome,
    /// One entry per input candidate, in input order.
    pub results: Vec<AllocationResult>,
    pub round_stats: Vec<RoundStats>,
}

impl AllocationSummary {
    pub fn seats_allocated(&self) -> u64 {
        self.results.iter().map(|r| r.seats as u64).sum()
    }
}

/// The reasons for rejecting the input of an allocation.
#[derive(PartialEq, Debug, Clone)]
pub enum InvalidInput {
    NegativeVotes { name: String, votes: i64 },
    NonPositiveSeats { total_seats: i64 },
    TooManySeats { total_seats: i64 },
    InvalidThreshold { threshold_percent: f64 },
    EmptyName,
    DuplicateName { name: String },
    /// A submission names a list that is not part of the registered lists.
    UnregisteredList { name: String },
    VoteOverflow,
}

impl Display for InvalidInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidInput::NegativeVotes { name, votes } => {
                write!(f, "invalid votes for {}: {} (must be non-negative)", name, votes)
            }
            InvalidInput::NonPositiveSeats { total_seats } => {
                write!(f, "total seats must be positive, got {}", total_seats)
            }
            InvalidInput::TooManySeats { total_seats } => {
                write!(f, "total seats is too large: {}", total_seats)
            }
            InvalidInput::InvalidThreshold { threshold_percent } => write!(
                f,
                "threshold must be a non-negative percentage, got {}",
                threshold_percent
            ),
            InvalidInput::EmptyName => write!(f, "list names may not be empty"),
            InvalidInput::DuplicateName { name } => write!(f, "duplicate list name: {}", name),
            InvalidInput::UnregisteredList { name } => {
                write!(f, "list {} is not a registered list", name)
            }
            InvalidInput::VoteOverflow => write!(f, "the total number of votes is too large"),
        }
    }
}

/// Errors that prevent the allocation from completing.
///
/// A threshold that excludes every list is not an error, see
/// [AllocationOutcome::NoEligibleCandidates].
#[derive(PartialEq, Debug, Clone)]
pub enum AllocationErrors {
    InvalidInput(InvalidInput),
}

impl Error for AllocationErrors {}

impl Display for AllocationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationErrors::InvalidInput(reason) => write!(f, "invalid input: {}", reason),
        }
    }
}

impl From<InvalidInput> for AllocationErrors {
    fn from(reason: InvalidInput) -> Self {
        AllocationErrors::InvalidInput(reason)
    }
}

// ********* Configuration **********

/// The parameters of one allocation.
///
/// The seat count is signed so that a zero or negative request coming from
/// a caller can be rejected as invalid input.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct AllocationRules {
    pub total_seats: i64,
    /// Minimum share of the total votes, in percent, to take part in the allocation.
    pub threshold_percent: f64,
}

impl AllocationRules {
    pub const DEFAULT_THRESHOLD_PERCENT: f64 = 3.0;

    pub fn new(total_seats: i64) -> AllocationRules {
        AllocationRules {
            total_seats,
            threshold_percent: AllocationRules::DEFAULT_THRESHOLD_PERCENT,
        }
    }

    pub fn with_threshold(self, threshold_percent: f64) -> AllocationRules {
        AllocationRules {
            threshold_percent,
            ..self
        }
    }
}
