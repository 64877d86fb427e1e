use serde::{Deserialize, Serialize};
use std::fmt;

/// Claim flow state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// No wallet session
    #[default]
    Idle,
    /// Account access requested, waiting for the wallet
    Connecting,
    /// Session established, ready to claim
    Connected,
    /// Relay check and batch submission in flight
    Claiming,
    /// Wallet accepted the batch and returned an id
    Claimed,
    /// Polling batch status
    Confirming,
    /// Batch confirmed on chain
    Confirmed,
    /// Last action failed; message is in the view's error slot
    Error,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Idle => "idle",
            ClaimStatus::Connecting => "connecting",
            ClaimStatus::Connected => "connected",
            ClaimStatus::Claiming => "claiming",
            ClaimStatus::Claimed => "claimed",
            ClaimStatus::Confirming => "confirming",
            ClaimStatus::Confirmed => "confirmed",
            ClaimStatus::Error => "error",
        }
    }

    /// Check if this state can transition to another state
    pub fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;

        match (self, target) {
            // Disconnect resets from anywhere
            (_, Idle) => true,

            (Idle, Connecting) => true,
            (Connecting, Connected) => true,

            (Connected, Claiming) => true,
            (Claiming, Claimed) => true,
            (Claimed, Confirming) => true,
            (Confirming, Confirmed) => true,

            // Retry after a failure or a completed claim
            (Error, Connecting) => true,
            (Error, Claiming) => true,
            (Confirmed, Claiming) => true,

            // Failures from any non-terminal state. A claim rejected by
            // validation after a confirmed one, or a repeated failure, lands here too
            (_, Error) => true,

            _ => false,
        }
    }

    /// Get valid next states from current state
    pub fn valid_transitions(&self) -> Vec<ClaimStatus> {
        use ClaimStatus::*;

        match self {
            Idle => vec![Connecting, Error, Idle],
            Connecting => vec![Connected, Error, Idle],
            Connected => vec![Claiming, Error, Idle],
            Claiming => vec![Claimed, Error, Idle],
            Claimed => vec![Confirming, Error, Idle],
            Confirming => vec![Confirmed, Error, Idle],
            Confirmed => vec![Claiming, Error, Idle],
            Error => vec![Connecting, Claiming, Error, Idle],
        }
    }

    /// An action is in flight; the matching controls are disabled
    pub fn is_transitional(&self) -> bool {
        matches!(
            self,
            ClaimStatus::Connecting
                | ClaimStatus::Claiming
                | ClaimStatus::Claimed
                | ClaimStatus::Confirming
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Confirmed | ClaimStatus::Error)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for ClaimStatus {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, <Self as TryFrom<&str>>::Error> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(ClaimStatus::Idle),
            "connecting" => Ok(ClaimStatus::Connecting),
            "connected" => Ok(ClaimStatus::Connected),
            "claiming" => Ok(ClaimStatus::Claiming),
            "claimed" => Ok(ClaimStatus::Claimed),
            "confirming" => Ok(ClaimStatus::Confirming),
            "confirmed" => Ok(ClaimStatus::Confirmed),
            "error" => Ok(ClaimStatus::Error),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ClaimStatus; 8] = [
        ClaimStatus::Idle,
        ClaimStatus::Connecting,
        ClaimStatus::Connected,
        ClaimStatus::Claiming,
        ClaimStatus::Claimed,
        ClaimStatus::Confirming,
        ClaimStatus::Confirmed,
        ClaimStatus::Error,
    ];

    #[test]
    fn test_happy_path_transitions() {
        use ClaimStatus::*;
        let path = [Idle, Connecting, Connected, Claiming, Claimed, Confirming, Confirmed];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_no_skipping_forward() {
        use ClaimStatus::*;
        assert!(!Idle.can_transition_to(Claiming));
        assert!(!Connected.can_transition_to(Confirming));
        assert!(!Claiming.can_transition_to(Confirmed));
        assert!(!Confirmed.can_transition_to(Connecting));
    }

    #[test]
    fn test_valid_transitions_matches_table() {
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    from.valid_transitions().contains(&to),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_error_reachable_from_non_terminal() {
        for from in ALL.iter().filter(|s| !s.is_terminal()) {
            assert!(from.can_transition_to(ClaimStatus::Error), "{from}");
        }
    }

    #[test]
    fn test_round_trip_names() {
        for status in ALL {
            assert_eq!(ClaimStatus::try_from(status.as_str()), Ok(status));
        }
        assert!(ClaimStatus::try_from("pending").is_err());
    }
}
