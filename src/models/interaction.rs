use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Candidate;

/// A user's and a candidate's like/pass decisions for one pairing.
///
/// There is exactly one interaction per (user, candidate) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub candidate_id: Uuid,
    pub user_liked: bool,
    /// Only ever set after a user like has been evaluated
    pub candidate_liked: bool,
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    pub fn new(user_id: Uuid, candidate_id: Uuid, user_liked: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            candidate_id,
            user_liked,
            candidate_liked: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_mutual(&self) -> bool {
        self.user_liked && self.candidate_liked
    }
}

/// Swipe direction sent by the client
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Like,
    Pass,
}

impl SwipeAction {
    pub fn is_like(&self) -> bool {
        matches!(self, SwipeAction::Like)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwipeRequest {
    pub candidate_id: Uuid,
    pub action: SwipeAction,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SwipeStatus {
    Success,
    MutualMatch,
}

/// Result of a swipe as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwipeOutcome {
    pub status: SwipeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SwipeOutcome {
    pub fn recorded() -> Self {
        Self {
            status: SwipeStatus::Success,
            message: None,
        }
    }

    pub fn mutual_match(candidate: &Candidate) -> Self {
        Self {
            status: SwipeStatus::MutualMatch,
            message: Some(format!(
                "It's a match! {} likes you back!",
                candidate.name
            )),
        }
    }
}

/// A mutual match together with the candidate it refers to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchView {
    pub match_id: Uuid,
    pub candidate: Candidate,
    pub matched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_interaction_is_not_mutual() {
        let interaction = Interaction::new(Uuid::new_v4(), Uuid::new_v4(), true);
        assert!(interaction.user_liked);
        assert!(!interaction.candidate_liked);
        assert!(!interaction.is_mutual());
    }

    #[test]
    fn test_mutual_requires_both_flags() {
        let mut interaction = Interaction::new(Uuid::new_v4(), Uuid::new_v4(), false);
        interaction.candidate_liked = true;
        assert!(!interaction.is_mutual());

        interaction.user_liked = true;
        assert!(interaction.is_mutual());
    }

    #[test]
    fn test_swipe_action_deserialization() {
        let like: SwipeAction = serde_json::from_str("\"like\"").unwrap();
        let pass: SwipeAction = serde_json::from_str("\"pass\"").unwrap();
        assert!(like.is_like());
        assert!(!pass.is_like());
        assert!(serde_json::from_str::<SwipeAction>("\"superlike\"").is_err());
    }

    #[test]
    fn test_recorded_outcome_omits_message() {
        let json = serde_json::to_value(SwipeOutcome::recorded()).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("message").is_none());
    }
}
