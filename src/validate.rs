use crate::error::ValidationError;
use crate::types::MatchState;

pub const MAX_WICKETS: u8 = 10;

/// Checks a submitted state in a fixed order and reports the first failure.
pub fn validate(state: &MatchState) -> Result<(), ValidationError> {
    if !state.overs.is_in_range() {
        return Err(ValidationError::OversOutOfRange);
    }
    if state.target <= state.score {
        return Err(ValidationError::TargetNotAboveScore);
    }
    if state.overs.is_zero() {
        return Err(ValidationError::ZeroOvers);
    }
    if state.wickets > MAX_WICKETS {
        return Err(ValidationError::WicketsOutOfRange);
    }
    if state.batting_team == state.bowling_team {
        return Err(ValidationError::SameTeams);
    }
    Ok(())
}
