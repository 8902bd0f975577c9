use crate::config::{Outcome, VotingResult, MAX_RANKINGS};

/// Renders the rounds and the outcome of an election as text lines.
///
/// Each round lists the running candidates with their ballot count, followed
/// by the candidate removed in that round. The last block is either the
/// winner with its share of all the accepted ballots, or the tied candidates.
pub fn render_text(result: &VotingResult) -> Vec<String> {
    let mut lines: Vec<String> = vec![String::new(), "Initial Results:".to_string(), String::new()];
    for round_stat in result.round_stats.iter() {
        for (name, count) in round_stat.tally.iter() {
            lines.push(format!("{}: {}", name, count));
        }
        lines.push(String::new());
        if let Some(elim) = &round_stat.eliminated {
            lines.push(format!("Removing: {} with {} votes", elim.name, elim.votes));
            lines.push(String::new());
        }
    }
    match &result.outcome {
        Outcome::Winner { name, votes } => {
            lines.push(format!("{}: {}", name, votes));
            lines.push(String::new());
            lines.push(format!("{} is the winner!", name));
            let pct = result.winner_percentage().unwrap_or(0.0);
            lines.push(format!(
                "With {:?}% of people having chosen it as one of their {} options!",
                pct, MAX_RANKINGS
            ));
        }
        Outcome::Tie { candidates } => {
            lines.push(format!("Tie between: {}", candidates.join(", ")));
        }
    }
    lines
}
