//! FSRS memory model
//!
//! Forgetting-curve scheduler with three memory states. A card enters in
//! `Learning`, graduates to `Review` after enough successful steps, drops to
//! `Relearning` on a lapse and graduates back to `Review` from there.
//!
//! All functions are pure: the caller supplies elapsed time and receives the
//! next interval in days.

use crate::sanitize::{clamp_difficulty, floor_positive};
use crate::types::{
    MemoryCard, MemoryState, Rating, ScheduledReview, SchedulerParams, DECAY, FACTOR,
    MEMORY_FLOOR, WEIGHT_COUNT,
};

type Weights = [f64; WEIGHT_COUNT];

/// Probability of recall after `elapsed_days` for a memory of `stability`
pub fn retrievability(stability: f64, elapsed_days: f64) -> f64 {
    if stability <= 0.0 {
        return 0.0;
    }
    let safe_elapsed = elapsed_days.max(0.0);
    (1.0 + FACTOR * safe_elapsed / stability).powf(DECAY)
}

/// Interval in days at which recall probability falls to the desired retention
pub fn next_interval(stability: f64, params: &SchedulerParams) -> f64 {
    let safe_retention = params.desired_retention.clamp(0.0001, 0.9999);
    let floor = params.minimum_interval_days.max(0.0);
    let ceiling = params.maximum_interval_days.max(floor);
    let interval = stability / FACTOR * (safe_retention.powf(1.0 / DECAY) - 1.0);
    if interval.is_nan() {
        return floor;
    }
    interval.clamp(floor, ceiling)
}

/// Apply one rating to a card
///
/// `elapsed_days` is the time since the last review; `None` (or a negative
/// value from clock skew) counts as zero.
pub fn schedule(
    card: &MemoryCard,
    rating: Rating,
    elapsed_days: Option<f64>,
    params: &SchedulerParams,
) -> ScheduledReview {
    let w = &params.w;

    let (stability, difficulty, retrievability) = match (card.stability, card.difficulty) {
        (Some(s), Some(d)) => {
            let s = floor_positive(s);
            let d = clamp_difficulty(d);
            let r = retrievability(s, elapsed_days.unwrap_or(0.0));
            let new_s = if rating == Rating::Again {
                next_forget_stability(w, d, s, r)
            } else {
                next_recall_stability(w, d, s, r, rating)
            };
            (new_s, next_difficulty(w, d, rating), r)
        }
        _ => (
            initial_stability(w, rating),
            initial_difficulty(w, rating),
            1.0,
        ),
    };

    let stability = floor_positive(stability);
    let difficulty = clamp_difficulty(floor_positive(difficulty));
    let (state, step) = next_state(card, rating, params);

    ScheduledReview {
        card: MemoryCard {
            state,
            step,
            stability: Some(stability),
            difficulty: Some(difficulty),
        },
        interval_days: next_interval(stability, params),
        retrievability,
    }
}

fn next_state(card: &MemoryCard, rating: Rating, params: &SchedulerParams) -> (MemoryState, u32) {
    match card.state {
        MemoryState::Learning => advance_step(card.step, rating, params.learning_steps, MemoryState::Learning),
        MemoryState::Relearning => {
            advance_step(card.step, rating, params.relearning_steps, MemoryState::Relearning)
        }
        MemoryState::Review => {
            if rating == Rating::Again {
                (MemoryState::Relearning, 0)
            } else {
                (MemoryState::Review, 0)
            }
        }
    }
}

fn advance_step(step: u32, rating: Rating, threshold: u32, state: MemoryState) -> (MemoryState, u32) {
    let next = match rating {
        Rating::Again => return (state, 0),
        Rating::Hard => step,
        Rating::Good => step.saturating_add(1),
        Rating::Easy => threshold,
    };
    if next >= threshold {
        (MemoryState::Review, 0)
    } else {
        (state, next)
    }
}

fn initial_stability(w: &Weights, rating: Rating) -> f64 {
    w[(rating.as_i64() - 1) as usize].max(MEMORY_FLOOR)
}

fn initial_difficulty(w: &Weights, rating: Rating) -> f64 {
    clamp_difficulty(w[4] - (rating.as_i64() - 3) as f64 * w[5])
}

// Centred on 2.5 so Good moves difficulty down rather than holding it.
fn next_difficulty(w: &Weights, d: f64, rating: Rating) -> f64 {
    let delta = -(rating.as_i64() as f64 - 2.5);
    let d_new = d + w[6] * delta;
    let anchor = initial_difficulty(w, Rating::Easy);
    clamp_difficulty(w[7] * anchor + (1.0 - w[7]) * d_new)
}

fn next_recall_stability(w: &Weights, d: f64, s: f64, r: f64, rating: Rating) -> f64 {
    let hard_penalty = if rating == Rating::Hard { w[15] } else { 1.0 };
    let easy_bonus = if rating == Rating::Easy { w[16] } else { 1.0 };

    let growth = w[8].exp()
        * (11.0 - d)
        * s.powf(-w[9])
        * ((1.0 - r) * w[10]).exp_m1()
        * hard_penalty
        * easy_bonus;
    (s * (1.0 + growth.max(0.0))).max(s)
}

fn next_forget_stability(w: &Weights, d: f64, s: f64, r: f64) -> f64 {
    let new_s = w[11] * d.powf(-w[12]) * ((s + 1.0).powf(w[13]) - 1.0) * ((1.0 - r) * w[14]).exp();
    new_s.min(s).max(MEMORY_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DIFFICULTY_MAX, DIFFICULTY_MIN};

    fn reviewed(state: MemoryState, step: u32, stability: f64, difficulty: f64) -> MemoryCard {
        MemoryCard {
            state,
            step,
            stability: Some(stability),
            difficulty: Some(difficulty),
        }
    }

    #[test]
    fn test_first_review_uses_initial_table() {
        let params = SchedulerParams::default();
        let result = schedule(&MemoryCard::new(), Rating::Good, None, &params);
        assert_eq!(result.card.stability, Some(2.4));
        assert_eq!(result.card.difficulty, Some(4.93));
        assert_eq!(result.card.state, MemoryState::Learning);
        assert_eq!(result.card.step, 1);
        assert_eq!(result.retrievability, 1.0);
        assert!(result.interval_days >= 1.0);
    }

    #[test]
    fn test_initial_stability_increases_with_rating() {
        let params = SchedulerParams::default();
        let stabilities: Vec<f64> = Rating::ALL
            .iter()
            .map(|&rating| {
                schedule(&MemoryCard::new(), rating, None, &params)
                    .card
                    .stability
                    .unwrap()
            })
            .collect();
        assert!(stabilities.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_learning_transitions() {
        let params = SchedulerParams::default();

        let again = schedule(&reviewed(MemoryState::Learning, 1, 2.0, 5.0), Rating::Again, Some(1.0), &params);
        assert_eq!((again.card.state, again.card.step), (MemoryState::Learning, 0));

        let hard = schedule(&reviewed(MemoryState::Learning, 1, 2.0, 5.0), Rating::Hard, Some(1.0), &params);
        assert_eq!((hard.card.state, hard.card.step), (MemoryState::Learning, 1));

        let good = schedule(&reviewed(MemoryState::Learning, 1, 2.0, 5.0), Rating::Good, Some(1.0), &params);
        assert_eq!((good.card.state, good.card.step), (MemoryState::Review, 0));

        let easy = schedule(&MemoryCard::new(), Rating::Easy, None, &params);
        assert_eq!((easy.card.state, easy.card.step), (MemoryState::Review, 0));
    }

    #[test]
    fn test_review_lapse_enters_relearning() {
        let params = SchedulerParams::default();
        let card = reviewed(MemoryState::Review, 0, 20.0, 5.0);

        let lapse = schedule(&card, Rating::Again, Some(20.0), &params);
        assert_eq!((lapse.card.state, lapse.card.step), (MemoryState::Relearning, 0));
        assert!(lapse.card.stability.unwrap() < 20.0);

        let pass = schedule(&card, Rating::Hard, Some(20.0), &params);
        assert_eq!(pass.card.state, MemoryState::Review);
    }

    #[test]
    fn test_relearning_graduates_back_to_review() {
        let params = SchedulerParams::default();
        let card = reviewed(MemoryState::Relearning, 0, 3.0, 7.0);
        let result = schedule(&card, Rating::Good, Some(1.0), &params);
        assert_eq!((result.card.state, result.card.step), (MemoryState::Review, 0));
    }

    #[test]
    fn test_difficulty_direction() {
        let params = SchedulerParams::default();
        let card = reviewed(MemoryState::Review, 0, 10.0, 5.0);
        let d = |rating| {
            schedule(&card, rating, Some(10.0), &params)
                .card
                .difficulty
                .unwrap()
        };
        assert!(d(Rating::Again) > 5.0);
        assert!(d(Rating::Hard) > 5.0);
        assert!(d(Rating::Good) < 5.0);
        assert!(d(Rating::Easy) < d(Rating::Good));
    }

    #[test]
    fn test_difficulty_stays_bounded() {
        let params = SchedulerParams::default();
        let hardest = schedule(&reviewed(MemoryState::Review, 0, 5.0, 10.0), Rating::Again, Some(3.0), &params);
        let easiest = schedule(&reviewed(MemoryState::Review, 0, 5.0, 1.0), Rating::Easy, Some(3.0), &params);
        assert_eq!(hardest.card.difficulty, Some(DIFFICULTY_MAX));
        assert_eq!(easiest.card.difficulty, Some(DIFFICULTY_MIN));
    }

    #[test]
    fn test_harder_items_gain_less_stability() {
        let params = SchedulerParams::default();
        let easy_item = schedule(&reviewed(MemoryState::Review, 0, 10.0, 2.0), Rating::Good, Some(10.0), &params);
        let hard_item = schedule(&reviewed(MemoryState::Review, 0, 10.0, 9.0), Rating::Good, Some(10.0), &params);
        assert!(easy_item.card.stability.unwrap() > hard_item.card.stability.unwrap());
        assert!(hard_item.card.stability.unwrap() >= 10.0);
    }

    #[test]
    fn test_degenerate_stored_values_are_floored() {
        let params = SchedulerParams::default();
        let card = reviewed(MemoryState::Review, 0, -1.0, 0.0);
        let result = schedule(&card, Rating::Again, Some(5.0), &params);
        assert!(result.card.stability.unwrap() >= MEMORY_FLOOR);
        assert!(result.card.difficulty.unwrap() >= DIFFICULTY_MIN);
        assert!(result.interval_days.is_finite());
    }

    #[test]
    fn test_retrievability_decay() {
        let r_0 = retrievability(10.0, 0.0);
        let r_5 = retrievability(10.0, 5.0);
        let r_10 = retrievability(10.0, 10.0);
        assert!(r_0 > r_5);
        assert!(r_5 > r_10);
        assert!((r_0 - 1.0).abs() < 0.001);
        assert!((r_10 - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_interval_matches_stability_at_ninety_percent() {
        let params = SchedulerParams::default();
        assert!((next_interval(12.0, &params) - 12.0).abs() < 1e-9);
        assert_eq!(next_interval(0.01, &params), params.minimum_interval_days);
        assert_eq!(next_interval(1e9, &params), params.maximum_interval_days);
    }
}
