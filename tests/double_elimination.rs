//! Integration tests for double elimination: losers-bracket routing and the grand finals reset.

use bracket_engine::{
    create_bracket, report_result, Bracket, BracketEvent, BracketStatus, BracketType, GameMatch,
    MatchStatus, Participant, ParticipantId, SeedingMethod, Stage,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn bracket_with_participants(n: usize) -> Bracket {
    let roster: Vec<Participant> = (1..=n).map(|i| Participant::new(format!("P{i}"))).collect();
    create_bracket(
        roster,
        BracketType::DoubleElimination,
        &SeedingMethod::RegistrationOrder,
        false,
    )
    .unwrap()
}

fn seed_of(b: &Bracket, id: Option<ParticipantId>) -> Option<u32> {
    id.and_then(|id| b.get_participant(id)).map(|p| p.seed)
}

fn stage_matches(b: &Bracket, stage: Stage) -> Vec<GameMatch> {
    b.matches.iter().filter(|m| m.stage == stage).cloned().collect()
}

/// Play every open match, letting `pick` choose the winner's seed from the two seeds.
fn play_out(b: &mut Bracket, pick: impl Fn(&GameMatch, u32, u32) -> u32) -> Vec<BracketEvent> {
    let mut events = Vec::new();
    for _ in 0..b.matches.len() {
        let Some(m) = b
            .matches
            .iter()
            .find(|m| m.status == MatchStatus::Ready)
            .cloned()
        else {
            break;
        };
        let (s1, s2) = (seed_of(b, m.slot_1).unwrap(), seed_of(b, m.slot_2).unwrap());
        let winner_seed = pick(&m, s1, s2);
        let winner = b.participant_by_seed(winner_seed).unwrap().id;
        events.extend(report_result(b, m.id, winner, None, None).unwrap().events);
    }
    events
}

/// Report a random READY match with a random winner until nothing is left to play.
fn play_randomly(b: &mut Bracket, rng: &mut StdRng) -> Vec<BracketEvent> {
    let mut events = Vec::new();
    for _ in 0..b.matches.len() {
        let ready: Vec<_> = b
            .matches
            .iter()
            .filter(|m| m.status == MatchStatus::Ready)
            .map(|m| (m.id, m.slot_1.unwrap(), m.slot_2.unwrap()))
            .collect();
        let Some(&(match_id, one, two)) = ready.choose(rng) else {
            break;
        };
        let winner = if rng.gen_bool(0.5) { one } else { two };
        events.extend(report_result(b, match_id, winner, None, None).unwrap().events);
    }
    events
}

fn better_seed(_: &GameMatch, s1: u32, s2: u32) -> u32 {
    s1.min(s2)
}

fn losses_by_seed(b: &Bracket) -> Vec<u32> {
    b.participants.iter().map(|p| p.losses).collect()
}

#[test]
fn four_participant_layout() {
    let b = bracket_with_participants(4);
    assert_eq!(b.winners_rounds, 2);
    assert_eq!(b.losers_rounds, 2);
    assert_eq!(b.round_count, 5);
    assert_eq!(b.matches.len(), 7);

    assert_eq!(stage_matches(&b, Stage::Winners).len(), 3);
    let losers = stage_matches(&b, Stage::Losers);
    assert_eq!(losers.iter().map(|m| m.round).collect::<Vec<_>>(), vec![3, 4]);
    let grand_final = &stage_matches(&b, Stage::GrandFinal)[0];
    let reset = &stage_matches(&b, Stage::GrandFinalReset)[0];
    assert_eq!((grand_final.round, reset.round), (5, 5));
    assert_eq!(reset.status, MatchStatus::Pending);
    assert_eq!(reset.pending_feeders, 0);

    let winners_final = b.round_matches(2).next().unwrap();
    assert_eq!(winners_final.next_match, Some(grand_final.id));
    assert_eq!(winners_final.loser_next_match, Some(losers[1].id));
    assert_eq!(losers[0].next_match, Some(losers[1].id));
    assert_eq!(losers[1].next_match, Some(grand_final.id));
}

#[test]
fn winners_bracket_loser_drops_into_losers_bracket() {
    let mut b = bracket_with_participants(4);
    let first = b.round_matches(1).next().unwrap().clone();
    assert_eq!(seed_of(&b, first.slot_2), Some(4));
    let one = b.participant_by_seed(1).unwrap().id;

    let report = report_result(&mut b, first.id, one, None, None).unwrap();
    let losers_first = b.get_match(first.loser_next_match.unwrap()).unwrap();
    assert_eq!(losers_first.stage, Stage::Losers);
    assert_eq!(losers_first.round, 3);
    assert_eq!(seed_of(&b, losers_first.slot_1), Some(4));
    assert_eq!(losers_first.status, MatchStatus::Pending);
    assert!(report.events.contains(&BracketEvent::ParticipantAdvanced {
        match_id: losers_first.id,
        participant_id: b.participant_by_seed(4).unwrap().id,
    }));

    let four = b.participant_by_seed(4).unwrap();
    assert_eq!(four.losses, 1);
    assert_eq!(four.placement, None);
}

#[test]
fn undefeated_champion_skips_the_reset() {
    let mut b = bracket_with_participants(4);
    let events = play_out(&mut b, better_seed);

    assert_eq!(b.status, BracketStatus::Completed);
    assert_eq!(b.champion().unwrap().seed, 1);
    assert_eq!(losses_by_seed(&b), vec![0, 2, 2, 2]);
    let placements: Vec<Option<u32>> = b.participants.iter().map(|p| p.placement).collect();
    assert_eq!(placements, vec![Some(1), Some(2), Some(3), Some(4)]);

    let reset = &stage_matches(&b, Stage::GrandFinalReset)[0];
    assert_eq!(reset.status, MatchStatus::Bye);
    assert!(events.contains(&BracketEvent::MatchSkipped { match_id: reset.id }));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, BracketEvent::BracketCompleted { .. }))
            .count(),
        1
    );
}

#[test]
fn losers_champion_forces_a_reset() {
    let mut b = bracket_with_participants(4);
    let reset_id = stage_matches(&b, Stage::GrandFinalReset)[0].id;

    // Seed 2 comes back through the losers bracket and wins both grand finals.
    let events = play_out(&mut b, |m, s1, s2| match m.stage {
        Stage::GrandFinal | Stage::GrandFinalReset => 2,
        _ => s1.min(s2),
    });

    assert!(events.contains(&BracketEvent::BracketReset { match_id: reset_id }));
    let reset = b.get_match(reset_id).unwrap();
    assert_eq!(reset.status, MatchStatus::Completed);
    assert_eq!(seed_of(&b, reset.winner), Some(2));

    assert_eq!(b.status, BracketStatus::Completed);
    assert_eq!(b.champion().unwrap().seed, 2);
    assert_eq!(losses_by_seed(&b), vec![2, 1, 2, 2]);
    assert_eq!(b.participant_by_seed(1).unwrap().placement, Some(2));
}

#[test]
fn bracket_stays_open_until_the_reset_is_played() {
    let mut b = bracket_with_participants(4);
    for _ in 0..b.matches.len() {
        let Some(m) = b
            .matches
            .iter()
            .find(|m| m.status == MatchStatus::Ready && m.stage != Stage::GrandFinalReset)
            .cloned()
        else {
            break;
        };
        let (s1, s2) = (seed_of(&b, m.slot_1).unwrap(), seed_of(&b, m.slot_2).unwrap());
        let winner_seed = if m.stage == Stage::GrandFinal { 2 } else { s1.min(s2) };
        let winner = b.participant_by_seed(winner_seed).unwrap().id;
        let report = report_result(&mut b, m.id, winner, None, None).unwrap();
        assert!(!report.bracket_completed);
    }

    assert_eq!(b.status, BracketStatus::InProgress);
    assert!(b.completed_at.is_none());
    let reset = &stage_matches(&b, Stage::GrandFinalReset)[0];
    assert_eq!(reset.status, MatchStatus::Ready);
    let grand_final = &stage_matches(&b, Stage::GrandFinal)[0];
    assert_eq!(seed_of(&b, reset.slot_1), seed_of(&b, grand_final.slot_1));
    assert_eq!(b.participants.iter().filter(|p| p.placement.is_none()).count(), 2);
    assert_eq!(b.current_round, 5);
}

#[test]
fn two_participants_meet_again_in_grand_finals() {
    let mut b = bracket_with_participants(2);
    assert_eq!(b.matches.len(), 3);
    assert_eq!(b.losers_rounds, 0);

    let first = b.round_matches(1).next().unwrap().clone();
    let one = b.participant_by_seed(1).unwrap().id;
    report_result(&mut b, first.id, one, None, None).unwrap();

    let grand_final = b.get_match(first.next_match.unwrap()).unwrap();
    assert_eq!(first.loser_next_match, first.next_match);
    assert_eq!(grand_final.status, MatchStatus::Ready);
    assert_eq!(seed_of(&b, grand_final.slot_1), Some(1));
    assert_eq!(seed_of(&b, grand_final.slot_2), Some(2));

    play_out(&mut b, better_seed);
    assert_eq!(b.status, BracketStatus::Completed);
    assert_eq!(losses_by_seed(&b), vec![0, 2]);
}

#[test]
fn byes_flow_through_the_losers_bracket() {
    let mut b = bracket_with_participants(5);
    assert_eq!(b.matches.len(), 15);

    // Top seeds had no opponent, so their losers-bracket slots stay empty.
    let losers = stage_matches(&b, Stage::Losers);
    let empty_bye = losers
        .iter()
        .find(|m| m.status == MatchStatus::Bye)
        .expect("one first-round losers match has no feeders with a loser");
    assert_eq!(empty_bye.winner, None);

    play_out(&mut b, better_seed);
    assert_eq!(b.status, BracketStatus::Completed);
    assert_eq!(b.champion().unwrap().seed, 1);
    assert_eq!(losses_by_seed(&b), vec![0, 2, 2, 2, 2]);
    let placements: Vec<Option<u32>> = b.participants.iter().map(|p| p.placement).collect();
    assert_eq!(placements, vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);
}

#[test]
fn eight_participants_play_to_completion() {
    let mut b = bracket_with_participants(8);
    assert_eq!(b.matches.len(), 15);
    let sizes: Vec<usize> = (4..=7).map(|r| b.round_matches(r).count()).collect();
    assert_eq!(sizes, vec![2, 2, 1, 1]);

    play_out(&mut b, better_seed);
    assert_eq!(b.status, BracketStatus::Completed);
    assert!(stage_matches(&b, Stage::Losers)
        .iter()
        .all(|m| m.status == MatchStatus::Completed));
    for p in &b.participants {
        let expected = if p.seed == 1 { 0 } else { 2 };
        assert_eq!(p.losses, expected, "seed {}", p.seed);
        assert!(p.placement.is_some());
    }
}

#[test]
fn second_round_drops_are_reversed() {
    let b = bracket_with_participants(8);
    let drops: Vec<GameMatch> = b.round_matches(5).cloned().collect();
    assert!(drops.iter().all(|m| m.stage == Stage::Losers));
    let size = drops.len();
    assert_eq!(size, 2);
    for (j, m) in b.round_matches(2).enumerate() {
        assert_eq!(m.loser_next_match, Some(drops[size - 1 - j].id));
    }

    // Third-round drops keep their order.
    let finals_drop = b.round_matches(7).next().unwrap();
    let winners_final = b.round_matches(3).next().unwrap();
    assert_eq!(winners_final.loser_next_match, Some(finals_drop.id));
}

#[test]
fn third_place_flag_is_ignored() {
    let roster: Vec<Participant> = (1..=8).map(|i| Participant::new(format!("P{i}"))).collect();
    let b = create_bracket(
        roster,
        BracketType::DoubleElimination,
        &SeedingMethod::RegistrationOrder,
        true,
    )
    .unwrap();
    assert!(!b.third_place_match);
    assert!(b.matches.iter().all(|m| !m.is_third_place()));
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

    #[test]
    fn random_results_in_any_order_finish_the_bracket(n in 2usize..=64, seed in any::<u64>()) {
        let mut b = bracket_with_participants(n);
        let mut rng = StdRng::seed_from_u64(seed);
        let events = play_randomly(&mut b, &mut rng);

        prop_assert_eq!(b.status, BracketStatus::Completed);
        prop_assert!(b.completed_at.is_some());
        prop_assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, BracketEvent::BracketCompleted { .. }))
                .count(),
            1
        );
        prop_assert!(b.matches.iter().all(|m| m.status.is_terminal()));

        let champion = b.champion().unwrap().id;
        for p in &b.participants {
            prop_assert!(p.placement.is_some(), "seed {} has no placement", p.seed);
            if p.id == champion {
                prop_assert!(p.losses <= 1);
            } else {
                prop_assert_eq!(p.losses, 2, "seed {}", p.seed);
            }
        }
    }
}
