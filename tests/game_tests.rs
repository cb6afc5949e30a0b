use battleship_server::{
    AttackOutcome, BoardError, Coord, Ending, Game, GameError, Line, Orientation, Phase,
    PlacementProgress, Side, TurnEvent, BOMBING_THRESHOLD, FLEET,
};

const SHORT_FLEET: [usize; 1] = [2];
const LONG_FLEET: [usize; 1] = [5];
const TWIN_FLEET: [usize; 2] = [5, 5];

fn at(row: usize, col: usize) -> Coord {
    Coord::new(row, col)
}

/// Game in progress where each side has a single ship placed along row
/// `row` of its own board, starting at column 0.
fn started(fleet: &'static [usize], human_row: usize, ai_row: usize) -> Game {
    let mut game = Game::with_fleet(fleet);
    game.place_ship(Side::Human, at(human_row, 0), Orientation::Horizontal)
        .unwrap();
    game.place_ship(Side::Ai, at(ai_row, 0), Orientation::Horizontal)
        .unwrap();
    assert_eq!(game.phase(), Phase::InProgress);
    game
}

#[test]
fn test_setup_until_both_fleets_are_down() {
    let mut game = Game::new();
    assert_eq!(game.phase(), Phase::Setup);
    assert_eq!(game.next_ship_length(Side::Human), Some(FLEET[0]));

    for (row, _) in FLEET.iter().enumerate() {
        game.place_ship(Side::Human, at(row, 0), Orientation::Horizontal)
            .unwrap();
    }
    assert_eq!(game.next_ship_length(Side::Human), None);
    assert_eq!(game.phase(), Phase::Setup);

    assert_eq!(
        game.place_ship(Side::Human, at(8, 0), Orientation::Horizontal)
            .unwrap_err(),
        GameError::InvalidPlacement(BoardError::FleetComplete)
    );

    let progress = (0..FLEET.len())
        .map(|col| {
            game.place_ship(Side::Ai, at(0, col * 2), Orientation::Vertical)
                .unwrap()
        })
        .last();
    assert_eq!(progress, Some(PlacementProgress::Complete));
    assert_eq!(game.phase(), Phase::InProgress);
    assert_eq!(game.turn(), Side::Human);

    assert_eq!(
        game.place_ship(Side::Ai, at(9, 0), Orientation::Horizontal)
            .unwrap_err(),
        GameError::WrongPhase
    );
}

#[test]
fn test_failed_placement_keeps_the_same_ship() {
    let mut game = Game::new();
    game.place_ship(Side::Human, at(0, 0), Orientation::Horizontal)
        .unwrap();
    let err = game
        .place_ship(Side::Human, at(0, 1), Orientation::Vertical)
        .unwrap_err();
    assert_eq!(err, GameError::InvalidPlacement(BoardError::ShipOverlaps));
    assert_eq!(game.next_ship_length(Side::Human), Some(3));
}

#[test]
fn test_no_attacks_during_setup() {
    let mut game = Game::new();
    assert_eq!(
        game.attack(Side::Human, at(0, 0)).unwrap_err(),
        GameError::WrongPhase
    );
    assert!(!game.is_game_over());
}

#[test]
fn test_turns_alternate() {
    let mut game = started(&SHORT_FLEET, 9, 0);
    assert_eq!(
        game.attack(Side::Ai, at(0, 0)).unwrap_err(),
        GameError::NotYourTurn
    );

    let report = game.attack(Side::Human, at(5, 5)).unwrap();
    assert_eq!(report.outcome, AttackOutcome::Miss);
    assert_eq!(report.event, None);
    assert_eq!(game.turn(), Side::Ai);

    assert_eq!(
        game.attack(Side::Human, at(5, 6)).unwrap_err(),
        GameError::NotYourTurn
    );
    game.attack(Side::Ai, at(5, 5)).unwrap();
    assert_eq!(game.turn(), Side::Human);
}

#[test]
fn test_invalid_target_keeps_the_turn() {
    let mut game = started(&SHORT_FLEET, 9, 0);
    assert_eq!(
        game.attack(Side::Human, at(10, 0)).unwrap_err(),
        GameError::InvalidTarget(BoardError::InvalidCoordinate { row: 10, col: 0 })
    );
    assert_eq!(game.turn(), Side::Human);

    game.attack(Side::Human, at(4, 4)).unwrap();
    game.attack(Side::Ai, at(4, 4)).unwrap();
    assert_eq!(
        game.attack(Side::Human, at(4, 4)).unwrap_err(),
        GameError::InvalidTarget(BoardError::AlreadyTargeted { row: 4, col: 4 })
    );
    assert_eq!(game.turn(), Side::Human);
}

#[test]
fn test_sinking_the_last_ship_ends_the_game() {
    let mut game = started(&SHORT_FLEET, 9, 0);
    game.attack(Side::Human, at(0, 0)).unwrap();
    game.attack(Side::Ai, at(0, 0)).unwrap();
    let report = game.attack(Side::Human, at(0, 1)).unwrap();

    assert_eq!(report.hit_count, 2);
    assert_eq!(
        report.event,
        Some(TurnEvent::GameOver {
            winner: Side::Human
        })
    );
    assert_eq!(
        game.phase(),
        Phase::GameOver {
            winner: Side::Human,
            ending: Ending::FleetDestroyed
        }
    );
    assert!(game.is_game_over());
    assert_eq!(game.winner(), Some(Side::Human));
    assert!(game.board(Side::Ai).is_defeated());

    assert_eq!(
        game.attack(Side::Ai, at(1, 1)).unwrap_err(),
        GameError::WrongPhase
    );
}

#[test]
fn test_automated_side_can_win() {
    let mut game = started(&SHORT_FLEET, 9, 0);
    game.attack(Side::Human, at(5, 5)).unwrap();
    game.attack(Side::Ai, at(9, 0)).unwrap();
    game.attack(Side::Human, at(5, 6)).unwrap();
    game.attack(Side::Ai, at(9, 1)).unwrap();
    assert_eq!(game.winner(), Some(Side::Ai));
}

/// Human lands three hits on a 5-cell ship at A1..A5 while the Ai misses.
fn unlock_bombing() -> Game {
    let mut game = started(&LONG_FLEET, 9, 0);
    for (i, col) in (0..3).enumerate() {
        let report = game.attack(Side::Human, at(0, col)).unwrap();
        assert_eq!(report.outcome, AttackOutcome::Hit);
        if i < 2 {
            assert_eq!(report.event, None);
            game.attack(Side::Ai, at(5, col)).unwrap();
        } else {
            assert_eq!(report.hit_count, BOMBING_THRESHOLD);
            assert_eq!(report.event, Some(TurnEvent::BombingUnlocked));
        }
    }
    game
}

#[test]
fn test_third_hit_unlocks_bombing() {
    let mut game = unlock_bombing();
    assert!(game.bombing_unlocked(Side::Human));
    assert_eq!(game.turn(), Side::Human);
    assert_eq!(
        game.attack(Side::Human, at(7, 7)).unwrap_err(),
        GameError::BombingPending
    );
    assert_eq!(
        game.bomb(Side::Ai, Line::Row(9)).unwrap_err(),
        GameError::NotYourTurn
    );
}

#[test]
fn test_bombing_a_row_resets_the_counter() {
    let mut game = unlock_bombing();
    let report = game.bomb(Side::Human, Line::Column(9)).unwrap();
    assert_eq!((report.hits, report.misses), (0, 10));
    assert_eq!(report.event, None);
    assert_eq!(game.hit_count(Side::Human), 0);
    assert!(!game.bombing_unlocked(Side::Human));
    assert_eq!(game.turn(), Side::Ai);

    // The unlock is spent.
    game.attack(Side::Ai, at(6, 6)).unwrap();
    assert_eq!(
        game.bomb(Side::Human, Line::Row(0)).unwrap_err(),
        GameError::BombingNotUnlocked
    );
}

#[test]
fn test_bombing_unlocks_again_after_three_more_hits() {
    let mut game = Game::with_fleet(&TWIN_FLEET);
    for row in 0..2 {
        game.place_ship(Side::Human, at(8 + row, 0), Orientation::Horizontal)
            .unwrap();
        game.place_ship(Side::Ai, at(row, 0), Orientation::Horizontal)
            .unwrap();
    }
    assert_eq!(game.phase(), Phase::InProgress);

    let mut ai_targets = (0..10).map(|col| at(5, col));
    let mut unlocks = 0;
    for (row, bomb_col) in [(0, 9), (1, 8)] {
        for col in 0..3 {
            let report = game.attack(Side::Human, at(row, col)).unwrap();
            assert_eq!(report.outcome, AttackOutcome::Hit);
            assert_eq!(report.hit_count, col as u8 + 1);
            if col < 2 {
                assert_eq!(report.event, None);
                game.attack(Side::Ai, ai_targets.next().unwrap()).unwrap();
            } else {
                assert_eq!(report.event, Some(TurnEvent::BombingUnlocked));
                unlocks += 1;
            }
        }
        let bombed = game.bomb(Side::Human, Line::Column(bomb_col)).unwrap();
        assert_eq!(bombed.hits, 0);
        assert_eq!(game.hit_count(Side::Human), 0);
        assert!(!game.bombing_unlocked(Side::Human));
        game.attack(Side::Ai, ai_targets.next().unwrap()).unwrap();
    }
    assert_eq!(unlocks, 2);
    assert_eq!(game.phase(), Phase::InProgress);
}

#[test]
fn test_bombing_can_win_the_game() {
    let mut game = unlock_bombing();
    let report = game.bomb(Side::Human, Line::Row(0)).unwrap();
    assert_eq!((report.hits, report.misses), (2, 5));
    assert_eq!(
        report.event,
        Some(TurnEvent::GameOver {
            winner: Side::Human
        })
    );
    assert_eq!(game.winner(), Some(Side::Human));
}

#[test]
fn test_bombing_out_of_bounds_keeps_the_unlock() {
    let mut game = unlock_bombing();
    assert_eq!(
        game.bomb(Side::Human, Line::Row(10)).unwrap_err(),
        GameError::InvalidTarget(BoardError::InvalidCoordinate { row: 10, col: 0 })
    );
    assert!(game.bombing_unlocked(Side::Human));
    assert_eq!(game.hit_count(Side::Human), BOMBING_THRESHOLD);
}

#[test]
fn test_declining_bombing_passes_the_turn() {
    let mut game = unlock_bombing();
    game.decline_bombing(Side::Human).unwrap();
    assert_eq!(game.hit_count(Side::Human), 0);
    assert!(!game.bombing_unlocked(Side::Human));
    assert_eq!(game.turn(), Side::Ai);
    assert_eq!(
        game.decline_bombing(Side::Ai).unwrap_err(),
        GameError::BombingNotUnlocked
    );
}

#[test]
fn test_forfeit() {
    let mut game = Game::new();
    assert_eq!(game.forfeit(Side::Human), Ok(Side::Ai));
    assert_eq!(
        game.phase(),
        Phase::GameOver {
            winner: Side::Ai,
            ending: Ending::Forfeit
        }
    );
    assert_eq!(game.forfeit(Side::Ai), Err(GameError::WrongPhase));
}

#[test]
fn test_hidden_snapshot_of_the_enemy() {
    let mut game = started(&LONG_FLEET, 9, 0);
    game.attack(Side::Human, at(0, 2)).unwrap();
    let enemy = game.snapshot(Side::Ai, true);
    assert_eq!(enemy.to_string().lines().next(), Some("- - X - - - - - - -"));
    let own = game.snapshot(Side::Ai, false);
    assert_eq!(own.to_string().lines().next(), Some("S S X S S - - - - -"));
}
