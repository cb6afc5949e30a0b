use battleship_server::{
    take_automated_turn, AiPlayer, CellState, Game, Phase, Player, Side, BOMBING_THRESHOLD,
    BOARD_SIZE,
};
use proptest::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};

fn resolved(game: &Game, side: Side) -> usize {
    let snap = game.snapshot(side, false);
    snap.count(CellState::Hit) + snap.count(CellState::Miss)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Every automated turn resolves at least one new cell on the opponent's
    /// board, never touches the actor's own board, and leaves no bombing
    /// pending.
    #[test]
    fn automated_turns_keep_invariants(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut players = [AiPlayer::new(), AiPlayer::new()];
        let mut game = Game::new();
        for side in Side::ALL {
            players[side.index()].place_ships(&mut rng, &mut game, side).unwrap();
        }

        while !game.is_game_over() {
            let side = game.turn();
            let enemy = side.opponent();
            let own_before = *game.board(side);
            let enemy_before = resolved(&game, enemy);
            let remaining_before = game.board(enemy).remaining_ship_cells();

            let turn = take_automated_turn(&mut players[side.index()], &mut game, side, &mut rng).unwrap();

            prop_assert_eq!(*game.board(side), own_before);
            prop_assert!(resolved(&game, enemy) > enemy_before);
            prop_assert!(game.board(enemy).remaining_ship_cells() <= remaining_before);
            prop_assert!(!game.bombing_unlocked(side));
            prop_assert!(game.hit_count(side) < BOMBING_THRESHOLD);
            prop_assert_eq!(turn.attack.side, side);
            if !game.is_game_over() {
                prop_assert_eq!(game.turn(), enemy);
            }
        }

        match game.phase() {
            Phase::GameOver { winner, .. } => {
                prop_assert!(game.board(winner.opponent()).is_defeated());
            }
            other => prop_assert!(false, "unexpected phase {:?}", other),
        }
        prop_assert!(resolved(&game, Side::Human) <= BOARD_SIZE * BOARD_SIZE);
    }
}
