use guardbot::selfplay::{generate_games, read_jsonl, write_jsonl, SelfPlayParams, Termination};
use guardbot::{EngineError, Position, Selection, SelectorConfig};
use pretty_assertions::assert_eq;

fn params(seed: u64) -> SelfPlayParams {
    SelfPlayParams { games: 3, max_plies: 24, seed, selector: SelectorConfig::default(), openings_path: None }
}

#[test]
fn selfplay_generates_games_deterministically() {
    let p = params(42);
    let g1 = generate_games(&p).unwrap();
    let g2 = generate_games(&p).unwrap();
    assert_eq!(g1.len(), 3);
    assert_eq!(g1, g2);
    for (i, g) in g1.iter().enumerate() {
        assert_eq!(g.index, i);
        // Every recorded move replays legally from the start position.
        let pos = Position::set_from_fen_and_moves(&g.start_fen, &g.moves).unwrap();
        match g.termination {
            Termination::MaxPlies => assert_eq!(g.moves.len(), 24),
            Termination::Checkmate => assert!(pos.is_checkmate()),
            Termination::Stalemate => assert!(pos.is_stalemate()),
            Termination::FiftyMoves => assert!(pos.is_fifty_move_draw()),
        }
    }
}

#[test]
fn thread_count_does_not_change_games() {
    let p = params(7);
    let one = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let four = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    let a = one.install(|| generate_games(&p)).unwrap();
    let b = four.install(|| generate_games(&p)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn random_selection_depends_on_seed() {
    let random = |seed| SelfPlayParams {
        selector: SelectorConfig { selection: Selection::Random, ..SelectorConfig::default() },
        ..params(seed)
    };
    let a = generate_games(&random(1)).unwrap();
    let b = generate_games(&random(2)).unwrap();
    assert_ne!(a.iter().map(|g| &g.moves).collect::<Vec<_>>(), b.iter().map(|g| &g.moves).collect::<Vec<_>>());
}

#[test]
fn openings_file_seeds_start_positions() {
    let dir = std::path::Path::new("target/selfplay_test");
    std::fs::create_dir_all(dir).unwrap();
    let openings = dir.join("openings.epd");
    std::fs::write(&openings, "# comment\nr3k2r/8/8/8/8/8/8/R3K2R w KQkq -\n").unwrap();
    let p = SelfPlayParams { games: 2, max_plies: 6, openings_path: Some(openings), ..params(5) };
    let games = generate_games(&p).unwrap();
    for g in &games {
        assert_eq!(g.start_fen, "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        Position::set_from_fen_and_moves(&g.start_fen, &g.moves).unwrap();
    }
}

#[test]
fn jsonl_round_trip() {
    let games = generate_games(&SelfPlayParams { games: 2, max_plies: 8, ..params(123) }).unwrap();
    let path = std::path::Path::new("target/selfplay_test/games.jsonl");
    write_jsonl(&games, path).unwrap();
    let back = read_jsonl(path).unwrap();
    assert_eq!(back, games);
}

#[test]
fn missing_openings_file_is_an_error() {
    let p = SelfPlayParams { openings_path: Some("target/selfplay_test/no_such_openings.epd".into()), ..params(5) };
    assert!(matches!(generate_games(&p), Err(EngineError::Openings { .. })));
}

#[test]
fn unparsable_opening_lines_are_skipped() {
    let dir = std::path::Path::new("target/selfplay_test");
    std::fs::create_dir_all(dir).unwrap();
    let openings = dir.join("mixed_openings.epd");
    std::fs::write(&openings, "not a fen at all\n4k3/8/8/8/8/8/8/R3K3 w Q -\n").unwrap();
    let p = SelfPlayParams { games: 2, max_plies: 4, openings_path: Some(openings), ..params(9) };
    for g in generate_games(&p).unwrap() {
        assert_eq!(g.start_fen, "4k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
    }
}
