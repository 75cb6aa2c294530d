use super::*;
use proptest::prelude::*;

fn starter_board(seed: u64) -> Board {
    Board::with_starting_elements(ChaCha8Rng::seed_from_u64(seed))
}

fn assert_no_overlap(board: &Board, placed: &Element) {
    for other in board.elements() {
        if other.name == placed.name {
            continue;
        }
        assert!(
            (other.x - placed.x).abs() >= CARD_SIZE || (other.y - placed.y).abs() >= CARD_SIZE,
            "{} at ({}, {}) overlaps {} at ({}, {})",
            placed.name,
            placed.x,
            placed.y,
            other.name,
            other.x,
            other.y
        );
    }
}

#[test]
fn starting_board_has_four_elements() {
    let board = starter_board(1);
    let names: Vec<_> = board.elements().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Fire", "Water", "Earth", "Air"]);
    assert_eq!(board.get("Earth").map(|e| (e.x, e.y)), Some((1000.0, 250.0)));
    assert_eq!(board.rev(), 4);
}

#[test]
fn collision_needs_both_axes_close() {
    let a = Position { x: 0.0, y: 0.0 };
    assert!(collides(a, Position { x: 127.9, y: 127.9 }));
    assert!(!collides(a, Position { x: 128.0, y: 0.0 }));
    assert!(!collides(a, Position { x: 0.0, y: -128.0 }));
    assert!(!collides(a, Position { x: 500.0, y: 10.0 }));
}

#[test]
fn steam_lands_clear_of_starting_elements() {
    let mut board = starter_board(7);
    let steam = board
        .place_if_new(Candidate::new("Steam", "♨️"), BoardSize::default())
        .expect("placed");
    assert_eq!(steam.name, "Steam");
    assert_no_overlap(&board, &steam);
    assert_eq!(board.len(), 5);
    assert_eq!(board.elements().last(), Some(&steam));
}

#[test]
fn existing_name_is_a_noop() {
    let mut board = starter_board(3);
    let before = board.elements().to_vec();
    let placed = board.place_if_new(Candidate::new("Fire", "🔥"), BoardSize::default());
    assert!(placed.is_none());
    assert_eq!(board.elements(), before.as_slice());
}

#[test]
fn same_novel_name_twice_inserts_once() {
    let mut board = starter_board(11);
    let size = BoardSize::default();
    assert!(board.place_if_new(Candidate::new("Mud", "🟫"), size).is_some());
    assert_eq!(
        board.try_place(Candidate::new("Mud", "🟫"), size),
        PlaceOutcome::Duplicate
    );
    assert_eq!(board.elements().iter().filter(|e| e.name == "Mud").count(), 1);
}

#[test]
fn names_are_case_sensitive() {
    let mut board = starter_board(5);
    assert!(board
        .place_if_new(Candidate::new("fire", "🔥"), BoardSize::default())
        .is_some());
    assert!(board.contains("fire") && board.contains("Fire"));
}

#[test]
fn full_board_gives_up_after_attempt_budget() {
    // A board exactly one card wide pins every sample to the origin.
    let size = BoardSize {
        width: CARD_SIZE,
        height: CARD_SIZE,
    };
    let mut board = Board::with_seed(9);
    assert!(board.place_if_new(Candidate::new("Stone", "🪨"), size).is_some());
    assert_eq!(board.get("Stone").map(|e| (e.x, e.y)), Some((0.0, 0.0)));

    assert_eq!(
        board.try_place(Candidate::new("Sand", "⏳"), size),
        PlaceOutcome::NoRoom {
            attempts: MAX_PLACEMENT_ATTEMPTS
        }
    );
    assert!(!board.contains("Sand"));
    assert_eq!(board.len(), 1);
}

#[test]
fn failed_placement_leaves_name_free_for_later() {
    let tiny = BoardSize {
        width: CARD_SIZE,
        height: CARD_SIZE,
    };
    let mut board = Board::with_seed(2);
    board.place_if_new(Candidate::new("Stone", "🪨"), tiny);
    assert!(board.place_if_new(Candidate::new("Sand", "⏳"), tiny).is_none());
    let roomy = BoardSize::measured(Some(2000.0), Some(2000.0));
    assert!(board
        .place_if_new(Candidate::new("Sand", "⏳"), roomy)
        .is_some());
}

#[test]
fn undersized_board_does_not_panic() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let size = BoardSize {
        width: 40.0,
        height: 1000.0,
    };
    let pos = find_available_position(&[], size, &mut rng).expect("empty board");
    assert_eq!(pos.x, 0.0);
    assert!(pos.y >= 0.0 && pos.y < 1000.0 - CARD_SIZE);
}

#[test]
fn measured_size_falls_back_per_axis() {
    assert_eq!(
        BoardSize::measured(Some(800.0), None),
        BoardSize {
            width: 800.0,
            height: DEFAULT_BOARD_HEIGHT
        }
    );
    assert_eq!(BoardSize::measured(Some(0.0), Some(f64::NAN)), BoardSize::default());
    assert_eq!(BoardSize::measured(Some(-5.0), Some(300.0)).height, 300.0);
}

#[test]
fn seeded_boards_place_identically() {
    let mut a = starter_board(42);
    let mut b = starter_board(42);
    let size = BoardSize::measured(Some(1400.0), Some(700.0));
    for name in ["Steam", "Mud", "Dust", "Lava"] {
        assert_eq!(
            a.place_if_new(Candidate::new(name, "?"), size),
            b.place_if_new(Candidate::new(name, "?"), size)
        );
    }
}

#[test]
fn element_serializes_flat() {
    let e = Element {
        name: "Steam".into(),
        emoji: "♨️".into(),
        x: 1.5,
        y: 2.0,
    };
    let v = serde_json::to_value(&e).unwrap();
    assert_eq!(v, serde_json::json!({"name": "Steam", "emoji": "♨️", "x": 1.5, "y": 2.0}));
}

proptest! {
    #[test]
    fn placed_cards_never_overlap(
        seed in any::<u64>(),
        names in proptest::collection::vec("[a-z]{1,6}", 1..40),
        width in 200.0f64..2000.0,
        height in 200.0f64..1200.0,
    ) {
        let mut board = starter_board(seed);
        let size = BoardSize { width, height };
        for name in names {
            if let Some(placed) = board.place_if_new(Candidate::new(name, "✨"), size) {
                prop_assert!(placed.x >= 0.0 && placed.y >= 0.0);
                assert_no_overlap(&board, &placed);
            }
        }
    }

    #[test]
    fn at_most_one_element_per_name(
        seed in any::<u64>(),
        names in proptest::collection::vec(
            prop_oneof!["Steam", "Mud", "Fire", "Lava", "Dust"],
            1..60,
        ),
    ) {
        let mut board = starter_board(seed);
        let size = BoardSize::measured(Some(3000.0), Some(3000.0));
        for name in names {
            board.place_if_new(Candidate::new(name, "✨"), size);
        }
        let mut seen = std::collections::HashSet::new();
        for e in board.elements() {
            prop_assert!(seen.insert(e.name.clone()), "duplicate {}", e.name);
        }
    }

    #[test]
    fn search_never_exceeds_budget(
        seed in any::<u64>(),
        width in 0.0f64..600.0,
        height in 0.0f64..600.0,
    ) {
        let board = starter_board(seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let placed: Vec<Element> = (0..6)
            .map(|i| Element {
                name: format!("e{i}"),
                emoji: String::new(),
                x: i as f64 * 60.0,
                y: 0.0,
            })
            .chain(board.elements().iter().cloned())
            .collect();
        let search = search_position(&placed, BoardSize { width, height }, &mut rng);
        prop_assert!(search.attempts >= 1 && search.attempts <= MAX_PLACEMENT_ATTEMPTS);
    }
}
