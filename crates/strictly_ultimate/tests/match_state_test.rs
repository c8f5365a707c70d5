//! Match scenarios driven purely through the rules crate.
//!
//! A small local harness stands in for the board engines: it owns the nine
//! mini grids and the meta grid and feeds the match state exactly the events
//! an engine would report. Every sequence below is a legal match from the
//! first move, so routing is exercised at each step.

use strictly_ultimate::{
    ActiveBoard, Cell, Grid, Mark, MatchError, MatchState, MetaCell, MoveEvent, Outcome, Position,
    evaluate,
};

/// X takes board 0 with cells 0,1,2 while O answers 3,4 on it.
const ROW_WIN_ON_BOARD_0: [(usize, usize); 11] = [
    (0, 0),
    (0, 3),
    (3, 4),
    (4, 0),
    (0, 1),
    (1, 5),
    (5, 0),
    (0, 4),
    (4, 6),
    (6, 0),
    (0, 2),
];

/// Board 4 fills as X O X / X O O / O X X without a line.
const DRAW_ON_BOARD_4: [(usize, usize); 23] = [
    (4, 0),
    (0, 1),
    (1, 4),
    (4, 1),
    (1, 2),
    (2, 4),
    (4, 2),
    (2, 0),
    (0, 4),
    (4, 4),
    (4, 3),
    (3, 5),
    (5, 4),
    (4, 5),
    (5, 6),
    (6, 4),
    (4, 7),
    (7, 3),
    (3, 4),
    (4, 6),
    (6, 8),
    (8, 4),
    (4, 8),
];

/// X wins boards 0, 1 and 2 in that order: the top meta row.
const X_TAKES_TOP_ROW: [(usize, usize); 17] = [
    (0, 3),
    (3, 0),
    (0, 4),
    (4, 0),
    (0, 5),
    (5, 1),
    (1, 6),
    (6, 1),
    (1, 7),
    (7, 1),
    (1, 8),
    (8, 2),
    (2, 3),
    (3, 2),
    (2, 4),
    (4, 2),
    (2, 5),
];

/// X wins board 4 with its center cell last, so the move routes to itself.
const SELF_ROUTING_WIN: [(usize, usize); 5] = [(4, 0), (0, 4), (4, 8), (8, 4), (4, 4)];

struct LocalMatch {
    minis: [Grid<Cell>; 9],
    meta: Grid<MetaCell>,
    state: MatchState,
}

impl LocalMatch {
    fn new() -> Self {
        Self {
            minis: [Grid::new(); 9],
            meta: Grid::new(),
            state: MatchState::new(),
        }
    }

    fn play(&mut self, board: usize, cell: usize) -> Result<(), MatchError> {
        let board = Position::from_index(board).unwrap();
        let cell = Position::from_index(cell).unwrap();
        self.state.check_play(board)?;

        let mark = self.state.turn();
        let mini = &mut self.minis[board.to_index()];
        mini.place(cell, Cell::Occupied(mark)).expect("cell free");
        let outcome = evaluate(mini);

        self.state
            .apply_move(MoveEvent::new(board, cell, mark, !outcome.is_decided()))?;

        if let Some(meta_cell) = MetaCell::from_outcome(outcome) {
            self.meta.place(board, meta_cell).expect("meta cell free");
            self.state.record_meta_outcome(evaluate(&self.meta))?;
        }
        Ok(())
    }

    fn play_all(&mut self, moves: &[(usize, usize)]) {
        for (i, &(board, cell)) in moves.iter().enumerate() {
            self.play(board, cell)
                .unwrap_or_else(|e| panic!("move {i} ({board},{cell}) rejected: {e}"));
        }
    }

    fn mini_outcome(&self, board: usize) -> Outcome {
        evaluate(&self.minis[board])
    }
}

#[test]
fn test_turn_alternates_only_on_accepted_moves() {
    let mut game = LocalMatch::new();
    game.play(0, 4).unwrap();
    assert_eq!(game.state.turn(), Mark::O);

    // O must play board 4
    assert!(game.play(3, 0).is_err());
    assert_eq!(game.state.turn(), Mark::O);

    game.play(4, 0).unwrap();
    assert_eq!(game.state.turn(), Mark::X);
}

#[test]
fn test_scenario_a_row_win_routes_to_open_board() {
    let mut game = LocalMatch::new();
    game.play_all(&ROW_WIN_ON_BOARD_0);

    assert_eq!(game.mini_outcome(0), Outcome::Won(Mark::X));
    assert_eq!(game.meta.get(Position::TopLeft), MetaCell::Claimed(Mark::X));
    assert!(game.state.is_finished(Position::TopLeft));
    // Cell 2 was the routing target and board 2 is open
    assert_eq!(game.state.active_board(), ActiveBoard::Board(Position::TopRight));
    assert_eq!(game.state.turn(), Mark::O);
    assert!(!game.state.is_over());
}

#[test]
fn test_scenario_b_drawn_board_blocks_meta_cell() {
    let mut game = LocalMatch::new();
    game.play_all(&DRAW_ON_BOARD_4);

    assert_eq!(game.mini_outcome(4), Outcome::Drawn);
    assert_eq!(game.meta.get(Position::Center), MetaCell::Blocked);
    assert!(game.state.is_finished(Position::Center));
    assert!(!game.state.is_over());
    assert_eq!(game.state.active_board(), ActiveBoard::Board(Position::BottomRight));

    // O plays board 8 and sends X to the middle row; board 4 is never eligible
    game.play(8, 3).unwrap();
    assert_eq!(game.state.active_board(), ActiveBoard::Board(Position::MiddleLeft));
    assert!(!game.state.is_playable(Position::Center));
}

#[test]
fn test_scenario_c_meta_line_ends_match_immediately() {
    let mut game = LocalMatch::new();
    game.play_all(&X_TAKES_TOP_ROW);

    for board in 0..3 {
        assert_eq!(game.mini_outcome(board), Outcome::Won(Mark::X));
    }
    assert_eq!(game.state.result(), Outcome::Won(Mark::X));
    assert!(Position::ALL.iter().all(|&b| !game.state.is_playable(b)));

    let before = game.state.clone();
    assert_eq!(game.play(5, 0), Err(MatchError::MatchAlreadyOver));
    assert_eq!(game.state, before);
}

#[test]
fn test_scenario_d_target_finished_by_the_same_move() {
    let mut game = LocalMatch::new();
    game.play_all(&SELF_ROUTING_WIN);

    assert_eq!(game.mini_outcome(4), Outcome::Won(Mark::X));
    assert!(game.state.is_finished(Position::Center));
    assert_eq!(game.state.active_board(), ActiveBoard::Any);
}

#[test]
fn test_routing_to_previously_finished_board_is_free_choice() {
    let mut game = LocalMatch::new();
    game.play_all(&SELF_ROUTING_WIN);

    // O picks board 3 and plays its center: board 4 is finished
    game.play(3, 4).unwrap();
    assert_eq!(game.state.active_board(), ActiveBoard::Any);
    assert_eq!(
        game.state.check_play(Position::Center),
        Err(MatchError::BoardFinished(Position::Center))
    );
}

#[test]
fn test_all_boards_finished_without_line_is_a_draw() {
    let mut state = MatchState::new();
    let mut meta = Grid::<MetaCell>::new();
    // X O X / X O O / - X X as meta cells: full, no line
    let claims = [
        MetaCell::Claimed(Mark::X),
        MetaCell::Claimed(Mark::O),
        MetaCell::Claimed(Mark::X),
        MetaCell::Claimed(Mark::X),
        MetaCell::Claimed(Mark::O),
        MetaCell::Claimed(Mark::O),
        MetaCell::Blocked,
        MetaCell::Claimed(Mark::X),
        MetaCell::Claimed(Mark::X),
    ];
    let mut mark = Mark::X;
    for (board, claim) in Position::ALL.into_iter().zip(claims) {
        // Each event concludes its board and targets the next index
        let next = Position::from_index((board.to_index() + 1) % 9).unwrap();
        state
            .apply_move(MoveEvent::new(board, next, mark, false))
            .unwrap();
        meta.place(board, claim).unwrap();
        state.record_meta_outcome(evaluate(&meta)).unwrap();
        mark = mark.opponent();
        if board != Position::BottomRight {
            assert!(!state.is_over(), "decided early at {board}");
        }
    }
    assert_eq!(state.result(), Outcome::Drawn);
}
