// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io::Write;

use derive_more::Display;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    board::{Board, Candidates, FenParseError},
    core::{Color, PieceKind, Square},
    history::MoveRecord,
    resolver::{self, CheckStatus},
};

/// Whether a game is still being played and, if not, how it ended.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum GameState {
    #[display(fmt = "in progress")]
    InProgress,
    #[display(fmt = "checkmate, {} wins", _0)]
    Checkmate(Color),
    #[display(fmt = "stalemate")]
    Stalemate,
}

/// Reasons a move attempt can be rejected. A rejected move never changes the game.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game is over")]
    GameOver,
    #[error("there is no piece on {0}")]
    NoPiece(Square),
    #[error("the piece on {0} does not belong to the side to move")]
    WrongSide(Square),
    #[error("{origin}{destination} is not a legal move")]
    NotLegal { origin: Square, destination: Square },
    #[error("this move promotes a pawn and needs a piece to promote to")]
    PromotionRequired,
    #[error("a pawn cannot promote to {0}")]
    InvalidPromotion(PieceKind),
    #[error("promotion was cancelled")]
    PromotionCancelled,
}

/// A chess game between two players: a board whose side to move always has its legal moves resolved.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    status: CheckStatus,
}

impl Game {
    /// A game from the standard starting position.
    pub fn new() -> Game {
        Game::from_board(Board::start_position())
    }

    pub fn from_fen(fen: impl AsRef<str>) -> Result<Game, FenParseError> {
        Ok(Game::from_board(Board::from_fen(fen)?))
    }

    pub fn from_board(mut board: Board) -> Game {
        let status = resolver::resolve(&mut board);
        Game { board, status }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn check_status(&self) -> CheckStatus {
        self.status
    }

    pub fn game_state(&self) -> GameState {
        match self.status {
            CheckStatus::Checkmate => GameState::Checkmate(self.side_to_move().toggle()),
            CheckStatus::Stalemate => GameState::Stalemate,
            _ => GameState::InProgress,
        }
    }

    pub fn history(&self) -> &[MoveRecord] {
        self.board.history()
    }

    /// The legal destinations of the piece on `square`. Empty if the square is empty, holds a piece of the side
    /// not to move, or the game is over.
    pub fn legal_moves_for(&self, square: Square) -> Candidates {
        match self.board.piece_at(square) {
            Some(id) if !self.status.is_terminal() => {
                let piece = self.board.piece(id);
                if piece.color() == self.side_to_move() {
                    piece.candidates().playable()
                } else {
                    Candidates::new()
                }
            }
            _ => Candidates::new(),
        }
    }

    /// Every legal move for the side to move, as (origin, destination) pairs.
    pub fn legal_moves(&self) -> Vec<(Square, Square)> {
        if self.status.is_terminal() {
            return vec![];
        }

        let mut moves = Vec::new();
        for &id in self.board.pieces(self.side_to_move()) {
            let piece = self.board.piece(id);
            for (destination, _) in piece.candidates().moves() {
                moves.push((piece.square(), destination));
            }
        }
        moves
    }

    /// Whether moving the piece on `origin` to `destination` would promote it. Does not check legality.
    pub fn is_promotion(&self, origin: Square, destination: Square) -> bool {
        match self.board.piece_at(origin) {
            Some(id) => {
                let piece = self.board.piece(id);
                piece.kind() == PieceKind::Pawn
                    && destination.rank() == piece.color().promotion_rank()
            }
            None => false,
        }
    }

    /// Plays a move. `promotion` names the piece a pawn becomes when it reaches the last rank; it is ignored for
    /// every other move.
    pub fn attempt_move(
        &mut self,
        origin: Square,
        destination: Square,
        promotion: Option<PieceKind>,
    ) -> Result<MoveRecord, MoveError> {
        self.play(origin, destination, || {
            promotion.ok_or(MoveError::PromotionRequired)
        })
    }

    /// Plays a move, asking `chooser` for the promotion piece only if the move promotes. A chooser that returns
    /// `None` cancels the move.
    pub fn attempt_move_with<F>(
        &mut self,
        origin: Square,
        destination: Square,
        chooser: F,
    ) -> Result<MoveRecord, MoveError>
    where
        F: FnOnce() -> Option<PieceKind>,
    {
        self.play(origin, destination, || {
            chooser().ok_or(MoveError::PromotionCancelled)
        })
    }

    fn play<F>(&mut self, origin: Square, destination: Square, choose: F) -> Result<MoveRecord, MoveError>
    where
        F: FnOnce() -> Result<PieceKind, MoveError>,
    {
        if self.status.is_terminal() {
            return Err(MoveError::GameOver);
        }

        let id = self
            .board
            .piece_at(origin)
            .ok_or(MoveError::NoPiece(origin))?;
        let piece = self.board.piece(id);
        if piece.color() != self.side_to_move() {
            return Err(MoveError::WrongSide(origin));
        }

        let target = piece
            .candidates()
            .get(destination)
            .filter(|target| target.is_playable())
            .ok_or(MoveError::NotLegal {
                origin,
                destination,
            })?;

        let promotion = if self.is_promotion(origin, destination) {
            let kind = choose()?;
            if !kind.is_promotion_target() {
                return Err(MoveError::InvalidPromotion(kind));
            }
            Some(kind)
        } else {
            None
        };

        let record = self.board.make_move(id, destination, target, promotion);
        debug!(mov = %record, color = %record.color, "applied move");
        self.status = resolver::resolve(&mut self.board);
        if self.status.is_terminal() {
            info!(result = %self.game_state(), plies = self.board.history().len(), "game over");
        }
        Ok(record)
    }

    /// Writes the move log as JSON, one record per line.
    pub fn write_history<W: Write>(&self, mut writer: W) -> Result<(), serde_json::Error> {
        for record in self.board.history() {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n").map_err(serde_json::Error::io)?;
        }
        Ok(())
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        board::Target,
        core::*,
        game::{Game, GameState, MoveError},
        history::MoveRecord,
        resolver::CheckStatus,
    };

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn play(game: &mut Game, moves: &[&str]) {
        for mov in moves {
            let origin = sq(&mov[0..2]);
            let destination = sq(&mov[2..4]);
            if let Err(e) = game.attempt_move(origin, destination, None) {
                println!("{}", game.board());
                panic!("move {} was rejected: {}", mov, e);
            }
        }
    }

    mod start {
        use super::*;

        #[test]
        fn surfaced_moves() {
            let game = Game::new();
            assert_eq!(GameState::InProgress, game.game_state());
            assert_eq!(CheckStatus::Safe, game.check_status());
            for name in &["a1", "c1", "d1", "e1", "f1", "h1"] {
                assert!(game.legal_moves_for(sq(name)).is_empty(), "{}", name);
            }
            for name in &["b1", "g1", "a2", "d2", "h2"] {
                assert_eq!(2, game.legal_moves_for(sq(name)).len(), "{}", name);
            }
            assert_eq!(20, game.legal_moves().len());
        }

        #[test]
        fn opponent_pieces_have_no_surfaced_moves() {
            let game = Game::new();
            assert!(game.legal_moves_for(sq("e7")).is_empty());
            assert!(game.legal_moves_for(sq("e4")).is_empty());
        }
    }

    mod rejections {
        use super::*;

        #[test]
        fn empty_origin() {
            let mut game = Game::new();
            assert_eq!(
                Err(MoveError::NoPiece(sq("e4"))),
                game.attempt_move(sq("e4"), sq("e5"), None)
            );
        }

        #[test]
        fn wrong_side() {
            let mut game = Game::new();
            assert_eq!(
                Err(MoveError::WrongSide(sq("e7"))),
                game.attempt_move(sq("e7"), sq("e5"), None)
            );
        }

        #[test]
        fn not_legal_leaves_board_untouched() {
            let mut game = Game::new();
            let before = game.board().as_fen();
            assert_eq!(
                Err(MoveError::NotLegal {
                    origin: sq("e2"),
                    destination: sq("e5")
                }),
                game.attempt_move(sq("e2"), sq("e5"), None)
            );
            assert_eq!(before, game.board().as_fen());
            assert!(game.history().is_empty());
        }

        #[test]
        fn attack_only_square_is_not_legal() {
            let mut game = Game::new();
            assert!(matches!(
                game.attempt_move(sq("e2"), sq("d3"), None),
                Err(MoveError::NotLegal { .. })
            ));
        }

        #[test]
        fn promotion_choice_ignored_when_not_promoting() {
            let mut game = Game::new();
            let record = game
                .attempt_move(sq("e2"), sq("e4"), Some(PieceKind::Queen))
                .unwrap();
            assert_eq!(None, record.promotion);
        }
    }

    mod fools_mate {
        use super::*;

        #[test]
        fn black_mates() {
            let mut game = Game::new();
            play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
            assert_eq!(CheckStatus::Checkmate, game.check_status());
            assert_eq!(GameState::Checkmate(Color::Black), game.game_state());
            assert_eq!("checkmate, black wins", game.game_state().to_string());
            assert!(game.legal_moves().is_empty());
            assert!(game.legal_moves_for(sq("e1")).is_empty());
        }

        #[test]
        fn no_moves_after_mate() {
            let mut game = Game::new();
            play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
            assert_eq!(
                Err(MoveError::GameOver),
                game.attempt_move(sq("a2"), sq("a3"), None)
            );
        }
    }

    mod en_passant {
        use super::*;

        #[test]
        fn available_for_one_ply() {
            let mut game = Game::new();
            play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);
            let moves = game.legal_moves_for(sq("e5"));
            let passed = game.board().piece_at(sq("d5")).unwrap();
            assert_eq!(Some(Target::Capture(passed)), moves.get(sq("d6")));
            assert_eq!(2, moves.len());

            play(&mut game, &["h2h3", "h7h6"]);
            let moves = game.legal_moves_for(sq("e5"));
            assert!(!moves.contains(sq("d6")));
        }

        #[test]
        fn capture_removes_passed_pawn() {
            let mut game = Game::new();
            play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);
            let black_before = game.board().pieces(Color::Black).len();
            let record = game.attempt_move(sq("e5"), sq("d6"), None).unwrap();
            assert!(record.capture);
            assert!(record.en_passant);
            assert!(game.board().piece_at(sq("d5")).is_none());
            assert!(game.board().piece_at(sq("d6")).is_some());
            assert_eq!(black_before - 1, game.board().pieces(Color::Black).len());
        }
    }

    mod castling {
        use super::*;

        #[test]
        fn kingside_moves_rook() {
            let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w").unwrap();
            let record = game.attempt_move(sq("e1"), sq("g1"), None).unwrap();
            assert!(record.castle);
            let rook = game.board().piece_at(sq("f1")).unwrap();
            assert_eq!(PieceKind::Rook, game.board().piece(rook).kind());
            assert!(game.board().piece_at(sq("h1")).is_none());
        }

        #[test]
        fn queenside_moves_rook() {
            let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b").unwrap();
            game.attempt_move(sq("e8"), sq("c8"), None).unwrap();
            let rook = game.board().piece_at(sq("d8")).unwrap();
            assert_eq!(PieceKind::Rook, game.board().piece(rook).kind());
            assert!(game.board().piece_at(sq("a8")).is_none());
            assert_eq!("2kr3r/8/8/8/8/8/8/R3K2R w", game.board().as_fen());
        }

        #[test]
        fn king_that_moved_back_cannot_castle() {
            let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w").unwrap();
            play(&mut game, &["e1e2", "a8b8", "e2e1", "b8a8"]);
            let moves = game.legal_moves_for(sq("e1"));
            assert!(!moves.contains(sq("g1")));
            assert!(!moves.contains(sq("c1")));
        }

        #[test]
        fn rook_that_moved_back_cannot_castle() {
            let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w").unwrap();
            play(&mut game, &["h1h2", "a8b8", "h2h1", "b8a8"]);
            let moves = game.legal_moves_for(sq("e1"));
            assert!(!moves.contains(sq("g1")));
            assert!(moves.contains(sq("c1")));
        }
    }

    mod promotion {
        use super::*;

        const PROMOTION_FEN: &str = "k7/4P3/8/8/8/8/8/4K3 w";

        #[test]
        fn requires_choice() {
            let mut game = Game::from_fen(PROMOTION_FEN).unwrap();
            assert_eq!(
                Err(MoveError::PromotionRequired),
                game.attempt_move(sq("e7"), sq("e8"), None)
            );
            assert_eq!(Color::White, game.side_to_move());
            assert!(game.history().is_empty());
        }

        #[test]
        fn rejects_king_and_pawn() {
            let mut game = Game::from_fen(PROMOTION_FEN).unwrap();
            assert_eq!(
                Err(MoveError::InvalidPromotion(PieceKind::King)),
                game.attempt_move(sq("e7"), sq("e8"), Some(PieceKind::King))
            );
            assert_eq!(
                Err(MoveError::InvalidPromotion(PieceKind::Pawn)),
                game.attempt_move(sq("e7"), sq("e8"), Some(PieceKind::Pawn))
            );
        }

        #[test]
        fn cancelled_choice_changes_nothing() {
            let mut game = Game::from_fen(PROMOTION_FEN).unwrap();
            let before = game.board().as_fen();
            assert_eq!(
                Err(MoveError::PromotionCancelled),
                game.attempt_move_with(sq("e7"), sq("e8"), || None)
            );
            assert_eq!(before, game.board().as_fen());
            assert_eq!(Color::White, game.side_to_move());
        }

        #[test]
        fn chooser_only_asked_when_promoting() {
            let mut game = Game::from_fen(PROMOTION_FEN).unwrap();
            let mut asked = false;
            game.attempt_move_with(sq("e1"), sq("d1"), || {
                asked = true;
                None
            })
            .unwrap();
            assert!(!asked);
        }

        #[test]
        fn promotes_to_queen_with_check() {
            let mut game = Game::from_fen(PROMOTION_FEN).unwrap();
            let white_before = game.board().pieces(Color::White).len();
            let record = game
                .attempt_move_with(sq("e7"), sq("e8"), || Some(PieceKind::Queen))
                .unwrap();
            assert_eq!(Some(PieceKind::Queen), record.promotion);
            assert_eq!("e7e8q", record.to_string());

            let queen = game.board().piece_at(sq("e8")).unwrap();
            assert_eq!(PieceKind::Queen, game.board().piece(queen).kind());
            assert_eq!(white_before, game.board().pieces(Color::White).len());
            assert_eq!(CheckStatus::SingleCheck(queen), game.check_status());
        }

        #[test]
        fn underpromotion() {
            let mut game = Game::from_fen(PROMOTION_FEN).unwrap();
            game.attempt_move(sq("e7"), sq("e8"), Some(PieceKind::Knight))
                .unwrap();
            let knight = game.board().piece_at(sq("e8")).unwrap();
            assert_eq!(PieceKind::Knight, game.board().piece(knight).kind());
            assert_eq!(CheckStatus::Safe, game.check_status());
        }
    }

    mod stalemate {
        use super::*;

        #[test]
        fn queen_stalemates() {
            let mut game = Game::from_fen("7k/8/5Q2/8/8/8/8/K7 w").unwrap();
            game.attempt_move(sq("f6"), sq("g6"), None).unwrap();
            assert_eq!(GameState::Stalemate, game.game_state());
            assert_eq!(
                Err(MoveError::GameOver),
                game.attempt_move(sq("h8"), sq("g8"), None)
            );
        }
    }

    mod history {
        use super::*;

        #[test]
        fn json_lines() {
            let mut game = Game::new();
            play(&mut game, &["e2e4", "e7e5", "g1f3"]);
            let mut buf = Vec::new();
            game.write_history(&mut buf).unwrap();
            let text = String::from_utf8(buf).unwrap();
            let records: Vec<MoveRecord> = text
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect();
            assert_eq!(game.history(), records.as_slice());
            assert!(text.lines().next().unwrap().contains("\"e2\""));
        }

        #[test]
        fn double_push_recorded() {
            let mut game = Game::new();
            play(&mut game, &["e2e4", "e7e6"]);
            assert!(game.history()[0].is_double_pawn_push());
            assert!(!game.history()[1].is_double_pawn_push());
        }
    }

    mod playouts {
        use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};

        use super::*;

        fn random_playout(seed: u64, plies: usize) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut game = Game::new();
            for _ in 0..plies {
                let moves = game.legal_moves();
                let &(origin, destination) = match moves.choose(&mut rng) {
                    Some(mov) => mov,
                    None => break,
                };

                let mover = game.side_to_move();
                game.attempt_move(origin, destination, Some(PieceKind::Queen))
                    .unwrap();

                // The side that just moved must never be left in check, and both kings are still on the board.
                if game.board().is_check(mover) {
                    println!("{}", game.board());
                    panic!("{} left its king in check with {}{}", mover, origin, destination);
                }
                for color in colors() {
                    let king = game.board().king(color);
                    let square = game.board().piece(king).square();
                    assert_eq!(Some(king), game.board().piece_at(square));
                }

                let in_check = game.board().is_check(game.side_to_move());
                assert_eq!(in_check, game.check_status().is_check());
            }
        }

        #[test]
        fn random_games_stay_legal() {
            for seed in 0..24 {
                random_playout(seed, 200);
            }
        }
    }
}
