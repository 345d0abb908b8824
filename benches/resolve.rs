// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tabia::{core::Square, movegen, resolver, Board, Game};

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("resolve-start", |b| {
        let board = Board::start_position();
        b.iter(|| {
            let mut board = black_box(&board).clone();
            resolver::resolve(&mut board)
        });
    });

    c.bench_function("resolve-kasparov-topalov", |b| {
        let board = Board::from_fen("7r/1R3p1p/6p1/1p6/2q5/5PP1/1Q1r3P/1K1k1B2 w").unwrap();
        b.iter(|| {
            let mut board = black_box(&board).clone();
            resolver::resolve(&mut board)
        });
    });

    c.bench_function("generate-side-kiwipete", |b| {
        let board =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w").unwrap();
        b.iter(|| {
            let mut board = black_box(&board).clone();
            movegen::generate_side(board.side_to_move(), &mut board);
        });
    });

    c.bench_function("play-and-resolve", |b| {
        let game = Game::new();
        let e2: Square = "e2".parse().unwrap();
        let e4: Square = "e4".parse().unwrap();
        b.iter(|| {
            let mut game = black_box(&game).clone();
            game.attempt_move(e2, e4, None)
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
