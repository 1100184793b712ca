use criterion::{black_box, criterion_group, criterion_main, Criterion};
use match3::core::{find_all_matches, is_deadlocked, shuffle_board, Board, BoardConfig, SimpleRng};

fn settled_board(seed: u32) -> Board {
    let mut board = Board::new(BoardConfig::default().headless(), seed).expect("default config");
    board.run_to_idle();
    board
}

fn bench_find_all_matches(c: &mut Criterion) {
    let board = settled_board(12345);

    c.bench_function("find_all_matches_8x8", |b| {
        b.iter(|| find_all_matches(black_box(board.grid()), 3))
    });
}

fn bench_deadlock_check(c: &mut Criterion) {
    let board = settled_board(12345);

    c.bench_function("is_deadlocked_8x8", |b| {
        b.iter(|| is_deadlocked(black_box(board.grid()), 3))
    });
}

fn bench_shuffle(c: &mut Criterion) {
    let board = settled_board(12345);
    let mut rng = SimpleRng::new(7);

    c.bench_function("shuffle_8x8", |b| {
        b.iter(|| {
            let mut grid = board.grid().clone();
            shuffle_board(&mut grid, &mut rng, 3, 100);
            grid
        })
    });
}

fn bench_resolve_swap(c: &mut Criterion) {
    let board = settled_board(12345);
    let Some((a, b)) = board.hint().and_then(|hint| hint.swap()) else {
        return;
    };

    c.bench_function("resolve_hinted_swap", |bench| {
        bench.iter(|| {
            let mut board = board.clone();
            board.request_swap(a, b).expect("idle board");
            board.run_to_idle().len()
        })
    });
}

criterion_group!(
    benches,
    bench_find_all_matches,
    bench_deadlock_check,
    bench_shuffle,
    bench_resolve_swap
);
criterion_main!(benches);
