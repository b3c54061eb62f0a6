use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tilemap_core::{
    Command, CommandStack, DenseTileMatrix, LayerKind, Map, MatrixExtent, RenameLayer,
    SparseTileMatrix, TileMatrix, TilePos, flood_fill,
};

const SIDE: usize = 256;

fn random_writes(count: usize) -> Vec<(TilePos, u32)> {
    let mut rng = StdRng::seed_from_u64(0xbe7c);
    (0..count)
        .map(|_| {
            let pos = TilePos::new(rng.gen_range(0..SIDE as i32), rng.gen_range(0..SIDE as i32));
            (pos, rng.gen_range(1..64))
        })
        .collect()
}

fn bench_flood_fill(c: &mut Criterion) {
    let extent = MatrixExtent::new(SIDE, SIDE);
    c.bench_function("flood_fill/dense_256x256", |b| {
        b.iter_batched(
            || DenseTileMatrix::new(extent).unwrap(),
            |mut matrix| {
                let changed = flood_fill(&mut matrix, TilePos::new(128, 128), 5, None);
                black_box(changed);
            },
            BatchSize::LargeInput,
        )
    });

    // A diagonal wall halves the fill region.
    c.bench_function("flood_fill/sparse_256x256_diagonal", |b| {
        b.iter_batched(
            || {
                let mut matrix = SparseTileMatrix::new(extent).unwrap();
                for i in 0..SIDE as i32 {
                    matrix.set_tile(TilePos::new(i, i), 1).unwrap();
                }
                matrix
            },
            |mut matrix| {
                let mut affected = Vec::new();
                let origin = TilePos::new(SIDE as i32 - 1, 0);
                let changed = flood_fill(&mut matrix, origin, 5, Some(&mut affected));
                black_box((changed, affected.len()));
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_set_tile(c: &mut Criterion) {
    let extent = MatrixExtent::new(SIDE, SIDE);
    let writes = random_writes(10_000);

    c.bench_function("set_tile/dense_10k", |b| {
        let mut matrix = DenseTileMatrix::new(extent).unwrap();
        b.iter(|| {
            for (pos, tile) in &writes {
                matrix.set_tile(*pos, *tile).unwrap();
            }
            black_box(matrix.tile_at(TilePos::new(0, 0)));
        })
    });

    c.bench_function("set_tile/sparse_10k", |b| {
        let mut matrix = SparseTileMatrix::new(extent).unwrap();
        b.iter(|| {
            for (pos, tile) in &writes {
                matrix.set_tile(*pos, *tile).unwrap();
            }
            black_box(matrix.tile_at(TilePos::new(0, 0)));
        })
    });
}

fn bench_command_push(c: &mut Criterion) {
    c.bench_function("command_stack/1k_pushes_capacity_100", |b| {
        b.iter_batched(
            || {
                let mut map = Map::new(MatrixExtent::new(8, 8)).unwrap();
                let layers: Vec<_> = (0..4)
                    .map(|_| map.add_layer(LayerKind::Tile, None).unwrap())
                    .collect();
                (map, layers)
            },
            |(mut map, layers)| {
                let mut stack: CommandStack<Command> = CommandStack::new(100);
                // Alternating layers keep renames from merging.
                for i in 0..1_000 {
                    let layer = layers[i % layers.len()];
                    stack
                        .push(RenameLayer::new(layer, format!("layer {i}")).into(), &mut map)
                        .unwrap();
                }
                black_box(stack.size());
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_flood_fill, bench_set_tile, bench_command_push);
criterion_main!(benches);
