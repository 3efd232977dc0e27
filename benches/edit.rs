// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracksmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use tracksmith::edit::{self, DeleteMode};
use tracksmith::graph::{GraphBuilder, GraphStore};
use tracksmith::model::{PointId, PrimitiveRef, Projection, SegmentId, TagMap};

// Benchmark identity (keep stable):
// - Groups: `edit.order_segments`, `edit.delete_plan`, `edit.delete_execute`.
// - Case IDs are the chain length; keep them when fixtures change.
const CASES: [usize; 3] = [64, 512, 4096];

struct Chain {
    store: GraphStore,
    points: Vec<PointId>,
    segments: Vec<SegmentId>,
}

fn pending_chain(len: usize) -> Chain {
    let mut builder = GraphBuilder::new(Projection::Mercator);
    let points: Vec<PointId> = (0..=len)
        .map(|i| builder.point(47.0 + i as f64 * 1e-4, 8.0))
        .collect();
    let segments = points
        .windows(2)
        .map(|w| builder.segment(w[0], w[1]).expect("segment"))
        .collect();
    Chain {
        store: builder.build(),
        points,
        segments,
    }
}

/// Two tracks meeting in the middle of the point run.
fn joined_tracks(len: usize) -> (GraphStore, PointId) {
    let mut builder = GraphBuilder::new(Projection::Mercator);
    let points: Vec<PointId> = (0..=len)
        .map(|i| builder.point(47.0, 8.0 + i as f64 * 1e-4))
        .collect();
    let mid = len / 2;
    builder
        .polyline(&points[..=mid], TagMap::new())
        .expect("first");
    builder
        .polyline(&points[mid..], TagMap::new())
        .expect("second");
    (builder.build(), points[mid])
}

fn bench_order_segments(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit.order_segments");
    for len in CASES {
        let chain = pending_chain(len);
        let mut bag = chain.segments.clone();
        bag.shuffle(&mut StdRng::seed_from_u64(len as u64));
        group.throughput(Throughput::Elements(len as u64));
        group.bench_function(len.to_string(), |b| {
            b.iter(|| {
                let order = edit::order_segments(black_box(&chain.store), black_box(&bag));
                assert!(order.is_single_chain());
                order
            })
        });
    }
    group.finish();
}

fn bench_delete_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit.delete_plan");
    for len in CASES {
        let (store, joint) = joined_tracks(len);
        group.bench_function(format!("combine/{len}"), |b| {
            b.iter(|| {
                edit::delete(
                    black_box(&store),
                    [PrimitiveRef::Point(joint)],
                    DeleteMode::Combine,
                )
                .expect("plan")
            })
        });

        let chain = pending_chain(len);
        let target = PrimitiveRef::Point(chain.points[len / 2]);
        group.bench_function(format!("cascade/{len}"), |b| {
            b.iter(|| {
                edit::delete(black_box(&chain.store), [target], DeleteMode::Cascade).expect("plan")
            })
        });
    }
    group.finish();
}

fn bench_delete_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit.delete_execute");
    for len in CASES {
        let (store, joint) = joined_tracks(len);
        group.bench_function(len.to_string(), |b| {
            b.iter_batched(
                || {
                    let command =
                        edit::delete(&store, [PrimitiveRef::Point(joint)], DeleteMode::Combine)
                            .expect("plan")
                            .expect("command");
                    (store.clone(), command)
                },
                |(mut store, mut command)| {
                    command.execute(&mut store).expect("execute");
                    command.undo(&mut store).expect("undo");
                    store
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_order_segments,
    bench_delete_plan,
    bench_delete_execute
);
criterion_main!(benches);
