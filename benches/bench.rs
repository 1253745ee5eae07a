use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use ktx2_tree::{Container, NodeId, RecordTree, RecordTreeView, TreeIndex, TreeState, VkFormat};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::StatefulWidget;

fn simple() -> Container {
    Container::new(VkFormat::R8G8B8A8_SRGB)
        .with_size(256, 256, 0)
        .with_counts(0, 0, 1)
}

/// Cubemap array with a full mip chain, tens of thousands of nodes.
fn cubemap_array() -> Container {
    Container::new(VkFormat::BC7_UNORM_BLOCK)
        .with_size(2048, 2048, 0)
        .with_counts(64, 6, 12)
}

/// Descend the last row on every level down to a depth slice.
fn last_depth_leaf(index: &TreeIndex) -> NodeId {
    let mut current = NodeId::ROOT;
    while index.child_count(current) > 0 {
        current = index
            .child_at(current, index.child_count(current) - 1)
            .unwrap();
    }
    current
}

fn init(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("init");
    group.throughput(Throughput::Elements(1)); // Documents per second

    for (name, container) in [("simple", simple()), ("cubemap-array", cubemap_array())] {
        group.bench_function(format!("build/{name}"), |bencher| {
            bencher.iter(|| black_box(RecordTree::build(black_box(&container))));
        });

        let tree = RecordTree::build(&container);
        group.bench_function(format!("index/{name}"), |bencher| {
            bencher.iter_batched(
                || tree.clone(),
                |tree| black_box(TreeIndex::new(black_box(tree))),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn select(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("select");
    group.throughput(Throughput::Elements(1)); // Clicks per second

    let index = TreeIndex::new(RecordTree::build(&cubemap_array()));
    let leaf = last_depth_leaf(&index);
    group.bench_function("last-depth-slice", |bencher| {
        bencher.iter(|| black_box(ktx2_tree::image_index(index.tree(), black_box(leaf))));
    });

    group.finish();
}

fn renders(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("render");
    group.throughput(Throughput::Elements(1)); // Frames per second

    let buffer_size = Rect::new(0, 0, 100, 100);

    let index = TreeIndex::new(RecordTree::build(&simple()));
    group.bench_function("simple", |bencher| {
        bencher.iter_batched(
            TreeState::default,
            |mut state| {
                let mut buffer = Buffer::empty(buffer_size);
                black_box(RecordTreeView::new(&index)).render(
                    buffer_size,
                    black_box(&mut buffer),
                    &mut state,
                );
            },
            BatchSize::SmallInput,
        );
    });

    let index = TreeIndex::new(RecordTree::build(&cubemap_array()));
    let leaf = last_depth_leaf(&index);
    group.bench_function("cubemap-array-revealed", |bencher| {
        bencher.iter_batched(
            || {
                let mut state = TreeState::default();
                state.reveal(&index, leaf);
                state
            },
            |mut state| {
                let mut buffer = Buffer::empty(buffer_size);
                black_box(RecordTreeView::new(&index)).render(
                    buffer_size,
                    black_box(&mut buffer),
                    &mut state,
                );
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Create flamegraphs with `cargo bench --bench bench -- --profile-time=5`
#[cfg(unix)]
fn profiled() -> Criterion {
    use pprof::criterion::{Output, PProfProfiler};
    Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}
#[cfg(not(unix))]
fn profiled() -> Criterion {
    Criterion::default()
}

criterion_group! {
    name = benches;
    config = profiled();
    targets = init, select, renders
}
criterion_main!(benches);
