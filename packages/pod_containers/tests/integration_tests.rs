//! Integration tests exercising the containers, the allocator and the algorithms together through
//! the public API, the way a geometry processing pipeline would use them.

use bytemuck::{Pod, Zeroable};
use pod_containers::{
    BlockVec, Error, PodAllocator, PodArray, PodArrayAdaptor, quick_sort, remove_duplicates,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Vertex {
    x: f64,
    y: f64,
    command: u32,
    flags: u32,
}

impl Vertex {
    fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            command: 1,
            flags: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Cell {
    x: i32,
    y: i32,
    cover: i32,
    area: i32,
}

#[test]
fn vertex_storage_is_address_stable_while_growing() {
    let mut path = BlockVec::<Vertex, 4>::new();
    path.add(Vertex::new(0.0, 0.0)).unwrap();

    let first = &raw const *path.get(0).unwrap();

    for i in 1..1000_u32 {
        path.add(Vertex::new(f64::from(i), -f64::from(i))).unwrap();
    }

    assert_eq!(first, &raw const *path.get(0).unwrap());
    assert_eq!(path.len(), 1000);
    assert_eq!(path.block_count(), 1000_usize.div_ceil(16));
    assert_eq!(path.value_at(999), Some(Vertex::new(999.0, -999.0)));
}

#[test]
fn closed_polygon_walks_neighbors_as_a_ring() {
    let mut polygon = BlockVec::<Vertex, 2>::new();
    for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
        polygon.add(Vertex::new(x, y)).unwrap();
    }

    // Twice the signed area via the shoelace formula, using ring neighbors.
    let doubled_area: f64 = (0..polygon.len())
        .map(|i| {
            let current = polygon.curr(i).unwrap();
            let next = polygon.next(i).unwrap();
            current.x * next.y - next.x * current.y
        })
        .sum();

    assert!((doubled_area - 2.0).abs() < f64::EPSILON);
    assert_eq!(polygon.prev(0), polygon.last());
}

#[test]
fn cells_sorted_and_deduplicated_in_block_storage() {
    let mut cells = BlockVec::<Cell, 3>::new();

    for y in (0..20).rev() {
        for x in [3, 1, 2, 1, 3] {
            cells
                .add(Cell {
                    x,
                    y,
                    cover: 1,
                    area: 2,
                })
                .unwrap();
        }
    }

    quick_sort(&mut cells, |a, b| (a.y, a.x) < (b.y, b.x));
    let unique = remove_duplicates(&mut cells, |a, b| a.x == b.x && a.y == b.y);
    cells.truncate(unique);

    assert_eq!(cells.len(), 20 * 3);
    assert_eq!(cells.get(0).map(|c| (c.x, c.y)), Some((1, 0)));
    assert_eq!(cells.last().map(|c| (c.x, c.y)), Some((3, 19)));
}

#[test]
fn scanline_spans_reserve_contiguous_runs() {
    let mut spans = BlockVec::<u8, 3>::new();
    spans.extend_from_slice(&[255; 5]).unwrap();

    // Does not fit in the 3 slots left in the first block.
    let start = spans.allocate_contiguous_run(6).unwrap();
    assert_eq!(start, 8);

    spans.run_mut(start, 6).unwrap().fill(128);
    assert_eq!(spans.block(1), Some(&[128, 128, 128, 128, 128, 128, 0, 0][..]));

    assert_eq!(
        spans.allocate_contiguous_run(8),
        Err(Error::RunExceedsBlock {
            requested: 8,
            block_size: 8
        })
    );
}

#[test]
fn fixed_capacity_array_round_trips_through_bytes() {
    let mut cells = PodArray::<Cell>::with_capacity(3, 0).unwrap();
    for i in 0..3 {
        cells
            .add(Cell {
                x: i,
                y: -i,
                cover: 7,
                area: 9,
            })
            .unwrap();
    }

    assert!(matches!(
        cells.add(Cell::default()),
        Err(Error::CapacityExceeded { capacity: 3 })
    ));

    let bytes = cells.to_bytes();
    assert_eq!(bytes.len(), 3 * size_of::<Cell>());

    let mut restored = PodArray::<Cell>::new();
    restored.deserialize(&bytes).unwrap();
    assert_eq!(restored.as_slice(), cells.as_slice());

    let mut in_blocks = BlockVec::<Cell, 1>::new();
    in_blocks.deserialize(&bytes).unwrap();
    assert_eq!(in_blocks.to_bytes(), bytes);
}

#[test]
fn scratch_memory_from_allocator_is_sortable() {
    let mut allocator = PodAllocator::new(1024);

    for round in 0..3 {
        let scratch = allocator.allocate_slice::<u32>(100).unwrap();
        for (i, slot) in scratch.iter_mut().enumerate() {
            *slot = u32::try_from((i * 37) % 100).unwrap();
        }

        let used = 50;
        let mut view = PodArrayAdaptor::new(scratch, used).unwrap();
        quick_sort(&mut view, |a, b| a < b);

        assert!(scratch[..used].is_sorted(), "round {round}");

        let vertices = allocator.allocate_slice::<Vertex>(4).unwrap();
        assert_eq!(vertices.as_ptr().addr() % align_of::<Vertex>(), 0);

        allocator.reset();
        assert_eq!(allocator.block_count(), 0);
    }
}
