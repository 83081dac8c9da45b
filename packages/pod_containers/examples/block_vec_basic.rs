//! Basic usage example for `BlockVec`.
//!
//! This example builds a polyline in block storage, shows that item addresses stay stable while
//! the sequence grows, and saves and restores the sequence as raw bytes.

use pod_containers::{BlockVec, quick_sort, remove_duplicates};

fn main() {
    // Blocks of 2^3 = 8 points each.
    let mut points = BlockVec::<[f32; 2], 3>::new();

    points.add([0.0, 0.0]).unwrap();
    let first_address = &raw const points[0];

    for i in 1..20_u16 {
        let x = f32::from(i);
        points.add([x, x * 0.5]).unwrap();
    }

    println!(
        "Stored {} points in {} blocks of {} points",
        points.len(),
        points.block_count(),
        BlockVec::<[f32; 2], 3>::BLOCK_SIZE
    );
    println!(
        "First point did not move while growing: {}",
        first_address == &raw const points[0]
    );

    // Neighbors wrap around, which is handy for closed polygons.
    println!("Point before the first: {:?}", points.prev(0));
    println!("Point after the last: {:?}", points.next(points.len() - 1));

    // Save and restore as raw bytes.
    let bytes = points.to_bytes();
    let mut restored = BlockVec::<[f32; 2], 3>::new();
    restored.deserialize(&bytes).unwrap();

    println!(
        "Serialized {} bytes, restored {} points",
        bytes.len(),
        restored.len()
    );

    // Sort by X descending and drop points with duplicate X coordinates.
    let mut xs = BlockVec::<u32, 3>::new();
    xs.extend_from_slice(&[5, 3, 9, 3, 5, 1, 9, 9]).unwrap();

    quick_sort(&mut xs, |a, b| a > b);
    let unique = remove_duplicates(&mut xs, |a, b| a == b);
    xs.truncate(unique);

    println!("Unique descending: {:?}", xs.iter().collect::<Vec<_>>());
}
