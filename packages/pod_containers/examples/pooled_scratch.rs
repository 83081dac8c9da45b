//! Example of using `PodAllocator` for per-frame scratch memory.
//!
//! Each frame carves many short-lived buffers from the allocator and releases all of them at once
//! at the end of the frame.

use pod_containers::{PodAllocator, PodArrayAdaptor, quick_sort};

fn main() {
    let mut allocator = PodAllocator::builder().block_size(4096).build();

    for frame in 0..3_u32 {
        let depths = allocator.allocate_slice::<f32>(256).unwrap();
        for (i, depth) in depths.iter_mut().enumerate() {
            *depth = ((i * 7919) % 256) as f32 / 256.0;
        }

        // Only the first 64 depths are relevant this frame.
        let mut visible = PodArrayAdaptor::new(depths, 64).unwrap();
        quick_sort(&mut visible, |a, b| a < b);

        let header = allocator.allocate(16, 8).unwrap();
        header[..4].copy_from_slice(&frame.to_le_bytes());

        // Larger than a block, so it gets a dedicated block of its own.
        let big = allocator.allocate_slice::<u64>(1024).unwrap();
        big[0] = u64::from(frame);

        println!(
            "Frame {frame}: nearest {:.3}, {} blocks, {} bytes reserved",
            depths[0],
            allocator.block_count(),
            allocator.allocated_bytes()
        );

        allocator.reset();
    }

    println!("After final reset: {allocator:?}");
}
