use crate::RandomAccess;

/// Ranges of at most this many items are sorted with insertion sort instead of being partitioned.
pub const QUICK_SORT_THRESHOLD: usize = 9;

/// Every partition step pushes the larger half and continues with the smaller one, so the number
/// of pending ranges never exceeds the bit width of the length.
const MAX_PENDING_RANGES: usize = usize::BITS as usize;

/// Sorts the items of `arr` in place according to the strict weak ordering `less`.
///
/// This is an iterative quicksort that never recurses and never allocates: the pending ranges live
/// on a small fixed-size stack. Ranges of up to [`QUICK_SORT_THRESHOLD`] items are finished with
/// insertion sort. The sort is not stable.
///
/// Works over any [`RandomAccess`] container, including non-contiguous ones like
/// [`BlockVec`][crate::BlockVec].
///
/// # Example
///
/// ```
/// use pod_containers::{PodArray, quick_sort};
///
/// let mut values = PodArray::<i32>::with_capacity(5, 0).unwrap();
/// for value in [5, 3, 3, 1, 4] {
///     values.add(value).unwrap();
/// }
///
/// quick_sort(&mut values, |a, b| a < b);
///
/// assert_eq!(values.as_slice(), &[1, 3, 3, 4, 5]);
/// ```
#[expect(
    clippy::arithmetic_side_effects,
    reason = "all indices stay within 0..=len, which cannot overflow"
)]
#[expect(
    clippy::indexing_slicing,
    reason = "pending range count is bounded by MAX_PENDING_RANGES, see above"
)]
pub fn quick_sort<A, F>(arr: &mut A, mut less: F)
where
    A: RandomAccess + ?Sized,
    F: FnMut(&A::Item, &A::Item) -> bool,
{
    if arr.len() < 2 {
        return;
    }

    let mut pending = [(0_usize, 0_usize); MAX_PENDING_RANGES];
    let mut pending_count = 0;

    let mut base = 0;
    let mut limit = arr.len();

    loop {
        if limit - base > QUICK_SORT_THRESHOLD {
            let (i, j) = partition(arr, base, limit, &mut less);

            // Continue with the smaller side, come back for the larger one later.
            if j - base > limit - i {
                pending[pending_count] = (base, j);
                base = i;
            } else {
                pending[pending_count] = (i, limit);
                limit = j;
            }

            pending_count += 1;
        } else {
            insertion_sort(arr, base, limit, &mut less);

            if pending_count == 0 {
                break;
            }

            pending_count -= 1;
            (base, limit) = pending[pending_count];
        }
    }
}

/// Partitions `base..limit` around a median-of-three pivot and returns the scan positions where
/// the two pointers crossed. On return the pivot sits at `j`, everything in `base..j` is not
/// greater than it and everything in `i..limit` is not less than it.
#[expect(
    clippy::arithmetic_side_effects,
    reason = "all indices stay within base..limit, which cannot overflow"
)]
#[expect(
    clippy::integer_division,
    reason = "we want the middle index, rounding down is fine"
)]
fn partition<A, F>(arr: &mut A, base: usize, limit: usize, less: &mut F) -> (usize, usize)
where
    A: RandomAccess + ?Sized,
    F: FnMut(&A::Item, &A::Item) -> bool,
{
    let last = limit - 1;

    arr.swap_items(base, base + (limit - base) / 2);

    let mut i = base + 1;
    let mut j = last;

    // Order the three candidates so that arr[i] <= arr[base] <= arr[j]. The outer two then act
    // as sentinels for the scans below.
    if less(arr.at(j), arr.at(i)) {
        arr.swap_items(i, j);
    }
    if less(arr.at(base), arr.at(i)) {
        arr.swap_items(base, i);
    }
    if less(arr.at(j), arr.at(base)) {
        arr.swap_items(j, base);
    }

    loop {
        i += 1;
        while i < last && less(arr.at(i), arr.at(base)) {
            i += 1;
        }

        j -= 1;
        while j > base && less(arr.at(base), arr.at(j)) {
            j -= 1;
        }

        if i > j {
            break;
        }

        arr.swap_items(i, j);
    }

    arr.swap_items(base, j);

    (i, j)
}

#[expect(
    clippy::arithmetic_side_effects,
    reason = "all indices stay within base..limit, which cannot overflow"
)]
fn insertion_sort<A, F>(arr: &mut A, base: usize, limit: usize, less: &mut F)
where
    A: RandomAccess + ?Sized,
    F: FnMut(&A::Item, &A::Item) -> bool,
{
    for i in base + 1..limit {
        let mut j = i;

        while j > base && less(arr.at(j), arr.at(j - 1)) {
            arr.swap_items(j, j - 1);
            j -= 1;
        }
    }
}
