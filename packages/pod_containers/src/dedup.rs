use crate::RandomAccess;

/// Compacts runs of consecutive equal items in `arr` down to their first item.
///
/// Returns the number of items that remain. The container itself is not shortened: the items at
/// positions at and after the returned length are left in an unspecified state and the caller
/// decides what to do with them (e.g. [`PodArray::truncate()`][crate::PodArray::truncate]).
///
/// Only consecutive duplicates are removed, so sort the container first to remove all of them.
///
/// # Example
///
/// ```
/// use pod_containers::remove_duplicates;
///
/// let mut values = vec![1, 1, 2, 3, 3, 3, 5];
/// let remaining = remove_duplicates(&mut values, |a, b| a == b);
/// values.truncate(remaining);
///
/// assert_eq!(values, [1, 2, 3, 5]);
/// ```
pub fn remove_duplicates<A, F>(arr: &mut A, mut equal: F) -> usize
where
    A: RandomAccess + ?Sized,
    F: FnMut(&A::Item, &A::Item) -> bool,
{
    let len = arr.len();
    if len < 2 {
        return len;
    }

    let mut kept = 1_usize;

    for index in 1..len {
        let item = *arr.at(index);

        if !equal(&item, arr.at(index.wrapping_sub(1))) {
            arr.set_item(kept, item);
            kept = kept.wrapping_add(1);
        }
    }

    kept
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(
        clippy::indexing_slicing,
        reason = "we do not need to worry about these things when writing test code"
    )]

    use proptest::prelude::*;

    use super::*;
    use crate::{BlockVec, quick_sort};

    #[test]
    fn keeps_first_of_each_run() {
        let mut values = vec![1, 1, 2, 3, 3, 3, 5];
        let remaining = remove_duplicates(&mut values, |a, b| a == b);

        assert_eq!(remaining, 4);
        assert_eq!(values[..remaining], [1, 2, 3, 5]);
    }

    #[test]
    fn short_inputs_return_their_size() {
        let mut empty: Vec<u8> = Vec::new();
        assert_eq!(remove_duplicates(&mut empty, |_, _| true), 0);

        let mut single = vec![3];
        assert_eq!(remove_duplicates(&mut single, |_, _| true), 1);
    }

    #[test]
    fn all_equal_collapses_to_one() {
        let mut values = vec![9_u8; 20];
        assert_eq!(remove_duplicates(&mut values, |a, b| a == b), 1);
    }

    #[test]
    fn comparison_is_against_unmodified_neighbor() {
        // Items compare equal when within 1 of each other, chaining through the run.
        let mut values = vec![1, 2, 3, 10, 11];
        let remaining = remove_duplicates(&mut values, |a: &i32, b: &i32| a.abs_diff(*b) <= 1);

        assert_eq!(values[..remaining], [1, 10]);
    }

    #[test]
    fn works_on_block_vec() {
        let mut sequence = BlockVec::<u16, 2>::new();
        sequence
            .extend_from_slice(&[4, 4, 4, 4, 4, 5, 5, 6, 7, 7])
            .unwrap();

        let remaining = remove_duplicates(&mut sequence, |a, b| a == b);
        sequence.truncate(remaining);

        assert_eq!(sequence.iter().copied().collect::<Vec<_>>(), [4, 5, 6, 7]);
    }

    proptest! {
        #[test]
        fn sort_then_dedup_matches_std(mut values in prop::collection::vec(0_i16..50, 0..300)) {
            let mut expected = values.clone();
            expected.sort_unstable();
            expected.dedup();

            quick_sort(&mut values, |a, b| a < b);
            let remaining = remove_duplicates(&mut values, |a, b| a == b);
            values.truncate(remaining);

            prop_assert_eq!(values, expected);
        }
    }
}
