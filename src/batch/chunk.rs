//! Chunk scheduling
//!
//! Splits the resolved file list into consecutive chunks no larger than the
//! configured batch size. Each chunk is one atomic dispatch decision.

use std::path::PathBuf;

/// Split `files` into chunks of at most `max_batch_size`, preserving order.
///
/// `max_batch_size` must already be validated (> 0) by the config surface.
pub fn chunk_files(files: Vec<PathBuf>, max_batch_size: usize) -> Vec<Vec<PathBuf>> {
    debug_assert!(max_batch_size > 0);
    let mut chunks = Vec::with_capacity(files.len().div_ceil(max_batch_size));
    let mut current = Vec::with_capacity(max_batch_size.min(files.len()));

    for file in files {
        current.push(file);
        if current.len() == max_batch_size {
            chunks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("file-{i}.txt"))).collect()
    }

    #[test]
    fn chunk_count_is_ceiling_division() {
        for (n, size, expected) in [(0, 3, 0), (1, 3, 1), (3, 3, 1), (4, 3, 2), (10, 3, 4)] {
            assert_eq!(chunk_files(paths(n), size).len(), expected, "n={n} size={size}");
        }
    }

    #[test]
    fn chunks_concatenate_back_to_input_order() {
        let input = paths(7);
        let chunks = chunk_files(input.clone(), 3);
        let flattened: Vec<PathBuf> = chunks.iter().flatten().cloned().collect();
        assert_eq!(flattened, input);
        assert!(chunks.iter().all(|c| c.len() <= 3));
    }

    #[test]
    fn example_split_two_then_one() {
        let chunks = chunk_files(
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt"), PathBuf::from("c.txt")],
            2,
        );
        assert_eq!(chunks, vec![
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")],
            vec![PathBuf::from("c.txt")],
        ]);
    }
}
