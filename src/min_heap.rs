/// Array-backed binary min-heap.
///
/// Only `<` is ever consulted, so elements that compare equal keep whatever
/// relative order the sift operations leave them in. That order is fixed for a
/// given sequence of `build`/`insert`/`extract_min` calls, which is what the
/// tree builder relies on to break frequency ties deterministically.
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    elements: Vec<T>,
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        MinHeap { elements: vec![] }
    }

    pub fn heap_size(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn parent(&self, i: usize) -> usize {
        (i - 1) / 2
    }

    pub fn left(&self, i: usize) -> usize {
        2 * i + 1
    }

    pub fn right(&self, i: usize) -> usize {
        2 * i + 2
    }
}

impl<T: PartialOrd> MinHeap<T> {
    /// Heapifies `source` in place, bottom-up from the last parent.
    pub fn build(source: Vec<T>) -> Self {
        let mut heap = MinHeap { elements: source };
        let n = heap.heap_size();
        for i in (0..n / 2).rev() {
            heap.sift_to_leaf(i);
        }
        heap
    }

    pub fn valid_min_heap(&self) -> bool {
        (1..self.heap_size()).all(|i| !(self.elements[i] < self.elements[self.parent(i)]))
    }

    pub fn insert(&mut self, value: T) {
        self.elements.push(value);
        let last = self.heap_size() - 1;
        self.sift_up(0, last);
    }

    pub fn extract_min(&mut self) -> Option<T> {
        let last = self.elements.pop()?;
        if self.elements.is_empty() {
            return Some(last);
        }
        let min = std::mem::replace(&mut self.elements[0], last);
        self.sift_to_leaf(0);
        Some(min)
    }

    /// Moves the element at `pos` towards the root while it is smaller than
    /// its parent, never above `start`.
    fn sift_up(&mut self, start: usize, mut pos: usize) {
        while pos > start {
            let parent = self.parent(pos);
            if self.elements[pos] < self.elements[parent] {
                self.elements.swap(pos, parent);
                pos = parent;
            } else {
                break;
            }
        }
    }

    /// Pulls the smaller child up until `pos` reaches a leaf, then sifts the
    /// displaced element back up. Right child wins unless the left is
    /// strictly smaller.
    fn sift_to_leaf(&mut self, start: usize) {
        let n = self.heap_size();
        let mut pos = start;
        let mut child = self.left(pos);
        while child < n {
            let right = child + 1;
            if right < n && !(self.elements[child] < self.elements[right]) {
                child = right;
            }
            self.elements.swap(pos, child);
            pos = child;
            child = self.left(pos);
        }
        self.sift_up(start, pos);
    }
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    #[test]
    fn extracts_in_sorted_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let values: Vec<u32> = (0..500).map(|_| rng.gen_range(0..100)).collect();

        let mut heap = MinHeap::build(values.clone());
        assert!(heap.valid_min_heap());

        let mut sorted = values;
        sorted.sort();

        let mut drained = Vec::new();
        while let Some(v) = heap.extract_min() {
            drained.push(v);
        }
        assert_eq!(drained, sorted);
    }

    #[test]
    fn insert_keeps_heap_property() {
        let mut heap = MinHeap::new();
        for v in [5, 3, 9, 1, 1, 7, 0, 4] {
            heap.insert(v);
            assert!(heap.valid_min_heap());
        }
        assert_eq!(heap.heap_size(), 8);
        assert_eq!(heap.extract_min(), Some(0));
        assert_eq!(heap.extract_min(), Some(1));
    }

    #[test]
    fn empty_heap_yields_none() {
        let mut heap: MinHeap<u8> = MinHeap::default();
        assert!(heap.is_empty());
        assert_eq!(heap.extract_min(), None);
    }

    #[derive(Debug, Clone, Copy)]
    struct Keyed(u32, char);

    impl PartialEq for Keyed {
        fn eq(&self, other: &Self) -> bool {
            self.0 == other.0
        }
    }

    impl PartialOrd for Keyed {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            self.0.partial_cmp(&other.0)
        }
    }

    #[test]
    fn ties_follow_sift_order() {
        // seeded as h, e, l, o the way "hello" is first seen
        let mut heap = MinHeap::build(vec![
            Keyed(1, 'h'),
            Keyed(1, 'e'),
            Keyed(2, 'l'),
            Keyed(1, 'o'),
        ]);

        let order: Vec<char> = std::iter::from_fn(|| heap.extract_min())
            .map(|k| k.1)
            .collect();
        assert_eq!(order, vec!['o', 'e', 'h', 'l']);
    }
}
