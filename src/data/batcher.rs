// ============================================================
// Layer 4 — Q&A Batcher
// ============================================================
// Groups a stream of (image, QA pair) views into batches.
//
// How batching works here:
//   Input:  a lazy iterator of Result<item>
//   Output: Vec<item> of at most max_batch_size, in input order
//
//   [p1 p2 p3 p4 p5 p6 p7]  max_batch_size = 3
//       → [p1 p2 p3] [p4 p5 p6] [p7]
//
// The final partial batch is still yielded, so concatenating all
// batches gives back exactly the input sequence.
//
// The first error from the input is yielded on its own and ends
// the stream; items gathered before it are dropped with the batch.

/// Iterator adapter that collects items into fixed-size batches
pub struct QaBatcher<I> {
    inner:          I,
    max_batch_size: usize,
    done:           bool,
}

impl<I> QaBatcher<I> {
    /// Wrap `inner`. A batch size of 0 is treated as 1.
    pub fn new(inner: I, max_batch_size: usize) -> Self {
        Self {
            inner,
            max_batch_size: max_batch_size.max(1),
            done:           false,
        }
    }
}

impl<T, E, I> Iterator for QaBatcher<I>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = Result<Vec<T>, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut batch = Vec::with_capacity(self.max_batch_size);
        while batch.len() < self.max_batch_size {
            match self.inner.next() {
                Some(Ok(item)) => batch.push(item),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        if batch.is_empty() {
            None
        } else {
            Some(Ok(batch))
        }
    }
}
