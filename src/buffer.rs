use crate::model::Frame;

/// A bounded, ordered priority queue of [`Frame`]s, ascending by
/// `full_time`. Ties are broken by insertion order (the frame inserted
/// first sorts first).
///
/// Grounded in the original synchronizer's array-backed frame queues
/// (`add_frame`/`dump_frames`/`use_frame`/`peek_frame`, all of which only
/// ever operate on index 0) and in a jitter buffer's ordered insert,
/// adapted from sequence-number ordering to `full_time` ordering.
#[derive(Debug)]
pub struct SortedFrameBuffer {
    frames: Vec<Frame>,
    capacity: usize,
    next_seq: u64,
}

/// Returned by [`SortedFrameBuffer::insert`] when the buffer has no room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferFull;

impl SortedFrameBuffer {
    pub fn new(capacity: usize) -> Self {
        Self { frames: Vec::with_capacity(capacity), capacity, next_seq: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Insert `frame`, placing it after every existing frame with
    /// `full_time <=` its own so ties preserve insertion order. Returns
    /// `Err(BufferFull)` without inserting if the buffer is at capacity.
    pub fn insert(&mut self, mut frame: Frame) -> Result<(), BufferFull> {
        if self.frames.len() >= self.capacity {
            return Err(BufferFull);
        }
        frame.insertion_seq = self.next_seq;
        self.next_seq += 1;

        let pos = self
            .frames
            .iter()
            .rposition(|existing| existing.full_time <= frame.full_time)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.frames.insert(pos, frame);
        Ok(())
    }

    /// Look at the earliest frame without removing it.
    pub fn peek_head(&self) -> Option<&Frame> {
        self.frames.first()
    }

    /// Remove and return the earliest frame.
    pub fn pop_head(&mut self) -> Option<Frame> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.frames.remove(0))
        }
    }

    /// Remove every frame, in ascending order, passing each to `dispose`.
    pub fn drain(&mut self, mut dispose: impl FnMut(Frame)) {
        for frame in self.frames.drain(..) {
            dispose(frame);
        }
    }

    /// True if the buffer's contents are non-decreasing in `full_time`.
    /// Used by tests to check the insert invariant holds.
    #[cfg(test)]
    fn is_sorted(&self) -> bool {
        self.frames.windows(2).all(|pair| pair[0].full_time <= pair[1].full_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FrameKind, MediaKind};
    use quickcheck_macros::quickcheck;

    fn test_frame(full_time: i64) -> Frame {
        Frame {
            payload: vec![],
            pts_raw: full_time,
            dts_raw: None,
            full_time,
            duration: 0,
            first_timestamp: 0,
            source: 0,
            sub_stream: 0,
            sync_frame: false,
            media_kind: MediaKind::H264,
            frame_kind: FrameKind::Video,
            language_tag: [0; 4],
            insertion_seq: 0,
        }
    }

    #[test]
    fn pop_head_is_global_minimum() {
        let mut buf = SortedFrameBuffer::new(8);
        for t in [50, 10, 30, 20] {
            buf.insert(test_frame(t)).unwrap();
        }
        assert!(buf.is_sorted());
        assert_eq!(buf.pop_head().unwrap().full_time, 10);
        assert_eq!(buf.pop_head().unwrap().full_time, 20);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut buf = SortedFrameBuffer::new(8);
        buf.insert(test_frame(100)).unwrap();
        buf.insert(test_frame(100)).unwrap();
        buf.insert(test_frame(100)).unwrap();
        assert_eq!(buf.pop_head().unwrap().insertion_seq, 0);
        assert_eq!(buf.pop_head().unwrap().insertion_seq, 1);
        assert_eq!(buf.pop_head().unwrap().insertion_seq, 2);
    }

    #[test]
    fn rejects_insert_past_capacity() {
        let mut buf = SortedFrameBuffer::new(2);
        buf.insert(test_frame(1)).unwrap();
        buf.insert(test_frame(2)).unwrap();
        assert_eq!(buf.insert(test_frame(3)), Err(BufferFull));
    }

    #[test]
    fn drain_releases_every_frame() {
        let mut buf = SortedFrameBuffer::new(8);
        for t in [1, 2, 3] {
            buf.insert(test_frame(t)).unwrap();
        }
        let mut released = Vec::new();
        buf.drain(|f| released.push(f.full_time));
        assert_eq!(released, vec![1, 2, 3]);
        assert!(buf.is_empty());
    }

    #[quickcheck]
    fn insert_keeps_buffer_sorted(times: Vec<i64>) -> bool {
        let mut buf = SortedFrameBuffer::new(times.len().max(1) + 1);
        for t in times {
            let _ = buf.insert(test_frame(t));
        }
        buf.is_sorted()
    }
}
