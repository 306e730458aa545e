//! Splitting a payload into frames.
//!
//! Frames are produced lazily from a shared [`Bytes`] payload, so each frame's
//! data is a cheap slice and a transfer of any size holds at most one frame at
//! a time. The sequence can be cloned or [rewound](Frames::rewind) to replay it
//! from the start.

use std::iter::FusedIterator;

use bytes::Bytes;

use crate::codec::{validate_chunk_capacity, Frame};
use crate::error::{FrameError, Result};
use crate::position::Position;

/// Most frames one transfer can span: the opening frame counts down from `u16::MAX`.
pub const MAX_FRAMES: usize = u16::MAX as usize + 1;

/// Number of frames a payload of `payload_len` bytes occupies. Never zero.
pub fn frame_count(payload_len: usize, chunk_capacity: usize) -> usize {
    payload_len.div_ceil(chunk_capacity).max(1)
}

/// Split `payload` into frames of at most `chunk_capacity` data bytes.
///
/// Fails before producing anything if the capacity is outside `1..=255` or the
/// payload needs more than [`MAX_FRAMES`] frames. An empty payload yields one
/// empty `Last` frame.
pub fn encode(payload: impl Into<Bytes>, report_id: u8, chunk_capacity: usize) -> Result<Frames> {
    validate_chunk_capacity(chunk_capacity)?;

    let payload = payload.into();
    let count = frame_count(payload.len(), chunk_capacity);
    if count > MAX_FRAMES {
        return Err(FrameError::TooManyFrames {
            size: payload.len(),
            frames: count,
            max: MAX_FRAMES,
        });
    }

    Ok(Frames {
        payload,
        report_id,
        chunk_capacity,
        count,
        next: 0,
    })
}

/// Ordered frames of one transfer.
#[derive(Debug, Clone)]
pub struct Frames {
    payload: Bytes,
    report_id: u8,
    chunk_capacity: usize,
    count: usize,
    next: usize,
}

impl Frames {
    /// Total frames in the transfer, independent of iteration progress.
    pub fn frame_count(&self) -> usize {
        self.count
    }

    pub fn report_id(&self) -> u8 {
        self.report_id
    }

    pub fn chunk_capacity(&self) -> usize {
        self.chunk_capacity
    }

    /// The payload being framed.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Restart from the first frame.
    pub fn rewind(&mut self) {
        self.next = 0;
    }

    /// Build frame `index` without advancing. `None` past the end.
    pub fn frame(&self, index: usize) -> Option<Frame> {
        if index >= self.count {
            return None;
        }

        let start = (index * self.chunk_capacity).min(self.payload.len());
        let end = (start + self.chunk_capacity).min(self.payload.len());
        // count <= MAX_FRAMES, so this fits in u16
        let remaining = (self.count - index - 1) as u16;

        // chunk_capacity was validated, so the slice fits the length byte
        Some(Frame::from_parts(
            self.report_id,
            Position::for_index(index, self.count),
            remaining,
            self.payload.slice(start..end),
        ))
    }
}

impl Iterator for Frames {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let frame = self.frame(self.next)?;
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next.min(self.count);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Frames {}

impl FusedIterator for Frames {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_frame;
    use crate::crc::checksum;

    fn collect(payload: &'static [u8], capacity: usize) -> Vec<Frame> {
        encode(Bytes::from_static(payload), 0x03, capacity)
            .unwrap()
            .collect()
    }

    fn reassemble(frames: &[Frame]) -> Vec<u8> {
        frames.iter().flat_map(|f| f.data().iter().copied()).collect()
    }

    #[test]
    fn single_frame_scenario() {
        let frames = collect(b"AB", 2);
        assert_eq!(frames.len(), 1);

        let frame = &frames[0];
        assert_eq!(frame.position, Position::Last);
        assert_eq!(frame.remaining, 0);
        assert_eq!(frame.length(), 2);
        assert_eq!(frame.data().as_ref(), b"AB");

        let expected_crc = checksum(&[0x20, 0x00, 0x00, 0x02, b'A', b'B']);
        let mut wire = vec![0x03, 0x20, 0x00, 0x00, 0x02, b'A', b'B'];
        wire.push(expected_crc);
        assert_eq!(frame.to_bytes().as_ref(), wire.as_slice());
    }

    #[test]
    fn three_frame_scenario() {
        let frames = collect(b"ABCDE", 2);

        let remaining: Vec<u16> = frames.iter().map(|f| f.remaining).collect();
        let positions: Vec<Position> = frames.iter().map(|f| f.position).collect();
        let data: Vec<&[u8]> = frames.iter().map(|f| f.data().as_ref()).collect();
        let lengths: Vec<u8> = frames.iter().map(Frame::length).collect();

        assert_eq!(remaining, vec![2, 1, 0]);
        assert_eq!(
            positions,
            vec![Position::First, Position::Middle, Position::Last]
        );
        assert_eq!(data, vec![&b"AB"[..], &b"CD"[..], &b"E"[..]]);
        assert_eq!(lengths, vec![2, 2, 1]);

        let crcs: Vec<u8> = frames.iter().map(|f| *f.to_bytes().last().unwrap()).collect();
        assert_eq!(crcs, vec![0x79, 0x7D, 0xAD]);
    }

    #[test]
    fn empty_payload_emits_one_empty_last_frame() {
        let frames = collect(b"", 43);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].position, Position::Last);
        assert_eq!(frames[0].remaining, 0);
        assert_eq!(frames[0].length(), 0);
        assert!(frames[0].data().is_empty());
    }

    #[test]
    fn frame_count_formula() {
        assert_eq!(frame_count(0, 4), 1);
        assert_eq!(frame_count(1, 4), 1);
        assert_eq!(frame_count(4, 4), 1);
        assert_eq!(frame_count(5, 4), 2);
        assert_eq!(frame_count(23000, 43), 535);
    }

    #[test]
    fn boundary_lengths_roundtrip_and_invariants() {
        let capacity = 7usize;
        let source: Vec<u8> = (0..=255u8).collect();

        for len in [0, 1, capacity - 1, capacity, capacity + 1, 3 * capacity, 5 * capacity + 4] {
            let payload = Bytes::copy_from_slice(&source[..len]);
            let frames: Vec<Frame> = encode(payload.clone(), 0x03, capacity).unwrap().collect();
            let n = frames.len();

            let expected_n = if len == 0 { 1 } else { len.div_ceil(capacity) };
            assert_eq!(n, expected_n, "len {len}");

            for (i, frame) in frames.iter().enumerate() {
                assert_eq!(frame.remaining as usize, n - i - 1, "len {len} frame {i}");
                assert_eq!(frame.report_id, 0x03);
                if i + 1 < n {
                    assert_eq!(frame.length() as usize, capacity);
                } else {
                    assert_eq!(frame.length() as usize, len - capacity * (n - 1));
                }
            }

            let lasts = frames.iter().filter(|f| f.position == Position::Last).count();
            let firsts = frames.iter().filter(|f| f.position == Position::First).count();
            assert_eq!(lasts, 1);
            assert_eq!(firsts, usize::from(n > 1));
            assert!(frames[1..n.saturating_sub(1).max(1)]
                .iter()
                .all(|f| f.position == Position::Middle));

            assert_eq!(reassemble(&frames), payload.as_ref(), "len {len}");
        }
    }

    #[test]
    fn encoded_frames_decode() {
        for frame in collect(b"The quick brown fox jumps over the lazy dog", 10) {
            let decoded = decode_frame(&frame.to_bytes(), 0x03).unwrap();
            assert_eq!(decoded, frame);
        }
    }

    #[test]
    fn zero_capacity_rejected() {
        let err = encode(Bytes::from_static(b"abc"), 0x03, 0).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidChunkCapacity { capacity: 0, .. }
        ));
    }

    #[test]
    fn capacity_above_length_field_rejected() {
        let err = encode(Bytes::from_static(b"abc"), 0x03, 256).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidChunkCapacity { capacity: 256, .. }
        ));
        assert!(encode(Bytes::from_static(b"abc"), 0x03, 255).is_ok());
    }

    #[test]
    fn too_many_frames_rejected() {
        let payload = Bytes::from(vec![0u8; MAX_FRAMES + 1]);
        let err = encode(payload, 0x03, 1).unwrap_err();
        assert!(matches!(
            err,
            FrameError::TooManyFrames {
                frames: 65537,
                max: 65536,
                ..
            }
        ));
    }

    #[test]
    fn max_frames_accepted() {
        let payload = Bytes::from(vec![0u8; MAX_FRAMES]);
        let mut frames = encode(payload, 0x03, 1).unwrap();
        assert_eq!(frames.len(), MAX_FRAMES);

        let first = frames.next().unwrap();
        assert_eq!(first.remaining, u16::MAX);
        assert_eq!(first.position, Position::First);
        assert_eq!(frames.last().unwrap().remaining, 0);
    }

    #[test]
    fn frames_are_restartable() {
        let mut frames = encode(Bytes::from_static(b"ABCDE"), 0x03, 2).unwrap();
        let replay = frames.clone();

        let first_pass: Vec<Frame> = frames.by_ref().collect();
        assert_eq!(frames.len(), 0);
        assert!(frames.next().is_none());

        frames.rewind();
        let second_pass: Vec<Frame> = frames.collect();
        let cloned_pass: Vec<Frame> = replay.collect();

        assert_eq!(first_pass, second_pass);
        assert_eq!(first_pass, cloned_pass);
    }

    #[test]
    fn exact_size_tracks_progress() {
        let mut frames = encode(Bytes::from_static(b"ABCDE"), 0x03, 2).unwrap();
        assert_eq!(frames.len(), 3);
        frames.next();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames.frame_count(), 3);
        assert!(frames.frame(3).is_none());
    }

    #[test]
    fn encode_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Frames>();

        let payload = Bytes::from_static(b"shared payload across threads");
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let payload = payload.clone();
                std::thread::spawn(move || encode(payload, 0x03, 4).unwrap().count())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 8);
        }
    }
}
