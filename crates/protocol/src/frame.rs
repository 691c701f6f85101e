/// A bit-sequence segment that matched the access address on exactly one
/// phase subsequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCandidate {
    /// The matched phase subsequence, access address included.
    pub bits: Vec<u8>,
    /// Which of the k phase subsequences matched.
    pub phase: usize,
    /// Index of the originating preamble-split segment.
    pub segment: usize,
}

/// Outcome for one preamble-split segment that matched the access address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResult {
    Candidate(FrameCandidate),
    /// More than one phase subsequence matched the access address. The
    /// detection is ambiguous and must be surfaced, not resolved by fiat.
    Ambiguous { segment: usize },
}

/// Preamble/access-address frame synchronizer.
///
/// The bit sequence is delimiter-split at every exact, non-overlapping
/// preamble occurrence, and each segment is tested on its k phase
/// subsequences (k = oversampling ratio) against the access address.
///
/// Delimiter splitting is the documented baseline behavior: a preamble
/// pattern that happens to recur inside payload data splits the frame and
/// the candidate is lost. A sliding correlation search would avoid that
/// false negative.
pub struct FrameSync {
    preamble: Vec<u8>,
    access_address: Vec<u8>,
    oversampling: usize,
}

impl FrameSync {
    pub fn new(preamble: Vec<u8>, access_address: Vec<u8>, oversampling: usize) -> Self {
        assert!(oversampling >= 1, "oversampling ratio must be at least 1");
        Self {
            preamble,
            access_address,
            oversampling,
        }
    }

    /// Scan `bits` for frame candidates, in encounter order.
    ///
    /// Each segment between preamble occurrences contributes at most one
    /// entry: a candidate when exactly one phase subsequence starts with
    /// the access address, or [`SyncResult::Ambiguous`] when several do.
    pub fn synchronize(&self, bits: &[u8]) -> Vec<SyncResult> {
        let mut results = Vec::new();

        for (segment, chunk) in split_on(bits, &self.preamble).into_iter().enumerate() {
            let mut matched: Vec<FrameCandidate> = Vec::new();

            for phase in 0..self.oversampling {
                let sub: Vec<u8> = chunk
                    .iter()
                    .skip(phase)
                    .step_by(self.oversampling)
                    .copied()
                    .collect();
                if sub.starts_with(&self.access_address) {
                    matched.push(FrameCandidate {
                        bits: sub,
                        phase,
                        segment,
                    });
                }
            }

            match matched.len() {
                0 => {}
                1 => results.push(SyncResult::Candidate(matched.remove(0))),
                _ => results.push(SyncResult::Ambiguous { segment }),
            }
        }

        results
    }
}

/// Split `bits` at each exact, non-overlapping occurrence of `pattern`,
/// returning the segments between delimiters (leading and trailing
/// segments included, as with `str::split`).
fn split_on<'a>(bits: &'a [u8], pattern: &[u8]) -> Vec<&'a [u8]> {
    if pattern.is_empty() || bits.len() < pattern.len() {
        return vec![bits];
    }

    let mut segments = Vec::new();
    let mut segment_start = 0;
    let mut i = 0;
    while i + pattern.len() <= bits.len() {
        if &bits[i..i + pattern.len()] == pattern {
            segments.push(&bits[segment_start..i]);
            i += pattern.len();
            segment_start = i;
        } else {
            i += 1;
        }
    }
    segments.push(&bits[segment_start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{access_address_bits, preamble_bits, BLE_ADV_AA};

    fn sync_2x() -> FrameSync {
        FrameSync::new(preamble_bits(2), access_address_bits(BLE_ADV_AA), 2)
    }

    /// Interleave `payload` at phase `phase` of a k=2 stream, with `filler`
    /// occupying the other phase.
    fn interleave(payload: &[u8], filler: u8, phase: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(payload.len() * 2);
        for &bit in payload {
            if phase == 0 {
                out.push(bit);
                out.push(filler);
            } else {
                out.push(filler);
                out.push(bit);
            }
        }
        out
    }

    #[test]
    fn test_even_phase_frame_yields_one_candidate() {
        let aa = access_address_bits(BLE_ADV_AA);
        let payload: Vec<u8> = [1, 0, 0, 1, 1, 1, 0, 0].repeat(4);
        let mut frame_bits = aa.clone();
        frame_bits.extend_from_slice(&payload);

        let mut stream = preamble_bits(2);
        stream.extend(interleave(&frame_bits, 0, 0));

        let results = sync_2x().synchronize(&stream);
        assert_eq!(results.len(), 1, "expected exactly one candidate");
        match &results[0] {
            SyncResult::Candidate(c) => {
                assert_eq!(c.phase, 0);
                assert_eq!(c.bits, frame_bits);
            }
            other => panic!("expected candidate, got {:?}", other),
        }
    }

    #[test]
    fn test_odd_phase_frame_records_phase() {
        let aa = access_address_bits(BLE_ADV_AA);

        let mut stream = vec![1u8; 9]; // junk before the preamble
        stream.extend(preamble_bits(2));
        stream.extend(interleave(&aa, 0, 1));

        let results = sync_2x().synchronize(&stream);
        assert_eq!(results.len(), 1);
        match &results[0] {
            SyncResult::Candidate(c) => {
                assert_eq!(c.phase, 1);
                assert_eq!(c.bits, aa);
            }
            other => panic!("expected candidate, got {:?}", other),
        }
    }

    #[test]
    fn test_both_phases_matching_is_ambiguous() {
        let aa = access_address_bits(BLE_ADV_AA);

        // Each access-address bit doubled: both phase subsequences are the
        // access address itself.
        let mut stream = preamble_bits(2);
        for &bit in &aa {
            stream.push(bit);
            stream.push(bit);
        }

        let results = sync_2x().synchronize(&stream);
        assert_eq!(results.len(), 1);
        match &results[0] {
            SyncResult::Ambiguous { segment } => assert_eq!(*segment, 1),
            other => panic!("expected ambiguous, got {:?}", other),
        }
    }

    #[test]
    fn test_no_access_address_no_candidates() {
        let mut stream = preamble_bits(2);
        stream.extend(std::iter::repeat(0u8).take(128));
        assert!(sync_2x().synchronize(&stream).is_empty());
    }

    #[test]
    fn test_multiple_frames_in_encounter_order() {
        let aa = access_address_bits(BLE_ADV_AA);
        let first_frame: Vec<u8> = aa.iter().copied().chain([1, 1, 1, 1]).collect();
        let second_frame: Vec<u8> = aa.iter().copied().chain([0, 1, 1, 0]).collect();

        let mut stream = preamble_bits(2);
        stream.extend(interleave(&first_frame, 0, 0));
        stream.extend(preamble_bits(2));
        stream.extend(interleave(&second_frame, 0, 0));

        let results = sync_2x().synchronize(&stream);
        assert_eq!(results.len(), 2);
        match (&results[0], &results[1]) {
            (SyncResult::Candidate(a), SyncResult::Candidate(b)) => {
                assert_eq!(a.bits, first_frame);
                assert_eq!(b.bits, second_frame);
                assert!(a.segment < b.segment);
            }
            other => panic!("expected two candidates, got {:?}", other),
        }
    }

    #[test]
    fn test_oversampling_one_passes_segment_through() {
        let aa = access_address_bits(BLE_ADV_AA);
        let sync = FrameSync::new(preamble_bits(1), aa.clone(), 1);

        let mut stream = preamble_bits(1);
        stream.extend(&aa);
        stream.extend([1, 0, 1, 1]);

        let results = sync.synchronize(&stream);
        assert_eq!(results.len(), 1);
        match &results[0] {
            SyncResult::Candidate(c) => {
                assert_eq!(c.phase, 0);
                assert_eq!(c.bits.len(), aa.len() + 4);
            }
            other => panic!("expected candidate, got {:?}", other),
        }
    }
}
