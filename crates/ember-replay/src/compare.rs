//! Trace comparison for determinism verification.
//!
//! Hash-first per-frame comparison: cheap on matching traces, precise
//! about where two runs first disagree when they do.

use crate::frame::FrameTrace;
use crate::hash::frame_hash;

/// The first point at which two traces disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceDivergence {
    /// Index of the first diverging frame. When the traces have
    /// different lengths and agree on their common prefix, this is the
    /// length of the shorter trace.
    pub frame_index: usize,
    /// Frame hash from the first trace, if it has a frame there.
    pub recorded: Option<u64>,
    /// Frame hash from the second trace, if it has a frame there.
    pub replayed: Option<u64>,
}

/// Compare two traces frame by frame and report the first divergence,
/// or `None` when the traces match exactly.
///
/// # Examples
///
/// ```
/// use ember_replay::{first_divergence, FrameTrace};
///
/// let a = FrameTrace::new(42, 8, 6);
/// let b = FrameTrace::new(42, 8, 6);
/// assert_eq!(first_divergence(&a, &b), None);
/// ```
pub fn first_divergence(a: &FrameTrace, b: &FrameTrace) -> Option<TraceDivergence> {
    let common = a.frames.len().min(b.frames.len());
    for i in 0..common {
        let ha = frame_hash(&a.frames[i]);
        let hb = frame_hash(&b.frames[i]);
        if ha != hb {
            return Some(TraceDivergence {
                frame_index: i,
                recorded: Some(ha),
                replayed: Some(hb),
            });
        }
    }
    if a.frames.len() != b.frames.len() {
        return Some(TraceDivergence {
            frame_index: common,
            recorded: a.frames.get(common).map(frame_hash),
            replayed: b.frames.get(common).map(frame_hash),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use ember_core::RunStats;

    fn frame(step: u32, saved: u32) -> Frame {
        Frame {
            step,
            agents: vec![],
            hazards: vec![],
            pois: vec![],
            walls: vec![0; 4],
            doors: vec![],
            stats: RunStats {
                saved,
                ..RunStats::default()
            },
        }
    }

    #[test]
    fn identical_traces_do_not_diverge() {
        let mut a = FrameTrace::new(1, 2, 2);
        a.frames.push(frame(0, 0));
        a.frames.push(frame(1, 1));
        let b = a.clone();
        assert_eq!(first_divergence(&a, &b), None);
    }

    #[test]
    fn reports_first_differing_frame() {
        let mut a = FrameTrace::new(1, 2, 2);
        let mut b = FrameTrace::new(1, 2, 2);
        a.frames.push(frame(0, 0));
        b.frames.push(frame(0, 0));
        a.frames.push(frame(1, 1));
        b.frames.push(frame(1, 2));

        let d = first_divergence(&a, &b).unwrap();
        assert_eq!(d.frame_index, 1);
        assert_ne!(d.recorded, d.replayed);
    }

    #[test]
    fn length_mismatch_diverges_at_the_shorter_end() {
        let mut a = FrameTrace::new(1, 2, 2);
        let mut b = FrameTrace::new(1, 2, 2);
        a.frames.push(frame(0, 0));
        b.frames.push(frame(0, 0));
        b.frames.push(frame(1, 0));

        let d = first_divergence(&a, &b).unwrap();
        assert_eq!(d.frame_index, 1);
        assert_eq!(d.recorded, None);
        assert!(d.replayed.is_some());
    }
}
