//! FNV-1a hashing of frames and traces.
//!
//! Fast, deterministic, and not cryptographically secure — the hashes
//! exist for cheap equality checks in determinism tests and batch
//! result comparison, nothing more.

use ember_core::{DoorStatus, HazardState, PoiKind, Role};

use crate::frame::{Frame, FrameTrace};

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// Feed a single byte into an FNV-1a hash state.
#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

/// Feed an i32 (as 4 LE bytes) into an FNV-1a hash state.
#[inline]
fn fnv1a_i32(mut hash: u64, v: i32) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Feed a u32 (as 4 LE bytes) into an FNV-1a hash state.
#[inline]
fn fnv1a_u32(mut hash: u64, v: u32) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Feed a u64 (as 8 LE bytes) into an FNV-1a hash state.
#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

fn role_tag(role: Role) -> u8 {
    match role {
        Role::Base => 0,
        Role::Firefighter => 1,
        Role::Rescuer => 2,
    }
}

fn hazard_tag(state: HazardState) -> u8 {
    match state {
        HazardState::Smoke => 1,
        HazardState::Fire => 2,
    }
}

fn poi_tag(kind: PoiKind) -> u8 {
    match kind {
        PoiKind::Victim => 1,
        PoiKind::FalseAlarm => 2,
    }
}

fn door_tag(status: DoorStatus) -> u8 {
    match status {
        DoorStatus::Closed => 0,
        DoorStatus::Open => 1,
        DoorStatus::Destroyed => 2,
    }
}

/// Hash every field of a frame.
///
/// List order matters: two frames with the same markers in different
/// order hash differently, which is exactly what byte-identical replay
/// verification wants.
pub fn frame_hash(frame: &Frame) -> u64 {
    let mut hash = FNV_OFFSET;
    hash = fnv1a_u32(hash, frame.step);

    hash = fnv1a_u32(hash, frame.agents.len() as u32);
    for a in &frame.agents {
        hash = fnv1a_u32(hash, a.id.0);
        hash = fnv1a_i32(hash, a.x);
        hash = fnv1a_i32(hash, a.y);
        hash = fnv1a_byte(hash, a.carrying as u8);
        hash = fnv1a_byte(hash, role_tag(a.role));
    }

    hash = fnv1a_u32(hash, frame.hazards.len() as u32);
    for h in &frame.hazards {
        hash = fnv1a_i32(hash, h.x);
        hash = fnv1a_i32(hash, h.y);
        hash = fnv1a_byte(hash, hazard_tag(h.state));
    }

    hash = fnv1a_u32(hash, frame.pois.len() as u32);
    for p in &frame.pois {
        hash = fnv1a_i32(hash, p.x);
        hash = fnv1a_i32(hash, p.y);
        hash = fnv1a_byte(hash, poi_tag(p.kind));
        hash = fnv1a_byte(hash, p.revealed as u8);
    }

    for &mask in &frame.walls {
        hash = fnv1a_byte(hash, mask);
    }

    hash = fnv1a_u32(hash, frame.doors.len() as u32);
    for d in &frame.doors {
        hash = fnv1a_i32(hash, d.a.x);
        hash = fnv1a_i32(hash, d.a.y);
        hash = fnv1a_i32(hash, d.b.x);
        hash = fnv1a_i32(hash, d.b.y);
        hash = fnv1a_byte(hash, door_tag(d.status));
    }

    hash = fnv1a_u32(hash, frame.stats.saved);
    hash = fnv1a_u32(hash, frame.stats.lost);
    hash = fnv1a_u32(hash, frame.stats.damage);
    hash
}

/// Hash a whole trace: the reproduction inputs plus every frame hash.
pub fn trace_hash(trace: &FrameTrace) -> u64 {
    let mut hash = FNV_OFFSET;
    hash = fnv1a_u64(hash, trace.seed);
    hash = fnv1a_i32(hash, trace.width);
    hash = fnv1a_i32(hash, trace.height);
    for frame in &trace.frames {
        hash = fnv1a_u64(hash, frame_hash(frame));
    }
    hash
}
