//! Determinism verification: identical inputs must produce
//! byte-identical frame traces, across strategies and trace detail
//! levels.

use ember_board::MapLayout;
use ember_core::PoiKind;
use ember_engine::{RescueWorld, RunConfig, Strategy, TraceDetail};
use ember_replay::{first_divergence, trace_hash, FrameTrace};

// ── Helpers ─────────────────────────────────────────────────────

fn base_config(seed: u64, strategy: Strategy) -> RunConfig {
    let mut layout = MapLayout::open_floor(8, 6);
    layout.pois.push((ember_core::Cell::new(4, 3), PoiKind::Victim));
    let mut config = RunConfig::new(layout);
    config.seed = seed;
    config.strategy = strategy;
    config.max_steps = 60;
    config
}

fn play(config: RunConfig) -> FrameTrace {
    RescueWorld::new(config).unwrap().run().trace
}

fn assert_identical(a: &FrameTrace, b: &FrameTrace) {
    if let Some(d) = first_divergence(a, b) {
        panic!(
            "determinism failure at frame {}: recorded={:?}, replayed={:?}",
            d.frame_index, d.recorded, d.replayed,
        );
    }
    assert_eq!(a, b, "hashes matched but traces differ structurally");
}

// ── Tests ───────────────────────────────────────────────────────

#[test]
fn same_seed_same_trace_random_crew() {
    let a = play(base_config(11, Strategy::Random));
    let b = play(base_config(11, Strategy::Random));
    assert_identical(&a, &b);
}

#[test]
fn same_seed_same_trace_mixed_crew() {
    let a = play(base_config(12, Strategy::Mixed));
    let b = play(base_config(12, Strategy::Mixed));
    assert_identical(&a, &b);
    assert_eq!(trace_hash(&a), trace_hash(&b));
}

#[test]
fn same_seed_same_trace_with_shuffled_order() {
    let mut config = base_config(13, Strategy::Firefighters);
    config.shuffle_agents = true;
    let a = play(config.clone());
    let b = play(config);
    assert_identical(&a, &b);
}

#[test]
fn same_seed_same_trace_per_agent_detail() {
    let mut config = base_config(14, Strategy::Rescuers);
    config.trace_detail = TraceDetail::PerAgent;
    let a = play(config.clone());
    let b = play(config);
    assert_identical(&a, &b);
}

#[test]
fn different_seeds_diverge() {
    let a = play(base_config(20, Strategy::Random));
    let b = play(base_config(21, Strategy::Random));
    // Seeds are baked into the trace header, so the hashes always
    // differ; the interesting claim is that play itself diverged.
    assert_ne!(trace_hash(&a), trace_hash(&b));
    let stripped = |t: &FrameTrace| t.frames.clone();
    assert_ne!(
        stripped(&a),
        stripped(&b),
        "two seeds played out identically; RNG is not being consumed"
    );
}

#[test]
fn stepping_matches_run_to_completion() {
    let by_run = play(base_config(30, Strategy::Mixed));

    let mut world = RescueWorld::new(base_config(30, Strategy::Mixed)).unwrap();
    while world.is_running() {
        world.step();
    }
    assert_identical(&by_run, world.trace());
}
