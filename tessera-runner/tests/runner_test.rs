//! Runner state machine properties.
//!
//! Uses proptest to verify:
//! 1. A body that asks for `k` restarts runs `k + 1` times while `k` is
//!    within the bound, and fails after `max_restarts + 1` attempts otherwise
//! 2. Every executed variant sees exactly one `on_finished`, after its last
//!    `on_started`
//! 3. Summary counts add up to the number of variants

use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use tessera_core::{MethodId, Variant};
use tessera_runner::{LifecycleListener, Outcome, Runner, RunnerConfig, TestStatus};

#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<(String, &'static str)>>>);

impl LifecycleListener for Log {
    fn on_started(&mut self, v: &str) {
        self.0.lock().unwrap().push((v.to_string(), "started"));
    }
    fn on_restarted(&mut self, v: &str, _reason: &str) {
        self.0.lock().unwrap().push((v.to_string(), "restarted"));
    }
    fn on_finished(&mut self, v: &str) {
        self.0.lock().unwrap().push((v.to_string(), "finished"));
    }
}

fn variants(n: usize) -> Vec<Variant> {
    (0..n)
        .map(|i| Variant::new(MethodId::new("C", format!("m{i}")), None, Vec::new()))
        .collect()
}

// ── Strategies (proptest) ────────────────────────────────────────────

/// Per variant: restarts requested before finishing, and whether it passes.
fn arb_script() -> impl Strategy<Value = Vec<(u32, bool)>> {
    prop::collection::vec((0u32..6, any::<bool>()), 1..6)
}

proptest! {
    #[test]
    fn attempts_follow_restart_bound(restarts in 0u32..8, max in 0u32..5) {
        let mut runner = Runner::new(RunnerConfig { max_restarts: max, ..RunnerConfig::default() });
        let mut remaining = restarts;
        let mut body = |_: &Variant| {
            if remaining > 0 {
                remaining -= 1;
                Outcome::Retry("again".into())
            } else {
                Outcome::Done(TestStatus::Passed)
            }
        };
        let report = runner.run_variant(&variants(1)[0], &mut body);

        if restarts <= max {
            prop_assert_eq!(report.status, TestStatus::Passed);
            prop_assert_eq!(report.attempts, restarts + 1);
        } else {
            prop_assert!(report.status.is_failure());
            prop_assert_eq!(report.attempts, max + 1);
        }
    }

    #[test]
    fn each_variant_finishes_once_after_last_start(script in arb_script()) {
        let log = Log::default();
        let mut runner = Runner::default();
        runner.add_listener(log.clone());

        let vs = variants(script.len());
        let mut pending: Vec<u32> = script.iter().map(|(r, _)| *r).collect();
        let mut body = |v: &Variant| {
            let i: usize = v.name()[1..].parse().unwrap();
            if pending[i] > 0 {
                pending[i] -= 1;
                return Outcome::Retry("again".into());
            }
            if script[i].1 {
                Outcome::Done(TestStatus::Passed)
            } else {
                Outcome::Done(TestStatus::Failed("nope".into()))
            }
        };
        let summary = runner.run_all(&vs, &mut body);

        let events = log.0.lock().unwrap();
        for v in &vs {
            let name = v.qualified_name();
            let mine: Vec<&str> = events.iter().filter(|(n, _)| *n == name).map(|(_, e)| *e).collect();
            prop_assert_eq!(mine.iter().filter(|e| **e == "finished").count(), 1);
            prop_assert_eq!(mine.last().copied(), Some("finished"));
            prop_assert_eq!(mine[mine.len() - 2], "started");
        }
        prop_assert_eq!(summary.passed + summary.failed + summary.ignored + summary.skipped, vs.len());
    }
}
