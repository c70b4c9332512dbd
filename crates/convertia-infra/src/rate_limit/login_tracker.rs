use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Window over which failures count toward a lockout.
const FAILURE_WINDOW: Duration = Duration::from_secs(3600);
/// Records untouched for this long are pruned entirely, resetting
/// lockout escalation.
const RETENTION: Duration = Duration::from_secs(24 * 3600);
/// Failures from one IP within the window that mark it suspicious.
const IP_FAILURE_THRESHOLD: usize = 10;
/// Distinct accounts targeted from one IP that mark it suspicious.
const IP_TARGET_THRESHOLD: usize = 5;

/// Whether an account may attempt a login right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutStatus {
    Unlocked,
    Locked { remaining_secs: u64 },
}

impl LockoutStatus {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockoutStatus::Locked { .. })
    }
}

#[derive(Debug, Default)]
struct AccountRecord {
    failures: Vec<Instant>,
    locked_until: Option<Instant>,
    /// Completed lockouts; drives the exponential duration of the next one.
    lockout_count: u32,
    last_activity: Option<Instant>,
}

#[derive(Debug, Default)]
struct IpRecord {
    /// (when, which account) per failed attempt.
    failures: Vec<(Instant, String)>,
}

/// Tracks login failures per account and per source IP.
///
/// Accounts lock after too many failures inside the window; the lock
/// duration doubles with each consecutive lockout up to a cap. A
/// successful login clears the account's failure history. Per-IP tracking
/// is advisory only and never locks anything by itself.
pub struct LoginAttemptTracker {
    state: Mutex<TrackerState>,
    max_failures: u32,
    base_lock_secs: u64,
    cap_lock_secs: u64,
}

#[derive(Default)]
struct TrackerState {
    accounts: HashMap<String, AccountRecord>,
    ips: HashMap<String, IpRecord>,
}

/// Lockout duration for the nth consecutive lockout (0-based).
fn lock_duration(lockout_count: u32, base_secs: u64, cap_secs: u64) -> Duration {
    let secs = 2u64
        .checked_pow(lockout_count)
        .and_then(|factor| base_secs.checked_mul(factor))
        .unwrap_or(cap_secs)
        .min(cap_secs);
    Duration::from_secs(secs)
}

impl LoginAttemptTracker {
    pub fn new(max_failures: u32, base_lock_secs: u64, cap_lock_secs: u64) -> Self {
        Self {
            state: Mutex::new(TrackerState::default()),
            max_failures: max_failures.max(1),
            base_lock_secs,
            cap_lock_secs,
        }
    }

    /// Record a login attempt and return the account's resulting status.
    ///
    /// Status transitions and the counter increment happen under one lock
    /// acquisition, so concurrent attempts cannot both slip under the
    /// failure threshold.
    pub async fn record_attempt(&self, identifier: &str, ip: &str, success: bool) -> LockoutStatus {
        self.record_attempt_at(identifier, ip, success, Instant::now())
            .await
    }

    async fn record_attempt_at(
        &self,
        identifier: &str,
        ip: &str,
        success: bool,
        now: Instant,
    ) -> LockoutStatus {
        let mut state = self.state.lock().await;
        state.prune(now);

        // Per-IP tracking is independent of per-account state: failures
        // against an already-locked account still count toward the IP's
        // stuffing score.
        if !success {
            state
                .ips
                .entry(ip.to_string())
                .or_default()
                .failures
                .push((now, identifier.to_string()));
        }

        let account = state.accounts.entry(identifier.to_string()).or_default();
        account.last_activity = Some(now);

        if let Some(locked_until) = account.locked_until {
            if now < locked_until {
                return LockoutStatus::Locked {
                    remaining_secs: remaining_secs(locked_until, now),
                };
            }
            // Lock expired: the slate is clean, but the escalation counter
            // survives until the record ages out of retention.
            account.locked_until = None;
            account.failures.clear();
        }

        if success {
            account.failures.clear();
            return LockoutStatus::Unlocked;
        }

        account.failures.push(now);
        account
            .failures
            .retain(|at| now.duration_since(*at) < FAILURE_WINDOW);

        if account.failures.len() as u32 >= self.max_failures {
            let duration =
                lock_duration(account.lockout_count, self.base_lock_secs, self.cap_lock_secs);
            account.locked_until = Some(now + duration);
            account.lockout_count += 1;
            warn!(
                identifier,
                lockout_secs = duration.as_secs(),
                consecutive_lockouts = account.lockout_count,
                "account locked after repeated login failures"
            );
            LockoutStatus::Locked {
                remaining_secs: duration.as_secs(),
            }
        } else {
            LockoutStatus::Unlocked
        }
    }

    /// Current status without recording an attempt.
    pub async fn lockout_status(&self, identifier: &str) -> LockoutStatus {
        self.lockout_status_at(identifier, Instant::now()).await
    }

    async fn lockout_status_at(&self, identifier: &str, now: Instant) -> LockoutStatus {
        let state = self.state.lock().await;
        match state
            .accounts
            .get(identifier)
            .and_then(|account| account.locked_until)
        {
            Some(locked_until) if now < locked_until => LockoutStatus::Locked {
                remaining_secs: remaining_secs(locked_until, now),
            },
            _ => LockoutStatus::Unlocked,
        }
    }

    /// Advisory: has this IP shown credential-stuffing behavior in the
    /// window. Never blocks on its own.
    pub async fn is_ip_suspicious(&self, ip: &str) -> bool {
        self.is_ip_suspicious_at(ip, Instant::now()).await
    }

    async fn is_ip_suspicious_at(&self, ip: &str, now: Instant) -> bool {
        let state = self.state.lock().await;
        let Some(record) = state.ips.get(ip) else {
            return false;
        };

        let recent: Vec<&String> = record
            .failures
            .iter()
            .filter(|(at, _)| now.duration_since(*at) < FAILURE_WINDOW)
            .map(|(_, target)| target)
            .collect();

        if recent.len() >= IP_FAILURE_THRESHOLD {
            return true;
        }

        let mut targets: Vec<&String> = recent;
        targets.sort();
        targets.dedup();
        targets.len() >= IP_TARGET_THRESHOLD
    }
}

/// Ceiling of the remaining lock time, never reported as zero while locked.
fn remaining_secs(locked_until: Instant, now: Instant) -> u64 {
    locked_until.duration_since(now).as_secs().max(1)
}

impl TrackerState {
    /// Drop records untouched for the retention period. Runs on every
    /// write rather than on a timer so the maps stay bounded without a
    /// background task.
    fn prune(&mut self, now: Instant) {
        self.accounts.retain(|_, account| {
            let stale = account
                .last_activity
                .is_none_or(|at| now.duration_since(at) >= RETENTION);
            let still_locked = account
                .locked_until
                .is_some_and(|until| now < until);
            !stale || still_locked
        });
        self.ips.retain(|_, record| {
            record
                .failures
                .retain(|(at, _)| now.duration_since(*at) < RETENTION);
            !record.failures.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> LoginAttemptTracker {
        LoginAttemptTracker::new(5, 300, 3600)
    }

    #[test]
    fn test_lock_duration_doubles_to_cap() {
        let secs: Vec<u64> = (0..6)
            .map(|n| lock_duration(n, 300, 3600).as_secs())
            .collect();
        assert_eq!(secs, vec![300, 600, 1200, 2400, 3600, 3600]);
    }

    #[test]
    fn test_lock_duration_overflow_saturates_at_cap() {
        assert_eq!(lock_duration(64, 300, 3600).as_secs(), 3600);
        assert_eq!(lock_duration(u32::MAX, 300, 3600).as_secs(), 3600);
    }

    #[tokio::test]
    async fn test_failures_below_threshold_stay_unlocked() {
        let tracker = tracker();
        for _ in 0..4 {
            let status = tracker.record_attempt("alice", "10.0.0.1", false).await;
            assert_eq!(status, LockoutStatus::Unlocked);
        }
        assert_eq!(
            tracker.lockout_status("alice").await,
            LockoutStatus::Unlocked
        );
    }

    #[tokio::test]
    async fn test_fifth_failure_locks_for_base_duration() {
        let tracker = tracker();
        for _ in 0..4 {
            tracker.record_attempt("alice", "10.0.0.1", false).await;
        }
        let status = tracker.record_attempt("alice", "10.0.0.1", false).await;
        assert_eq!(status, LockoutStatus::Locked { remaining_secs: 300 });
        assert!(tracker.lockout_status("alice").await.is_locked());
    }

    #[tokio::test]
    async fn test_success_clears_failure_history() {
        let tracker = tracker();
        for _ in 0..4 {
            tracker.record_attempt("alice", "10.0.0.1", false).await;
        }
        tracker.record_attempt("alice", "10.0.0.1", true).await;
        // Four more failures fit before the threshold again.
        for _ in 0..4 {
            let status = tracker.record_attempt("alice", "10.0.0.1", false).await;
            assert_eq!(status, LockoutStatus::Unlocked);
        }
    }

    #[tokio::test]
    async fn test_attempts_during_lockout_report_remaining_time() {
        let tracker = tracker();
        for _ in 0..5 {
            tracker.record_attempt("alice", "10.0.0.1", false).await;
        }
        let status = tracker.record_attempt("alice", "10.0.0.1", false).await;
        match status {
            LockoutStatus::Locked { remaining_secs } => {
                assert!(remaining_secs > 0 && remaining_secs <= 300);
            }
            LockoutStatus::Unlocked => panic!("expected lockout to persist"),
        }
    }

    #[tokio::test]
    async fn test_second_lockout_doubles() {
        let tracker = tracker();
        let start = Instant::now();
        for _ in 0..5 {
            tracker
                .record_attempt_at("alice", "10.0.0.1", false, start)
                .await;
        }
        // After the first 300 s lock expires, five fresh failures lock
        // again for twice as long.
        let after_unlock = start + Duration::from_secs(301);
        let mut status = LockoutStatus::Unlocked;
        for _ in 0..5 {
            status = tracker
                .record_attempt_at("alice", "10.0.0.1", false, after_unlock)
                .await;
        }
        assert_eq!(status, LockoutStatus::Locked { remaining_secs: 600 });
    }

    #[tokio::test]
    async fn test_lock_expiry_clears_failure_history() {
        let tracker = tracker();
        let start = Instant::now();
        for _ in 0..5 {
            tracker
                .record_attempt_at("alice", "10.0.0.1", false, start)
                .await;
        }
        let after_unlock = start + Duration::from_secs(301);
        let status = tracker
            .record_attempt_at("alice", "10.0.0.1", false, after_unlock)
            .await;
        assert_eq!(status, LockoutStatus::Unlocked);
    }

    #[tokio::test]
    async fn test_retention_prunes_escalation() {
        let tracker = tracker();
        let start = Instant::now();
        for _ in 0..5 {
            tracker
                .record_attempt_at("alice", "10.0.0.1", false, start)
                .await;
        }
        // A day later the record is gone and the next lockout starts at
        // the base duration again.
        let next_day = start + RETENTION + Duration::from_secs(1);
        let mut status = LockoutStatus::Unlocked;
        for _ in 0..5 {
            status = tracker
                .record_attempt_at("alice", "10.0.0.1", false, next_day)
                .await;
        }
        assert_eq!(status, LockoutStatus::Locked { remaining_secs: 300 });
    }

    #[tokio::test]
    async fn test_ip_suspicious_by_failure_volume() {
        let tracker = tracker();
        // Spread over two accounts so neither locks before ten failures land.
        for i in 0..10 {
            let account = if i % 2 == 0 { "alice" } else { "bob" };
            tracker.record_attempt(account, "10.0.0.9", false).await;
        }
        assert!(tracker.is_ip_suspicious("10.0.0.9").await);
    }

    #[tokio::test]
    async fn test_failures_against_locked_account_still_count_toward_ip() {
        let tracker = tracker();
        for _ in 0..5 {
            tracker.record_attempt("alice", "10.0.0.9", false).await;
        }
        // The account is locked but the spray keeps hitting it; the IP's
        // score keeps climbing regardless.
        for _ in 0..5 {
            let status = tracker.record_attempt("alice", "10.0.0.9", false).await;
            assert!(status.is_locked());
        }
        assert!(tracker.is_ip_suspicious("10.0.0.9").await);
    }

    #[tokio::test]
    async fn test_ip_suspicious_by_distinct_targets() {
        let tracker = tracker();
        for account in ["a", "b", "c", "d", "e"] {
            tracker.record_attempt(account, "10.0.0.9", false).await;
        }
        assert!(tracker.is_ip_suspicious("10.0.0.9").await);
    }

    #[tokio::test]
    async fn test_ip_not_suspicious_below_thresholds() {
        let tracker = tracker();
        for account in ["a", "b", "c", "d"] {
            tracker.record_attempt(account, "10.0.0.9", false).await;
        }
        assert!(!tracker.is_ip_suspicious("10.0.0.9").await);
        assert!(!tracker.is_ip_suspicious("10.0.0.99").await);
    }
}
