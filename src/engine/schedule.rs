//! Schedule evaluation
//!
//! Decides, for a published post, which checkpoint kinds are expected,
//! which are still outstanding, and what state each kind is in. Every
//! function takes the wall-clock `now` explicitly so callers control time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

use super::catalog::CheckpointKind;
use crate::data::Checkpoint;

/// Set of kinds already captured for a post
pub type CapturedKinds = BTreeSet<CheckpointKind>;

/// Schedule state of one checkpoint kind for one post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointStatus {
    /// Expected and captured
    Completed,
    /// Expected, not captured, and past its grace window
    Missed,
    /// Expected, not captured, still inside its grace window
    Upcoming,
    /// Threshold not reached yet
    NotApplicable,
}

/// Collect the kinds present in a list of checkpoints.
///
/// Rows with an unrecognized kind label are skipped.
pub fn captured_kinds(checkpoints: &[Checkpoint]) -> CapturedKinds {
    checkpoints
        .iter()
        .filter_map(Checkpoint::checkpoint_kind)
        .collect()
}

fn is_expected(kind: CheckpointKind, published_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - published_at >= kind.threshold()
}

/// Kinds whose threshold has elapsed, in catalog order.
pub fn expected_kinds(published_at: DateTime<Utc>, now: DateTime<Utc>) -> Vec<CheckpointKind> {
    CheckpointKind::ALL
        .into_iter()
        .filter(|kind| is_expected(*kind, published_at, now))
        .collect()
}

/// Expected kinds that have not been captured, in catalog order.
pub fn missed_kinds(
    published_at: DateTime<Utc>,
    captured: &CapturedKinds,
    now: DateTime<Utc>,
) -> Vec<CheckpointKind> {
    expected_kinds(published_at, now)
        .into_iter()
        .filter(|kind| !captured.contains(kind))
        .collect()
}

/// Earliest outstanding kind, if any.
pub fn next_suggested_kind(
    published_at: DateTime<Utc>,
    captured: &CapturedKinds,
    now: DateTime<Utc>,
) -> Option<CheckpointKind> {
    missed_kinds(published_at, captured, now).into_iter().next()
}

pub fn status_of(
    kind: CheckpointKind,
    published_at: DateTime<Utc>,
    captured: &CapturedKinds,
    now: DateTime<Utc>,
) -> CheckpointStatus {
    if !is_expected(kind, published_at, now) {
        return CheckpointStatus::NotApplicable;
    }

    if captured.contains(&kind) {
        return CheckpointStatus::Completed;
    }

    if now - published_at < kind.grace_window() {
        CheckpointStatus::Upcoming
    } else {
        CheckpointStatus::Missed
    }
}

/// One row of a post's checkpoint timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub kind: CheckpointKind,
    pub due_at: DateTime<Utc>,
    pub grace_ends_at: DateTime<Utc>,
    pub status: CheckpointStatus,
}

/// Schedule view of a single published post at a fixed instant
#[derive(Debug, Clone)]
pub struct PostSchedule {
    published_at: DateTime<Utc>,
    captured: CapturedKinds,
    now: DateTime<Utc>,
}

impl PostSchedule {
    pub fn new(published_at: DateTime<Utc>, captured: CapturedKinds, now: DateTime<Utc>) -> Self {
        Self {
            published_at,
            captured,
            now,
        }
    }

    /// Build a schedule from a post's stored checkpoints
    pub fn from_checkpoints(
        published_at: DateTime<Utc>,
        checkpoints: &[Checkpoint],
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(published_at, captured_kinds(checkpoints), now)
    }

    pub fn captured(&self) -> &CapturedKinds {
        &self.captured
    }

    pub fn expected_kinds(&self) -> Vec<CheckpointKind> {
        expected_kinds(self.published_at, self.now)
    }

    pub fn missed_kinds(&self) -> Vec<CheckpointKind> {
        missed_kinds(self.published_at, &self.captured, self.now)
    }

    pub fn next_suggested_kind(&self) -> Option<CheckpointKind> {
        next_suggested_kind(self.published_at, &self.captured, self.now)
    }

    pub fn status_of(&self, kind: CheckpointKind) -> CheckpointStatus {
        status_of(kind, self.published_at, &self.captured, self.now)
    }

    /// One entry per catalog kind
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        CheckpointKind::ALL
            .into_iter()
            .map(|kind| TimelineEntry {
                kind,
                due_at: kind.due_at(self.published_at),
                grace_ends_at: self.published_at + kind.grace_window(),
                status: self.status_of(kind),
            })
            .collect()
    }

    /// The earliest kind whose threshold has not been reached, with its due time
    pub fn next_due(&self) -> Option<(CheckpointKind, DateTime<Utc>)> {
        CheckpointKind::ALL
            .into_iter()
            .find(|kind| !is_expected(*kind, self.published_at, self.now))
            .map(|kind| (kind, kind.due_at(self.published_at)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn captured(kinds: &[CheckpointKind]) -> CapturedKinds {
        kinds.iter().copied().collect()
    }

    #[test]
    fn three_hours_after_publish_with_first_checkpoint_captured() {
        let published_at = now() - Duration::hours(3);
        let captured = captured(&[CheckpointKind::OneHour]);

        assert_eq!(
            missed_kinds(published_at, &captured, now()),
            vec![CheckpointKind::ThreeHours]
        );
        assert_eq!(
            next_suggested_kind(published_at, &captured, now()),
            Some(CheckpointKind::ThreeHours)
        );
        assert_eq!(
            status_of(CheckpointKind::OneHour, published_at, &captured, now()),
            CheckpointStatus::Completed
        );
        assert_eq!(
            status_of(CheckpointKind::SixHours, published_at, &captured, now()),
            CheckpointStatus::NotApplicable
        );
    }

    #[test]
    fn nothing_expected_before_first_threshold() {
        let published_at = now() - Duration::minutes(59);
        assert!(expected_kinds(published_at, now()).is_empty());
        assert_eq!(
            next_suggested_kind(published_at, &CapturedKinds::new(), now()),
            None
        );
    }

    #[test]
    fn future_publish_time_expects_nothing() {
        let published_at = now() + Duration::hours(5);
        assert!(expected_kinds(published_at, now()).is_empty());
    }

    #[test]
    fn threshold_instant_is_inclusive() {
        let published_at = now() - Duration::hours(1);
        assert_eq!(
            expected_kinds(published_at, now()),
            vec![CheckpointKind::OneHour]
        );
    }

    #[test]
    fn day_granular_kinds_follow_elapsed_days() {
        let published_at = now() - Duration::days(7) - Duration::minutes(1);
        let expected = expected_kinds(published_at, now());
        assert_eq!(expected.last(), Some(&CheckpointKind::SevenDays));
        assert_eq!(expected.len(), 7);
    }

    #[test]
    fn uncaptured_kind_is_upcoming_inside_grace_window() {
        let published_at = now() - Duration::minutes(90);
        assert_eq!(
            status_of(
                CheckpointKind::OneHour,
                published_at,
                &CapturedKinds::new(),
                now()
            ),
            CheckpointStatus::Upcoming
        );
    }

    #[test]
    fn uncaptured_kind_is_missed_after_grace_window() {
        let published_at = now() - Duration::hours(2);
        assert_eq!(
            status_of(
                CheckpointKind::OneHour,
                published_at,
                &CapturedKinds::new(),
                now()
            ),
            CheckpointStatus::Missed
        );

        let published_at = now() - Duration::hours(47);
        assert_eq!(
            status_of(
                CheckpointKind::OneDay,
                published_at,
                &CapturedKinds::new(),
                now()
            ),
            CheckpointStatus::Upcoming
        );
    }

    #[test]
    fn missed_is_subset_of_expected_and_disjoint_from_captured() {
        let captured = captured(&[
            CheckpointKind::ThreeHours,
            CheckpointKind::OneDay,
            CheckpointKind::FourteenDays,
        ]);

        for hours in [0, 1, 2, 3, 5, 6, 13, 24, 49, 170, 400, 800] {
            let published_at = now() - Duration::hours(hours);
            let expected = expected_kinds(published_at, now());
            let missed = missed_kinds(published_at, &captured, now());

            assert!(missed.iter().all(|kind| expected.contains(kind)));
            assert!(missed.iter().all(|kind| !captured.contains(kind)));
            assert_eq!(
                next_suggested_kind(published_at, &captured, now()),
                missed.iter().min().copied()
            );
        }
    }

    #[test]
    fn not_applicable_kinds_form_a_suffix() {
        for hours in [0, 2, 7, 30, 200, 1000] {
            let schedule = PostSchedule::new(
                now() - Duration::hours(hours),
                captured(&[CheckpointKind::OneHour]),
                now(),
            );
            let statuses: Vec<CheckpointStatus> = schedule
                .timeline()
                .into_iter()
                .map(|entry| entry.status)
                .collect();

            let first_na = statuses
                .iter()
                .position(|status| *status == CheckpointStatus::NotApplicable)
                .unwrap_or(statuses.len());
            assert!(
                statuses[first_na..]
                    .iter()
                    .all(|status| *status == CheckpointStatus::NotApplicable)
            );
        }
    }

    #[test]
    fn timeline_reports_due_times_and_next_due() {
        let published_at = now() - Duration::hours(4);
        let schedule = PostSchedule::new(published_at, CapturedKinds::new(), now());

        let timeline = schedule.timeline();
        assert_eq!(timeline.len(), CheckpointKind::ALL.len());
        assert_eq!(timeline[1].due_at, published_at + Duration::hours(3));
        assert_eq!(timeline[1].grace_ends_at, published_at + Duration::hours(6));

        assert_eq!(
            schedule.next_due(),
            Some((CheckpointKind::SixHours, published_at + Duration::hours(6)))
        );
    }
}
