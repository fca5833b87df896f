//! Unit tests for aim-schedule.

use aim_core::Tick;

use crate::ScheduleQueue;

#[cfg(test)]
mod schedule {
    use super::*;

    #[test]
    fn fires_only_when_due() {
        let mut q: ScheduleQueue<Vec<u64>> = ScheduleQueue::new();
        q.schedule(Tick(3), false, 0, |_tick, log: &mut Vec<u64>| log.push(1)).unwrap();

        assert!(q.take_due(Tick(2)).is_empty());
        let due = q.take_due(Tick(3));
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn same_tick_fires_in_scheduling_order() {
        let mut q: ScheduleQueue<Vec<u64>> = ScheduleQueue::new();
        for i in 0..5u64 {
            q.schedule(Tick(10), false, 0, move |_tick, log: &mut Vec<u64>| log.push(i)).unwrap();
        }

        let mut due = q.take_due(Tick(10));
        let mut log = Vec::new();
        for cb in &mut due {
            cb.fire(Tick(10), &mut log);
        }
        assert_eq!(log, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn take_due_drains_every_tick_up_to_and_including() {
        let mut q: ScheduleQueue<Vec<u64>> = ScheduleQueue::new();
        q.schedule(Tick(1), false, 0, |_tick, log: &mut Vec<u64>| log.push(1)).unwrap();
        q.schedule(Tick(2), false, 0, |_tick, log: &mut Vec<u64>| log.push(2)).unwrap();
        q.schedule(Tick(5), false, 0, |_tick, log: &mut Vec<u64>| log.push(5)).unwrap();

        let due = q.take_due(Tick(3));
        assert_eq!(due.len(), 2, "only ticks 1 and 2 are due at t=3");
        assert_eq!(q.len(), 1, "tick 5's callback remains queued");
    }

    #[test]
    fn recurring_reinserts_at_due_tick_plus_period() {
        let mut q: ScheduleQueue<Vec<u64>> = ScheduleQueue::new();
        q.schedule(Tick(0), true, 3, |tick, log: &mut Vec<u64>| log.push(tick.0)).unwrap();

        let mut log = Vec::new();
        for t in 0..10u64 {
            let mut due = q.take_due(Tick(t));
            for mut cb in due.drain(..) {
                cb.fire(Tick(t), &mut log);
                if cb.recurring {
                    q.reinsert_recurring(cb);
                }
            }
        }
        // first due d=0, period p=3 ⇒ fires at 0, 3, 6, 9.
        assert_eq!(log, vec![0, 3, 6, 9]);
    }

    #[test]
    fn recurring_with_zero_period_is_rejected() {
        let mut q: ScheduleQueue<()> = ScheduleQueue::new();
        let err = q.schedule(Tick(0), true, 0, |_tick, _ctx: &mut ()| {});
        assert!(err.is_err());
    }

    #[test]
    fn rescheduling_at_the_current_tick_waits_for_a_later_drain() {
        // A callback fired at tick t that schedules something due_tick <= t
        // must not be picked up by the current take_due batch — it was
        // already drained out of the map before firing began.
        let mut q: ScheduleQueue<()> = ScheduleQueue::new();
        q.schedule(Tick(5), false, 0, |_tick, _ctx: &mut ()| {}).unwrap();
        let due = q.take_due(Tick(5));
        assert_eq!(due.len(), 1);

        q.schedule(Tick(5), false, 0, |_tick, _ctx: &mut ()| {}).unwrap();
        assert_eq!(q.len(), 1, "re-scheduled entry is queued fresh, not part of the drained batch");
    }
}
