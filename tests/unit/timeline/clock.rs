use super::*;

const MS_100: Duration = Duration::from_millis(100);

#[test]
fn virtual_ticks_fall_due_per_interval() {
    let mut s = VirtualScheduler::new();
    let h = s.schedule_tick(MS_100);
    assert_eq!(s.take_due(h), 0);
    s.advance(Duration::from_millis(99));
    assert_eq!(s.take_due(h), 0);
    s.advance(Duration::from_millis(1));
    assert_eq!(s.take_due(h), 1);
    assert_eq!(s.take_due(h), 0);
    s.advance(Duration::from_millis(350));
    assert_eq!(s.take_due(h), 3);
    assert_eq!(s.next_due_in(h), Some(Duration::from_millis(50)));
}

#[test]
fn cancelled_handles_report_nothing() {
    let mut s = VirtualScheduler::new();
    let h = s.schedule_tick(MS_100);
    s.advance(Duration::from_secs(1));
    s.cancel(h);
    assert_eq!(s.take_due(h), 0);
    assert_eq!(s.next_due_in(h), None);
    assert_eq!(s.scheduled(), 0);
    s.cancel(h);
}

#[test]
fn handles_are_independent() {
    let mut s = VirtualScheduler::new();
    let a = s.schedule_tick(MS_100);
    s.advance(Duration::from_millis(50));
    let b = s.schedule_tick(MS_100);
    assert_ne!(a, b);
    s.advance(Duration::from_millis(60));
    assert_eq!(s.take_due(a), 1);
    assert_eq!(s.take_due(b), 0);
    s.advance(Duration::from_millis(40));
    assert_eq!(s.take_due(b), 1);
}

#[test]
fn wall_scheduler_starts_with_nothing_due() {
    let mut s = WallScheduler::new();
    let h = s.schedule_tick(Duration::from_secs(3600));
    assert_eq!(s.take_due(h), 0);
    assert!(s.next_due_in(h).is_some_and(|d| d > Duration::from_secs(3000)));
}
