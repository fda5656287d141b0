use super::*;

fn frame(i: u32) -> FrameHandle {
    FrameHandle::from_premul(i, 1, 1, vec![i as u8, 0, 0, 255])
}

fn settle_all_but(set: &mut FrameSet, failed: &[u32]) {
    for i in 0..set.len() {
        if failed.contains(&i) {
            assert!(set.mark_failed(i));
        } else {
            assert!(set.store(i, frame(i)));
        }
    }
}

#[test]
fn get_searches_backward_over_empty_slots() {
    let mut set = FrameSet::new(6);
    set.store(1, frame(1));
    set.store(4, frame(4));

    assert!(set.get(0).is_none());
    assert_eq!(set.get(1).unwrap().source_index, 1);
    assert_eq!(set.get(3).unwrap().source_index, 1);
    assert_eq!(set.get(5).unwrap().source_index, 4);
    assert!(set.get(6).is_none());
}

#[test]
fn out_of_order_completion_counts_toward_completion() {
    let mut set = FrameSet::new(3);
    assert!(!set.is_complete());
    set.store(2, frame(2));
    assert!(set.mark_failed(0));
    assert!(!set.mark_failed(0));
    assert_eq!(set.unsettled().collect::<Vec<_>>(), vec![1]);
    set.store(1, frame(1));
    assert!(set.is_complete());
    assert_eq!(set.loaded_count(), 2);
    assert_eq!(set.failed_count(), 1);
    assert_eq!(set.progress(), 1.0);
}

#[test]
fn failed_middle_frame_falls_back_to_previous_after_gap_fill() {
    let mut set = FrameSet::new(280);
    settle_all_but(&mut set, &[50]);
    assert!(set.is_complete());

    assert_eq!(set.gap_fill(), 1);
    assert!(matches!(set.slot(50), Some(FrameSlot::FailedFallback(_))));
    assert_eq!(set.get(50).unwrap().source_index, 49);
    assert_eq!(set.get(51).unwrap().source_index, 51);
}

#[test]
fn failed_first_frame_stays_undrawable() {
    let mut set = FrameSet::new(5);
    settle_all_but(&mut set, &[0, 2]);
    set.gap_fill();

    assert!(set.get(0).is_none());
    assert!(set.slot(0).unwrap().is_empty());
    assert_eq!(set.get(1).unwrap().source_index, 1);
    assert_eq!(set.get(2).unwrap().source_index, 1);
}

#[test]
fn gap_fill_is_idempotent() {
    let mut set = FrameSet::new(10);
    settle_all_but(&mut set, &[0, 3, 4, 9]);

    assert_eq!(set.gap_fill(), 3);
    let before: Vec<Option<u32>> = (0..10).map(|i| set.get(i).map(|h| h.source_index)).collect();
    assert_eq!(set.gap_fill(), 0);
    let after: Vec<Option<u32>> = (0..10).map(|i| set.get(i).map(|h| h.source_index)).collect();
    assert_eq!(before, after);
    assert_eq!(after[4], Some(2));
    assert_eq!(after[9], Some(8));
}

#[test]
fn late_success_replaces_a_given_up_slot() {
    let mut set = FrameSet::new(2);
    set.store(0, frame(0));
    set.mark_failed(1);
    set.gap_fill();
    assert_eq!(set.get(1).unwrap().source_index, 0);

    set.store(1, frame(1));
    assert_eq!(set.get(1).unwrap().source_index, 1);
    assert_eq!(set.loaded_count(), 2);
    assert_eq!(set.failed_count(), 0);
    assert_eq!(set.settled_count(), 2);
}
