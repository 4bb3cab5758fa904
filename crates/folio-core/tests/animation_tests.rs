// Integration tests for the animation loop state machine.

use folio_core::*;
use std::cell::RefCell;
use std::rc::Rc;

type Ticks = Rc<RefCell<Vec<FrameTick>>>;

fn recording_loop() -> (AnimationLoop<ManualScheduler>, Ticks) {
    (AnimationLoop::new(ManualScheduler::default()), Rc::new(RefCell::new(Vec::new())))
}

fn start_recording(lp: &mut AnimationLoop<ManualScheduler>, ticks: &Ticks) {
    let ticks = ticks.clone();
    lp.start(move |tick| {
        ticks.borrow_mut().push(tick);
        Ok(())
    });
}

/// Delivers the currently pending frame, if any.
fn pump(lp: &mut AnimationLoop<ManualScheduler>, now_ms: f64) -> bool {
    match lp.pending_handle() {
        Some(handle) => lp.run_frame(handle, now_ms).unwrap(),
        None => false,
    }
}

#[test]
fn start_then_stop_never_invokes_callback() {
    let (mut lp, ticks) = recording_loop();
    start_recording(&mut lp, &ticks);
    let scheduled = lp.pending_handle().unwrap();
    lp.stop();
    assert_eq!(lp.state(), LoopState::Stopped);
    assert_eq!(lp.scheduler().cancelled, vec![scheduled]);

    // a frame that was already in flight is ignored
    assert!(!lp.run_frame(scheduled, 16.0).unwrap());
    assert!(ticks.borrow().is_empty());
}

#[test]
fn running_loop_reports_delta_and_elapsed() {
    let (mut lp, ticks) = recording_loop();
    start_recording(&mut lp, &ticks);
    assert_eq!(lp.state(), LoopState::Running);
    for now in [1000.0, 1016.0, 1033.0, 2000.0] {
        assert!(pump(&mut lp, now));
    }
    let ticks = ticks.borrow();
    assert_eq!(ticks[0].delta_ms, 0.0);
    assert_eq!(ticks[0].elapsed_s, 0.0);
    assert_eq!(ticks[1].delta_ms, 16.0);
    assert_eq!(ticks[2].delta_ms, 17.0);
    assert_eq!(ticks[3].elapsed_s, 1.0);
}

#[test]
fn pause_ends_chain_and_resume_resets_timing() {
    let (mut lp, ticks) = recording_loop();
    start_recording(&mut lp, &ticks);
    pump(&mut lp, 0.0);
    pump(&mut lp, 16.0);

    lp.pause();
    assert_eq!(lp.state(), LoopState::Paused);
    // the in-flight frame sees the flag and schedules nothing
    assert!(!pump(&mut lp, 32.0));
    assert_eq!(lp.pending_handle(), None);

    lp.resume();
    assert_eq!(lp.state(), LoopState::Running);
    assert!(pump(&mut lp, 5000.0));
    let last = *ticks.borrow().last().unwrap();
    assert_eq!(last.delta_ms, 0.0, "no spurious delta after resume");
    assert_eq!(ticks.borrow().len(), 3);
}

#[test]
fn pause_and_resume_before_next_frame_keeps_one_chain() {
    let (mut lp, ticks) = recording_loop();
    start_recording(&mut lp, &ticks);
    pump(&mut lp, 0.0);
    lp.pause();
    lp.resume();
    assert_eq!(lp.scheduler().requested.len(), 2);
    assert!(pump(&mut lp, 16.0));
    assert_eq!(ticks.borrow().len(), 2);
}

#[test]
fn hiding_stops_and_showing_restarts_without_start() {
    let (mut lp, ticks) = recording_loop();
    start_recording(&mut lp, &ticks);
    pump(&mut lp, 0.0);

    lp.set_intersection_ratio(0.05);
    assert!(!lp.is_visible());
    assert_eq!(lp.state(), LoopState::Stopped);
    assert_eq!(lp.pending_handle(), None);

    lp.set_intersection_ratio(0.5);
    assert_eq!(lp.state(), LoopState::Running);
    assert!(pump(&mut lp, 100.0));
    let ticks = ticks.borrow();
    assert_eq!(ticks.len(), 2);
    assert_eq!(ticks[1].elapsed_s, 0.0);
}

#[test]
fn visibility_changes_while_paused_do_not_restart() {
    let (mut lp, ticks) = recording_loop();
    start_recording(&mut lp, &ticks);
    lp.pause();
    lp.set_visible(false);
    lp.set_visible(true);
    assert_eq!(lp.state(), LoopState::Paused);
    assert!(!pump(&mut lp, 0.0));
    assert!(ticks.borrow().is_empty());
}

#[test]
fn start_while_hidden_waits_for_visibility() {
    let (mut lp, ticks) = recording_loop();
    lp.set_visible(false);
    start_recording(&mut lp, &ticks);
    assert_eq!(lp.pending_handle(), None);
    lp.set_visible(true);
    assert!(pump(&mut lp, 0.0));
    assert_eq!(ticks.borrow().len(), 1);
}

#[test]
fn restarting_replaces_the_callback() {
    let (mut lp, ticks) = recording_loop();
    start_recording(&mut lp, &ticks);
    let first = lp.pending_handle().unwrap();
    let other = Rc::new(RefCell::new(0));
    let other_l = other.clone();
    lp.start(move |_| {
        *other_l.borrow_mut() += 1;
        Ok(())
    });
    assert!(!lp.run_frame(first, 0.0).unwrap());
    assert!(pump(&mut lp, 16.0));
    assert!(ticks.borrow().is_empty());
    assert_eq!(*other.borrow(), 1);
}

#[test]
fn callback_error_stops_loop_and_unregisters() {
    let (mut lp, _) = recording_loop();
    let calls = Rc::new(RefCell::new(0));
    let calls_l = calls.clone();
    lp.start(move |_| {
        *calls_l.borrow_mut() += 1;
        anyhow::bail!("scene lost")
    });
    let handle = lp.pending_handle().unwrap();
    let err = lp.run_frame(handle, 0.0).unwrap_err();
    assert_eq!(err.to_string(), "scene lost");
    assert_eq!(lp.state(), LoopState::Stopped);
    assert!(!lp.has_callback());

    lp.set_visible(false);
    lp.set_visible(true);
    assert_eq!(lp.pending_handle(), None);
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn callback_can_pause_its_own_loop() {
    // shared host, as in the browser: the callback reaches back into the loop
    let lp = Rc::new(RefCell::new(AnimationLoop::new(ManualScheduler::default())));
    let calls = Rc::new(RefCell::new(0));
    {
        let lp_cb = Rc::downgrade(&lp);
        let calls_l = calls.clone();
        lp.borrow_mut().start(move |_| {
            *calls_l.borrow_mut() += 1;
            if let Some(lp) = lp_cb.upgrade() {
                lp.borrow_mut().pause();
            }
            Ok(())
        });
    }
    let handle = lp.borrow().pending_handle().unwrap();
    let due = lp.borrow_mut().begin_frame(handle, 0.0).unwrap();
    let mut callback = due.callback.borrow_mut();
    let result = (&mut *callback)(due.tick);
    drop(callback);
    lp.borrow_mut().finish_frame(due, result).unwrap();

    assert_eq!(*calls.borrow(), 1);
    assert_eq!(lp.borrow().state(), LoopState::Paused);
    assert_eq!(lp.borrow().pending_handle(), None);
}

#[test]
fn dispose_drops_callback() {
    let (mut lp, ticks) = recording_loop();
    start_recording(&mut lp, &ticks);
    lp.dispose();
    lp.resume();
    assert_eq!(lp.pending_handle(), None);
    assert!(!lp.has_callback());
}

#[test]
fn default_visibility_options() {
    let params = VisibilityParams::default();
    assert!(params.is_visible(0.1));
    assert!(!params.is_visible(0.099));
    assert_eq!(params.root_margin_css(), "50px");
}
