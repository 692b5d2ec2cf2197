use backdrop::fake::{FakeDisplay, FakeShell};
use std::time::Duration;

use backdrop::os::{WindowSystem, MSG_REFRESH_DESKTOP, MSG_SPAWN_WORKER, SHELL_HOST_CLASS, WORKER_CLASS};
use backdrop::{Config, Mode, Placement, Rect, Resolution, SessionController, WindowHandle};

type Controller = SessionController<FakeShell, FakeDisplay>;

fn display() -> FakeDisplay {
    FakeDisplay::windowed(Resolution::new(1280, 720), Resolution::new(1920, 1080))
}

/// Desktop with an application frame hosting the render window, which is active.
fn desktop_with_app() -> (FakeShell, WindowHandle, WindowHandle) {
    let shell = FakeShell::desktop();
    let frame = shell.add_top_level("UnityContainerWndClass", "Editor");
    let app = shell.add_child(frame, "UnityWndClass", "Aquarium");
    shell.set_active(app);
    (shell, app, frame)
}

fn controller() -> (Controller, WindowHandle, WindowHandle) {
    let (shell, app, frame) = desktop_with_app();
    (SessionController::new(shell, display(), &Config::default()), app, frame)
}

fn placement_of(c: &Controller, w: WindowHandle) -> (WindowHandle, Option<Rect>) {
    let ws = c.window_system();
    (ws.parent_of(w), ws.last_position(w).map(|(r, _)| r))
}

#[test]
fn enter_twice_matches_enter_once() {
    let (mut c, app, _) = controller();

    c.enter_background_mode();
    let once = placement_of(&c, app);
    c.enter_background_mode();
    let twice = placement_of(&c, app);

    assert_eq!(once, twice);
    assert_eq!(once.0, c.window_system().worker_surface());
    assert_eq!(once.1, Some(Rect::new(0, 0, 1920, 1080)));
    assert!(c.is_background());
}

#[test]
fn round_trips_restore_the_first_parent() {
    let (mut c, app, frame) = controller();

    for _ in 0..3 {
        c.enter_background_mode();
        assert_ne!(c.window_system().parent_of(app), frame);
        c.exit_background_mode();
        assert_eq!(c.window_system().parent_of(app), frame);
    }
    assert_eq!(c.mode(), Mode::Foreground);
    assert_eq!(c.placement(), Placement::Foreground);
}

#[test]
fn original_parent_is_captured_once() {
    let (mut c, app, frame) = controller();
    let intruder = c.window_system().add_top_level("Intruder", "");

    c.enter_background_mode();
    c.exit_background_mode();
    // someone else moves the window between calls
    assert!(c.window_system().set_parent(app, intruder));
    c.enter_background_mode();
    c.tick();
    c.exit_background_mode();

    assert_eq!(c.session().original_parent, Some(frame));
    assert_eq!(c.window_system().parent_of(app), frame);
}

#[test]
fn bad_screen_indexes_clamp_to_screen_zero() {
    let screens = vec![Rect::new(0, 0, 1920, 1080), Rect::new(1920, 0, 2560, 1440)];
    let mut results = Vec::new();
    for index in [0, -1, 2, 99] {
        let (mut c, app, _) = controller();
        c.window_system().set_screens(screens.clone());
        c.set_screen_index(index);
        c.enter_background_mode();
        results.push(placement_of(&c, app).1);
    }
    assert!(results.iter().all(|r| *r == Some(Rect::new(0, 0, 1920, 1080))));
}

#[test]
fn screen_left_of_primary_lands_at_zero() {
    let (mut c, app, _) = controller();
    c.window_system()
        .set_screens(vec![Rect::new(0, 0, 1920, 1080), Rect::new(-1920, 0, 1920, 1080)]);

    c.set_screen_index(1);
    c.enter_background_mode();
    assert_eq!(placement_of(&c, app).1, Some(Rect::new(0, 0, 1920, 1080)));

    c.set_screen_index(0);
    c.enter_background_mode();
    assert_eq!(placement_of(&c, app).1, Some(Rect::new(1920, 0, 1920, 1080)));
}

#[test]
fn degenerate_windowed_size_is_replaced_on_exit() {
    let (shell, _, _) = desktop_with_app();
    let tiny = FakeDisplay::windowed(Resolution::new(10, 10), Resolution::new(1920, 1080));
    let mut c = SessionController::new(shell, tiny, &Config::default());

    c.enter_background_mode();
    c.display_mut().set_fullscreen(true);
    c.exit_background_mode();

    assert_eq!(c.display().applied(), &[(Resolution::new(640, 360), false)]);
}

#[test]
fn foreground_fullscreen_flag_goes_fullscreen_on_exit() {
    let (mut c, _, _) = controller();
    c.set_fullscreen_flags(true, true);

    c.enter_background_mode();
    assert!(c.display().applied().is_empty());
    c.exit_background_mode();

    assert_eq!(c.display().applied(), &[(Resolution::new(1920, 1080), true)]);
}

#[test]
fn worker_surface_appears_on_second_attempt() {
    let (shell, app, _) = desktop_with_app();
    shell.spawn_worker_after(2);
    let mut c = SessionController::new(shell, display(), &Config::default());

    c.enter_background_mode();

    assert!(c.is_background());
    assert_eq!(c.window_system().spawn_requests(), 2);
    assert_eq!(c.window_system().parent_of(app), c.window_system().worker_surface());
}

#[test]
fn unavailable_worker_defers_to_next_tick() {
    let (shell, app, frame) = desktop_with_app();
    shell.spawn_worker_after(3);
    let mut c = SessionController::new(shell, display(), &Config::default());

    c.enter_background_mode();
    assert!(!c.is_background());
    assert!(c.has_pending());
    assert_eq!(c.window_system().parent_of(app), frame);

    c.tick();
    assert!(c.is_background());
    assert!(!c.has_pending());
}

#[test]
fn unresponsive_shell_never_panics() {
    let (shell, app, frame) = desktop_with_app();
    shell.set_responsive(false);
    let mut c = SessionController::new(shell, display(), &Config::default());

    c.enter_background_mode();
    c.tick();
    c.tick();

    assert_eq!(c.mode(), Mode::Foreground);
    assert_eq!(c.window_system().parent_of(app), frame);

    c.window_system().set_responsive(true);
    c.tick();
    assert!(c.is_background());
}

#[test]
fn exit_before_enter_keeps_the_window_where_it_is() {
    let (mut c, app, frame) = controller();

    c.exit_background_mode();
    c.exit_background_mode();

    assert_eq!(c.window_system().parent_of(app), frame);
    assert_eq!(c.mode(), Mode::Foreground);
    assert!(c.display().applied().is_empty());
}

#[test]
fn worker_is_re_resolved_after_shell_restart() {
    let (mut c, app, _) = controller();
    c.enter_background_mode();
    let first = c.window_system().worker_surface();

    c.exit_background_mode();
    c.window_system().restart_shell();
    c.enter_background_mode();

    let second = c.window_system().worker_surface();
    assert_ne!(first, second);
    assert_eq!(c.window_system().parent_of(app), second);
}

#[test]
fn decoy_worker_is_never_used() {
    let (mut c, app, _) = controller();
    let decoy = c.window_system().find_window(Some(WORKER_CLASS), None);

    c.enter_background_mode();

    assert_ne!(c.window_system().parent_of(app), decoy);
}

#[test]
fn unresolved_target_is_resolved_by_tick_then_round_trips() {
    let shell = FakeShell::desktop();
    let mut c = SessionController::new(shell, display(), &Config::default());
    assert!(c.session().target_window.is_null());
    assert_eq!(c.mode(), Mode::Unknown);

    // the render window shows up a few frames later
    let frame = c.window_system().add_top_level("UnityContainerWndClass", "Editor");
    let app = c.window_system().add_child(frame, "UnityWndClass", "Aquarium");
    c.window_system().set_active(app);
    c.tick();

    assert_eq!(c.session().target_window, app);
    assert_eq!(c.session().original_parent, Some(frame));

    c.enter_background_mode();
    let worker = c.window_system().worker_surface();
    assert_eq!(c.window_system().parent_of(app), worker);

    c.exit_background_mode();
    assert_eq!(c.window_system().parent_of(app), frame);
}

#[test]
fn enter_with_no_target_waits_for_it() {
    let shell = FakeShell::desktop();
    let mut c = SessionController::new(shell, display(), &Config::default());

    c.enter_background_mode();
    c.tick();
    assert!(c.has_pending());
    assert!(c
        .window_system()
        .messages()
        .iter()
        .all(|m| m.msg != MSG_SPAWN_WORKER));

    let app = c.window_system().add_top_level("UnityWndClass", "Aquarium");
    c.window_system().set_active(app);
    c.tick();

    assert!(c.is_background());
    assert_eq!(c.session().original_parent, Some(WindowHandle::NULL));

    c.exit_background_mode();
    assert!(c.window_system().parent_of(app).is_null());
}

#[test]
fn exit_before_enter_skips_display_and_shell() {
    let (mut c, app, frame) = controller();
    c.set_fullscreen_flags(false, true);

    c.exit_background_mode();

    assert!(c.display().applied().is_empty());
    assert!(c.window_system().raised().is_empty());
    assert!(c.window_system().messages().iter().all(|m| m.msg != MSG_REFRESH_DESKTOP));
    assert_eq!(c.window_system().parent_of(app), frame);
    assert_eq!(c.mode(), Mode::Foreground);
}

#[test]
fn focused_shell_host_is_not_embedded() {
    let shell = FakeShell::desktop();
    let host = shell.find_window(Some(SHELL_HOST_CLASS), None);
    shell.set_active(host);
    let mut c = SessionController::new(shell, display(), &Config::default());

    c.enter_background_mode();
    c.tick();

    assert!(c.session().target_window.is_null());
    assert!(!c.is_background());
    assert!(c.has_pending());
    assert!(c.window_system().parent_of(host).is_null());

    // launched from the desktop, the app takes focus a moment later
    let app = c.window_system().add_top_level("UnityWndClass", "Aquarium");
    c.window_system().set_active(app);
    c.tick();

    assert!(c.is_background());
    assert_eq!(c.window_system().parent_of(app), c.window_system().worker_surface());
    assert!(c.window_system().parent_of(host).is_null());
}

#[test]
fn focused_worker_surface_is_not_a_target() {
    let shell = FakeShell::desktop();
    let host = shell.find_window(Some(SHELL_HOST_CLASS), None);
    shell.send_message_timeout(host, MSG_SPAWN_WORKER, 0, 0, Duration::from_millis(1000));
    let worker = shell.worker_surface();
    assert!(!worker.is_null());
    shell.set_active(worker);

    let mut c = SessionController::new(shell, display(), &Config::default());
    c.enter_background_mode();

    assert!(c.session().target_window.is_null());
    assert_eq!(c.mode(), Mode::Unknown);
    assert!(c.window_system().parent_of(worker).is_null());
}

#[test]
fn restarted_app_becomes_the_new_target() {
    let (mut c, app, _) = controller();
    assert_eq!(c.session().target_window, app);

    c.window_system().destroy(app);
    let relaunched = c.window_system().add_top_level("UnityWndClass", "Aquarium");
    c.window_system().set_active(relaunched);
    c.enter_background_mode();
    for _ in 0..5 {
        c.tick();
    }

    assert_eq!(c.session().target_window, relaunched);
    assert_eq!(c.session().original_parent, Some(WindowHandle::NULL));
    assert!(!c.has_pending());
    assert!(c.is_background());
    assert_eq!(c.window_system().parent_of(relaunched), c.window_system().worker_surface());

    c.exit_background_mode();
    assert!(c.window_system().parent_of(relaunched).is_null());
    assert_eq!(c.mode(), Mode::Foreground);
}

#[test]
fn target_destroyed_while_embedded_does_not_block_exit() {
    let (mut c, app, _) = controller();
    c.enter_background_mode();
    assert!(c.is_background());
    let sent = c.window_system().messages().len();

    c.window_system().destroy(app);
    c.exit_background_mode();

    assert!(!c.is_background());
    assert!(!c.has_pending());
    assert_eq!(c.mode(), Mode::Unknown);
    assert_eq!(c.window_system().messages().len(), sent);
}
