use crate::{ElapsedClock, SessionState};

/// WHAT: The clock only counts while started
/// WHY: Ticks keep arriving while idle
#[test]
fn given_stopped_clock_when_ticking_then_stays_at_zero() {
    // Given: A fresh clock
    let mut clock = ElapsedClock::default();

    // When: Ticking without starting
    clock.tick();
    clock.tick();

    // Then: Nothing counted
    assert_eq!(clock.seconds(), 0);
    assert!(!clock.is_running());
}

/// WHAT: Elapsed time is formatted as HH:MM:SS past one hour
/// WHY: Status output shows long recordings correctly
#[test]
fn given_running_clock_when_formatting_then_hours_minutes_seconds() {
    // Given: A clock that ran for 1h 1m 5s
    let mut clock = ElapsedClock::default();
    clock.start();
    for _ in 0..3665 {
        clock.tick();
    }

    // When/Then: Formatted with zero padding
    assert_eq!(clock.formatted(), "01:01:05");

    // And: Reset returns to zero
    clock.reset();
    assert_eq!(clock.formatted(), "00:00:00");
}

/// WHAT: Only Recording and Switching count time
/// WHY: Switching monitors must not pause the clock
#[test]
fn given_states_when_checking_activity_then_recording_and_switching_active() {
    assert!(SessionState::Recording.is_active());
    assert!(SessionState::Switching.is_active());
    assert!(!SessionState::Idle.is_active());
    assert!(!SessionState::Stopping.is_active());
    assert_eq!(SessionState::Switching.to_string(), "switching");
}
