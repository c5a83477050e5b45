//! Tests for the listener registry

use super::*;

fn frame(text: &str) -> Bytes {
    Bytes::copy_from_slice(text.as_bytes())
}

fn expect_frame(registered: &mut Registered) -> Bytes {
    match registered.frames.try_recv() {
        Ok(Outgoing::Frame(bytes)) => bytes,
        other => panic!("expected a frame, got {other:?}"),
    }
}

#[test]
fn test_add_assigns_increasing_ids() {
    let listeners = Listeners::new();
    let server = CancellationToken::new();

    let a = listeners.add(4, &server);
    let b = listeners.add(4, &server);

    assert!(b.id > a.id);
    assert_eq!(listeners.count(), 2);
}

#[test]
fn test_broadcast_queues_for_every_listener_in_order() {
    let listeners = Listeners::new();
    let server = CancellationToken::new();
    let mut a = listeners.add(4, &server);
    let mut b = listeners.add(4, &server);

    assert!(listeners.broadcast(&frame("one")).is_empty());
    assert!(listeners.broadcast(&frame("two")).is_empty());

    for registered in [&mut a, &mut b] {
        assert_eq!(expect_frame(registered), frame("one"));
        assert_eq!(expect_frame(registered), frame("two"));
    }
}

#[test]
fn test_full_queue_removes_only_that_listener() {
    let listeners = Listeners::new();
    let server = CancellationToken::new();
    let slow = listeners.add(2, &server);
    let mut fast = listeners.add(8, &server);

    for i in 0..3 {
        let removed = listeners.broadcast(&frame(&i.to_string()));
        // Let the fast listener keep up
        expect_frame(&mut fast);
        if i < 2 {
            assert!(removed.is_empty());
        } else {
            assert_eq!(removed, vec![slow.id]);
        }
    }

    assert!(slow.cancel.is_cancelled());
    assert!(!fast.cancel.is_cancelled());
    assert_eq!(listeners.count(), 1);
}

#[test]
fn test_stopped_write_task_is_removed() {
    let listeners = Listeners::new();
    let server = CancellationToken::new();
    let gone = listeners.add(4, &server);
    let id = gone.id;
    drop(gone.frames);

    assert_eq!(listeners.broadcast(&frame("x")), vec![id]);
    assert_eq!(listeners.count(), 0);
}

#[test]
fn test_remove_cancels_listener() {
    let listeners = Listeners::new();
    let server = CancellationToken::new();
    let registered = listeners.add(4, &server);

    assert!(listeners.remove(registered.id));
    assert!(registered.cancel.is_cancelled());
    assert!(!listeners.remove(registered.id));
    assert!(!server.is_cancelled());
}

#[test]
fn test_server_cancel_reaches_listeners() {
    let listeners = Listeners::new();
    let server = CancellationToken::new();
    let registered = listeners.add(4, &server);

    server.cancel();
    assert!(registered.cancel.is_cancelled());
}

#[test]
fn test_clear_cancels_everyone() {
    let listeners = Listeners::new();
    let server = CancellationToken::new();
    let a = listeners.add(4, &server);
    let b = listeners.add(4, &server);

    assert_eq!(listeners.clear(), 2);
    assert_eq!(listeners.count(), 0);
    assert!(a.cancel.is_cancelled());
    assert!(b.cancel.is_cancelled());
}

#[test]
fn test_flush_marker_follows_queued_frames() {
    let listeners = Listeners::new();
    let server = CancellationToken::new();
    let mut registered = listeners.add(4, &server);

    listeners.broadcast(&frame("before"));
    let (mut waiters, removed) = listeners.flush();
    assert!(removed.is_empty());
    assert_eq!(waiters.len(), 1);

    assert_eq!(expect_frame(&mut registered), frame("before"));
    match registered.frames.try_recv() {
        Ok(Outgoing::Flush(done)) => done.send(()).unwrap(),
        other => panic!("expected a flush marker, got {other:?}"),
    }
    assert!(waiters[0].try_recv().is_ok());
}
