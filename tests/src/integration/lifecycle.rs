//! # Lifecycle Tests
//!
//! Sequencing of sender connects, disconnects and shutdown:
//!
//! 1. **Drain**: N one-shot senders, one receiver drains exactly N messages
//! 2. **Already terminated**: late senders fail, late receivers see closure
//! 3. **Late observers**: shutdown stays resolved for every later query

#[cfg(test)]
mod tests {
    use crate::support::{count_strings, init_tracing, send_one};
    use conduit_bus::{Bus, BusError, TryRecvError};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_seven_senders_drained_by_one_receiver() {
        init_tracing();
        let bus: Bus = Bus::new();

        let senders: Vec<_> = (1..=7)
            .map(|inst| send_one(&bus, inst).expect("bus should be active"))
            .collect();

        assert_eq!(count_strings(&bus), 7);
        for sender in senders {
            sender.join().expect("sender");
        }
        assert!(bus.shutdown_monitor().is_shutdown());
    }

    #[test]
    fn test_bus_already_terminated() {
        init_tracing();
        let bus: Bus = Bus::new();

        // bus started
        let first = send_one(&bus, 1).expect("bus should be active");
        assert_eq!(count_strings(&bus), 1);
        first.join().expect("sender");

        // sender connect after termination
        let result = bus.sender_connect();
        assert!(matches!(result, Err(BusError::Terminated)));
        assert!(send_one(&bus, 2).is_none());

        // receiver connect after termination
        let rx = bus.receiver_connect();
        assert!(rx.recv().is_none());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Closed)));
    }

    #[tokio::test]
    async fn test_late_receiver_never_blocks() {
        init_tracing();
        let bus: Bus<u64> = Bus::new();
        let (_tx, disconnect) = bus.sender_connect().expect("active");
        disconnect.disconnect();

        let rx = bus.receiver_connect();
        let read = timeout(Duration::from_millis(100), rx.recv_async())
            .await
            .expect("read after shutdown must not block");
        assert_eq!(read, None);
    }

    #[test]
    fn test_send_pending_at_shutdown_never_reaches_late_receiver() {
        init_tracing();
        let bus: Bus = Bus::new();
        let (tx, disconnect) = bus.sender_connect().expect("active");

        let writer = thread::spawn(move || {
            tx.send(Box::new("stale".to_string()))
                .map_err(|err| err.into_inner())
        });
        thread::sleep(Duration::from_millis(20));
        disconnect.disconnect();

        assert_eq!(count_strings(&bus), 0);
        let returned = writer
            .join()
            .expect("writer")
            .expect_err("send should be abandoned");
        assert_eq!(returned.downcast_ref::<String>().map(String::as_str), Some("stale"));
        assert!(bus.receiver_connect().is_closed());
    }

    #[test]
    fn test_shutdown_unresolved_until_last_disconnect() {
        init_tracing();
        let bus: Bus<u8> = Bus::new();
        let monitor = bus.shutdown_monitor();

        let (_a, da) = bus.sender_connect().expect("active");
        let (_b, db) = bus.sender_connect().expect("active");
        let (_c, dc) = bus.sender_connect().expect("active");

        da.disconnect();
        assert!(!monitor.is_shutdown());
        dc.disconnect();
        assert!(!monitor.is_shutdown());
        db.disconnect();
        assert!(monitor.is_shutdown());
    }

    #[test]
    fn test_shutdown_stays_resolved_for_late_observers() {
        init_tracing();
        let bus = Arc::new(Bus::<u8>::new());
        let (_tx, disconnect) = bus.sender_connect().expect("active");
        disconnect.disconnect();

        for _ in 0..3 {
            let bus = Arc::clone(&bus);
            thread::spawn(move || bus.shutdown_monitor().wait())
                .join()
                .expect("late observer");
        }
        assert!(bus.shutdown_monitor().is_shutdown());
    }

    #[test]
    fn test_receivers_may_attach_before_during_and_after() {
        init_tracing();
        let bus: Bus<u32> = Bus::new();
        let early = bus.receiver_connect();

        let (tx, disconnect) = bus.sender_connect().expect("active");
        let during = bus.receiver_connect();

        let producer = thread::spawn(move || {
            tx.send(1).expect("active");
            tx.send(2).expect("active");
            disconnect.disconnect();
        });

        let first = early.recv().expect("first message");
        let second = during.recv().expect("second message");
        producer.join().expect("producer");

        assert_eq!(first + second, 3);
        assert!(early.recv().is_none());
        assert!(during.recv().is_none());
        assert!(bus.receiver_connect().recv().is_none());
    }

    #[test]
    fn test_stats_track_full_lifecycle() {
        init_tracing();
        let bus: Bus<u8> = Bus::new();

        let (_tx, first) = bus.sender_connect().expect("active");
        let (_tx2, second) = bus.sender_connect().expect("active");
        drop(first);
        second.disconnect();
        let _ = bus.sender_connect();

        let stats = bus.stats();
        assert_eq!(stats.senders, 0);
        assert!(stats.terminated);
        assert_eq!(stats.total_connects, 2);
        assert_eq!(stats.total_disconnects, 2);
        assert_eq!(stats.rejected_connects, 1);
    }
}
