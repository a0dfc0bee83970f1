use crate::datagram::Datagram;
use std::collections::VecDeque;
use std::time::Instant;

/// FIFO of datagrams owned by the port. Expiry is checked lazily: stale datagrams are
/// only noticed, and released, when they reach the head.
#[derive(Default, Debug)]
pub struct DatagramQueue {
    datagrams: VecDeque<Datagram>,
}

impl DatagramQueue {
    pub fn new() -> Self {
        DatagramQueue {
            datagrams: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, datagram: Datagram) {
        self.datagrams.push_back(datagram);
    }

    /// Pops from the head until a live datagram turns up. Expired ones are dropped on
    /// the way and counted in the returned `Dequeued`.
    pub fn dequeue_unexpired(&mut self, now: Instant) -> Dequeued {
        let mut expired = 0;
        while let Some(datagram) = self.datagrams.pop_front() {
            if datagram.is_expired(now) {
                expired += 1;
                continue;
            }
            return Dequeued {
                datagram: Some(datagram),
                expired,
            };
        }
        Dequeued {
            datagram: None,
            expired,
        }
    }

    /// Releases every datagram regardless of expiry, returning how many there were.
    pub fn drain_all(&mut self) -> usize {
        let released = self.datagrams.len();
        self.datagrams.clear();
        released
    }

    pub fn len(&self) -> usize {
        self.datagrams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datagrams.is_empty()
    }
}

/// Outcome of `DatagramQueue::dequeue_unexpired`
#[derive(Debug)]
pub struct Dequeued {
    pub datagram: Option<Datagram>,
    pub expired: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use usbnet_packets::Ipv4Header;

    fn datagram(id: u16, expiry: Option<Instant>) -> Datagram {
        let mut header = Ipv4Header::new();
        header.set_identification(id);
        let mut datagram = Datagram::new(header, vec![], vec![id as u8]);
        datagram.expiry = expiry;
        datagram
    }

    #[test]
    fn fifo_order() {
        let now = Instant::now();
        let mut queue = DatagramQueue::new();
        for id in 0..5 {
            queue.enqueue(datagram(id, None));
        }
        for id in 0..5 {
            let out = queue.dequeue_unexpired(now).datagram.unwrap();
            assert_eq!(out.header.identification(), id);
        }
        assert!(queue.dequeue_unexpired(now).datagram.is_none());
    }

    #[test]
    fn expired_head_entries_are_released() {
        let now = Instant::now();
        let past = now - Duration::from_millis(1);
        let future = now + Duration::from_secs(10);

        let mut queue = DatagramQueue::new();
        for id in 0..3 {
            queue.enqueue(datagram(id, Some(past)));
        }
        queue.enqueue(datagram(3, Some(future)));
        queue.enqueue(datagram(4, Some(future)));
        queue.enqueue(datagram(5, Some(past)));

        let dequeued = queue.dequeue_unexpired(now);
        assert_eq!(dequeued.expired, 3);
        assert_eq!(dequeued.datagram.unwrap().header.identification(), 3);
        // Only what followed the live entry remains
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn queue_of_only_expired_entries_empties() {
        let now = Instant::now();
        let mut queue = DatagramQueue::new();
        queue.enqueue(datagram(0, Some(now)));
        queue.enqueue(datagram(1, Some(now)));

        let dequeued = queue.dequeue_unexpired(now);
        assert!(dequeued.datagram.is_none());
        assert_eq!(dequeued.expired, 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_all_ignores_expiry() {
        let now = Instant::now();
        let mut queue = DatagramQueue::new();
        queue.enqueue(datagram(0, None));
        queue.enqueue(datagram(1, Some(now + Duration::from_secs(60))));
        assert_eq!(queue.drain_all(), 2);
        assert!(queue.is_empty());
    }
}
