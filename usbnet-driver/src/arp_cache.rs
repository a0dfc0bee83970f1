use std::net::Ipv4Addr;
use usbnet_packets::MacAddr;

/// One IPv4 to hardware address translation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArpEntry {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
}

/// Fixed capacity translation table between IPv4 addresses and 48-bit Ethernet addresses.
///
/// Entries are never removed one at a time, so occupied slots always form a prefix of
/// the table. Once every slot is taken, new addresses replace slots round-robin starting
/// from slot 0, which evicts the oldest insertion first.
pub struct ArpCache {
    slots: Vec<Option<ArpEntry>>,
    next_victim: usize,
}

impl ArpCache {
    pub fn new(capacity: usize) -> Self {
        ArpCache {
            slots: vec![None; capacity],
            next_victim: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn lookup(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        self.entries().find(|entry| entry.ip == ip).map(|entry| entry.mac)
    }

    /// Stores the pair. An address already present keeps its slot and only has its
    /// hardware address replaced, so refreshing a stale entry never evicts another one.
    pub fn insert_or_update(&mut self, ip: Ipv4Addr, mac: MacAddr) {
        if self.slots.is_empty() {
            return;
        }

        if let Some(entry) = self.slots.iter_mut().flatten().find(|entry| entry.ip == ip) {
            entry.mac = mac;
            return;
        }

        let slot = match self.slots.iter().position(Option::is_none) {
            Some(free) => free,
            None => {
                let victim = self.next_victim;
                self.next_victim = (victim + 1) % self.slots.len();
                victim
            }
        };
        self.slots[slot] = Some(ArpEntry { ip, mac });
    }

    /// Number of occupied slots
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.next_victim = 0;
    }

    /// Copies occupied entries, in slot order, into `buffer` and returns how many were
    /// written. Callers size the buffer from `count()`; if the table grew in between,
    /// the extra entries are left out.
    pub fn snapshot(&self, buffer: &mut [ArpEntry]) -> usize {
        let mut written = 0;
        for (dest, entry) in buffer.iter_mut().zip(self.entries()) {
            *dest = *entry;
            written += 1;
        }
        written
    }

    pub fn entries(&self) -> impl Iterator<Item = &ArpEntry> {
        self.slots.iter().flatten()
    }
}
