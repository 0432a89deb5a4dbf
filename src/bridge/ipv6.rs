//! Per-identity source address allocation within a configured IPv6 prefix.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::net::Ipv6Addr;
use std::sync::Mutex;

/// Hands out distinct IPv6 addresses within a `/64`-or-wider prefix for outbound connections,
/// so that one process can present a different source address per bridged identity.
pub trait Ipv6Allocator: Send + Sync {
    /// Allocates an address within `prefix` for `identity_key`, reserving it against reuse
    /// until [`release`][Ipv6Allocator::release] is called.
    ///
    /// Calling this twice with the same `identity_key` and `prefix` without an intervening
    /// `release` returns the same address.
    fn allocate(&self, prefix: Ipv6Addr, prefix_len: u8, identity_key: &str) -> Ipv6Addr;

    /// Releases a previously allocated address, making it available for reuse.
    fn release(&self, addr: Ipv6Addr);
}

/// Deterministic allocator: an identity key always yields the same address for a given
/// prefix, found by hashing the key into the host bits and linearly probing on collision.
#[derive(Debug, Default)]
pub struct DefaultIpv6Allocator {
    taken: Mutex<HashSet<Ipv6Addr>>,
}

impl DefaultIpv6Allocator {
    /// Creates an allocator with no addresses reserved.
    pub fn new() -> Self {
        Self::default()
    }

    fn host_bits(prefix_len: u8) -> u32 {
        (128 - prefix_len as u32).min(128)
    }

    fn candidate(prefix: Ipv6Addr, prefix_len: u8, key: &str, attempt: u64) -> Ipv6Addr {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        attempt.hash(&mut hasher);
        let host = hasher.finish() as u128;

        let bits = Self::host_bits(prefix_len);
        let mask = if bits >= 128 { u128::MAX } else { (1u128 << bits) - 1 };
        let base = u128::from(prefix) & !mask;
        Ipv6Addr::from(base | (host & mask))
    }
}

impl Ipv6Allocator for DefaultIpv6Allocator {
    fn allocate(&self, prefix: Ipv6Addr, prefix_len: u8, identity_key: &str) -> Ipv6Addr {
        let mut taken = self.taken.lock().unwrap();
        for attempt in 0..u64::MAX {
            let addr = Self::candidate(prefix, prefix_len, identity_key, attempt);
            if taken.insert(addr) {
                return addr;
            }
        }
        unreachable!("address space exhausted")
    }

    fn release(&self, addr: Ipv6Addr) {
        self.taken.lock().unwrap().remove(&addr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix() -> Ipv6Addr {
        "2001:db8::".parse().unwrap()
    }

    #[test]
    fn same_key_yields_same_address_until_released() {
        let alloc = DefaultIpv6Allocator::new();
        let a = alloc.allocate(prefix(), 64, "identity-a");
        alloc.release(a);
        let b = alloc.allocate(prefix(), 64, "identity-a");
        assert_eq!(a, b);
    }

    #[test]
    fn different_keys_usually_yield_different_addresses() {
        let alloc = DefaultIpv6Allocator::new();
        let a = alloc.allocate(prefix(), 64, "identity-a");
        let b = alloc.allocate(prefix(), 64, "identity-b");
        assert_ne!(a, b);
    }

    #[test]
    fn allocated_addresses_stay_within_prefix() {
        let alloc = DefaultIpv6Allocator::new();
        let addr = alloc.allocate(prefix(), 64, "identity-a");
        let segments = addr.segments();
        assert_eq!(&segments[..4], &prefix().segments()[..4]);
    }

    #[test]
    fn collision_is_resolved_by_probing() {
        let alloc = DefaultIpv6Allocator::new();
        let a = alloc.allocate(prefix(), 64, "identity-a");
        let b = alloc.allocate(prefix(), 64, "identity-a-collision-seed");
        assert_ne!(a, b);
    }
}
