//! IEC 61162-450 transmission group table.
//!
//! The standard reserves the `239.192.0.1`–`239.192.0.16` multicast block,
//! ports 60001–60016, for LWE traffic. Seven groups carry talker sets;
//! PROP and USR1–USR8 are reserved for proprietary/user equipment and
//! currently match no talker.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddrV4};

use crate::types::TalkerId;

/// One IEC 61162-450 transmission group.
#[derive(Debug)]
pub struct TransmissionGroup {
    pub name: &'static str,
    pub address: Ipv4Addr,
    pub port: u16,
    /// Talker identifiers routed to this group. Empty for reserved groups.
    pub talkers: &'static [&'static str],
}

impl TransmissionGroup {
    pub fn destination(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.address, self.port)
    }
}

/// The fixed group table. A talker belongs to at most one group.
pub static TRANSMISSION_GROUPS: [TransmissionGroup; 16] = [
    TransmissionGroup {
        name: "MISC",
        address: Ipv4Addr::new(239, 192, 0, 1),
        port: 60001,
        talkers: &[
            "AG", "AP", "DF", "HC", "HE", "HN", "II", "IN", "SD", "SS", "VD", "VM", "VW", "WI",
            "YX",
        ],
    },
    TransmissionGroup {
        name: "TGTD",
        address: Ipv4Addr::new(239, 192, 0, 2),
        port: 60002,
        talkers: &["AB", "AD", "AI", "AN", "AR", "AS", "AT", "AX", "RA", "TI"],
    },
    TransmissionGroup {
        name: "SATD",
        address: Ipv4Addr::new(239, 192, 0, 3),
        port: 60003,
        talkers: &["GA", "GB", "GI", "GQ"],
    },
    TransmissionGroup {
        name: "NAVD",
        address: Ipv4Addr::new(239, 192, 0, 4),
        port: 60004,
        talkers: &["EC", "EI", "GL", "GN", "GP", "SN"],
    },
    TransmissionGroup {
        name: "VDRD",
        address: Ipv4Addr::new(239, 192, 0, 5),
        port: 60005,
        talkers: &["VR"],
    },
    TransmissionGroup {
        name: "RCOM",
        address: Ipv4Addr::new(239, 192, 0, 6),
        port: 60006,
        talkers: &["CD", "CR", "CS", "CT", "CV", "CX", "EP", "ER"],
    },
    TransmissionGroup {
        name: "TIME",
        address: Ipv4Addr::new(239, 192, 0, 7),
        port: 60007,
        talkers: &["ZA", "ZC", "ZQ", "ZV"],
    },
    TransmissionGroup {
        name: "PROP",
        address: Ipv4Addr::new(239, 192, 0, 8),
        port: 60008,
        talkers: &[],
    },
    TransmissionGroup {
        name: "USR1",
        address: Ipv4Addr::new(239, 192, 0, 9),
        port: 60009,
        talkers: &[],
    },
    TransmissionGroup {
        name: "USR2",
        address: Ipv4Addr::new(239, 192, 0, 10),
        port: 60010,
        talkers: &[],
    },
    TransmissionGroup {
        name: "USR3",
        address: Ipv4Addr::new(239, 192, 0, 11),
        port: 60011,
        talkers: &[],
    },
    TransmissionGroup {
        name: "USR4",
        address: Ipv4Addr::new(239, 192, 0, 12),
        port: 60012,
        talkers: &[],
    },
    TransmissionGroup {
        name: "USR5",
        address: Ipv4Addr::new(239, 192, 0, 13),
        port: 60013,
        talkers: &[],
    },
    TransmissionGroup {
        name: "USR6",
        address: Ipv4Addr::new(239, 192, 0, 14),
        port: 60014,
        talkers: &[],
    },
    TransmissionGroup {
        name: "USR7",
        address: Ipv4Addr::new(239, 192, 0, 15),
        port: 60015,
        talkers: &[],
    },
    TransmissionGroup {
        name: "USR8",
        address: Ipv4Addr::new(239, 192, 0, 16),
        port: 60016,
        talkers: &[],
    },
];

/// Immutable talker → group lookup, precomputed from the table.
///
/// The table itself groups talkers by destination; flattening it gives
/// O(1) lookup per sentence instead of scanning groups.
pub struct Registry {
    by_talker: HashMap<TalkerId, &'static TransmissionGroup>,
}

impl Registry {
    /// Build the registry from [`TRANSMISSION_GROUPS`].
    pub fn standard() -> Self {
        let mut by_talker = HashMap::new();
        for group in &TRANSMISSION_GROUPS {
            for talker in group.talkers {
                let id = TalkerId::from_pair(talker).expect("group table talkers are 2-char ASCII");
                let previous = by_talker.insert(id, group);
                debug_assert!(
                    previous.is_none(),
                    "talker {talker} assigned to more than one group"
                );
            }
        }
        Self { by_talker }
    }

    /// Look up the transmission group for a talker.
    ///
    /// `None` is a normal routing outcome ("do not relay"), not an error.
    pub fn lookup(&self, talker: &TalkerId) -> Option<&'static TransmissionGroup> {
        self.by_talker.get(talker).copied()
    }

    /// Number of distinct talkers the registry routes.
    pub fn talker_count(&self) -> usize {
        self.by_talker.len()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}
