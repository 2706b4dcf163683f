#![forbid(unsafe_code)]

use adminql_core::{Datum, IdentifierFormat, Microtime, ServerId};
use adminql_store::ClusterMetadata;

use crate::convert::{microtime_to_datum, port_to_datum, uuid_to_datum};
use crate::resolve::server_id_to_datum;

/// Output-only row of `server_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStatus {
    pub id: ServerId,
    pub reql_port: u16,
    pub cluster_port: u16,
    pub time_connected: Microtime,
}

impl ServerStatus {
    /// `None` when the server is no longer in `meta`.
    pub fn to_datum(&self, meta: &ClusterMetadata) -> Option<Datum> {
        let identity = server_id_to_datum(self.id, IdentifierFormat::Name, meta)?;
        let network = Datum::from_pairs([
            ("reql_port", port_to_datum(self.reql_port)),
            ("cluster_port", port_to_datum(self.cluster_port)),
            ("time_connected", microtime_to_datum(self.time_connected)),
        ]);
        Some(Datum::from_pairs([
            ("id", uuid_to_datum(self.id.into())),
            ("name", identity.datum),
            ("network", network),
        ]))
    }
}
