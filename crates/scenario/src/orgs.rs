//! Organization tags and caller identities of the trade network.
//!
//! Organization tags select endorsing peers. Callers name the user identity
//! within an organization; the two banks call through their client's org.

pub const EXPORTER_ORG: &str = "exporterorg";
pub const IMPORTER_ORG: &str = "importerorg";
pub const CARRIER_ORG: &str = "carrierorg";
pub const REGULATOR_ORG: &str = "regulatororg";
pub const LENDER_ORG: &str = "lenderorg";

pub const EXPORTER: &str = "Exporter";
pub const EXPORTERS_BANK: &str = "ExportersBank";
pub const IMPORTER: &str = "Importer";
pub const IMPORTERS_BANK: &str = "ImportersBank";
pub const CARRIER: &str = "Carrier";
pub const REGULATOR: &str = "Regulator";
pub const LENDER: &str = "Lender";

/// Every organization tag, in network order.
pub const ALL_ORGS: [&str; 5] = [EXPORTER_ORG, IMPORTER_ORG, CARRIER_ORG, REGULATOR_ORG, LENDER_ORG];
