//! Built-in scenarios for the five-organization trade workflow.

use saga::{DEFAULT_CONTRACT_VERSION, Step};

use crate::error::{Result, ScenarioError};
use crate::orgs::*;
use crate::scenario::Scenario;

/// Names accepted by [`builtin`].
pub const BUILTIN_SCENARIOS: [&str; 3] = ["account-balances", "trade-request", "trade-workflow"];

/// Values substituted into the built-in scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeParams {
    pub trade_id: String,
    pub contract_version: String,
}

impl TradeParams {
    pub fn new(trade_id: impl Into<String>, contract_version: impl Into<String>) -> Self {
        Self {
            trade_id: trade_id.into(),
            contract_version: contract_version.into(),
        }
    }

    fn invoke(&self, org: &str, caller: &str, function: &str) -> Step {
        Step::invoke(org, function)
            .caller(caller)
            .version(&self.contract_version)
            .arg(&self.trade_id)
    }

    fn query(&self, org: &str, caller: &str, function: &str) -> Step {
        Step::query(org, function)
            .caller(caller)
            .version(&self.contract_version)
            .arg(&self.trade_id)
    }

    fn balance(&self, org: &str, caller: &str, account: &str) -> Step {
        self.query(org, caller, "getAccountBalance")
            .arg(account)
            .label(format!("getAccountBalance ({caller})"))
    }
}

impl Default for TradeParams {
    fn default() -> Self {
        Self::new("9gsdns3", DEFAULT_CONTRACT_VERSION)
    }
}

/// Looks up a built-in scenario by name.
pub fn builtin(name: &str, params: &TradeParams) -> Result<Scenario> {
    match name {
        "account-balances" => Ok(account_balances(params)),
        "trade-request" => Ok(trade_request(params)),
        "trade-workflow" => Ok(trade_workflow(params)),
        other => Err(ScenarioError::UnknownScenario(other.to_string())),
    }
}

/// Reads the exporter, importer and lender balances for a trade.
pub fn account_balances(p: &TradeParams) -> Scenario {
    Scenario::new(
        "account-balances",
        vec![
            p.balance(EXPORTER_ORG, EXPORTER, "exporter"),
            p.balance(IMPORTER_ORG, IMPORTER, "importer"),
            p.balance(LENDER_ORG, LENDER, "lender"),
        ],
    )
    .with_description("Query every party's account balance")
}

fn request_and_accept(p: &TradeParams) -> Vec<Step> {
    vec![
        p.invoke(IMPORTER_ORG, IMPORTER, "requestTrade")
            .args(["50000", "Wood for Toys"]),
        p.query(EXPORTER_ORG, EXPORTER, "getTradeStatus")
            .label("getTradeStatus (Exporter)"),
        p.invoke(EXPORTER_ORG, EXPORTER, "acceptTrade"),
        p.query(IMPORTER_ORG, IMPORTER, "getTradeStatus")
            .label("getTradeStatus (Importer)"),
    ]
}

/// The importer requests a trade and the exporter accepts it.
pub fn trade_request(p: &TradeParams) -> Scenario {
    Scenario::new("trade-request", request_and_accept(p))
        .with_description("Request a trade and accept it")
}

/// The full trade: letter of credit, export license, shipment, payment,
/// L/C transfer to the lender with an advance payment, delivery and final
/// settlement.
pub fn trade_workflow(p: &TradeParams) -> Scenario {
    let mut steps = request_and_accept(p);

    // Letter of credit
    steps.extend([
        p.invoke(IMPORTER_ORG, IMPORTER, "requestLC"),
        p.query(IMPORTER_ORG, IMPORTER, "getLCStatus")
            .label("getLCStatus (Importer)"),
        p.invoke(IMPORTER_ORG, IMPORTERS_BANK, "issueLC")
            .args(["lc8349", "12/31/2018", "E/L", "B/L"]),
        p.query(IMPORTER_ORG, IMPORTERS_BANK, "getLCStatus")
            .label("getLCStatus (ImportersBank)"),
        p.invoke(EXPORTER_ORG, EXPORTERS_BANK, "acceptLC"),
        p.query(EXPORTER_ORG, EXPORTERS_BANK, "getLCStatus")
            .label("getLCStatus (ExportersBank)"),
    ]);

    // Export license
    steps.extend([
        p.invoke(EXPORTER_ORG, EXPORTER, "requestEL"),
        p.query(EXPORTER_ORG, EXPORTER, "getELStatus")
            .label("getELStatus (after request)"),
        p.invoke(REGULATOR_ORG, REGULATOR, "issueEL")
            .args(["el979", "4/30/2019"]),
        p.query(EXPORTER_ORG, EXPORTER, "getELStatus")
            .label("getELStatus (after issue)"),
    ]);

    // Shipment and first payment
    steps.extend([
        p.invoke(EXPORTER_ORG, EXPORTER, "prepareShipment"),
        p.query(IMPORTER_ORG, IMPORTER, "getShipmentLocation")
            .label("getShipmentLocation (prepared)"),
        p.invoke(CARRIER_ORG, CARRIER, "acceptShipmentAndIssueBL").args([
            "bl06678",
            "8/31/2018",
            "Woodlands Port",
            "Market Port",
        ]),
        p.query(EXPORTER_ORG, EXPORTER, "getBillOfLading"),
        p.invoke(EXPORTER_ORG, EXPORTER, "requestPayment")
            .label("requestPayment (Exporter)"),
        p.invoke(IMPORTER_ORG, IMPORTER, "makePayment")
            .arg("01/01/2019")
            .label("makePayment (first)"),
        // Read through the lender's peers.
        p.balance(LENDER_ORG, EXPORTER, "exporter"),
        p.balance(IMPORTER_ORG, IMPORTER, "importer"),
    ]);

    // L/C transfer to the lender and advance payment
    steps.extend([
        p.invoke(EXPORTER_ORG, EXPORTER, "requestLCTransfer").arg("0.1"),
        p.query(EXPORTER_ORG, EXPORTER, "getLCStatus")
            .label("getLCStatus (transfer requested)"),
        p.invoke(EXPORTER_ORG, EXPORTER, "issueLCTransfer"),
        p.query(EXPORTER_ORG, EXPORTER, "getLCStatus")
            .label("getLCStatus (transfer issued)"),
        p.invoke(LENDER_ORG, LENDER, "acceptLCTransfer"),
        p.query(LENDER_ORG, LENDER, "getLCStatus")
            .label("getLCStatus (Lender)"),
        p.invoke(EXPORTER_ORG, EXPORTER, "requestAdvancePayment"),
        p.invoke(LENDER_ORG, LENDER, "makeAdvancePayment"),
        p.balance(EXPORTER_ORG, EXPORTER, "exporter"),
        p.balance(LENDER_ORG, LENDER, "lender"),
    ]);

    // Delivery and settlement
    steps.extend([
        p.invoke(CARRIER_ORG, CARRIER, "updateShipmentLocation")
            .args(["DESTINATION", "02/01/2019"]),
        p.query(IMPORTER_ORG, IMPORTER, "getShipmentLocation")
            .label("getShipmentLocation (delivered)"),
        p.query(IMPORTER_ORG, IMPORTER, "getArrivalDate"),
        p.invoke(LENDER_ORG, LENDER, "requestPayment")
            .label("requestPayment (Lender)"),
        p.invoke(IMPORTER_ORG, IMPORTER, "makePayment")
            .arg("03/01/2019")
            .label("makePayment (final)"),
        p.balance(EXPORTER_ORG, EXPORTER, "exporter"),
        p.balance(IMPORTER_ORG, IMPORTER, "importer"),
        p.balance(LENDER_ORG, LENDER, "lender"),
    ]);

    Scenario::new("trade-workflow", steps)
        .with_description("Five-organization trade from request to final settlement")
}
