pub mod aggregator;
pub mod explanation;
pub mod solver;
pub mod splitbill;

pub use aggregator::{AggregatedLedger, BalanceAggregator, NormalizedBill};
pub use explanation::{Explanation, ExplanationFormatter};
pub use solver::SettlementSolver;
pub use splitbill::{Cell, SettlementReport, SplitBillOutput, SplitBillService};
