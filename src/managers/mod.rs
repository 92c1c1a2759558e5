// wledmark state managers
// Managers own all mutation: the places database, its backup, and the ledger.

pub mod ledger;
pub mod store_manager;
