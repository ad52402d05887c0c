// Banking Domain
// Customer → Account → Loan / Debit Order → Transaction
//
// Each generator reads the tables it depends on from banking_data/ and writes
// its own yearly table next to them.

pub mod customers;
pub mod accounts;
pub mod loans;
pub mod loan_defaults;
pub mod employment;
pub mod debit_orders;
pub mod debit_order_transactions;
pub mod loan_payments;
pub mod corruption;
pub mod balance;
pub mod merchants;
pub mod transactions;

pub use customers::{BankCustomer, CustomerGenerator};
pub use accounts::{Account, AccountGenerator, AccountType};
pub use loans::{Loan, LoanGenerator, LoanType};
pub use debit_orders::{DebitOrder, DebitOrderGenerator};
pub use loan_payments::{LoanPayment, LoanPaymentGenerator};
pub use balance::{BalanceTracker, BankingTier, Direction};
pub use merchants::{Merchant, MerchantCatalog, SpendingCategory};
pub use transactions::{Transaction, TransactionSimulator};
