//! Salesforce integration: session bridge, field dictionary, REST gateway
//! and the fixed record operations built on them.

pub mod client;
pub mod fields;
pub mod records;
pub mod session;

pub use client::{RecordGateway, SalesforceRestClient};
pub use fields::{JobField, OpportunityDiscussedField, SObject, SObjectField, UpdatePayload};
pub use records::RecordRelay;
pub use session::{CrmSession, SessionProvider, SoapLoginProvider};
