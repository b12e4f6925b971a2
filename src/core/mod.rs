pub mod accepter;
pub mod decoder;
pub mod dispatcher;
pub mod reducer;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{
    DecodedMessage, Delivery, DispatchOutcome, DispatchReport, DomainName, DomainResult,
    FieldGroup, MessageDisposition, ProductIdentifier, Settlement,
};
pub use crate::domain::ports::{ConfigProvider, MasterDataApi, ResultSink, Transport};
pub use crate::utils::error::Result;
