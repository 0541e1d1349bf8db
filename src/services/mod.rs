pub mod projector;
pub use projector::{
    ProjectionError, ProjectionFailed, ProjectionOptions, RequestProjector, RequestRecord,
};

pub mod requests;
pub use requests::{RequestError, RequestService, RequestServiceOptions};

pub mod validation;
pub use validation::{ParameterError, RawRequestQuery, RequestQuery};
