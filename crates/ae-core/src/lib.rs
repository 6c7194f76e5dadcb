pub mod credits;
pub mod error;
pub mod gallery;
pub mod job;
mod model_types;
pub mod request;
pub mod session;

pub use credits::{CreditBalance, CreditPackage, SubscriptionPlan};
pub use error::ValidationError;
pub use gallery::{GalleryItem, Owner};
pub use job::{JobStatus, JobStatusResponse};
pub use model_types::{AspectRatio, ModelType};
pub use request::GenerationRequest;
pub use session::{Session, User};
