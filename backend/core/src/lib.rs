//! Shared pieces of the Greenlens pipelines: the error taxonomy and the
//! collaborator traits that stand in for hosted models.

pub mod error;
pub mod traits;

pub use error::{Collaborator, LensError, LensResult};
pub use traits::{TextModel, VisionModel};
