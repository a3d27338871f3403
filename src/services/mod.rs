pub mod document_registry;
pub mod result_view;

pub use document_registry::{DocumentRegistry, RegistryState};
pub use result_view::{Field, ResultView, NOT_AVAILABLE};
