pub mod analysis;
pub mod document;
pub mod selection;

pub use analysis::{
    AnalysisResult, CleanedData, ClinicalInfo, Diagnosis, Medication, PatientInfo, ProviderInfo,
    VitalSigns,
};
pub use document::{format_file_size, DocumentStatus, UploadedDocument};
pub use selection::{FileSelection, PdfFile, SelectionOutcome, ACCEPTED_MIME};
