//! 分析结果展示 - 业务能力层
//!
//! 把宽松的 `AnalysisResult` 一次性投影成展示模型：
//! 每个字段要么有值，要么是明确的 `N/A`，渲染时不再做任何防御性判断。

use crate::models::{AnalysisResult, CleanedData, ClinicalInfo, Medication, VitalSigns};
use std::fmt;

/// 缺失字段的显示文本
pub const NOT_AVAILABLE: &str = "N/A";

/// 一个可能缺失的展示字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Present(String),
    NotAvailable,
}

impl Field {
    /// 空白字符串与缺失同样处理
    pub fn from_option(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(text) if !text.is_empty() => Field::Present(text.to_string()),
            _ => Field::NotAvailable,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Field::Present(text) => Some(text),
            Field::NotAvailable => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_deref().unwrap_or(NOT_AVAILABLE))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientView {
    pub name: Field,
    pub dob: Field,
    pub id: Field,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderView {
    pub name: Field,
    pub contact: Field,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationView {
    pub name: Field,
    pub dosage: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VitalSignsView {
    pub blood_pressure: Field,
    pub heart_rate: Field,
    pub temperature: Field,
}

impl VitalSignsView {
    /// 有值的体征，按固定顺序
    pub fn present(&self) -> Vec<(&'static str, &str)> {
        [
            ("Blood Pressure", &self.blood_pressure),
            ("Heart Rate", &self.heart_rate),
            ("Temperature", &self.temperature),
        ]
        .into_iter()
        .filter_map(|(label, field)| field.as_deref().map(|v| (label, v)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalView {
    /// 规范化后的诊断列表；缺失时为 `None`
    pub diagnosis: Option<Vec<String>>,
    pub medications: Vec<MedicationView>,
    pub vital_signs: VitalSignsView,
}

/// 分析结果的展示模型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub files_processed: u32,
    pub document_type: Field,
    pub patient: PatientView,
    pub provider: ProviderView,
    pub clinical: ClinicalView,
    pub additional_notes: Field,
    pub form_filling_status: Field,
}

impl ResultView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let cleaned = result.cleaned_data.clone().unwrap_or_default();
        let CleanedData {
            document_type,
            patient_info,
            provider_info,
            clinical_info,
            additional_notes,
        } = cleaned;

        let patient = patient_info.unwrap_or_default();
        let provider = provider_info.unwrap_or_default();

        Self {
            files_processed: result.num_files_processed,
            document_type: Field::from_option(document_type.as_deref()),
            patient: PatientView {
                name: Field::from_option(patient.name.as_deref()),
                dob: Field::from_option(patient.dob.as_deref()),
                id: Field::from_option(patient.id.as_deref()),
            },
            provider: ProviderView {
                name: Field::from_option(provider.name.as_deref()),
                contact: Field::from_option(provider.contact.as_deref()),
            },
            clinical: clinical_view(clinical_info.unwrap_or_default()),
            additional_notes: Field::from_option(additional_notes.as_deref()),
            form_filling_status: Field::from_option(result.form_filling_status.as_deref()),
        }
    }

    /// 渲染成纯文本报告
    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn clinical_view(clinical: ClinicalInfo) -> ClinicalView {
    let diagnosis = clinical
        .diagnosis
        .map(|d| d.normalized())
        .filter(|items| items.iter().any(|item| !item.trim().is_empty()));

    let VitalSigns {
        blood_pressure,
        heart_rate,
        temperature,
    } = clinical.vital_signs.unwrap_or_default();

    ClinicalView {
        diagnosis,
        medications: clinical.medications.iter().map(medication_view).collect(),
        vital_signs: VitalSignsView {
            blood_pressure: Field::from_option(blood_pressure.as_deref()),
            heart_rate: Field::from_option(heart_rate.as_deref()),
            temperature: Field::from_option(temperature.as_deref()),
        },
    }
}

fn medication_view(medication: &Medication) -> MedicationView {
    let non_blank = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    MedicationView {
        name: Field::from_option(medication.name.as_deref()),
        dosage: non_blank(&medication.dosage),
        instructions: non_blank(&medication.instructions),
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "✓ Analysis Complete")?;
        writeln!(f, "Processed {} document(s)", self.files_processed)?;
        writeln!(f)?;
        writeln!(f, "Document Type: {}", self.document_type)?;

        writeln!(f, "Patient Information")?;
        writeln!(f, "  Name: {}", self.patient.name)?;
        writeln!(f, "  Date of Birth: {}", self.patient.dob)?;
        writeln!(f, "  Patient ID: {}", self.patient.id)?;

        writeln!(f, "Provider Information")?;
        writeln!(f, "  Name: {}", self.provider.name)?;
        writeln!(f, "  Contact: {}", self.provider.contact)?;

        writeln!(f, "Clinical Information")?;
        match &self.clinical.diagnosis {
            Some(items) => {
                writeln!(f, "  Diagnosis:")?;
                for item in items {
                    writeln!(f, "    • {}", item)?;
                }
            }
            None => writeln!(f, "  Diagnosis: {}", NOT_AVAILABLE)?,
        }

        if !self.clinical.medications.is_empty() {
            writeln!(f, "  Medications:")?;
            for med in &self.clinical.medications {
                match &med.dosage {
                    Some(dosage) => writeln!(f, "    - {} - {}", med.name, dosage)?,
                    None => writeln!(f, "    - {}", med.name)?,
                }
                if let Some(instructions) = &med.instructions {
                    writeln!(f, "      {}", instructions)?;
                }
            }
        }

        let vitals = self.clinical.vital_signs.present();
        if !vitals.is_empty() {
            writeln!(f, "  Vital Signs:")?;
            for (label, value) in vitals {
                writeln!(f, "    {}: {}", label, value)?;
            }
        }

        if let Some(notes) = self.additional_notes.as_deref() {
            writeln!(f, "Additional Notes")?;
            writeln!(f, "  {}", notes)?;
        }

        if let Some(status) = self.form_filling_status.as_deref() {
            writeln!(f, "Form Filling: {}", status)?;
        }
        Ok(())
    }
}
