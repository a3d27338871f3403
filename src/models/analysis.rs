//! 分析结果模型
//!
//! 服务端返回的结构比较松散：除 `num_files_processed` 外所有字段都可能缺失，
//! 个别字段的形状也不固定（`diagnosis` 可能是字符串或字符串数组）。
//! 这里在边界处一次性解析成全 `Option` 的结构，类型不对的嵌套字段按缺失处理。

use crate::error::AnalysisError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `/analyze/all` 的响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub num_files_processed: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub cleaned_data: Option<CleanedData>,
    /// 服务端后台填表任务的状态，如 `running_in_background`
    #[serde(default, deserialize_with = "lenient_text")]
    pub form_filling_status: Option<String>,
}

impl AnalysisResult {
    /// 从 JSON 值解析，非对象或缺少 `num_files_processed` 视为格式错误
    pub fn from_value(value: Value) -> Result<Self, AnalysisError> {
        if !value.is_object() {
            return Err(AnalysisError::Malformed {
                reason: format!("expected a JSON object, got {}", json_kind(&value)),
            });
        }
        serde_json::from_value(value).map_err(|e| AnalysisError::Malformed {
            reason: e.to_string(),
        })
    }

    pub fn from_json_str(body: &str) -> Result<Self, AnalysisError> {
        let value: Value = serde_json::from_str(body).map_err(|e| AnalysisError::Malformed {
            reason: e.to_string(),
        })?;
        Self::from_value(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanedData {
    #[serde(default, deserialize_with = "lenient_text")]
    pub document_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub patient_info: Option<PatientInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub provider_info: Option<ProviderInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub clinical_info: Option<ClinicalInfo>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalInfo {
    #[serde(default, deserialize_with = "lenient_diagnosis")]
    pub diagnosis: Option<Diagnosis>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub medications: Vec<Medication>,
    #[serde(default, deserialize_with = "lenient")]
    pub vital_signs: Option<VitalSigns>,
}

/// 诊断：服务端可能返回单个字符串或字符串数组
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Diagnosis {
    Single(String),
    List(Vec<String>),
}

impl Diagnosis {
    /// 统一成有序列表：单值包成一个元素，列表原样返回
    pub fn normalized(&self) -> Vec<String> {
        match self {
            Diagnosis::Single(value) => vec![value.clone()],
            Diagnosis::List(values) => values.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub dosage: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    #[serde(default, deserialize_with = "lenient_text")]
    pub blood_pressure: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub heart_rate: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub temperature: Option<String>,
}

/// 类型不匹配时返回 `None` 而不是报错
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// 文本字段：数字和布尔值按原样转成字符串，对象、数组按缺失处理
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(value))
}

/// 诊断：单值或列表；列表逐个元素解析，丢弃 null 和空白项
fn lenient_diagnosis<'de, D>(deserializer: D) -> Result<Option<Diagnosis>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => {
            let items: Vec<String> = items
                .into_iter()
                .filter_map(scalar_text)
                .filter(|item| !item.trim().is_empty())
                .collect();
            (!items.is_empty()).then_some(Diagnosis::List(items))
        }
        other => scalar_text(other).map(Diagnosis::Single),
    })
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// 逐个元素宽松解析，丢弃无法识别的元素；非数组按空列表处理
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| T::deserialize(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
