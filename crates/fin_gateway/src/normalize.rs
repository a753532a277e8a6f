use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

/// The shapes an analyze reply has taken across backend versions, in the
/// order they are preferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{"insight": ...}`
    Insight(String),
    /// `{"result": ...}`
    Result(String),
    /// `{"choices": [{"message": {"content": ...}}]}`
    ChatCompletion(String),
    /// `{"raw": ...}`, or a body that was not JSON at all
    Raw(String),
    Empty,
}

impl PayloadShape {
    pub fn into_text(self) -> String {
        match self {
            PayloadShape::Insight(text)
            | PayloadShape::Result(text)
            | PayloadShape::ChatCompletion(text)
            | PayloadShape::Raw(text) => text,
            PayloadShape::Empty => String::new(),
        }
    }
}

/// An analyze reply, classified once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPayload {
    pub error: Option<String>,
    pub shape: PayloadShape,
}

impl AnalysisPayload {
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Self::from_map(&map),
            Ok(Value::String(text)) => Self {
                error: None,
                shape: PayloadShape::Raw(text),
            },
            Ok(_) => Self {
                error: None,
                shape: PayloadShape::Empty,
            },
            Err(_) => Self {
                error: None,
                shape: PayloadShape::Raw(String::from_utf8_lossy(body).into_owned()),
            },
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let field = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);

        let completion = map
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let shape = if let Some(text) = field("insight") {
            PayloadShape::Insight(text)
        } else if let Some(text) = field("result") {
            PayloadShape::Result(text)
        } else if let Some(text) = completion {
            PayloadShape::ChatCompletion(text)
        } else if let Some(text) = field("raw") {
            PayloadShape::Raw(text)
        } else {
            PayloadShape::Empty
        };

        Self {
            error: field("error"),
            shape,
        }
    }

    /// The one string shown for this reply. Failed replies prefer their
    /// `error` field.
    pub fn into_message(self, success: bool) -> String {
        if !success {
            if let Some(error) = self.error {
                return error;
            }
        }
        if self.shape == PayloadShape::Empty {
            debug!("Analyze payload carried no recognised text field");
        }
        self.shape.into_text()
    }
}

/// Extracts the human-readable string from an analyze reply.
pub fn extract_insight(status: u16, body: &[u8]) -> String {
    AnalysisPayload::from_body(body).into_message((200..300).contains(&status))
}

/// Reply of the upload (OCR) endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadPayload {
    #[serde(default)]
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// Body text when the reply was not a JSON object.
    #[serde(default)]
    pub raw: Option<String>,
}

impl UploadPayload {
    /// A non-JSON body or a bare JSON string is kept as `raw`; a JSON value
    /// that doesn't fit the fields reads as empty.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::String(text)) => Self::from_text(text),
            Ok(value) => serde_json::from_value(value).unwrap_or_default(),
            Err(_) => Self::from_text(String::from_utf8_lossy(body).trim().to_string()),
        }
    }

    fn from_text(text: String) -> Self {
        Self {
            raw: Some(text).filter(|t| !t.is_empty()),
            ..Self::default()
        }
    }
}
