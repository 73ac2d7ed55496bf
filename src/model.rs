use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
    /// Accepted for wire compatibility, currently unused.
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub url: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub links: Vec<Link>,
}

/// One corpus row consumed by the offline index builder.
#[derive(Debug, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub url: String,
    #[serde(default)]
    pub text: Option<String>,
    pub embedding: Vec<f32>,
}
