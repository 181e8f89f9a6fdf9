//! Request descriptions for the fetch client.

use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP method of a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[serde(alias = "get")]
    #[default]
    Get,
    #[serde(alias = "post")]
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// A single page request: URL, method and optional form parameters.
///
/// Form parameters are sent url-encoded in the body of a POST. They are
/// ignored for GET requests, where paging is expressed in the URL itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    pub form: Vec<(String, String)>,
}

impl FetchRequest {
    /// A plain GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            form: Vec::new(),
        }
    }

    /// A POST request with no form parameters yet.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            form: Vec::new(),
        }
    }

    /// Appends a form parameter.
    pub fn with_form_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)?;
        if !self.form.is_empty() {
            let pairs: Vec<String> = self.form.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            write!(f, " [{}]", pairs.join("&"))?;
        }
        Ok(())
    }
}
