use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::templates::substitution::render;

/// Static shape of an email template; never mutated per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailLayout {
    pub subject: &'static str,
    pub html_body: &'static str,
    pub text_body: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsTemplate {
    pub message: String,
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

impl EmailTemplate {
    pub fn render(&self) -> RenderedEmail {
        RenderedEmail {
            subject: render(&self.subject, &self.variables),
            html_body: render(&self.html_body, &self.variables),
            text_body: render(&self.text_body, &self.variables),
        }
    }
}

impl SmsTemplate {
    pub fn render(&self) -> String {
        render(&self.message, &self.variables)
    }
}
