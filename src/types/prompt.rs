use serde::{Deserialize, Serialize};

use crate::config::setup_prompt;

// === REMEDIATION PROMPT ===

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ButtonData {
    /// Page the host should open when the button is pressed
    pub href: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PromptElement {
    Button { label: String, data: ButtonData },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PromptArgs {
    pub title: String,
    pub body: String,
    pub elements: Vec<PromptElement>,
}

impl PromptArgs {
    /// Prompt pointing the user at the snap setup page
    pub fn snap_setup(setup_page_url: &str) -> Self {
        Self {
            title: setup_prompt::TITLE.to_string(),
            body: setup_prompt::BODY.to_string(),
            elements: vec![PromptElement::Button {
                label: setup_prompt::BUTTON_LABEL.to_string(),
                data: ButtonData {
                    href: setup_page_url.to_string(),
                },
            }],
        }
    }
}

/// Host UI able to show a prompt. Rendering is the host's business.
pub trait UserInterface {
    fn prompt(&self, args: PromptArgs);
}
