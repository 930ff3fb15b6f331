use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use log::info;

use crate::models::chat::{ Dialog, Message };

#[derive(Debug)]
pub enum DialogsError {
    Empty,
    EmptyDialog(usize),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for DialogsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogsError::Empty => write!(f, "Dialogs file contains no dialogs"),
            DialogsError::EmptyDialog(index) => write!(f, "Dialog #{} has no messages", index),
            DialogsError::IoError(e) => write!(f, "Dialogs file IO error: {}", e),
            DialogsError::JsonError(e) => write!(f, "Dialogs JSON parsing error: {}", e),
        }
    }
}

impl Error for DialogsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DialogsError::IoError(e) => Some(e),
            DialogsError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DialogsError {
    fn from(err: std::io::Error) -> Self {
        DialogsError::IoError(err)
    }
}

impl From<serde_json::Error> for DialogsError {
    fn from(err: serde_json::Error) -> Self {
        DialogsError::JsonError(err)
    }
}

/// Reads a JSON array of dialogs, each an array of `{ "role", "content" }` objects.
pub fn load_dialogs<P: AsRef<Path>>(path: P) -> Result<Vec<Dialog>, DialogsError> {
    let file_content = fs::read_to_string(&path)?;
    let dialogs: Vec<Dialog> = serde_json::from_str(&file_content)?;

    if dialogs.is_empty() {
        return Err(DialogsError::Empty);
    }
    if let Some(index) = dialogs.iter().position(|dialog| dialog.is_empty()) {
        return Err(DialogsError::EmptyDialog(index));
    }

    info!("Loaded {} dialogs from {}", dialogs.len(), path.as_ref().display());
    Ok(dialogs)
}

const JAPAN_LANDMARKS: &str =
    "    Japan is home to many iconic landmarks that attract tourists from all over the world. Here are some famous landmarks in Japan:

    1. Mount Fuji: This majestic and iconic mountain is the highest peak in Japan and a symbol of the country.
    2. Tokyo Tower: A prominent landmark in Tokyo, this communications and observation tower offers panoramic views of the city.
    3. Kyoto's Kiyomizu-dera Temple: A historic temple with a stunning wooden stage that offers picturesque views of Kyoto.

    These are just a few examples of the many famous landmarks that Japan has to offer.";

const ENTREPRENEUR_BOOKS: &str =
    "    Reading is a great way to enhance your entrepreneurial skills and knowledge. Here are some must-read books for entrepreneurs:

    1. \"The Lean Startup\" by Eric Ries: This book introduces the concept of lean methodology and is essential for any startup founder.
    2. \"The Innovator's Dilemma\" by Clayton Christensen: A classic that explores disruptive innovation and its impact on businesses.
    3. \"Shoe Dog\" by Phil Knight: The memoir of the Nike founder offers valuable insights into building a successful business.

    These books cover a range of important topics for entrepreneurs and are highly recommended reads.";

const INDIA_FESTIVALS: &str =
    "    India is known for its rich cultural heritage and vibrant festivals. Here are some traditional customs and festivals in India:

    1. Diwali: Also known as the Festival of Lights, Diwali is one of the most important Hindu festivals celebrated with fireworks, sweets, and decorations.
    2. Holi: Known as the Festival of Colors, Holi is a lively celebration where people throw colored powders and water at each other in a joyous atmosphere.
    3. Navratri: A nine-night festival dedicated to the worship of the Hindu goddess Durga, Navratri features traditional dance performances and music.

    These are just a few examples of the colorful customs and festivals that showcase India's cultural diversity.";

/// The demonstration batch used when no dialogs file is given.
pub fn example_dialogs() -> Vec<Dialog> {
    vec![
        vec![Message::user("how to lead a team on a project?")],
        vec![
            Message::user("What are some famous landmarks in Japan?"),
            Message::assistant(JAPAN_LANDMARKS),
            Message::user("What are the benefits of practicing yoga regularly?")
        ],
        vec![Message::system("How can I improve my time management skills at work?")],
        vec![
            Message::user("Can you recommend some must-read books for entrepreneurs?"),
            Message::assistant(ENTREPRENEUR_BOOKS),
            Message::user("What are the best ways to stay productive while working from home?")
        ],
        vec![
            Message::user("What are some traditional customs and festivals in India?"),
            Message::assistant(INDIA_FESTIVALS),
            Message::user("What are some key tips for taking great photographs?")
        ]
    ]
}
