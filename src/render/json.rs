//! JSON projection of a batch of documents.
//!
//! ```json
//! {
//!   "documents": [
//!     {
//!       "filename": "Recent Llama Sightings.md",
//!       "title": "Recent Llama Sightings",
//!       "properties": { "author": "Alfred J. Prufrock" },
//!       "preamble": "",
//!       "sections": [
//!         {
//!           "title": "2 Llamas Spotted Near Mall",
//!           "images": [{ "description": "two llamas", "source": "llamas.jpg" }],
//!           "properties": { "date": "Mon, 01 Jan 2024 10:00:00 GMT" },
//!           "body": "They were near the food court."
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```

use super::RenderError;
use crate::model::{Document, Image, Properties, Section};
use serde::Serialize;

#[derive(Serialize)]
struct JsonOutput<'a> {
    documents: Vec<JsonDocument<'a>>,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    filename: Option<&'a str>,
    title: &'a str,
    properties: &'a Properties,
    preamble: String,
    sections: Vec<JsonSection<'a>>,
}

#[derive(Serialize)]
struct JsonSection<'a> {
    title: &'a str,
    images: &'a [Image],
    properties: &'a Properties,
    body: String,
}

impl<'a> From<&'a Document> for JsonDocument<'a> {
    fn from(document: &'a Document) -> Self {
        Self {
            filename: document.filename.as_deref(),
            title: &document.title,
            properties: &document.properties,
            preamble: document.preamble.join("\n"),
            sections: document.sections.iter().map(JsonSection::from).collect(),
        }
    }
}

impl<'a> From<&'a Section> for JsonSection<'a> {
    fn from(section: &'a Section) -> Self {
        Self {
            title: &section.title,
            images: &section.images,
            properties: &section.properties,
            body: section.body(),
        }
    }
}

/// Pretty-printed `{"documents": [...]}` for the whole batch.
pub fn render_documents(documents: &[Document]) -> Result<String, RenderError> {
    let output = JsonOutput {
        documents: documents.iter().map(JsonDocument::from).collect(),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use serde_json::{Value, json};

    #[test]
    fn projects_documents_and_sections() {
        let mut doc = parse(
            "# Sightings\n\n* author: Alfred\n\nIntro.\n\n### Bridge\n\n![llama](l.jpg)\n\n* date: Jan 1 1984 12:00:00\n* seen-by @ Alice\n\nLine one.\nLine two.\n",
        )
        .unwrap();
        doc.filename = Some("sightings.md".to_string());

        let value: Value = serde_json::from_str(&render_documents(&[doc]).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "documents": [{
                    "filename": "sightings.md",
                    "title": "Sightings",
                    "properties": {"author": "Alfred"},
                    "preamble": "Intro.",
                    "sections": [{
                        "title": "Bridge",
                        "images": [{"description": "llama", "source": "l.jpg"}],
                        "properties": {
                            "date": "Jan 1 1984 12:00:00",
                            "seen-by": ["Alice"]
                        },
                        "body": "Line one.\nLine two."
                    }]
                }]
            })
        );
    }

    #[test]
    fn unloaded_document_has_null_filename() {
        let doc = Document::new("Loose");
        let value: Value = serde_json::from_str(&render_documents(&[doc]).unwrap()).unwrap();
        assert_eq!(value["documents"][0]["filename"], Value::Null);
        assert_eq!(value["documents"][0]["sections"], json!([]));
    }
}
