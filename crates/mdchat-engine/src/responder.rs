//! Response sources.
//!
//! A [`ResponseSource`] turns the submitted user text into the full
//! assistant reply before the reveal starts. [`TemplateResponder`] is the
//! built-in source: a fixed markdown document that quotes the input and
//! exercises the renderer.

/// Produces the full assistant reply for a submitted input.
pub trait ResponseSource: Send {
    /// Build the complete reply text for `input`.
    fn respond(&mut self, input: &str) -> Result<String, ResponseError>;

    /// Short name shown in logs.
    fn name(&self) -> &str {
        "responder"
    }
}

/// Deterministic markdown template responder.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateResponder;

impl ResponseSource for TemplateResponder {
    fn respond(&mut self, input: &str) -> Result<String, ResponseError> {
        Ok(generate_response(input))
    }

    fn name(&self) -> &str {
        "template"
    }
}

/// Build the canned markdown reply for `input`.
///
/// The input is embedded verbatim inside double quotes, followed by two
/// headings, a two item list, bold and italic emphasis, a link and a fenced
/// javascript block. The result has no trailing newline.
pub fn generate_response(input: &str) -> String {
    format!(
        "Here's a Markdown response to your input: \"{input}\"\n\
         \n\
         # Heading 1\n\
         ## Heading 2\n\
         \n\
         - List item 1\n\
         - List item 2\n\
         \n\
         **Bold text** and *italic text*\n\
         \n\
         [A link](https://example.com)\n\
         \n\
         ```javascript\n\
         console.log('Hello, World!');\n\
         ```"
    )
}

/// Errors from a response source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// The source could not produce a reply.
    #[error("response generation failed: {0}")]
    Generation(String),
}
