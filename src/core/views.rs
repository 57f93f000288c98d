//! HTML views

use crate::types::Content;

/// Name shown when no name is given
pub const GUEST_NAME: &str = "Guest";

/// Greeting page for `name`, with a link to a sample greeting
pub fn index(name: &str) -> Content {
    let name = html_escape::encode_text(name);
    Content::html(format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>Hello {name}</title></head>\n\
         <body>\n\
         <h1 id=\"title\">Hello {name}</h1>\n\
         <a href=\"/Coco\">Say hello to Coco</a>\n\
         </body>\n\
         </html>\n"
    ))
}

// =============================================================================
// TESTS
// =============================================================================
