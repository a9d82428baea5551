#![forbid(unsafe_code)]

use log::error;
use tera::{Context, Tera};

use crate::utils::errors::Errors;
use crate::utils::greetings::GreetingTable;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// The .html suffix turns on tera's autoescaping for subscriber supplied names.
const EDITION_TEMPLATE_NAME : &str = "edition.html";
const EDITION_TEMPLATE      : &str = include_str!("../../templates/edition.html");

// ***************************************************************************
//                                AppState
// ***************************************************************************
/// Read-only state built once in main and shared by every request handler.
#[derive(Debug)]
pub struct AppState {
    pub greetings: GreetingTable,
    templates: Tera,
}

impl AppState {
    // -----------------------------------------------------------------------
    // new:
    // -----------------------------------------------------------------------
    /** Build the greeting table and compile the edition template. */
    pub fn new() -> Result<Self, Errors> {
        let mut templates = Tera::default();
        if let Err(e) = templates.add_raw_template(EDITION_TEMPLATE_NAME, EDITION_TEMPLATE) {
            let msg = Errors::TemplateLoad(e.to_string());
            error!("{}", msg);
            return Err(msg);
        }

        Ok(AppState { greetings: GreetingTable::new(), templates })
    }

    // -----------------------------------------------------------------------
    // render_edition:
    // -----------------------------------------------------------------------
    /** Render the edition html for a greeting line. */
    pub fn render_edition(&self, greeting: &str) -> Result<String, Errors> {
        let mut context = Context::new();
        context.insert("greeting", greeting);
        self.templates.render(EDITION_TEMPLATE_NAME, &context).map_err(|e| {
            error!("Edition template rendering failed: {}", e);
            Errors::RenderEdition
        })
    }
}
