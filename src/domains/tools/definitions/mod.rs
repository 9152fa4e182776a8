//! Tool definitions module.
//!
//! Endpoints of the demo application served by the binary. Each file holds
//! one handler family together with the declarations that publish it.

pub mod calculator;
pub mod documents;
pub mod extraction;
pub mod system;

pub use calculator::calculator_endpoint;
pub use documents::document_endpoint;
pub use extraction::extract_endpoint;
pub use system::health_endpoint;

use super::ToolApp;

/// The demo application: four tools and one internal route.
pub fn demo_app() -> ToolApp {
    system::mount(ToolApp::new())
        .endpoint(extract_endpoint())
        .endpoint(document_endpoint())
        .endpoint(calculator_endpoint())
}
