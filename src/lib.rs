//! Animated single-page portfolio: hero, about, projects and contact
//! sections over a WebGL veil, with an optional generator that rewrites the
//! profile from a free-text prompt.
//!
//! Everything outside `wasm` is target independent and tested on the host.

pub mod background;
pub mod config;
pub mod error;
pub mod generator;
pub mod profile;
pub mod reveal;
pub mod shell;

pub use background::{FrameClock, VeilConfig};
pub use config::SiteConfig;
pub use error::{GenerateError, PageError};
pub use generator::{GeminiGenerator, GenerationRequest, ProfileGenerator};
pub use profile::{BrandProfile, Project};
pub use reveal::{IntersectionSample, RevealState, RevealTransition};
pub use shell::{Command, Modal, Msg, PageState, Phase};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use wasm_bindgen::prelude::*;

    mod app;
    mod dom;
    mod logger;
    mod observe;
    mod render;

    pub use observe::RevealController;
    pub use render::BackgroundHandle;

    use crate::error::PageError;

    pub(crate) fn dom_err(err: JsValue) -> PageError {
        PageError::Dom(err.as_string().unwrap_or_else(|| format!("{err:?}")))
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        logger::init(log::LevelFilter::Info);
        let config = app::load_config(&document);
        logger::init(config.log_level());

        // Pages without the mount points (e.g. the test harness) load the
        // module without a UI.
        let (Some(root), Some(canvas)) = (
            document.get_element_by_id("app"),
            document.get_element_by_id("veil"),
        ) else {
            log::debug!("no #app/#veil in document; not mounting");
            return Ok(());
        };
        let canvas = canvas.dyn_into::<web_sys::HtmlCanvasElement>()?;

        app::App::mount(config, &root, canvas).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(())
    }

    /// Mount the background alone on `canvas`. Exposed for embedding and
    /// browser tests; dropping the handle tears the loop down.
    pub fn start_background(
        canvas: web_sys::HtmlCanvasElement,
        config: std::rc::Rc<std::cell::RefCell<crate::VeilConfig>>,
    ) -> Result<BackgroundHandle, PageError> {
        render::start(canvas, config)
    }

    /// Mount the whole page into `root`. Used by the browser tests.
    pub fn mount_page(
        config: crate::SiteConfig,
        root: &web_sys::Element,
        canvas: web_sys::HtmlCanvasElement,
    ) -> Result<(), PageError> {
        app::App::mount(config, root, canvas)
    }
}
