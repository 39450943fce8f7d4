//! The page controller: owns [`PageState`], turns DOM events into messages
//! and carries out the commands they produce.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Document, Element, Event, EventTarget, HtmlCanvasElement, MouseEvent, Node};

use super::dom::{Reveals, View, ACTION_CLOSE, ACTION_DISMISS, ACTION_OPEN};
use super::observe::RevealController;
use super::render::{self, BackgroundHandle};
use super::dom_err;
use crate::background::VeilConfig;
use crate::config::{RevealThresholds, SiteConfig};
use crate::error::Result;
use crate::generator::{GeminiGenerator, GenerationRequest, ProfileGenerator};
use crate::shell::{Command, Msg, PageState, FAILURE_NOTICE};

const CONFIG_ELEMENT_ID: &str = "site-config";
const INTERACTIVE: &str = "[data-interactive]";

/// Read the inline JSON config block, falling back to defaults.
pub fn load_config(document: &Document) -> SiteConfig {
    let json = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
        .unwrap_or_default();
    let config = SiteConfig::from_json(&json).unwrap_or_else(|err| {
        log::warn!("{err}; using defaults");
        SiteConfig::default()
    });
    let config = config.with_build_env();
    if config.generator.api_key.is_none() {
        log::info!("no generator API key configured; refinement requests will fail");
    }
    config
}

/// A registered DOM listener, removed again when dropped.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

#[derive(Default)]
struct Sections {
    about: Option<RevealController>,
    projects: Option<RevealController>,
    contact: Option<RevealController>,
}

impl Sections {
    fn snapshot(&self) -> Reveals {
        let visible = |c: &Option<RevealController>| c.as_ref().is_some_and(|c| c.is_visible());
        Reveals {
            about: visible(&self.about),
            projects: visible(&self.projects),
            contact: visible(&self.contact),
        }
    }
}

pub struct App {
    state: RefCell<PageState>,
    view: View,
    /// Shared with the render loop, which reads it every frame.
    veil: Rc<RefCell<VeilConfig>>,
    generator: Rc<dyn ProfileGenerator>,
    sections: RefCell<Sections>,
    _background: Option<BackgroundHandle>,
    listeners: RefCell<Vec<Listener>>,
}

impl App {
    pub fn mount(config: SiteConfig, root: &Element, canvas: HtmlCanvasElement) -> Result<()> {
        let generator = Rc::new(GeminiGenerator::new(config.generator.clone()));
        Self::mount_with(config, root, canvas, generator)
    }

    pub fn mount_with(
        config: SiteConfig,
        root: &Element,
        canvas: HtmlCanvasElement,
        generator: Rc<dyn ProfileGenerator>,
    ) -> Result<()> {
        let view = View::build(root, &canvas)?;
        let state = PageState::new(config.scroll_threshold);
        let veil = Rc::new(RefCell::new(VeilConfig {
            hue_shift: state.profile().hue_shift as f32,
            ..config.veil.clone()
        }));

        let background = match render::start(canvas.clone(), Rc::clone(&veil)) {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::warn!("{err}; continuing without background");
                let _ = canvas.class_list().add_1("hidden");
                None
            }
        };

        let app = Rc::new(Self {
            state: RefCell::new(state),
            view,
            veil,
            generator,
            sections: RefCell::new(Sections::default()),
            _background: background,
            listeners: RefCell::new(Vec::new()),
        });
        app.attach_reveals(&config.reveal);
        app.wire()?;
        app.render();
        // A reload may restore a scrolled position.
        app.dispatch(Msg::Scrolled(scroll_y()));
        log::info!("page mounted");

        // Lives as long as the page; there is no unmount on the web.
        std::mem::forget(app);
        Ok(())
    }

    fn attach_reveals(self: &Rc<Self>, thresholds: &RevealThresholds) {
        let on_reveal = |app: &Rc<Self>| {
            let weak = Rc::downgrade(app);
            Box::new(move || {
                if let Some(app) = weak.upgrade() {
                    app.render();
                }
            }) as Box<dyn Fn()>
        };
        let sections = Sections {
            about: Some(RevealController::attach(&self.view.about, thresholds.about, on_reveal(self))),
            projects: Some(RevealController::attach(
                &self.view.projects,
                thresholds.projects,
                on_reveal(self),
            )),
            contact: Some(RevealController::attach(
                &self.view.contact,
                thresholds.contact,
                on_reveal(self),
            )),
        };
        *self.sections.borrow_mut() = sections;
    }

    fn listen<F>(self: &Rc<Self>, target: &EventTarget, kind: &'static str, handler: F) -> Result<()>
    where
        F: Fn(&Rc<Self>, Event) + 'static,
    {
        let weak = Rc::downgrade(self);
        let callback = Closure::wrap(Box::new(move |event: Event| {
            if let Some(app) = weak.upgrade() {
                handler(&app, event);
            }
        }) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(dom_err)?;
        self.listeners.borrow_mut().push(Listener {
            target: target.clone(),
            kind,
            callback,
        });
        Ok(())
    }

    fn wire(self: &Rc<Self>) -> Result<()> {
        let window = web_sys::window().ok_or_else(|| crate::PageError::Dom("no window".into()))?;
        let form: EventTarget = self.view.form.clone().into();
        let page = self
            .view
            .form
            .owner_document()
            .ok_or_else(|| crate::PageError::Dom("detached".into()))?;

        self.listen(&window, "scroll", |app, _| app.dispatch(Msg::Scrolled(scroll_y())))?;

        self.listen(&page, "click", |app, event| {
            let Some(action) = closest(&event, "[data-action]")
                .and_then(|el| el.get_attribute("data-action"))
            else {
                return;
            };
            match action.as_str() {
                ACTION_OPEN => {
                    app.dispatch(Msg::OpenGenerator);
                    app.view.focus_prompt();
                }
                ACTION_CLOSE => app.dispatch(Msg::CloseGenerator),
                ACTION_DISMISS => app.dispatch(Msg::DismissOutside),
                _ => {}
            }
        })?;

        self.listen(&form, "submit", |app, event| {
            event.prevent_default();
            app.dispatch(Msg::Submit);
        })?;

        let prompt: EventTarget = self.view.prompt.clone().into();
        self.listen(&prompt, "input", |app, _| {
            let text = app.view.prompt.value();
            app.dispatch(Msg::PromptChanged(text));
        })?;

        // mouseenter/mouseleave do not bubble, so hover is tracked by
        // delegation: crossing an interactive element's boundary counts.
        self.listen(&page, "mouseover", |app, event| {
            if crossed_interactive(&event) {
                app.dispatch(Msg::PointerEntered);
            }
        })?;
        self.listen(&page, "mouseout", |app, event| {
            if crossed_interactive(&event) {
                app.dispatch(Msg::PointerLeft);
            }
        })?;
        Ok(())
    }

    fn dispatch(self: &Rc<Self>, msg: Msg) {
        let command = self.state.borrow_mut().update(msg);
        match command {
            Command::Ignore => {}
            Command::Render => self.render(),
            Command::Generate(request) => {
                self.render();
                self.spawn_generation(request);
            }
            Command::NotifyFailure => {
                self.render();
                notify(FAILURE_NOTICE);
                self.view.focus_prompt();
            }
        }
    }

    fn spawn_generation(self: &Rc<Self>, request: GenerationRequest) {
        let app = Rc::clone(self);
        wasm_bindgen_futures::spawn_local(async move {
            let result = app.generator.generate(&request).await;
            if let Ok(profile) = &result {
                log::info!("profile refined for {:?}", profile.role);
            }
            app.dispatch(Msg::GenerationSettled(result));
        });
    }

    fn render(&self) {
        let state = self.state.borrow();
        {
            let mut veil = self.veil.borrow_mut();
            veil.hue_shift = state.profile().hue_shift as f32;
            veil.is_interacting = state.is_interacting();
        }
        let reveals = self.sections.borrow().snapshot();
        if let Err(err) = self.view.sync(&state, reveals) {
            log::error!("render failed: {err}");
        }
    }
}

fn scroll_y() -> f64 {
    web_sys::window()
        .and_then(|w| w.scroll_y().ok())
        .unwrap_or(0.0)
}

fn closest(event: &Event, selector: &str) -> Option<Element> {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(selector).ok().flatten())
}

/// True when a mouseover/mouseout moves the pointer across the boundary of
/// an interactive element rather than between its descendants.
fn crossed_interactive(event: &Event) -> bool {
    let Some(region) = closest(event, INTERACTIVE) else {
        return false;
    };
    let related = event
        .dyn_ref::<MouseEvent>()
        .and_then(|e| e.related_target())
        .and_then(|t| t.dyn_into::<Node>().ok());
    !region.contains(related.as_ref())
}

fn notify(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}
