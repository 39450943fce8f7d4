//! Page markup. The skeleton is built once; [`View::sync`] then patches it
//! from the current [`PageState`]. Profile text always goes in as text
//! nodes.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlAnchorElement, HtmlButtonElement, HtmlElement, HtmlTextAreaElement};

use super::dom_err;
use crate::error::{PageError, Result};
use crate::profile::{project_glyph, project_reveal_delay_ms, skill_reveal_delay_ms, BrandProfile};
use crate::shell::{Modal, PageState};

pub const ACTION_OPEN: &str = "open-generator";
pub const ACTION_CLOSE: &str = "close-generator";
pub const ACTION_DISMISS: &str = "dismiss-generator";

const SUBMIT_IDLE: &str = "Update Identity";
const SUBMIT_BUSY: &str = "Synchronizing Aura...";

/// Which tracked sections have been revealed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reveals {
    pub about: bool,
    pub projects: bool,
    pub contact: bool,
}

struct Builder<'a> {
    doc: &'a Document,
}

impl Builder<'_> {
    fn el(&self, tag: &str, class: &str) -> Result<Element> {
        let el = self.doc.create_element(tag).map_err(dom_err)?;
        if !class.is_empty() {
            el.set_class_name(class);
        }
        Ok(el)
    }

    fn text(&self, tag: &str, class: &str, text: &str) -> Result<Element> {
        let el = self.el(tag, class)?;
        el.set_text_content(Some(text));
        Ok(el)
    }

    fn child(&self, parent: &Element, tag: &str, class: &str) -> Result<Element> {
        let el = self.el(tag, class)?;
        append(parent, &el)?;
        Ok(el)
    }

    fn text_child(&self, parent: &Element, tag: &str, class: &str, text: &str) -> Result<Element> {
        let el = self.text(tag, class, text)?;
        append(parent, &el)?;
        Ok(el)
    }

    /// Element that toggles the background's interaction boost on hover.
    fn interactive(&self, parent: &Element, tag: &str, class: &str, text: &str) -> Result<Element> {
        let el = self.text_child(parent, tag, class, text)?;
        set_attr(&el, "data-interactive", "")?;
        Ok(el)
    }

    fn action_button(&self, parent: &Element, class: &str, text: &str, action: &str) -> Result<Element> {
        let el = self.interactive(parent, "button", class, text)?;
        set_attr(&el, "type", "button")?;
        set_attr(&el, "data-action", action)?;
        Ok(el)
    }
}

fn append(parent: &Element, child: &Element) -> Result<()> {
    parent.append_child(child).map(drop).map_err(dom_err)
}

fn set_attr(el: &Element, name: &str, value: &str) -> Result<()> {
    el.set_attribute(name, value).map_err(dom_err)
}

fn toggle(el: &Element, class: &str, on: bool) {
    let _ = el.class_list().toggle_with_force(class, on);
}

fn set_style(el: &Element, property: &str, value: &str) -> Result<()> {
    let el: &HtmlElement = el.dyn_ref().ok_or_else(|| PageError::Dom("not an HtmlElement".into()))?;
    el.style().set_property(property, value).map_err(dom_err)
}

fn clear(el: &Element) {
    el.set_text_content(None);
}

pub struct View {
    doc: Document,
    canvas: Element,
    nav: Element,
    nav_name: Element,
    headline: Element,
    tagline: Element,
    scroll_hint: Element,
    pub about: Element,
    summary: Element,
    skills: Element,
    pub projects: Element,
    project_grid: Element,
    modal: Element,
    pub form: Element,
    pub prompt: HtmlTextAreaElement,
    submit: HtmlButtonElement,
    close: HtmlButtonElement,
    pub contact: Element,
    contact_link: HtmlAnchorElement,
    copyright: Element,
    shown_profile: RefCell<Option<BrandProfile>>,
}

impl View {
    pub fn build(root: &Element, canvas: &Element) -> Result<Self> {
        let doc = root
            .owner_document()
            .ok_or_else(|| PageError::Dom("root is detached".into()))?;
        let b = Builder { doc: &doc };
        clear(root);
        root.set_class_name("page");

        // Navigation
        let nav = b.child(root, "nav", "nav")?;
        let nav_inner = b.child(&nav, "div", "nav-inner")?;
        let brand = b.interactive(&nav_inner, "div", "brand", "")?;
        let mark = b.child(&brand, "div", "brand-mark")?;
        b.text_child(&mark, "span", "", "P")?;
        let nav_name = b.text_child(&brand, "span", "brand-name", "")?;
        let links = b.child(&nav_inner, "div", "nav-links")?;
        for (label, href) in [("About", "#about"), ("Projects", "#projects")] {
            let a = b.interactive(&links, "a", "nav-link", label)?;
            set_attr(&a, "href", href)?;
        }
        b.action_button(&links, "pill-button", "AI Brand Studio", ACTION_OPEN)?;

        // Hero
        let hero = b.child(root, "header", "hero")?;
        let pill = b.text_child(&hero, "div", "status-pill reveal-in", "Portfolio v.2.5 Active")?;
        set_style(&pill, "animation-delay", "100ms")?;
        let headline = b.child(&hero, "h1", "headline reveal-in")?;
        set_style(&headline, "animation-delay", "300ms")?;
        let tagline = b.text_child(&hero, "p", "tagline float reveal-in", "")?;
        set_style(&tagline, "animation-delay", "500ms")?;
        let ctas = b.child(&hero, "div", "cta-row reveal-in")?;
        set_style(&ctas, "animation-delay", "700ms")?;
        let explore = b.interactive(&ctas, "a", "cta-primary glow", "Explore Projects")?;
        set_attr(&explore, "href", "#projects")?;
        b.action_button(&ctas, "cta-secondary", "Refine with AI", ACTION_OPEN)?;
        let scroll_hint = b.child(&hero, "div", "scroll-hint")?;
        let mouse = b.child(&scroll_hint, "div", "scroll-hint-mouse")?;
        b.child(&mouse, "div", "scroll-hint-dot")?;

        // About
        let about = b.child(root, "section", "section about reveal-hidden")?;
        set_attr(&about, "id", "about")?;
        let about_text = b.child(&about, "div", "about-text")?;
        b.text_child(&about_text, "h2", "eyebrow", "The Foundation")?;
        let summary = b.text_child(&about_text, "p", "summary", "")?;
        let skills = b.child(&about_text, "div", "skills")?;
        let card = b.child(&about, "div", "glass-card")?;
        let dots = b.child(&card, "div", "window-dots")?;
        for color in ["dot-red", "dot-yellow", "dot-green"] {
            b.child(&dots, "div", color)?;
        }
        for (label, pct, class) in [
            ("Conceptual Design", "95%", "bar-fill bar-indigo"),
            ("Systems Architecture", "90%", "bar-fill bar-purple"),
        ] {
            let meter = b.child(&card, "div", "meter")?;
            let head = b.child(&meter, "div", "meter-head")?;
            b.text_child(&head, "span", "", label)?;
            b.text_child(&head, "span", "", pct)?;
            let track = b.child(&meter, "div", "bar-track")?;
            let fill = b.child(&track, "div", class)?;
            set_style(&fill, "--fill", pct)?;
        }

        // Projects
        let projects = b.child(root, "section", "section projects reveal-hidden")?;
        set_attr(&projects, "id", "projects")?;
        let head = b.child(&projects, "div", "projects-head")?;
        let titles = b.child(&head, "div", "")?;
        b.text_child(&titles, "h2", "eyebrow", "Gallery of Work")?;
        let h3 = b.text_child(&titles, "h3", "section-title", "Featured ")?;
        b.child(&h3, "br", "")?;
        b.text_child(&h3, "span", "muted", "Systems")?;
        b.text_child(
            &head,
            "p",
            "mono-note",
            "High performance architecture meets expressive interaction design.",
        )?;
        let project_grid = b.child(&projects, "div", "project-grid")?;

        // Generator modal
        let modal = b.child(root, "div", "modal hidden")?;
        let backdrop = b.child(&modal, "div", "modal-backdrop")?;
        set_attr(&backdrop, "data-action", ACTION_DISMISS)?;
        let panel = b.child(&modal, "div", "modal-panel reveal-in")?;
        let panel_head = b.child(&panel, "div", "modal-head")?;
        b.text_child(&panel_head, "h3", "modal-title", "Brand Studio")?;
        let close = b.text_child(&panel_head, "button", "modal-close", "×")?;
        set_attr(&close, "type", "button")?;
        set_attr(&close, "data-action", ACTION_CLOSE)?;
        set_attr(&close, "aria-label", "Close")?;
        b.text_child(
            &panel,
            "p",
            "modal-copy",
            "Our neural engine will re-map your portfolio aesthetic and content based on your \
             professional vision.",
        )?;
        let form = b.child(&panel, "form", "modal-form")?;
        let prompt = b.child(&form, "textarea", "prompt")?;
        set_attr(
            &prompt,
            "placeholder",
            "Ex: Refocus my profile for a specialized AI Infrastructure role with an emphasis on \
             sustainable computing...",
        )?;
        let submit = b.interactive(&form, "button", "submit", SUBMIT_IDLE)?;
        set_attr(&submit, "type", "submit")?;

        // Footer
        let contact = b.child(root, "footer", "section contact reveal-hidden")?;
        set_attr(&contact, "id", "contact")?;
        b.text_child(&contact, "h2", "eyebrow wide", "Initiate Contact")?;
        let contact_link = b.interactive(&contact, "a", "contact-link", "")?;
        let socials_wrap = b.child(&contact, "div", "footer-bottom")?;
        let socials = b.child(&socials_wrap, "div", "socials")?;
        for label in ["LinkedIn", "GitHub", "Layers"] {
            b.interactive(&socials, "span", "social", label)?;
        }
        let copyright = b.text_child(&socials_wrap, "div", "copyright", "")?;

        Ok(Self {
            canvas: canvas.clone(),
            nav,
            nav_name,
            headline,
            tagline,
            scroll_hint,
            about,
            summary,
            skills,
            projects,
            project_grid,
            modal,
            form,
            prompt: prompt.dyn_into().map_err(|_| PageError::Dom("textarea".into()))?,
            submit: submit.dyn_into().map_err(|_| PageError::Dom("submit".into()))?,
            close: close.dyn_into().map_err(|_| PageError::Dom("close".into()))?,
            contact,
            contact_link: contact_link
                .dyn_into()
                .map_err(|_| PageError::Dom("contact link".into()))?,
            copyright,
            shown_profile: RefCell::new(None),
            doc,
        })
    }

    pub fn sync(&self, state: &PageState, reveals: Reveals) -> Result<()> {
        let changed = self.shown_profile.borrow().as_ref() != Some(state.profile());
        if changed {
            self.render_profile(state.profile())?;
            *self.shown_profile.borrow_mut() = Some(state.profile().clone());
        }

        let scrolled = state.is_scrolled();
        toggle(&self.nav, "scrolled", scrolled);
        toggle(&self.canvas, "dimmed", scrolled);
        toggle(&self.scroll_hint, "faded", scrolled);

        for (section, visible) in [
            (&self.about, reveals.about),
            (&self.projects, reveals.projects),
            (&self.contact, reveals.contact),
        ] {
            toggle(section, "reveal-visible", visible);
        }
        self.sync_staggered(&self.skills, reveals.about);
        self.sync_staggered(&self.project_grid, reveals.projects);

        let open = state.modal() == Modal::Open;
        toggle(&self.modal, "hidden", !open);
        let busy = state.is_generating();
        if self.prompt.value() != state.prompt() {
            self.prompt.set_value(state.prompt());
        }
        self.prompt.set_disabled(busy);
        self.close.set_disabled(busy);
        self.submit.set_disabled(!state.can_submit());
        toggle(&self.submit, "busy", busy);
        self.submit
            .set_text_content(Some(if busy { SUBMIT_BUSY } else { SUBMIT_IDLE }));
        Ok(())
    }

    pub fn focus_prompt(&self) {
        let _ = self.prompt.focus();
    }

    fn sync_staggered(&self, container: &Element, visible: bool) {
        let children = container.children();
        for i in 0..children.length() {
            if let Some(child) = children.item(i) {
                toggle(&child, "reveal-visible", visible);
            }
        }
    }

    fn render_profile(&self, profile: &BrandProfile) -> Result<()> {
        let b = Builder { doc: &self.doc };
        self.nav_name.set_text_content(Some(&profile.name));

        clear(&self.headline);
        for (i, word) in profile.headline_words().enumerate() {
            let class = if i == 0 { "headline-lead" } else { "headline-accent" };
            b.text_child(&self.headline, "span", class, &format!("{word} "))?;
        }
        self.tagline.set_text_content(Some(&profile.tagline));
        self.summary.set_text_content(Some(&profile.summary));

        clear(&self.skills);
        for (i, skill) in profile.skills.iter().enumerate() {
            let chip = b.interactive(&self.skills, "span", "skill stagger", skill)?;
            set_style(&chip, "animation-delay", &format!("{}ms", skill_reveal_delay_ms(i)))?;
        }

        clear(&self.project_grid);
        for (i, project) in profile.projects.iter().enumerate() {
            let card = b.interactive(&self.project_grid, "article", "project-card reveal-hidden", "")?;
            set_style(&card, "transition-delay", &format!("{}ms", project_reveal_delay_ms(i)))?;
            b.text_child(&card, "div", "project-glyph", project_glyph(i))?;
            let title = b.text_child(&card, "h4", "project-title", "")?;
            match &project.link {
                Some(link) => {
                    let a = b.text_child(&title, "a", "", &project.title)?;
                    set_attr(&a, "href", link)?;
                    set_attr(&a, "target", "_blank")?;
                    set_attr(&a, "rel", "noopener noreferrer")?;
                }
                None => title.set_text_content(Some(&project.title)),
            }
            b.text_child(&card, "p", "project-description", &project.description)?;
            let tags = b.child(&card, "div", "tags")?;
            for tag in &project.tags {
                b.text_child(&tags, "span", "tag", tag)?;
            }
        }

        let address = profile.contact_address();
        self.contact_link.set_href(&format!("mailto:{address}"));
        self.contact_link.set_text_content(Some(&address));

        let year = js_sys::Date::new_0().get_full_year();
        self.copyright.set_text_content(Some(&format!(
            "© {year} {} // Neural Brand System // [41.8781° N, 87.6298° W]",
            profile.name
        )));
        Ok(())
    }
}
